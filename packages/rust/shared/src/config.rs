//! Application configuration for blogcrew.
//!
//! User config lives at `~/.blogcrew/blogcrew.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BlogCrewError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "blogcrew.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".blogcrew";

// ---------------------------------------------------------------------------
// Config structs (matching blogcrew.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenRouter settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Published post settings.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory generated posts are written to (relative to the cwd).
    #[serde(default = "default_blog_dir")]
    pub blog_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            blog_dir: default_blog_dir(),
        }
    }
}

fn default_blog_dir() -> String {
    "data/blogs".into()
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used by every agent.
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            default_model: default_model(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}

/// `[search]` section (Google Programmable Search).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Env var holding the Google API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Env var holding the custom search engine id.
    #[serde(default = "default_engine_id_env")]
    pub engine_id_env: String,

    /// Custom Search JSON API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            engine_id_env: default_engine_id_env(),
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_key_env() -> String {
    "GOOGLE_API_KEY".into()
}
fn default_engine_id_env() -> String {
    "GOOGLE_CSE_ID".into()
}
fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}
fn default_search_timeout() -> u64 {
    10
}

/// `[blog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Title used when the final post has no heading.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Tags written into every post's frontmatter.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            tags: default_tags(),
        }
    }
}

fn default_title() -> String {
    "MongoDB Technical Blog".into()
}
fn default_tags() -> Vec<String> {
    vec!["mongodb".into(), "databases".into(), "technical".into()]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.blogcrew/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BlogCrewError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.blogcrew/blogcrew.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BlogCrewError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BlogCrewError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BlogCrewError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BlogCrewError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BlogCrewError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a secret from the named env var, rejecting unset or empty values.
pub fn read_env_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(BlogCrewError::config(format!(
            "{var_name} is not set. Export it before running a generation."
        ))),
    }
}

/// Check that every secret a generation run needs is present.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    read_env_key(&config.openrouter.api_key_env).map_err(|_| {
        BlogCrewError::config(format!(
            "OpenRouter API key not found. Set the {} environment variable.\n\
             Get a key at https://openrouter.ai/keys",
            config.openrouter.api_key_env
        ))
    })?;
    read_env_key(&config.search.api_key_env)?;
    read_env_key(&config.search.engine_id_env)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("blog_dir"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(toml_str.contains("GOOGLE_CSE_ID"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.blog_dir, "data/blogs");
        assert_eq!(parsed.blog.default_title, "MongoDB Technical Blog");
        assert_eq!(parsed.blog.tags, vec!["mongodb", "databases", "technical"]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[openrouter]
default_model = "anthropic/claude-3.5-haiku"

[blog]
tags = ["rust"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.openrouter.default_model, "anthropic/claude-3.5-haiku");
        assert_eq!(config.openrouter.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.blog.tags, vec!["rust"]);
        assert_eq!(config.blog.default_title, "MongoDB Technical Blog");
        assert_eq!(config.search.timeout_secs, 10);
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("blogcrew-no-such-config.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, BlogCrewError::Io { .. }));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openrouter.api_key_env = "BC_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_keys(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
