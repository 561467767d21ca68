//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use blogcrew_core::{
    BlogCrew, CrewSettings, OpenRouterEngine, ProgressReporter, list_blogs, load_blog,
};
use blogcrew_shared::{AppConfig, Topic, init_config, load_config, validate_api_keys};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// blogcrew: AI-written technical blog posts about MongoDB.
#[derive(Parser)]
#[command(
    name = "blogcrew",
    version,
    about = "Generate technical blog posts with a crew of AI agents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Plan, research, write and edit a new blog post.
    Generate {
        /// Blog topic. Leave empty to let the planner pick a trending one.
        #[arg(short, long)]
        topic: Option<String>,

        /// Output directory for the post (defaults to `blog_dir` from config).
        #[arg(short, long)]
        out: Option<String>,

        /// OpenRouter model id (defaults to `default_model` from config).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List saved blog posts.
    List {
        /// Blog directory (defaults to `blog_dir` from config).
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Print a saved blog post with its metadata.
    Show {
        /// Path to the post's Markdown file.
        path: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "blogcrew=info",
        1 => "blogcrew=debug",
        _ => "blogcrew=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate { topic, out, model } => {
            cmd_generate(topic.as_deref(), out.as_deref(), model.as_deref()).await
        }
        Command::List { dir } => cmd_list(dir.as_deref()),
        Command::Show { path } => cmd_show(&path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(topic: Option<&str>, out: Option<&str>, model: Option<&str>) -> Result<()> {
    // Validate API keys before doing anything
    let config = load_config()?;
    validate_api_keys(&config)?;

    let mut settings = CrewSettings::from_config(&config);
    if let Some(dir) = out {
        settings.blog_dir = PathBuf::from(dir);
    }

    let engine = OpenRouterEngine::from_config(&config, model)?;
    let crew = BlogCrew::new(Topic::parse(topic), settings);

    info!(
        run_id = %crew.run_id(),
        topic = crew.topic().map_or("AI-chosen topic", Topic::as_str),
        model = engine.model(),
        "generating blog post"
    );

    let started = Instant::now();
    let reporter = CliProgress::new();
    let result = crew.run(&engine, &reporter).await;
    reporter.finish();
    let path = result?;

    let post = load_blog(&path)?;

    println!();
    println!("  Blog post generated successfully!");
    println!("  Title:  {}", post.meta.title);
    println!("  Words:  {}", post.word_count());
    println!("  Path:   {}", path.display());
    println!("  Time:   {:.1}s", started.elapsed().as_secs_f64());
    println!();

    Ok(())
}

fn cmd_list(dir: Option<&str>) -> Result<()> {
    let dir = blog_dir(dir)?;
    info!(dir = %dir.display(), "listing blog posts");

    let posts = list_blogs(&dir);
    if posts.is_empty() {
        println!("No blog posts found in {}", dir.display());
        return Ok(());
    }

    for path in &posts {
        match load_blog(path) {
            Ok(post) => println!(
                "{}  {:<50}  {}",
                post.meta.date,
                post.meta.title,
                path.display()
            ),
            Err(e) => println!("??????????  {:<50}  {} ({e})", "(unreadable)", path.display()),
        }
    }
    println!("\n{} post(s)", posts.len());

    Ok(())
}

fn cmd_show(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(eyre!("no blog post at '{}'", path.display()));
    }

    let post = load_blog(path)?;
    println!("Title:       {}", post.meta.title);
    println!("Date:        {}", post.meta.date);
    println!("Tags:        {}", post.meta.tags.join(", "));
    println!("Description: {}", post.meta.description);
    println!("Words:       {}", post.word_count());
    println!();
    println!("{}", post.body);

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// `--dir` if given, otherwise `blog_dir` from config.
fn blog_dir(flag: Option<&str>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(PathBuf::from(load_config()?.defaults.blog_dir)),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:30.cyan/blue}] {percent:>3}% {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn update(&self, message: &str, fraction: f32) {
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * 100.0).round() as u64);
        self.bar.set_message(message.to_string());
    }
}
