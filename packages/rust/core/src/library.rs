//! The on-disk blog library: saving, listing and loading posts.
//!
//! Posts are written atomically (temp file, then rename) under a filename
//! claimed with create-new semantics, so concurrent runs that derive the
//! same slug never overwrite each other.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use blogcrew_markdown::{BlogPost, slugify};
use blogcrew_shared::{BlogCrewError, Result};

/// Slug used when a title slugifies to nothing.
const FALLBACK_SLUG: &str = "blog";

/// Give up after this many numbered variants of one slug.
const MAX_SUFFIX: u32 = 1000;

/// Longest slug in bytes. Leaves room under the 255-byte name limit for
/// `-1000.md` and the `.{name}.tmp` file written next to it.
const MAX_SLUG_BYTES: usize = 200;

/// Persist `post` under `dir` and return the file's path.
///
/// The file is named after the title's slug; if that name is taken, `-2`,
/// `-3`, ... are appended until a free name is found.
#[instrument(skip_all, fields(dir = %dir.display(), title = %post.meta.title))]
pub fn save_post(dir: &Path, post: &BlogPost) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| BlogCrewError::io(dir, e))?;

    let content = post.render()?;
    let slug = bounded_slug(&post.meta.title);

    let target = claim_path(dir, &slug)?;
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{slug}.md"));
    let temp = dir.join(format!(".{file_name}.tmp"));

    if let Err(e) = write_then_rename(&temp, &target, &content) {
        let _ = std::fs::remove_file(&temp);
        let _ = std::fs::remove_file(&target);
        return Err(e);
    }

    info!(path = %target.display(), bytes = content.len(), "blog post saved");
    Ok(target)
}

/// Slug of `title`, cut to [`MAX_SLUG_BYTES`] on a char boundary.
fn bounded_slug(title: &str) -> String {
    let mut slug = slugify(title);
    if slug.len() > MAX_SLUG_BYTES {
        let mut end = MAX_SLUG_BYTES;
        while !slug.is_char_boundary(end) {
            end -= 1;
        }
        slug.truncate(end);
        let kept = slug.trim_end_matches('-').len();
        slug.truncate(kept);
    }

    if slug.chars().all(|c| c == '-' || c.is_whitespace()) {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Reserve `<slug>.md` (or the first free numbered variant) by creating it.
fn claim_path(dir: &Path, slug: &str) -> Result<PathBuf> {
    for n in 1..=MAX_SUFFIX {
        let name = if n == 1 {
            format!("{slug}.md")
        } else {
            format!("{slug}-{n}.md")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!(path = %path.display(), "claimed filename");
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BlogCrewError::io(&path, e)),
        }
    }

    Err(BlogCrewError::validation(format!(
        "no free filename for '{slug}' after {MAX_SUFFIX} attempts"
    )))
}

fn write_then_rename(temp: &Path, target: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::File::create(temp).map_err(|e| BlogCrewError::io(temp, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| BlogCrewError::io(temp, e))?;
    file.sync_all().map_err(|e| BlogCrewError::io(temp, e))?;
    drop(file);

    std::fs::rename(temp, target).map_err(|e| BlogCrewError::io(target, e))
}

/// Saved posts under `dir`, sorted by file name.
///
/// Only non-empty `.md` files count. A missing or unreadable directory
/// yields an empty list.
pub fn list_blogs(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "failed to read blog directory");
            }
            return Vec::new();
        }
    };

    let mut posts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .metadata()
                .map(|m| m.is_file() && m.len() > 0)
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();

    posts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(count = posts.len(), "listed blog posts");
    posts
}

/// Read and parse one saved post.
pub fn load_blog(path: &Path) -> Result<BlogPost> {
    let text = std::fs::read_to_string(path).map_err(|e| BlogCrewError::io(path, e))?;
    BlogPost::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("blogcrew-library-test-{}", uuid::Uuid::now_v7()))
    }

    fn post(title: &str) -> BlogPost {
        BlogPost::new(
            title.into(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            vec!["mongodb".into(), "databases".into(), "technical".into()],
            format!("# {title}\n\nBody paragraph.\n"),
        )
    }

    #[test]
    fn save_writes_slugged_file() {
        let dir = temp_dir();
        let path = save_post(&dir, &post("Time Series Collections")).unwrap();

        assert_eq!(path, dir.join("time-series-collections.md"));
        let loaded = load_blog(&path).unwrap();
        assert_eq!(loaded.meta.title, "Time Series Collections");
        assert_eq!(loaded.meta.tags, vec!["mongodb", "databases", "technical"]);
        assert!(loaded.body.starts_with("# Time Series Collections"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_never_overwrites() {
        let dir = temp_dir();
        let first = save_post(&dir, &post("Same Title")).unwrap();
        let second = save_post(&dir, &post("Same Title")).unwrap();
        let third = save_post(&dir, &post("Same Title")).unwrap();

        assert_eq!(first, dir.join("same-title.md"));
        assert_eq!(second, dir.join("same-title-2.md"));
        assert_eq!(third, dir.join("same-title-3.md"));
        assert_eq!(list_blogs(&dir).len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = temp_dir();
        save_post(&dir, &post("Atomic")).unwrap();

        for entry in std::fs::read_dir(&dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.starts_with('.'), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_with_separator_title() {
        let dir = temp_dir();
        let path = save_post(&dir, &post("Replica Sets / Sharding")).unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "replica-sets---sharding.md"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_bounds_long_titles() {
        let dir = temp_dir();
        let title = "a".repeat(251);
        let first = save_post(&dir, &post(&title)).unwrap();
        let second = save_post(&dir, &post(&title)).unwrap();

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("{}.md", "a".repeat(MAX_SLUG_BYTES)));
        assert_eq!(
            second.file_name().unwrap().to_string_lossy(),
            format!("{}-2.md", "a".repeat(MAX_SLUG_BYTES))
        );
        assert_eq!(load_blog(&first).unwrap().meta.title, title);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bounded_slug_respects_char_boundaries() {
        // 'é' is two bytes, so byte 200 falls inside a char
        let slug = bounded_slug(&format!("a{}", "é".repeat(150)));
        assert!(slug.len() <= MAX_SLUG_BYTES);
        assert!(slug.starts_with('a'));
        assert!(slug[1..].chars().all(|c| c == 'é'));

        assert_eq!(bounded_slug(&format!("{} tail", "x".repeat(199))), "x".repeat(199));
        assert_eq!(bounded_slug("   "), "blog");
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let dir = temp_dir();
        assert!(list_blogs(&dir).is_empty());
    }

    #[test]
    fn list_filters_and_sorts() {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("nested.md")).unwrap();
        std::fs::write(dir.join("b-post.md"), "---\ntitle: B\ndate: 2024-01-01\n---\nB").unwrap();
        std::fs::write(dir.join("a-post.md"), "---\ntitle: A\ndate: 2024-01-01\n---\nA").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a post").unwrap();
        std::fs::write(dir.join("claimed.md"), "").unwrap();

        let listed = list_blogs(&dir);
        assert_eq!(listed, vec![dir.join("a-post.md"), dir.join("b-post.md")]);
        // listing has no side effects
        assert_eq!(list_blogs(&dir), listed);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_blog(&temp_dir().join("nope.md")).unwrap_err();
        assert!(matches!(err, BlogCrewError::Io { .. }));
    }
}
