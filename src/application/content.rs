//! Content collection loading and queries.

use std::{
    collections::BTreeSet,
    fs, io,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::{
    posts::{FrontMatterError, Post, split_front_matter},
    slug::{SlugError, derive_slug, ensure_unique_slug},
};

pub const WORDS_PER_MINUTE: u32 = 200;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid front matter in `{}`: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("could not derive a permalink for `{}`: {source}", path.display())]
    Slug {
        path: PathBuf,
        #[source]
        source: SlugError,
    },
}

/// Every post loaded from the content directory, drafts included. Queries
/// filter drafts out; the build step never publishes them.
#[derive(Debug)]
pub struct Collection {
    posts: Vec<Post>,
}

impl Collection {
    /// Load every `*.md` file under `content_dir`.
    ///
    /// Files are visited in a deterministic name order so permalink
    /// collision suffixes are stable across builds. Posts end up sorted
    /// newest first.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let mut posts: Vec<Post> = Vec::new();

        for entry in WalkDir::new(content_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }

            let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let relative = path.strip_prefix(content_dir).unwrap_or(path).to_path_buf();

            let (matter, body) =
                split_front_matter(&raw).map_err(|source| ContentError::FrontMatter {
                    path: relative.clone(),
                    source,
                })?;
            let date = matter.date().map_err(|source| ContentError::FrontMatter {
                path: relative.clone(),
                source,
            })?;
            let slug = resolve_permalink(matter.slug.as_deref(), &relative, &posts).map_err(
                |source| ContentError::Slug {
                    path: relative.clone(),
                    source,
                },
            )?;

            let post = Post {
                slug,
                title: matter.title,
                date,
                summary: matter.summary,
                tags: matter.tags,
                draft: matter.draft,
                featured: matter.featured,
                cover: matter.cover,
                reading_time_minutes: reading_time(body),
                source_path: relative,
                body: body.to_string(),
            };
            debug!(
                target: "application::content",
                slug = %post.slug,
                draft = post.draft,
                "loaded post"
            );
            posts.push(post);
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(Self { posts })
    }

    /// Published posts, newest first.
    pub fn published(&self) -> Vec<&Post> {
        self.posts.iter().filter(|post| !post.draft).collect()
    }

    /// Published posts flagged as featured.
    pub fn featured(&self) -> Vec<&Post> {
        self.published()
            .into_iter()
            .filter(|post| post.featured)
            .collect()
    }

    /// Look up a published post by its permalink slug.
    pub fn by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts
            .iter()
            .find(|post| post.slug == slug && !post.draft)
    }

    /// Published posts carrying the given tag, case-insensitively.
    pub fn by_tag(&self, tag: &str) -> Vec<&Post> {
        self.published()
            .into_iter()
            .filter(|post| post.has_tag(tag))
            .collect()
    }

    /// Sorted, de-duplicated tags across published posts.
    pub fn tags(&self) -> Vec<String> {
        self.published()
            .iter()
            .flat_map(|post| post.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn resolve_permalink(
    explicit: Option<&str>,
    relative: &Path,
    loaded: &[Post],
) -> Result<String, SlugError> {
    let base = match explicit {
        Some(slug) => derive_slug(slug)?,
        None => derive_path_slug(relative)?,
    };
    ensure_unique_slug(base, |candidate| {
        loaded.iter().all(|post| post.slug != candidate)
    })
}

/// Permalink from the content-relative path: every directory segment and the
/// file stem are slugified independently and rejoined with `/`.
fn derive_path_slug(relative: &Path) -> Result<String, SlugError> {
    let mut segments = Vec::new();

    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(name) = component {
                segments.push(derive_slug(&name.to_string_lossy())?);
            }
        }
    }

    let stem = relative
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    segments.push(derive_slug(stem)?);

    Ok(segments.join("/"))
}

fn reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count() as u32;
    ((words as f32 / WORDS_PER_MINUTE as f32).ceil() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_post(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write post");
    }

    fn post_source(title: &str, date: &str, extra: &str) -> String {
        format!("+++\ntitle = \"{title}\"\ndate = \"{date}\"\n{extra}+++\n\n# {title}\n")
    }

    #[test]
    fn load_sorts_published_newest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_post(
            dir.path(),
            "older.md",
            &post_source("Older", "2024-01-01", ""),
        );
        write_post(
            dir.path(),
            "newer.md",
            &post_source("Newer", "2024-06-01", ""),
        );
        write_post(
            dir.path(),
            "hidden.md",
            &post_source("Hidden", "2024-07-01", "draft = true\n"),
        );

        let collection = Collection::load(dir.path()).expect("load");
        assert_eq!(collection.len(), 3);

        let slugs: Vec<&str> = collection
            .published()
            .iter()
            .map(|post| post.slug.as_str())
            .collect();
        assert_eq!(slugs, ["newer", "older"]);
        assert!(collection.by_slug("hidden").is_none());
    }

    #[test]
    fn load_derives_pinyin_permalinks_from_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_post(
            dir.path(),
            "笔记/部署指南.md",
            &post_source("部署指南", "2024-02-02", ""),
        );

        let collection = Collection::load(dir.path()).expect("load");
        let post = collection.published()[0];
        assert_eq!(post.slug, "bi-ji/bu-shu-zhi-nan");
    }

    #[test]
    fn explicit_slug_overrides_path_and_collisions_get_suffixes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_post(
            dir.path(),
            "a.md",
            &post_source("A", "2024-03-01", "slug = \"hello\"\n"),
        );
        write_post(
            dir.path(),
            "hello.md",
            &post_source("Hello", "2024-03-02", ""),
        );

        let collection = Collection::load(dir.path()).expect("load");
        let mut slugs: Vec<&str> = collection
            .published()
            .iter()
            .map(|post| post.slug.as_str())
            .collect();
        slugs.sort();
        assert_eq!(slugs, ["hello", "hello-2"]);
    }

    #[test]
    fn queries_filter_by_tag_and_collect_sorted_tags() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_post(
            dir.path(),
            "a.md",
            &post_source("A", "2024-01-01", "tags = [\"Rust\", \"web\"]\n"),
        );
        write_post(
            dir.path(),
            "b.md",
            &post_source("B", "2024-01-02", "tags = [\"rust\"]\nfeatured = true\n"),
        );

        let collection = Collection::load(dir.path()).expect("load");
        assert_eq!(collection.by_tag("RUST").len(), 2);
        assert_eq!(collection.by_tag("web").len(), 1);
        assert_eq!(collection.tags(), ["Rust", "rust", "web"]);
        assert_eq!(collection.featured().len(), 1);
        assert_eq!(collection.featured()[0].slug, "b");
    }

    #[test]
    fn front_matter_errors_name_the_offending_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_post(dir.path(), "broken.md", "+++\ntitle =\n+++\n");

        let err = Collection::load(dir.path()).expect_err("broken front matter");
        match err {
            ContentError::FrontMatter { path, .. } => {
                assert_eq!(path, PathBuf::from("broken.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reading_time_rounds_up_and_never_reports_zero() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("one two three"), 1);
        let long = "word ".repeat(401);
        assert_eq!(reading_time(&long), 3);
    }
}
