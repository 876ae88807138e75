//! Site build orchestration: load the collection, render every published
//! post, and write the static artifacts.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;
use time::{format_description::BorrowedFormatItem, macros::format_description};
use tracing::{debug, info};

use crate::{
    application::{
        content::{Collection, ContentError},
        pagination::{PageInfo, paginate},
        render::{RenderError, render_service},
    },
    config::Settings,
    domain::{
        outline::{HeadingRecord, scan_outline},
        posts::{FrontMatterError, Post, split_front_matter},
        slug::AnchorSlugger,
    },
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("failed to render `{slug}`: {source}")]
    Render {
        slug: String,
        #[source]
        source: RenderError,
    },
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid front matter in `{}`: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("failed to encode `{artifact}`: {source}")]
    Encode {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to format date for `{slug}`")]
    DateFormat { slug: String },
}

#[derive(Debug, Serialize)]
struct PostSummary<'a> {
    slug: &'a str,
    title: &'a str,
    date: String,
    summary: &'a str,
    tags: &'a [String],
    featured: bool,
    reading_time_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ListingPage<'a> {
    posts: Vec<&'a str>,
    pagination: PageInfo,
}

#[derive(Debug, Serialize)]
struct SiteIndex<'a> {
    title: &'a str,
    description: &'a str,
    base_url: &'a str,
    posts: Vec<PostSummary<'a>>,
    tags: Vec<String>,
}

/// Summary of one completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub posts: usize,
    pub output_dir: PathBuf,
}

pub struct SiteBuilder {
    settings: Settings,
}

impl SiteBuilder {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Build the whole site into the configured output directory.
    ///
    /// Each published post gets `posts/<slug>/index.html` (sanitised HTML
    /// with heading anchors) and `posts/<slug>/outline.json` (the
    /// source-scanned navigation outline). The site index with post
    /// metadata and the tag list lands in `index.json`, and the listing is
    /// paginated into `pages/<n>/index.json`. Drafts are skipped.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let collection = Collection::load(&self.settings.content.dir)?;
        let renderer = render_service();
        let output_dir = &self.settings.output.dir;

        let published = collection.published();
        for post in &published {
            let rendered = renderer
                .render(&post.body)
                .map_err(|source| BuildError::Render {
                    slug: post.slug.clone(),
                    source,
                })?;
            let outline = post_outline(post);

            let post_dir = output_dir.join("posts").join(&post.slug);
            write_file(&post_dir.join("index.html"), rendered.html.as_bytes())?;
            let outline_json =
                serde_json::to_vec_pretty(&outline).map_err(|source| BuildError::Encode {
                    artifact: "outline.json",
                    source,
                })?;
            write_file(&post_dir.join("outline.json"), &outline_json)?;

            debug!(
                target: "application::site",
                slug = %post.slug,
                headings = outline.len(),
                "rendered post"
            );
        }

        self.write_listing_pages(output_dir, &published)?;

        let index = site_index(&self.settings, &published, collection.tags())?;
        let index_json =
            serde_json::to_vec_pretty(&index).map_err(|source| BuildError::Encode {
                artifact: "index.json",
                source,
            })?;
        write_file(&output_dir.join("index.json"), &index_json)?;

        info!(
            target: "application::site",
            posts = published.len(),
            output = %output_dir.display(),
            "site build complete"
        );
        Ok(BuildReport {
            posts: published.len(),
            output_dir: output_dir.clone(),
        })
    }

    fn write_listing_pages(
        &self,
        output_dir: &Path,
        published: &[&Post],
    ) -> Result<(), BuildError> {
        let per_page = self.settings.content.per_page;
        let total_pages = paginate(published, 1, per_page).info.total_pages;

        for page_number in 1..=total_pages {
            let page = paginate(published, page_number, per_page);
            let listing = ListingPage {
                posts: page.items.iter().map(|post| post.slug.as_str()).collect(),
                pagination: page.info,
            };
            let listing_json =
                serde_json::to_vec_pretty(&listing).map_err(|source| BuildError::Encode {
                    artifact: "listing page",
                    source,
                })?;
            write_file(
                &output_dir
                    .join("pages")
                    .join(page_number.to_string())
                    .join("index.json"),
                &listing_json,
            )?;
        }

        Ok(())
    }
}

/// Scan a post body for its navigation outline, with a fresh id session.
pub fn post_outline(post: &Post) -> Vec<HeadingRecord> {
    let mut slugger = AnchorSlugger::new();
    scan_outline(&post.body, &mut slugger)
}

/// Extract the heading outline of a standalone markdown file.
///
/// Front matter is stripped when present; a file without an opening fence
/// is scanned whole.
pub fn outline_file(path: &Path) -> Result<Vec<HeadingRecord>, BuildError> {
    let raw = fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let body = match split_front_matter(&raw) {
        Ok((_, body)) => body,
        Err(FrontMatterError::MissingFence) => raw.as_str(),
        Err(source) => {
            return Err(BuildError::FrontMatter {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut slugger = AnchorSlugger::new();
    Ok(scan_outline(body, &mut slugger))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn site_index<'a>(
    settings: &'a Settings,
    published: &[&'a Post],
    tags: Vec<String>,
) -> Result<SiteIndex<'a>, BuildError> {
    let mut posts = Vec::with_capacity(published.len());
    for post in published {
        let date = post
            .date
            .format(DATE_FORMAT)
            .map_err(|_| BuildError::DateFormat {
                slug: post.slug.clone(),
            })?;
        posts.push(PostSummary {
            slug: &post.slug,
            title: &post.title,
            date,
            summary: &post.summary,
            tags: &post.tags,
            featured: post.featured,
            reading_time_minutes: post.reading_time_minutes,
            cover: post.cover.as_deref(),
        });
    }

    Ok(SiteIndex {
        title: &settings.site.title,
        description: &settings.site.description,
        base_url: &settings.site.base_url,
        posts,
        tags,
    })
}
