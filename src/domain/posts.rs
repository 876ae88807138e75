//! Post entities and TOML front matter.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

pub const FRONT_MATTER_FENCE: &str = "+++";

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing `+++` front matter fence")]
    MissingFence,
    #[error("unterminated front matter block")]
    Unterminated,
    #[error("invalid front matter: {0}")]
    Invalid(#[from] toml::de::Error),
    #[error("invalid date `{value}`: expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Author-provided metadata at the top of every post source file.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub cover: Option<String>,
    /// Explicit permalink override; the path-derived slug is used otherwise.
    #[serde(default)]
    pub slug: Option<String>,
}

impl FrontMatter {
    pub fn date(&self) -> Result<Date, FrontMatterError> {
        Date::parse(self.date.trim(), DATE_FORMAT).map_err(|_| FrontMatterError::InvalidDate {
            value: self.date.clone(),
        })
    }
}

/// Split a source document into parsed front matter and the markdown body.
///
/// The document must open with a `+++` fence on its own line; the body is
/// everything after the closing fence line.
pub fn split_front_matter(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let rest = source
        .strip_prefix(FRONT_MATTER_FENCE)
        .ok_or(FrontMatterError::MissingFence)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .ok_or(FrontMatterError::MissingFence)?;

    let (raw, body) = split_at_closing_fence(rest).ok_or(FrontMatterError::Unterminated)?;
    let matter: FrontMatter = toml::from_str(raw)?;
    Ok((matter, body))
}

fn split_at_closing_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FRONT_MATTER_FENCE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// A loaded post, ready for querying and rendering.
#[derive(Debug, Clone)]
pub struct Post {
    /// Permalink slug; may contain `/` separators for nested content paths.
    pub slug: String,
    pub title: String,
    pub date: Date,
    pub summary: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub featured: bool,
    pub cover: Option<String>,
    pub reading_time_minutes: u32,
    /// Source file path relative to the content directory.
    pub source_path: PathBuf,
    /// Markdown body with the front matter removed.
    pub body: String,
}

impl Post {
    /// Case-insensitive tag membership, matching how tag pages resolve.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}
