//! Heading outline extraction from raw markdown source.
//!
//! This is the second of the two traversals that must agree on anchor ids:
//! the render pipeline walks the parsed document tree, while this scanner
//! reads the raw source line by line. Both feed heading text through the
//! same [`AnchorSlugger`] algorithm in document order, so a reader's table
//! of contents links resolve against the ids stamped into the HTML.

use serde::Serialize;

use crate::domain::slug::AnchorSlugger;

/// Deepest heading level the source scan picks up. The render pass anchors
/// all six levels; only the top three appear in the navigation outline.
pub const MAX_SCAN_LEVEL: u8 = 3;

/// One heading occurrence, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    /// Anchor id, unique within the document.
    pub id: String,
    /// Heading text as authored, trimmed. The scan does not resolve inline
    /// markup, so emphasis markers may still be present here.
    pub text: String,
    /// Heading depth, 1-based.
    pub level: u8,
}

/// Scan raw markdown for heading lines and issue anchor ids in source order.
///
/// A heading line starts with one to three `#` characters followed by
/// whitespace and non-empty text. The scan is deliberately fence-blind: a
/// `#` line inside a fenced code block is picked up here even though the
/// render pass will not treat it as a heading. Both traversals must keep
/// visiting headings in the same order, or their id sequences diverge with
/// no runtime signal.
pub fn scan_outline(source: &str, slugger: &mut AnchorSlugger) -> Vec<HeadingRecord> {
    source
        .lines()
        .filter_map(parse_heading_line)
        .map(|(level, text)| HeadingRecord {
            id: slugger.anchor_for(text),
            text: text.to_string(),
            level,
        })
        .collect()
}

fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_SCAN_LEVEL as usize {
        return None;
    }

    let rest = &line[hashes..];
    if !rest.starts_with(|ch: char| ch.is_whitespace()) {
        return None;
    }

    let text = rest.trim();
    (!text.is_empty()).then_some((hashes as u8, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<HeadingRecord> {
        let mut slugger = AnchorSlugger::new();
        scan_outline(source, &mut slugger)
    }

    #[test]
    fn scan_collects_levels_one_through_three() {
        let outline = scan("# One\n\nbody\n\n## Two\n\n### Three\n");
        let levels: Vec<u8> = outline.iter().map(|h| h.level).collect();
        assert_eq!(levels, [1, 2, 3]);
        assert_eq!(outline[0].id, "one");
        assert_eq!(outline[2].text, "Three");
    }

    #[test]
    fn scan_skips_deeper_headings_and_non_headings() {
        let outline = scan("#### Four\n#no-space\n##\n## \nplain\n## Kept\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].id, "kept");
    }

    #[test]
    fn scan_trims_heading_text() {
        let outline = scan("##   spaced out  \n");
        assert_eq!(outline[0].text, "spaced out");
        assert_eq!(outline[0].id, "spaced-out");
    }

    #[test]
    fn scan_is_fence_blind() {
        // Pinned: a `#` line inside a fenced block still counts here.
        let outline = scan("```\n# comment\n```\n## Real\n");
        let ids: Vec<&str> = outline.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["comment", "real"]);
    }

    #[test]
    fn scan_issues_unique_ids_for_duplicates() {
        let outline = scan("## Setup\n## Setup\n## Setup\n");
        let ids: Vec<&str> = outline.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["setup", "setup-1", "setup-2"]);
    }

    #[test]
    fn scan_handles_crlf_sources() {
        let outline = scan("## First\r\n## Second\r\n");
        let ids: Vec<&str> = outline.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
    }
}
