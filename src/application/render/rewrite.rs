//! AST pass that collects heading records for the anchor stage.

use comrak::nodes::{AstNode, NodeValue};

use crate::domain::{outline::HeadingRecord, slug::AnchorSlugger};

/// Walk the parsed document in order and issue an anchor id for every
/// heading node. This is the tree-side counterpart of the raw-source
/// outline scan; both must visit headings in the same document order.
pub(crate) fn collect_headings<'a>(root: &'a AstNode<'a>) -> Vec<HeadingRecord> {
    let mut walker = HeadingWalker::default();
    walker.visit(root);
    walker.headings
}

#[derive(Default)]
struct HeadingWalker {
    slugger: AnchorSlugger,
    headings: Vec<HeadingRecord>,
}

impl HeadingWalker {
    fn visit(&mut self, node: &AstNode<'_>) {
        if let Some(level) = heading_level(node) {
            let text = collect_inline_text(node);
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let id = self.slugger.anchor_for(&normalized);
            self.headings.push(HeadingRecord {
                id,
                text: normalized,
                level,
            });
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit(next);
            child = next.next_sibling();
        }
    }
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    if let NodeValue::Heading(heading) = &data.value {
        Some(heading.level)
    } else {
        None
    }
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::{Arena, parse_document};

    fn headings_of(markdown: &str) -> Vec<HeadingRecord> {
        let options = crate::application::render::config::default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &options);
        collect_headings(root)
    }

    #[test]
    fn collects_headings_in_document_order() {
        let headings = headings_of("# One\n\ntext\n\n## Two\n\n#### Deep\n");
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["one", "two", "deep"]);
        assert_eq!(headings[2].level, 4);
    }

    #[test]
    fn resolves_inline_markup_before_slugging() {
        let headings = headings_of("## **Bold** and `code`\n");
        assert_eq!(headings[0].text, "Bold and code");
        assert_eq!(headings[0].id, "bold-and-code");
    }

    #[test]
    fn duplicate_headings_receive_suffixes() {
        let headings = headings_of("## Setup\n\n## Setup\n");
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["setup", "setup-1"]);
    }

    #[test]
    fn fenced_code_lines_are_not_headings() {
        let headings = headings_of("```\n# comment\n```\n\n## Real\n");
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["real"]);
    }
}
