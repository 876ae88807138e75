use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.front_matter_delimiter = Some("+++".to_string());
    ext.cjk_friendly_emphasis = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.r#unsafe = true;
    render.gfm_quirks = true;

    options
}

pub(crate) fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "dl",
        "dt",
        "dd",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "ins",
        "kbd",
        "li",
        "mark",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "aria-hidden",
        "aria-label",
        "role",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
        "data-footnote-backref-idx",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("img", &["title", "width", "height", "alt", "loading", "decoding"]);
    builder.add_tag_attributes("pre", &["class", "data-language"]);
    builder.add_tag_attributes("code", &["class", "data-language"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled", "class"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}

#[cfg(test)]
mod tests {
    use super::build_sanitizer;

    #[test]
    fn sanitizer_strips_script_but_keeps_structure() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<h2>Safe</h2><script>alert(1)</script><p>body</p>")
            .to_string();

        assert!(html.contains("<h2>Safe</h2>"));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("script"));
    }

    #[test]
    fn sanitizer_preserves_strikethrough_and_task_inputs() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<p><del>Removed</del></p><input type=\"checkbox\" checked disabled>")
            .to_string();

        assert!(html.contains("<del>Removed</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }
}
