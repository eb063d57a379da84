// crates/serve/src/render/rich_text.rs

use domain::rich_text::{Inline, ListFormat, RichText, RichTextNode, TextRun};

use super::html::{safe_href, text};

/// Markup for a rich-text document. Unsupported nodes and inlines render as
/// nothing.
pub fn render_rich_text(doc: &RichText) -> String {
    doc.nodes().iter().map(render_node).collect()
}

pub fn render_node(node: &RichTextNode) -> String {
    match node {
        RichTextNode::Paragraph { children } => format!("<p>{}</p>", inlines(children)),
        RichTextNode::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            format!("<h{level}>{}</h{level}>", inlines(children))
        }
        RichTextNode::List { format, children } => {
            let tag = match format {
                ListFormat::Ordered => "ol",
                ListFormat::Unordered => "ul",
            };
            let items: String = children
                .iter()
                .map(|child| match child {
                    RichTextNode::ListItem { children } => format!("<li>{}</li>", inlines(children)),
                    nested @ RichTextNode::List { .. } => format!("<li>{}</li>", render_node(nested)),
                    other => render_node(other),
                })
                .collect();
            format!("<{tag}>{items}</{tag}>")
        }
        RichTextNode::ListItem { children } => format!("<li>{}</li>", inlines(children)),
        RichTextNode::Quote { children } => format!("<blockquote>{}</blockquote>", inlines(children)),
        RichTextNode::Unsupported => String::new(),
    }
}

pub fn inlines(children: &[Inline]) -> String {
    children.iter().map(render_inline).collect()
}

fn render_inline(inline: &Inline) -> String {
    match inline {
        Inline::Text(run) => render_run(run),
        Inline::Link { url, children } => {
            let external = url.starts_with("http://") || url.starts_with("https://");
            let target = if external {
                r#" target="_blank" rel="noopener noreferrer""#
            } else {
                ""
            };
            format!(r#"<a href="{}"{target}>{}</a>"#, safe_href(url), inlines(children))
        }
        Inline::Unsupported => String::new(),
    }
}

fn render_run(run: &TextRun) -> String {
    let mut out = text(&run.text).replace('\n', "<br>");
    // Innermost first so `code` ends up closest to the text.
    let wrappers = [
        (run.code, "code"),
        (run.strikethrough, "s"),
        (run.underline, "u"),
        (run.italic, "em"),
        (run.bold, "strong"),
    ];
    for (on, tag) in wrappers {
        if on {
            out = format!("<{tag}>{out}</{tag}>");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> RichText {
        serde_json::from_value(v).expect("rich text")
    }

    #[test]
    fn renders_paragraph_heading_and_lists() {
        let rt = doc(json!([
            { "type": "heading", "level": 9, "children": [{ "type": "text", "text": "T" }] },
            { "type": "paragraph", "children": [
                { "type": "text", "text": "a", "bold": true, "italic": true },
                { "type": "text", "text": "<b>" }
            ]},
            { "type": "list", "format": "ordered", "children": [
                { "type": "list-item", "children": [{ "type": "text", "text": "one" }] }
            ]}
        ]));
        assert_eq!(
            render_rich_text(&rt),
            "<h6>T</h6><p><strong><em>a</em></strong>&lt;b&gt;</p><ol><li>one</li></ol>"
        );
    }

    #[test]
    fn links_are_sanitised_and_external_ones_open_new_tab() {
        let rt = doc(json!([{ "type": "paragraph", "children": [
            { "type": "link", "url": "https://x.y", "children": [{ "type": "text", "text": "x" }] },
            { "type": "link", "url": "javascript:alert(1)", "children": [{ "type": "text", "text": "bad" }] }
        ]}]));
        let html = render_rich_text(&rt);
        assert!(html.contains(r#"<a href="https://x.y" target="_blank" rel="noopener noreferrer">x</a>"#));
        assert!(html.contains(r##"<a href="#">bad</a>"##));
    }

    #[test]
    fn unsupported_nodes_render_nothing_and_output_is_stable() {
        let rt = doc(json!([
            { "type": "image", "image": {} },
            { "type": "paragraph", "children": [{ "type": "emoji" }, { "type": "text", "text": "ok" }] }
        ]));
        let first = render_rich_text(&rt);
        assert_eq!(first, "<p>ok</p>");
        assert_eq!(render_rich_text(&rt), first);
    }
}
