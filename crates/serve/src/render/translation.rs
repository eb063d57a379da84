// crates/serve/src/render/translation.rs
//
// Side-by-side translation comparison. Paragraph `i` of example `ex` gets
// `s-{ex}-{i}` on the source side and `t-{ex}-{i}` on the target side; the
// inline script pairs them by index to toggle a highlight class. Nothing on
// the server side depends on that state.

use domain::block::{TranslationBlock, TranslationExample};
use domain::locale::language_name;
use domain::rich_text::RichTextNode;
use regex::Regex;
use std::sync::LazyLock;

use super::html::{attr, optional, text};
use super::rich_text::{inlines, render_node, render_rich_text};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://\S+|www\.\S+)").expect("url pattern compiles"));

/// Pair highlighting and tab switching for every translation block on a
/// page. Emitted once per document.
pub const HIGHLIGHT_SCRIPT: &str = r#"<script>(function(){document.querySelectorAll('[data-translation]').forEach(function(root){function mark(ex,i){root.querySelectorAll('.tr-highlight').forEach(function(el){el.classList.remove('tr-highlight')});if(i===null)return;['s','t'].forEach(function(side){var el=root.querySelector('#'+side+'-'+ex+'-'+i);if(el)el.classList.add('tr-highlight')})}root.querySelectorAll('[data-pair]').forEach(function(p){var ex=p.getAttribute('data-ex'),i=p.getAttribute('data-pair');p.addEventListener('mouseenter',function(){mark(ex,i)});p.addEventListener('mouseleave',function(){mark(ex,null)});p.addEventListener('click',function(){mark(ex,i)})});root.querySelectorAll('[data-tab]').forEach(function(tab){tab.addEventListener('click',function(){var n=tab.getAttribute('data-tab');mark(n,null);root.querySelectorAll('[data-panel]').forEach(function(panel){panel.hidden=panel.getAttribute('data-panel')!==n});root.querySelectorAll('[data-tab]').forEach(function(t){t.setAttribute('aria-selected',t===tab?'true':'false')})})})})})();</script>"#;

/// Credit text with every URL turned into a "Source" link.
pub fn linkify_source(credit: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for m in URL_RE.find_iter(credit) {
        out.push_str(&text(&credit[last..m.start()]));
        let url = m.as_str();
        let href = if url.starts_with("http") {
            url.to_string()
        } else {
            format!("https://{url}")
        };
        out.push_str(&format!(
            r#"<a class="source-link" href="{}" target="_blank" rel="noopener noreferrer" title="{}">Source</a>"#,
            attr(&href),
            attr(url)
        ));
        last = m.end();
    }
    out.push_str(&text(&credit[last..]));
    out
}

/// Paragraphs of one side, tagged for pairing. Non-paragraph nodes render
/// normally and do not consume an index.
fn side(nodes: &[RichTextNode], prefix: char, ex: usize) -> String {
    let mut index = 0;
    nodes
        .iter()
        .map(|node| match node {
            RichTextNode::Paragraph { children } => {
                let html = format!(
                    r#"<p id="{prefix}-{ex}-{index}" data-ex="{ex}" data-pair="{index}">{}</p>"#,
                    inlines(children)
                );
                index += 1;
                html
            }
            other => render_node(other),
        })
        .collect()
}

/// Mobile view: non-empty paragraphs interleaved source/target.
fn interleaved(example: &TranslationExample) -> String {
    let sources = example.source.non_empty_paragraphs();
    let targets = example.translation.non_empty_paragraphs();
    let rows = sources.len().max(targets.len());
    (0..rows)
        .map(|i| {
            let s = sources.get(i).map(|n| render_node(n)).unwrap_or_default();
            let t = targets.get(i).map(|n| render_node(n)).unwrap_or_default();
            format!(
                r#"<div class="pair"><div class="pair-source">{s}</div><div class="pair-target">{t}</div></div>"#
            )
        })
        .collect()
}

fn label(show: bool, code: &str) -> String {
    if show {
        format!(r#"<span class="lang-label">{}</span>"#, text(language_name(code)))
    } else {
        String::new()
    }
}

fn panel(b: &TranslationBlock, ex: usize, example: &TranslationExample, hidden: bool) -> String {
    let source_lang = example
        .source_language
        .as_deref()
        .unwrap_or(&b.source_language);
    let credit = match (example.author.as_deref(), example.source_text.as_deref()) {
        (None, None) => String::new(),
        (author, source) => format!(
            r#"<p class="credit">{}{}</p>"#,
            author
                .map(|a| format!(r#"<span class="author">{}</span> "#, text(a)))
                .unwrap_or_default(),
            source.map(linkify_source).unwrap_or_default()
        ),
    };
    let description = if example.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="example-description">{}</div>"#,
            render_rich_text(&example.description)
        )
    };
    format!(
        r#"<div class="translation-panel" data-panel="{ex}"{}>{}{description}{credit}<div class="columns"><div class="column source" lang="{}">{}{}</div><div class="column target" lang="{}">{}{}</div></div><div class="interleaved">{}</div></div>"#,
        if hidden { " hidden" } else { "" },
        optional("h3", "example-title", example.title.as_deref()),
        attr(source_lang),
        label(b.show_language_label, source_lang),
        side(example.source.nodes(), 's', ex),
        attr(&b.translation_language),
        label(b.show_language_label, &b.translation_language),
        side(example.translation.nodes(), 't', ex),
        interleaved(example)
    )
}

pub fn translation_block(b: &TranslationBlock) -> String {
    let examples = b.all_examples();
    let tabs = if examples.len() > 1 {
        let buttons: String = examples
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let name = e
                    .title
                    .clone()
                    .or_else(|| e.theme.clone())
                    .unwrap_or_else(|| format!("Exemple {}", i + 1));
                format!(
                    r#"<button type="button" role="tab" data-tab="{i}" aria-selected="{}">{}</button>"#,
                    i == 0,
                    text(&name)
                )
            })
            .collect();
        format!(r#"<div class="translation-tabs" role="tablist">{buttons}</div>"#)
    } else {
        String::new()
    };
    let panels: String = examples
        .iter()
        .enumerate()
        .map(|(i, e)| panel(b, i, e, i > 0))
        .collect();
    format!(
        r#"<div class="block block-translation" data-translation>{}{tabs}{panels}</div>"#,
        optional("h2", "block-title", b.title.as_deref())
    )
}
