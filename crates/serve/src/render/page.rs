// crates/serve/src/render/page.rs

use domain::page::{Page, Section};

use super::html::{attr, img, text, RenderCtx};
use super::registry::{BlockRenderer, RenderOutput};
use super::rich_text::render_rich_text;
use super::template::TemplateEngine;

/// `<main>` content for a page: the hero, then every section in order.
pub fn render_page<E: TemplateEngine>(
    renderer: &BlockRenderer<E>,
    page: &Page,
    ctx: &RenderCtx<'_>,
) -> RenderOutput {
    let mut out = RenderOutput::default();
    out.push_str(&hero(page));
    for section in page.ordered_sections() {
        out.append(render_section(renderer, section, ctx));
    }
    out
}

fn hero(page: &Page) -> String {
    let title = if page.hide_title || page.title.trim().is_empty() {
        String::new()
    } else {
        format!(r#"<h1 class="page-title">{}</h1>"#, text(&page.title))
    };
    let content = if page.hero_content.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="hero-content">{}</div>"#,
            render_rich_text(&page.hero_content)
        )
    };
    if title.is_empty() && content.is_empty() {
        return String::new();
    }
    format!(r#"<header class="page-hero">{title}{content}</header>"#)
}

pub fn render_section<E: TemplateEngine>(
    renderer: &BlockRenderer<E>,
    section: &Section,
    ctx: &RenderCtx<'_>,
) -> RenderOutput {
    let mut out = RenderOutput::default();
    let id = section
        .anchor()
        .map(|a| format!(r#" id="{}""#, attr(&a)))
        .unwrap_or_default();
    out.push_str(&format!(
        r#"<section class="section spacing-{}"{id}><div class="section-inner">"#,
        section.spacing
    ));
    if let Some(title) = section.visible_title() {
        out.push_str(&format!(r#"<h2 class="section-title">{}</h2>"#, text(title)));
    }

    if section.blocks.is_empty() {
        // Collection variant: a text body with an optional side image.
        if !section.content.is_empty() || section.image.is_some() {
            let body = format!(
                r#"<div class="prose">{}</div>"#,
                render_rich_text(&section.content)
            );
            let figure = section
                .image
                .as_ref()
                .map(|m| format!(r#"<figure class="section-image">{}</figure>"#, img(m, ctx, "")))
                .unwrap_or_default();
            let (first, second) = if section.reverse {
                (figure, body)
            } else {
                (body, figure)
            };
            out.push_str(&format!(
                r#"<div class="section-simple{}">{first}{second}</div>"#,
                if section.reverse { " reverse" } else { "" }
            ));
        }
    } else {
        out.push_str(r#"<div class="blocks">"#);
        out.append(renderer.render_blocks(&section.blocks, ctx));
        out.push_str("</div>");
    }

    out.push_str("</div></section>");
    out
}
