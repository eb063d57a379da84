// crates/serve/src/render/blocks.rs
//
// One pure renderer per typed block kind. Same attributes in, same markup
// out; the only state any of them touch is client-side (carousel, filters).

use domain::block::{
    ButtonBlock, ButtonLink, Card, CardsBlock, CarouselBlock, ContactFormBlock, HeroBlock,
    ImageBlock, PortfolioBlock, TextBlock, TextImageBlock, TimelineBlock, WorkBlock,
};
use domain::layout::ImagePosition;
use domain::work::{PortfolioItem, WorkItem};
use std::collections::BTreeMap;

use super::html::{attr, classes, img, optional, safe_href, text, RenderCtx};
use super::rich_text::render_rich_text;

pub fn text_block(b: &TextBlock) -> String {
    format!(
        r#"<div {}><div class="prose text-{}">{}</div></div>"#,
        classes(&[
            "block block-text",
            &format!("align-{}", b.block_alignment),
            &format!("width-{}", b.max_width),
        ]),
        b.text_alignment,
        render_rich_text(&b.content)
    )
}

pub fn image_block(b: &ImageBlock, ctx: &RenderCtx<'_>) -> String {
    let caption = b.caption.as_deref().or(b.image.caption.as_deref());
    format!(
        r#"<figure {}>{}{}</figure>"#,
        classes(&[
            "block block-image",
            &format!("align-{}", b.alignment),
            &format!("size-{}", b.size),
        ]),
        img(&b.image, ctx, ""),
        optional("figcaption", "caption", caption)
    )
}

fn button(link: &ButtonLink, ctx: &RenderCtx<'_>) -> String {
    let file_url = link.file.as_ref().map(|f| f.absolute_url(ctx.cms_origin));
    let href = match (link.url.as_deref().filter(|u| !u.trim().is_empty()), &file_url) {
        (Some(url), _) => safe_href(url),
        (None, Some(file)) => safe_href(file),
        (None, None) => "#".to_string(),
    };
    let mut extra = String::new();
    if link.is_external {
        extra.push_str(r#" target="_blank" rel="noopener noreferrer""#);
    }
    if link.url.is_none() && file_url.is_some() {
        extra.push_str(" download");
    }
    let icon = link
        .icon
        .as_deref()
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!(r#"<span class="btn-icon icon-{}" aria-hidden="true"></span>"#, attr(i)))
        .unwrap_or_default();
    format!(
        r#"<a class="btn btn-{}" href="{href}"{extra}>{icon}{}</a>"#,
        link.variant,
        text(&link.label)
    )
}

pub fn button_block(b: &ButtonBlock, ctx: &RenderCtx<'_>) -> String {
    let buttons: String = b.buttons.iter().map(|l| button(l, ctx)).collect();
    format!(
        r#"<div class="block block-buttons buttons-{}">{buttons}</div>"#,
        b.alignment
    )
}

fn card(c: &Card, ctx: &RenderCtx<'_>) -> String {
    let image = c
        .image
        .as_ref()
        .map(|m| format!(r#"<div class="card-image">{}</div>"#, img(m, ctx, "")))
        .unwrap_or_default();
    format!(
        r#"<article class="card">{image}<div class="card-body"><h3 class="card-title">{}</h3>{}<div class="card-content">{}</div></div></article>"#,
        text(&c.title),
        optional("p", "card-subtitle", c.subtitle.as_deref()),
        render_rich_text(&c.content)
    )
}

pub fn cards_block(b: &CardsBlock, ctx: &RenderCtx<'_>) -> String {
    let cards: String = b.cards.iter().map(|c| card(c, ctx)).collect();
    format!(
        r#"<div {}>{}{}<div class="cards cols-{} cards-{}">{cards}</div></div>"#,
        classes(&[
            "block block-cards",
            &format!("align-{}", b.block_alignment),
            &format!("width-{}", b.max_width),
        ]),
        optional("h2", "block-title", b.title.as_deref()),
        optional("p", "block-description", b.description.as_deref()),
        b.columns.count(),
        b.alignment
    )
}

pub fn text_image_block(b: &TextImageBlock, ctx: &RenderCtx<'_>) -> String {
    let rounded = if b.rounded_image { "rounded" } else { "" };
    let figure = format!(
        r#"<figure class="text-image-figure size-{}">{}</figure>"#,
        b.image_size,
        img(&b.image, ctx, rounded)
    );
    let body = format!(
        r#"<div class="prose text-{}">{}</div>"#,
        b.text_alignment,
        render_rich_text(&b.content)
    );
    let inner = match b.image_position {
        ImagePosition::Left => format!("{figure}{body}"),
        ImagePosition::Right => format!("{body}{figure}"),
    };
    format!(
        r#"<div class="block block-text-image image-{} valign-{}">{inner}</div>"#,
        b.image_position, b.vertical_alignment
    )
}

pub fn hero_block(b: &HeroBlock) -> String {
    let body: String = b
        .content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>{}</p>", text(l)))
        .collect();
    format!(
        r#"<section class="block block-hero hero-{} text-{}">{}<div class="hero-content">{body}</div></section>"#,
        b.height,
        b.text_alignment,
        optional("h1", "hero-title", b.title.as_deref())
    )
}

pub fn carousel_block(b: &CarouselBlock, ctx: &RenderCtx<'_>) -> String {
    let slides: String = b
        .cards
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let image = c
                .image
                .as_ref()
                .map(|m| img(m, ctx, "flip-image"))
                .unwrap_or_default();
            format!(
                r#"<div class="carousel-slide" data-index="{i}"><div class="flip-card" tabindex="0"><div class="flip-front">{image}<h3>{}</h3>{}</div><div class="flip-back">{}</div></div></div>"#,
                text(&c.front_title),
                render_rich_text(&c.front_content),
                render_rich_text(&c.back_content)
            )
        })
        .collect();
    let controls = if b.show_controls && b.cards.len() > 1 {
        r#"<button type="button" class="carousel-prev" data-carousel-prev aria-label="Précédent">&#8249;</button><button type="button" class="carousel-next" data-carousel-next aria-label="Suivant">&#8250;</button>"#
    } else {
        ""
    };
    let indicators = if b.show_indicators && b.cards.len() > 1 {
        let dots: String = (0..b.cards.len())
            .map(|i| {
                format!(
                    r#"<button type="button" class="carousel-dot" data-carousel-to="{i}" aria-label="{}"></button>"#,
                    i + 1
                )
            })
            .collect();
        format!(r#"<div class="carousel-indicators">{dots}</div>"#)
    } else {
        String::new()
    };
    format!(
        r#"<div class="block block-carousel" data-carousel data-autoplay="{}" data-delay="{}"><div class="carousel-track">{slides}</div>{controls}{indicators}</div>"#,
        b.autoplay, b.autoplay_delay
    )
}

pub fn contact_form_block(b: &ContactFormBlock) -> String {
    format!(
        r#"<div class="block block-contact align-{} width-{}"><form class="contact-form" method="post" action="/api/contact" data-contact-form>{}{}<div class="form-row"><label for="contact-name">Nom <span class="required">*</span></label><input type="text" id="contact-name" name="name" required placeholder="Votre nom"></div><div class="form-row"><label for="contact-email">Email <span class="required">*</span></label><input type="email" id="contact-email" name="email" required placeholder="votre@email.com"></div><div class="form-row"><label for="contact-message">Message <span class="required">*</span></label><textarea id="contact-message" name="message" rows="5" required placeholder="Votre message..."></textarea></div><div class="form-row form-consent"><input type="checkbox" id="contact-consent" name="consent" value="true" required><label for="contact-consent">J'accepte que mes données soient utilisées pour traiter ma demande.</label></div><button type="submit" class="btn btn-primary">{}</button><p class="form-status" role="status" aria-live="polite"></p></form></div>"#,
        b.block_alignment,
        b.max_width,
        optional("h2", "block-title", Some(b.title.as_str())),
        optional("p", "block-description", b.description.as_deref()),
        text(&b.submit_button_text)
    )
}

/// Filter buttons plus an "all" entry, from `(slug, name)` pairs.
fn filter_bar(group: &str, entries: &BTreeMap<String, String>) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let buttons: String = entries
        .iter()
        .map(|(slug, name)| {
            format!(
                r#"<button type="button" class="filter" data-filter="{}">{}</button>"#,
                attr(slug),
                text(name)
            )
        })
        .collect();
    format!(
        r#"<div class="filters" data-filter-group="{}"><button type="button" class="filter active" data-filter="">Tous</button>{buttons}</div>"#,
        attr(group)
    )
}

fn work_card(item: &WorkItem, ctx: &RenderCtx<'_>) -> String {
    let tags: Vec<&str> = item.categories.iter().map(|c| c.slug.as_str()).collect();
    let image = item
        .image
        .as_ref()
        .map(|m| format!(r#"<div class="work-image">{}</div>"#, img(m, ctx, "")))
        .unwrap_or_default();
    let chips: String = item
        .categories
        .iter()
        .map(|c| match c.color.as_deref() {
            Some(color) => format!(
                r#"<span class="chip" style="background-color:{}">{}</span>"#,
                attr(color),
                text(&c.name)
            ),
            None => format!(r#"<span class="chip">{}</span>"#, text(&c.name)),
        })
        .collect();
    let meta: Vec<String> = [item.client.as_deref(), item.year.as_deref()]
        .into_iter()
        .flatten()
        .map(text)
        .collect();
    let summary = match item.short_description.as_deref() {
        Some(s) if !s.trim().is_empty() => format!(r#"<p class="work-summary">{}</p>"#, text(s)),
        _ => render_rich_text(&item.description),
    };
    let title = match item.link.as_deref() {
        Some(link) => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            safe_href(link),
            text(&item.title)
        ),
        None => text(&item.title),
    };
    format!(
        r#"<article class="work-card type-{}{}" data-tags="{}">{image}<div class="work-body"><h3>{title}</h3>{}{summary}<div class="chips">{chips}</div></div></article>"#,
        item.item_type,
        if item.featured { " featured" } else { "" },
        attr(&tags.join(" ")),
        if meta.is_empty() {
            String::new()
        } else {
            format!(r#"<p class="work-meta">{}</p>"#, meta.join(" · "))
        }
    )
}

pub fn work_block(b: &WorkBlock, ctx: &RenderCtx<'_>) -> String {
    let title = optional("h2", "block-title", b.title.as_deref());
    if b.items.is_empty() {
        return format!(
            r#"<div class="block block-work">{title}<p class="empty">Aucun élément disponible.</p></div>"#
        );
    }
    let filters = if b.show_filters {
        let entries: BTreeMap<String, String> = b
            .items
            .iter()
            .flat_map(|i| i.categories.iter())
            .filter(|c| !c.slug.is_empty())
            .map(|c| (c.slug.clone(), c.name.clone()))
            .collect();
        filter_bar("work", &entries)
    } else {
        String::new()
    };
    let cards: String = b.items.iter().map(|i| work_card(i, ctx)).collect();
    format!(
        r#"<div class="block block-work">{title}{filters}<div class="listing layout-{} cols-{}" data-filter-target="work">{cards}</div></div>"#,
        b.layout,
        b.columns.count()
    )
}

fn portfolio_card(item: &PortfolioItem, ctx: &RenderCtx<'_>) -> String {
    let tags: Vec<&str> = item.themes.iter().map(|t| t.slug.as_str()).collect();
    let image = item
        .image
        .as_ref()
        .map(|m| format!(r#"<div class="portfolio-image">{}</div>"#, img(m, ctx, "")))
        .unwrap_or_default();
    let themes: String = item
        .themes
        .iter()
        .map(|t| format!(r#"<span class="chip">{}</span>"#, text(&t.name)))
        .collect();
    let link = item
        .link
        .as_deref()
        .map(|l| {
            format!(
                r#"<a class="portfolio-link" href="{}" target="_blank" rel="noopener noreferrer">Voir le projet</a>"#,
                safe_href(l)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<article class="portfolio-card{}" data-tags="{}">{image}<div class="portfolio-body"><h3>{}</h3>{}<div class="chips">{themes}</div>{link}</div></article>"#,
        if item.featured { " featured" } else { "" },
        attr(&tags.join(" ")),
        text(&item.title),
        render_rich_text(&item.description)
    )
}

pub fn portfolio_block(b: &PortfolioBlock, ctx: &RenderCtx<'_>) -> String {
    let title = optional("h2", "block-title", b.title.as_deref());
    if b.items.is_empty() {
        return format!(
            r#"<div class="block block-portfolio">{title}<p class="empty">Aucun projet de portfolio disponible.</p></div>"#
        );
    }
    let filters = if b.show_filters {
        let entries: BTreeMap<String, String> = b
            .items
            .iter()
            .flat_map(|i| i.themes.iter())
            .filter(|t| !t.slug.is_empty())
            .map(|t| (t.slug.clone(), t.name.clone()))
            .collect();
        filter_bar("portfolio", &entries)
    } else {
        String::new()
    };
    let cards: String = b.items.iter().map(|i| portfolio_card(i, ctx)).collect();
    format!(
        r#"<div class="block block-portfolio">{title}{filters}<div class="listing layout-{} cols-{}" data-filter-target="portfolio">{cards}</div></div>"#,
        b.layout,
        b.columns.count()
    )
}

pub fn timeline_block(b: &TimelineBlock, ctx: &RenderCtx<'_>) -> String {
    let items: String = b
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let side = if i % 2 == 0 { "left" } else { "right" };
            let images: String = item
                .images
                .iter()
                .map(|ti| {
                    let picture = img(&ti.image, ctx, "timeline-image");
                    match &ti.link {
                        Some(link) => format!(
                            r#"<a href="{}" target="_blank" rel="noopener noreferrer"{}>{picture}</a>"#,
                            safe_href(&link.url),
                            link.label
                                .as_deref()
                                .map(|l| format!(r#" title="{}""#, attr(l)))
                                .unwrap_or_default()
                        ),
                        None => picture,
                    }
                })
                .collect();
            let images = if images.is_empty() {
                images
            } else {
                format!(r#"<div class="timeline-images">{images}</div>"#)
            };
            format!(
                r#"<li class="timeline-item side-{side}"><span class="timeline-dot" aria-hidden="true"></span><div class="timeline-card">{}<h3>{}</h3>{}{images}</div></li>"#,
                optional("time", "timeline-date", item.date.as_deref()),
                text(&item.title),
                optional("p", "timeline-description", item.description.as_deref())
            )
        })
        .collect();
    format!(
        r#"<div class="block block-timeline">{}<ol class="timeline">{items}</ol></div>"#,
        optional("h2", "block-title", b.title.as_deref())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::block::Block;
    use domain::work::WorkCategory;
    use serde_json::json;

    const CTX: RenderCtx<'static> = RenderCtx {
        cms_origin: "http://cms",
        locale: "fr",
    };

    fn parse(v: serde_json::Value) -> Block {
        Block::from_json(v)
    }

    #[test]
    fn text_block_carries_layout_classes() {
        let Block::Text(b) = parse(json!({
            "__component": "blocks.text-block",
            "content": "Bonjour",
            "textAlignment": "center",
            "maxWidth": "small"
        })) else {
            panic!("text block")
        };
        let html = text_block(&b);
        assert!(html.contains("align-full"));
        assert!(html.contains("width-small"));
        assert!(html.contains(r#"<div class="prose text-center"><p>Bonjour</p></div>"#));
    }

    #[test]
    fn buttons_resolve_links_and_files() {
        let Block::Button(b) = parse(json!({
            "__component": "blocks.button-block",
            "alignment": "space-between",
            "buttons": [
                { "label": "Site", "url": "https://x.y", "isExternal": true, "variant": "outline" },
                { "label": "CV", "file": { "url": "/uploads/cv.pdf" } },
                { "label": "Nowhere" }
            ]
        })) else {
            panic!("button block")
        };
        let html = button_block(&b, &CTX);
        assert!(html.contains("buttons-space-between"));
        assert!(html.contains(r#"<a class="btn btn-outline" href="https://x.y" target="_blank" rel="noopener noreferrer">Site</a>"#));
        assert!(html.contains(r#"href="http://cms/uploads/cv.pdf" download"#));
        assert!(html.contains(r##"href="#">Nowhere"##));
    }

    #[test]
    fn text_image_respects_position() {
        let Block::TextImage(b) = parse(json!({
            "__component": "blocks.text-image-block",
            "content": "Texte",
            "image": { "url": "/uploads/a.png" },
            "imagePosition": "left",
            "roundedImage": true
        })) else {
            panic!("text-image block")
        };
        let html = text_image_block(&b, &CTX);
        let fig = html.find("<figure").expect("figure");
        let body = html.find("prose").expect("body");
        assert!(fig < body);
        assert!(html.contains(r#"class="rounded""#));
    }

    #[test]
    fn hero_escapes_and_splits_lines() {
        let Block::Hero(b) = parse(json!({
            "__component": "blocks.hero-block-simple-text",
            "title": "Salut <toi>",
            "content": "ligne 1\n\nligne 2"
        })) else {
            panic!("hero block")
        };
        let html = hero_block(&b);
        assert!(html.contains("Salut &lt;toi&gt;"));
        assert!(html.contains("<p>ligne 1</p><p>ligne 2</p>"));
        assert!(html.contains("text-center"));
    }

    #[test]
    fn carousel_controls_only_with_several_cards() {
        let Block::Carousel(b) = parse(json!({
            "__component": "blocks.carousel-block",
            "cards": [{ "frontTitle": "A" }]
        })) else {
            panic!("carousel block")
        };
        let html = carousel_block(&b, &CTX);
        assert!(html.contains(r#"data-delay="5000""#));
        assert!(!html.contains("carousel-prev"));
        assert!(!html.contains("carousel-indicators"));
    }

    #[test]
    fn contact_form_posts_to_api() {
        let Block::ContactForm(b) = parse(json!({ "__component": "blocks.contact-form-block" })) else {
            panic!("contact block")
        };
        let html = contact_form_block(&b);
        assert!(html.contains(r#"action="/api/contact""#));
        assert!(html.contains("Contactez-nous"));
        assert!(html.contains(">Envoyer</button>"));
        assert!(html.contains(r#"name="consent""#));
    }

    #[test]
    fn work_listing_builds_filters_from_items() {
        let Block::Work(mut b) = parse(json!({ "__component": "blocks.work-block", "title": "Travaux" })) else {
            panic!("work block")
        };
        let html = work_block(&b, &CTX);
        assert!(html.contains("Aucun élément disponible."));

        b.items = vec![WorkItem {
            title: "Atlas".into(),
            categories: vec![WorkCategory {
                name: "Web".into(),
                slug: "web".into(),
                ..WorkCategory::default()
            }],
            year: Some("2023".into()),
            ..WorkItem::default()
        }];
        let html = work_block(&b, &CTX);
        assert!(html.contains(r#"data-filter="web">Web</button>"#));
        assert!(html.contains(r#"data-tags="web""#));
        assert!(html.contains(r#"<p class="work-meta">2023</p>"#));
    }

    #[test]
    fn timeline_alternates_sides_and_links_images() {
        let Block::Timeline(b) = parse(json!({
            "__component": "blocks.timeline-block",
            "items": [
                { "title": "A", "date": "2020" },
                { "title": "B", "images": [{ "image": { "url": "/u/b.png" }, "link": { "url": "https://b.c" } }] }
            ]
        })) else {
            panic!("timeline block")
        };
        let html = timeline_block(&b, &CTX);
        assert!(html.contains("side-left"));
        assert!(html.contains("side-right"));
        assert!(html.contains(r#"<a href="https://b.c" target="_blank" rel="noopener noreferrer"><img src="http://cms/u/b.png""#));
    }
}
