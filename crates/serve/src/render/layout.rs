// crates/serve/src/render/layout.rs
//
// The document shell around every page: head, header with navigation and
// language switcher, footer, and the draft-mode badge.

use domain::locale::LocaleSet;
use domain::navigation::{nav_links, Header};

use super::html::{attr, img, text, RenderCtx};
use super::translation::HIGHLIGHT_SCRIPT;

const SITE_SCRIPT: &str = r#"<script>(function(){document.querySelectorAll('[data-filter-group]').forEach(function(bar){var target=document.querySelector('[data-filter-target="'+bar.getAttribute('data-filter-group')+'"]');if(!target)return;bar.querySelectorAll('[data-filter]').forEach(function(btn){btn.addEventListener('click',function(){var tag=btn.getAttribute('data-filter');bar.querySelectorAll('[data-filter]').forEach(function(b){b.classList.toggle('active',b===btn)});target.querySelectorAll('[data-tags]').forEach(function(card){card.hidden=!!tag&&card.getAttribute('data-tags').split(' ').indexOf(tag)<0})})})});document.querySelectorAll('[data-carousel]').forEach(function(c){var slides=c.querySelectorAll('.carousel-slide'),i=0;if(!slides.length)return;function show(n){i=(n+slides.length)%slides.length;slides.forEach(function(s,k){s.hidden=k!==i})}show(0);var prev=c.querySelector('[data-carousel-prev]'),next=c.querySelector('[data-carousel-next]');if(prev)prev.addEventListener('click',function(){show(i-1)});if(next)next.addEventListener('click',function(){show(i+1)});c.querySelectorAll('[data-carousel-to]').forEach(function(d){d.addEventListener('click',function(){show(+d.getAttribute('data-carousel-to'))})});if(c.getAttribute('data-autoplay')==='true')setInterval(function(){show(i+1)},+c.getAttribute('data-delay')||5000)});document.querySelectorAll('[data-contact-form]').forEach(function(f){f.addEventListener('submit',function(e){e.preventDefault();var status=f.querySelector('.form-status'),el=f.elements,body={name:el.namedItem('name').value,email:el.namedItem('email').value,message:el.namedItem('message').value,consent:el.namedItem('consent').checked};fetch(f.action,{method:'POST',headers:{'Content-Type':'application/json'},body:JSON.stringify(body)}).then(function(r){return r.json().then(function(j){return{ok:r.ok,j:j}})}).then(function(res){status.textContent=res.ok?'Message envoyé. Merci !':(res.j.error||'Erreur');if(res.ok)f.reset()}).catch(function(){status.textContent='Erreur'})})})})();</script>"#;

/// Everything the shell needs besides the `<main>` content.
pub struct Shell<'a> {
    pub site_name: &'a str,
    pub locale: &'a str,
    /// Path of the current request, used for active links and switching.
    pub path: &'a str,
    /// Pre-rendered `<head>` tags (title, meta, links, JSON-LD).
    pub head: &'a str,
    pub header: Option<&'a Header>,
    pub locales: &'a LocaleSet,
    pub draft_mode: bool,
    pub year: i32,
    pub cms_origin: &'a str,
}

pub fn language_switcher(locales: &LocaleSet, current: &str, path: &str) -> String {
    let (Some(target), Some(href)) = (locales.switch_target(current), locales.switch_path(current, path)) else {
        return String::new();
    };
    format!(
        r#"<nav class="lang-switcher" aria-label="Langue"><span class="lang-current">{}</span><a href="{}" hreflang="{}" aria-label="Passer en {}">{}</a></nav>"#,
        text(&current.to_uppercase()),
        attr(&href),
        attr(target),
        attr(target),
        text(&target.to_uppercase())
    )
}

fn site_header(shell: &Shell<'_>) -> String {
    let ctx = RenderCtx {
        cms_origin: shell.cms_origin,
        locale: shell.locale,
    };
    let title = shell
        .header
        .and_then(|h| h.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(shell.site_name);
    let brand = match shell.header.and_then(|h| h.logo.as_ref()) {
        Some(logo) => format!(
            r#"{}<span class="brand-name">{}</span>"#,
            img(logo, &ctx, "brand-logo"),
            text(title)
        ),
        None => format!(r#"<span class="brand-name">{}</span>"#, text(title)),
    };
    let links: String = shell
        .header
        .map(|h| nav_links(&h.navigation, shell.locale, shell.path))
        .unwrap_or_default()
        .into_iter()
        .map(|link| {
            let current = if link.active { r#" aria-current="page" class="active""# } else { "" };
            format!(
                r#"<li><a href="{}"{current}>{}</a></li>"#,
                attr(&link.href),
                text(&link.label)
            )
        })
        .collect();
    let nav = if links.is_empty() {
        String::new()
    } else {
        format!(r#"<nav class="site-nav" aria-label="Navigation"><ul>{links}</ul></nav>"#)
    };
    format!(
        r#"<header class="site-header"><a class="brand" href="/{}">{brand}</a>{nav}{}</header>"#,
        attr(shell.locale),
        language_switcher(shell.locales, shell.locale, shell.path)
    )
}

fn footer(shell: &Shell<'_>) -> String {
    format!(
        r#"<footer class="site-footer"><p>{} © {}. Tous droits réservés.</p></footer>"#,
        text(shell.site_name),
        shell.year
    )
}

fn draft_badge(enabled: bool) -> &'static str {
    if enabled {
        r#"<div class="draft-indicator" role="status"><span>Mode Preview</span> <a href="/api/preview/disable">Quitter</a></div>"#
    } else {
        ""
    }
}

/// A complete HTML document around `main`.
pub fn document(shell: &Shell<'_>, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="{}"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">{}<link rel="stylesheet" href="/assets/site.css"></head><body>{}<main id="content">{main}</main>{}{}{SITE_SCRIPT}{HIGHLIGHT_SCRIPT}</body></html>"#,
        attr(shell.locale),
        shell.head,
        site_header(shell),
        footer(shell),
        draft_badge(shell.draft_mode)
    )
}

/// Not-found page strings for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFoundText {
    pub title: &'static str,
    pub message: &'static str,
    pub back: &'static str,
}

/// Unknown locales get the French strings.
pub fn not_found_text(locale: &str) -> NotFoundText {
    match locale {
        "en" => NotFoundText {
            title: "Page not found",
            message: "This page doesn't exist.",
            back: "Back to home",
        },
        "it" => NotFoundText {
            title: "Pagina non trovata",
            message: "Questa pagina non esiste.",
            back: "Torna alla home",
        },
        _ => NotFoundText {
            title: "Page introuvable",
            message: "Cette page n'existe pas.",
            back: "Retour à l'accueil",
        },
    }
}

/// `<main>` content of the localized not-found page.
pub fn not_found_main(locale: &str) -> String {
    let t = not_found_text(locale);
    format!(
        r#"<section class="not-found"><h1>404</h1><p>{}</p><a class="btn btn-primary" href="/{}">{}</a></section>"#,
        text(t.message),
        attr(locale),
        text(t.back)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::navigation::{NavEntry, NavPage};

    fn locales(list: &[&str]) -> LocaleSet {
        LocaleSet::new(list.iter().map(|s| s.to_string()).collect(), list[0])
    }

    #[test]
    fn switcher_cycles_and_disappears_for_single_locale() {
        let three = locales(&["fr", "en", "it"]);
        let html = language_switcher(&three, "en", "/en/about");
        assert!(html.contains(r#"href="/it/about""#));
        let html = language_switcher(&three, "it", "/it");
        assert!(html.contains(r#"href="/fr""#));
        assert_eq!(language_switcher(&locales(&["fr"]), "fr", "/fr/x"), "");
    }

    #[test]
    fn document_has_nav_footer_and_draft_badge() {
        let header = Header {
            title: Some("Studio".into()),
            logo: None,
            navigation: vec![NavEntry {
                id: Some(1),
                custom_label: None,
                page: Some(NavPage {
                    id: Some(3),
                    slug: Some("about".into()),
                    title: Some("À propos".into()),
                }),
                section: None,
            }],
        };
        let set = locales(&["fr", "en"]);
        let shell = Shell {
            site_name: "My Website",
            locale: "fr",
            path: "/fr/about",
            head: "<title>T</title>",
            header: Some(&header),
            locales: &set,
            draft_mode: true,
            year: 2026,
            cms_origin: "http://cms",
        };
        let html = document(&shell, "<p>main</p>");
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"fr\">"));
        assert!(html.contains("<title>T</title>"));
        assert!(html.contains(r#"<a href="/fr/about" aria-current="page" class="active">À propos</a>"#));
        assert!(html.contains(r#"<span class="brand-name">Studio</span>"#));
        assert!(html.contains("My Website © 2026."));
        assert!(html.contains(r#"href="/api/preview/disable""#));
        assert!(html.contains(r#"href="/en/about""#));
        assert_eq!(html.matches(HIGHLIGHT_SCRIPT).count(), 1);

        let shell = Shell {
            draft_mode: false,
            header: None,
            ..shell
        };
        let html = document(&shell, "");
        assert!(!html.contains("draft-indicator"));
        assert!(html.contains(r#"<span class="brand-name">My Website</span>"#));
    }

    #[test]
    fn not_found_follows_the_locale() {
        let en = not_found_main("en");
        assert!(en.contains("<h1>404</h1>"));
        assert!(en.contains("This page doesn't exist."));
        assert!(en.contains(r#"href="/en">Back to home</a>"#));

        let it = not_found_main("it");
        assert!(it.contains("Questa pagina non esiste."));
        assert!(it.contains("Torna alla home"));

        assert_eq!(not_found_text("de"), not_found_text("fr"));
        assert_eq!(not_found_text("fr").title, "Page introuvable");
        assert!(not_found_main("fr").contains("Retour à l'accueil"));
    }
}
