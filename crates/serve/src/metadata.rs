// crates/serve/src/metadata.rs
//
// `<head>` tags derived from a page record. Building is pure; the request
// only contributes the site settings and the CMS origin for media URLs.

use domain::page::Page;
use serde::Serialize;
use serde_json::json;

use crate::render::html::{attr, text};

const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternate {
    pub locale: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: Option<String>,
    pub canonical: String,
    pub robots: &'static str,
    pub locale: String,
    pub alternates: Vec<Alternate>,
    pub image: Option<SocialImage>,
}

/// Site-wide inputs the page record does not carry.
#[derive(Debug, Clone, Copy)]
pub struct SiteInfo<'a> {
    /// Public base URL without a trailing slash.
    pub base_url: &'a str,
    pub name: &'a str,
    pub cms_origin: &'a str,
}

/// Root-relative path of `slug` in `locale`; home is the locale root.
pub fn page_path(locale: &str, slug: &str) -> String {
    if slug.is_empty() || slug == domain::page::HOME_SLUG {
        format!("/{locale}")
    } else {
        format!("/{locale}/{slug}")
    }
}

pub fn build(page: &Page, site: &SiteInfo<'_>) -> Metadata {
    let title = page
        .seo_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&page.title)
        .to_string();
    let description = page.seo_description.as_ref().and_then(|d| d.text());

    let mut alternates = vec![Alternate {
        locale: page.locale.clone(),
        href: format!("{}{}", site.base_url, page_path(&page.locale, &page.slug)),
    }];
    for l in &page.localizations {
        if l.locale.is_empty() || alternates.iter().any(|a| a.locale == l.locale) {
            continue;
        }
        alternates.push(Alternate {
            locale: l.locale.clone(),
            href: format!("{}{}", site.base_url, page_path(&l.locale, &page.slug)),
        });
    }

    let image = page.seo_image.as_ref().map(|m| SocialImage {
        url: m.absolute_url(site.cms_origin),
        width: OG_IMAGE_WIDTH,
        height: OG_IMAGE_HEIGHT,
        alt: if m.alt().is_empty() {
            title.clone()
        } else {
            m.alt().to_string()
        },
    });

    Metadata {
        canonical: alternates[0].href.clone(),
        robots: if page.no_index {
            "noindex, nofollow"
        } else {
            "index, follow"
        },
        locale: page.locale.clone(),
        title,
        description,
        alternates,
        image,
    }
}

impl Metadata {
    /// Title, description, robots, canonical, hreflang, Open Graph and
    /// Twitter tags.
    pub fn to_head_html(&self, site_name: &str) -> String {
        let mut out = String::new();
        let full_title = if self.title.trim().is_empty() {
            site_name.to_string()
        } else {
            format!("{} | {site_name}", self.title)
        };
        out.push_str(&format!("<title>{}</title>", text(&full_title)));
        let meta = |name: &str, content: &str| {
            format!(r#"<meta name="{name}" content="{}">"#, attr(content))
        };
        let prop = |name: &str, content: &str| {
            format!(r#"<meta property="{name}" content="{}">"#, attr(content))
        };

        if let Some(d) = &self.description {
            out.push_str(&meta("description", d));
        }
        out.push_str(&meta("robots", self.robots));
        out.push_str(&format!(r#"<link rel="canonical" href="{}">"#, attr(&self.canonical)));
        for a in &self.alternates {
            out.push_str(&format!(
                r#"<link rel="alternate" hreflang="{}" href="{}">"#,
                attr(&a.locale),
                attr(&a.href)
            ));
        }

        out.push_str(&prop("og:type", "website"));
        out.push_str(&prop("og:site_name", site_name));
        out.push_str(&prop("og:title", &self.title));
        out.push_str(&prop("og:url", &self.canonical));
        out.push_str(&prop("og:locale", &self.locale));
        if let Some(d) = &self.description {
            out.push_str(&prop("og:description", d));
        }
        out.push_str(&meta(
            "twitter:card",
            if self.image.is_some() {
                "summary_large_image"
            } else {
                "summary"
            },
        ));
        out.push_str(&meta("twitter:title", &self.title));
        if let Some(d) = &self.description {
            out.push_str(&meta("twitter:description", d));
        }
        if let Some(img) = &self.image {
            out.push_str(&prop("og:image", &img.url));
            out.push_str(&prop("og:image:width", &img.width.to_string()));
            out.push_str(&prop("og:image:height", &img.height.to_string()));
            out.push_str(&prop("og:image:alt", &img.alt));
            out.push_str(&meta("twitter:image", &img.url));
        }
        out
    }
}

/// Schema.org description of the site and its publisher.
pub fn json_ld(site: &SiteInfo<'_>, locale: &str) -> String {
    let data = json!({
        "@context": "https://schema.org",
        "@graph": [
            {
                "@type": "Organization",
                "@id": format!("{}/#organization", site.base_url),
                "name": site.name,
                "url": site.base_url,
            },
            {
                "@type": "WebSite",
                "@id": format!("{}/#website", site.base_url),
                "name": site.name,
                "url": format!("{}/{locale}", site.base_url),
                "inLanguage": locale,
                "publisher": { "@id": format!("{}/#organization", site.base_url) },
            }
        ]
    });
    // `</` would close the script element early.
    let body = data.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{body}</script>"#)
}
