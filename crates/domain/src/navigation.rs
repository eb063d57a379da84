// crates/domain/src/navigation.rs

use serde::{Deserialize, Serialize};

use crate::media::Media;
use crate::page::{slugify, HOME_SLUG};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSection {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

impl NavSection {
    pub fn anchor(&self) -> Option<String> {
        match self.identifier.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => self.title.as_deref().map(slugify).filter(|s| !s.is_empty()),
        }
    }
}

/// One header link: a page, optionally narrowed to a section of it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub page: Option<NavPage>,
    #[serde(default)]
    pub section: Option<NavSection>,
}

impl NavEntry {
    fn page_slug(&self) -> Option<&str> {
        self.page.as_ref().and_then(|p| p.slug.as_deref())
    }

    /// Field-wise merge: present incoming fields overwrite, absent ones
    /// never erase.
    pub fn absorb(&mut self, incoming: NavEntry) {
        if incoming.id.is_some() {
            self.id = incoming.id;
        }
        if incoming.custom_label.is_some() {
            self.custom_label = incoming.custom_label;
        }
        if incoming.page.is_some() {
            self.page = incoming.page;
        }
        if incoming.section.is_some() {
            self.section = incoming.section;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub logo: Option<Media>,
    #[serde(default)]
    pub navigation: Vec<NavEntry>,
}

/// Merge navigation lists fetched with different relations populated.
///
/// An incoming entry joins an existing one with the same id; an entry
/// without an id joins the existing entry linking to the same page slug;
/// anything else is appended. Entries keep first-seen order.
pub fn merge_navigation<I>(lists: I) -> Vec<NavEntry>
where
    I: IntoIterator<Item = Vec<NavEntry>>,
{
    let mut merged: Vec<NavEntry> = Vec::new();
    for entry in lists.into_iter().flatten() {
        let slot = match entry.id {
            Some(id) => merged.iter().position(|e| e.id == Some(id)),
            None => entry
                .page_slug()
                .and_then(|slug| merged.iter().position(|e| e.page_slug() == Some(slug))),
        };
        match slot {
            Some(i) => merged[i].absorb(entry),
            None => merged.push(entry),
        }
    }
    merged
}

/// Combine the page-populated and section-populated header responses.
/// Title and logo come from the page-populated response only; the other
/// one contributes navigation.
pub fn merge_headers(by_page: Option<Header>, by_section: Option<Header>) -> Option<Header> {
    if by_page.is_none() && by_section.is_none() {
        return None;
    }
    let (title, logo, page_nav) = match by_page {
        Some(h) => (h.title, h.logo, h.navigation),
        None => (None, None, Vec::new()),
    };
    let section_nav = by_section.map(|h| h.navigation).unwrap_or_default();
    Some(Header {
        title,
        logo,
        navigation: merge_navigation([page_nav, section_nav]),
    })
}

/// A rendered header link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// Localize navigation entries for `locale`. Entries without a page slug
/// are skipped.
pub fn nav_links(entries: &[NavEntry], locale: &str, current_path: &str) -> Vec<NavLink> {
    let current = current_path.split('#').next().unwrap_or_default().trim_end_matches('/');
    entries
        .iter()
        .filter_map(|entry| {
            let page = entry.page.as_ref()?;
            let slug = page.slug.as_deref().filter(|s| !s.is_empty())?;
            let base = if slug == HOME_SLUG {
                format!("/{locale}")
            } else {
                format!("/{locale}/{slug}")
            };
            let anchor = entry.section.as_ref().and_then(NavSection::anchor);
            let label = entry
                .custom_label
                .clone()
                .filter(|l| !l.trim().is_empty())
                .or_else(|| entry.section.as_ref().and_then(|s| s.title.clone()))
                .or_else(|| page.title.clone())
                .unwrap_or_else(|| slug.to_string());
            let active = anchor.is_none() && base == current;
            let href = match anchor {
                Some(a) => format!("{base}#{a}"),
                None => base,
            };
            Some(NavLink { label, href, active })
        })
        .collect()
}
