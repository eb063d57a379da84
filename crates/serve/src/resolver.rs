// crates/serve/src/resolver.rs

//! Request → page resolution.
//!
//! A lookup runs an ordered list of strategies; each either settles the
//! request or passes to the next. Locale validation and the home alias are
//! decided before any strategy runs.

use domain::page::{Page, HOME_SLUG};
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheKey, ContentCache, PAGES_TAG};
use crate::client::ContentSource;
use crate::locale::LocaleService;
use crate::query::{Populate, Query};
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Box<Page>),
    /// Root-relative path to send the visitor to.
    Redirect(String),
    NotFound,
}

/// Draft state of a request.
///
/// `mode` is the session-wide draft switch (cookie); it only bypasses the
/// cache. `requested` (`?draft=true`) also reads unpublished content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Draft {
    pub mode: bool,
    pub requested: bool,
}

impl Draft {
    pub fn bypass_cache(self) -> bool {
        self.mode || self.requested
    }

    pub fn preview(self) -> bool {
        self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The slug in one locale; settles with the page when there is one.
    Localized(String),
    /// The slug in any locale; a hit elsewhere redirects there.
    Global,
    /// A synthesized home page in the requested locale.
    Placeholder,
}

/// Fields and relations a page render needs.
pub fn page_query(slug: &str) -> Query {
    Query::new()
        .filter_eq("slug", slug)
        .fields([
            "title",
            "hideTitle",
            "slug",
            "heroContent",
            "seoTitle",
            "seoDescription",
            "noIndex",
            "locale",
            "publishedAt",
        ])
        .populate(
            Populate::new("sections")
                .fields(["title", "hideTitle", "identifier", "content", "order", "reverse", "spacing"])
                .with(Populate::media("image"))
                .with(Populate::all("blocks")),
        )
        .populate(Populate::media("seoImage"))
        .populate(Populate::new("localizations").fields(["slug", "locale"]))
}

pub struct PageResolver {
    source: Arc<dyn ContentSource>,
    cache: ContentCache<Vec<Page>>,
    locales: Arc<LocaleService>,
}

impl PageResolver {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: ContentCache<Vec<Page>>,
        locales: Arc<LocaleService>,
    ) -> Self {
        PageResolver {
            source,
            cache,
            locales,
        }
    }

    /// Resolve `/{locale}/{slug}`.
    #[tracing::instrument(skip_all, fields(slug = %slug, locale = %locale))]
    pub async fn resolve(&self, slug: &str, locale: &str, draft: Draft) -> Result<Resolution, Error> {
        let supported = self.locales.current().await;
        if !supported.contains(locale) {
            return Ok(Resolution::NotFound);
        }
        if slug == HOME_SLUG {
            return Ok(Resolution::Redirect(format!("/{locale}")));
        }
        let chain = [Strategy::Localized(locale.to_string()), Strategy::Global];
        self.run(&chain, slug, locale, draft).await
    }

    /// Resolve `/{locale}`: the locale's home, then the default locale's,
    /// then a placeholder.
    #[tracing::instrument(skip_all, fields(locale = %locale))]
    pub async fn resolve_home(&self, locale: &str, draft: Draft) -> Result<Resolution, Error> {
        let supported = self.locales.current().await;
        if !supported.contains(locale) {
            return Ok(Resolution::NotFound);
        }
        let mut chain = vec![Strategy::Localized(locale.to_string())];
        if supported.default_locale != locale {
            chain.push(Strategy::Localized(supported.default_locale.clone()));
        }
        chain.push(Strategy::Placeholder);
        self.run(&chain, HOME_SLUG, locale, draft).await
    }

    async fn run(
        &self,
        chain: &[Strategy],
        slug: &str,
        locale: &str,
        draft: Draft,
    ) -> Result<Resolution, Error> {
        for strategy in chain {
            if let Some(resolution) = self.attempt(strategy, slug, locale, draft).await? {
                debug!(?strategy, "resolved");
                return Ok(resolution);
            }
        }
        Ok(Resolution::NotFound)
    }

    async fn attempt(
        &self,
        strategy: &Strategy,
        slug: &str,
        requested: &str,
        draft: Draft,
    ) -> Result<Option<Resolution>, Error> {
        match strategy {
            Strategy::Localized(locale) => {
                let pages = self.fetch(slug, Some(locale), draft).await?;
                Ok(pages.into_iter().next().map(|p| Resolution::Found(Box::new(p))))
            }
            Strategy::Global => {
                let pages = self.fetch(slug, None, draft).await?;
                let Some(page) = pages.into_iter().next() else {
                    return Ok(None);
                };
                if page.locale.is_empty() || page.locale == requested {
                    return Ok(Some(Resolution::Found(Box::new(page))));
                }
                if !self.locales.current().await.contains(&page.locale) {
                    return Ok(None);
                }
                Ok(Some(Resolution::Redirect(format!("/{}/{slug}", page.locale))))
            }
            Strategy::Placeholder => Ok(Some(Resolution::Found(Box::new(
                Page::placeholder_home(requested),
            )))),
        }
    }

    async fn fetch(&self, slug: &str, locale: Option<&str>, draft: Draft) -> Result<Vec<Page>, Error> {
        let mut query = page_query(slug);
        if let Some(locale) = locale {
            query = query.locale(locale);
        }
        if draft.bypass_cache() {
            return self.source.find_pages(&query, draft.preview()).await;
        }
        let key = CacheKey::new(PAGES_TAG, format!("{slug}|{}", locale.unwrap_or("*")));
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_load(key, async move { source.find_pages(&query, false).await })
            .await
    }
}
