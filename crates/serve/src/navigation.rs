// crates/serve/src/navigation.rs

use domain::navigation::{merge_headers, Header};
use std::sync::Arc;
use tracing::warn;

use crate::cache::{CacheKey, ContentCache, HEADER_TAG};
use crate::client::ContentSource;
use crate::query::{Populate, Query};
use crate::resolver::Draft;

/// Navigation entries populated with their linked page, plus the logo.
pub fn header_by_page_query(locale: &str) -> Query {
    Query::new()
        .populate(
            Populate::new("navigation").with(Populate::new("page").fields(["title", "slug"])),
        )
        .populate(Populate::media("logo"))
        .locale(locale)
}

/// Navigation entries populated with their linked section.
pub fn header_by_section_query(locale: &str) -> Query {
    Query::new()
        .populate(
            Populate::new("navigation")
                .with(Populate::new("section").fields(["title", "identifier"])),
        )
        .locale(locale)
}

/// Site header for a locale, fetched as two concurrent requests and merged.
pub struct HeaderLoader {
    source: Arc<dyn ContentSource>,
    cache: ContentCache<Option<Header>>,
}

impl HeaderLoader {
    pub fn new(source: Arc<dyn ContentSource>, cache: ContentCache<Option<Header>>) -> Self {
        HeaderLoader { source, cache }
    }

    /// `None` when the CMS has no header or cannot be reached; the page
    /// still renders with the site name in its place.
    #[tracing::instrument(skip_all, fields(locale = %locale))]
    pub async fn load(&self, locale: &str, draft: Draft) -> Option<Header> {
        let result = if draft.bypass_cache() {
            fetch(self.source.as_ref(), locale, draft.preview()).await
        } else {
            let source = Arc::clone(&self.source);
            let owned = locale.to_string();
            self.cache
                .get_or_load(CacheKey::new(HEADER_TAG, locale), async move {
                    fetch(source.as_ref(), &owned, false).await
                })
                .await
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "header unavailable");
            None
        })
    }
}

async fn fetch(
    source: &dyn ContentSource,
    locale: &str,
    draft: bool,
) -> Result<Option<Header>, crate::Error> {
    let by_page = header_by_page_query(locale);
    let by_section = header_by_section_query(locale);
    let (pages, sections) = futures::join!(
        source.find_header(&by_page, draft),
        source.find_header(&by_section, draft)
    );
    Ok(merge_headers(pages?, sections?))
}
