// crates/serve/src/listing.rs
//
// Work and portfolio blocks list collection entries that are not part of the
// page payload. They are fetched here, before rendering, so the renderers
// only ever see complete data.

use domain::block::{Block, PortfolioBlock, WorkBlock};
use domain::layout::WorkItemType;
use domain::page::Page;
use domain::work::{PortfolioItem, WorkItem};
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

use crate::cache::{CacheKey, ContentCache, PAGES_TAG};
use crate::client::ContentSource;
use crate::query::{Populate, Query};
use crate::resolver::Draft;

const LISTING_SORT: [&str; 2] = ["order:asc", "createdAt:desc"];

pub fn work_query(block: &WorkBlock, locale: &str) -> Query {
    let mut query = Query::new()
        .populate(Populate::new("categories").fields(["name", "slug", "color"]))
        .populate(Populate::media("image"));
    if block.show_featured_only {
        query = query.filter_eq("featured", "true");
    }
    if !block.show_all_categories {
        let slugs: Vec<&str> = block
            .filter_by_categories
            .iter()
            .map(|c| c.slug.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        if !slugs.is_empty() {
            query = query.filter_in("categories.slug", slugs);
        }
    }
    if block.filter_by_item_type != WorkItemType::All {
        query = query.filter_eq("itemType", block.filter_by_item_type.as_str());
    }
    for s in LISTING_SORT {
        query = query.sort(s);
    }
    query.limit(block.limit).locale(locale)
}

pub fn portfolio_query(block: &PortfolioBlock, locale: &str) -> Query {
    let mut query = Query::new()
        .populate(Populate::new("themes").fields(["name", "slug", "color"]))
        .populate(Populate::media("image"));
    if block.show_featured_only {
        query = query.filter_eq("featured", "true");
    }
    if !block.show_all_themes {
        let slugs: Vec<&str> = block
            .filter_by_themes
            .iter()
            .map(|t| t.slug.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        if !slugs.is_empty() {
            query = query.filter_in("themes.slug", slugs);
        }
    }
    for s in LISTING_SORT {
        query = query.sort(s);
    }
    query.limit(block.limit).locale(locale)
}

pub struct ListingLoader {
    source: Arc<dyn ContentSource>,
    work_items: ContentCache<Vec<WorkItem>>,
    portfolio_items: ContentCache<Vec<PortfolioItem>>,
}

impl ListingLoader {
    pub fn new(
        source: Arc<dyn ContentSource>,
        work_items: ContentCache<Vec<WorkItem>>,
        portfolio_items: ContentCache<Vec<PortfolioItem>>,
    ) -> Self {
        ListingLoader {
            source,
            work_items,
            portfolio_items,
        }
    }

    /// Fill every listing block of `page`, concurrently. A failed listing
    /// is logged and left empty; it never fails the page.
    #[tracing::instrument(skip_all, fields(slug = %page.slug))]
    pub async fn hydrate(&self, page: &mut Page, draft: Draft) {
        let locale = page.locale.clone();
        let fills = page
            .sections
            .iter_mut()
            .flat_map(|s| s.blocks.iter_mut())
            .map(|block| self.fill(block, &locale, draft));
        join_all(fills).await;
    }

    async fn fill(&self, block: &mut Block, locale: &str, draft: Draft) {
        match block {
            Block::Work(b) => {
                let query = work_query(b, locale);
                match self.load_work(query, draft).await {
                    Ok(items) => b.items = items,
                    Err(e) => warn!(error = %e, "work listing unavailable"),
                }
            }
            Block::Portfolio(b) => {
                let query = portfolio_query(b, locale);
                match self.load_portfolio(query, draft).await {
                    Ok(items) => b.items = items,
                    Err(e) => warn!(error = %e, "portfolio listing unavailable"),
                }
            }
            _ => {}
        }
    }

    async fn load_work(&self, query: Query, draft: Draft) -> Result<Vec<WorkItem>, crate::Error> {
        if draft.bypass_cache() {
            return self.source.find_work_items(&query, draft.preview()).await;
        }
        let key = CacheKey::new(PAGES_TAG, format!("work|{}", query.to_query_string()));
        let source = Arc::clone(&self.source);
        self.work_items
            .get_or_load(key, async move { source.find_work_items(&query, false).await })
            .await
    }

    async fn load_portfolio(
        &self,
        query: Query,
        draft: Draft,
    ) -> Result<Vec<PortfolioItem>, crate::Error> {
        if draft.bypass_cache() {
            return self.source.find_portfolio_items(&query, draft.preview()).await;
        }
        let key = CacheKey::new(PAGES_TAG, format!("portfolio|{}", query.to_query_string()));
        let source = Arc::clone(&self.source);
        self.portfolio_items
            .get_or_load(key, async move { source.find_portfolio_items(&query, false).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockContentSource;
    use crate::Error;
    use serde_json::json;
    use std::time::Duration;

    fn has(q: &Query, k: &str, v: &str) -> bool {
        q.pairs().iter().any(|(pk, pv)| pk == k && pv == v)
    }

    fn work(v: serde_json::Value) -> WorkBlock {
        match Block::from_json(v) {
            Block::Work(b) => b,
            other => panic!("expected work block, got {other:?}"),
        }
    }

    #[test]
    fn work_query_applies_filters() {
        let b = work(json!({
            "__component": "blocks.work-block",
            "showFeaturedOnly": true,
            "showAllCategories": false,
            "filterByCategories": [{ "name": "Web", "slug": "web" }],
            "filterByItemType": "case-study",
            "limit": 6
        }));
        let q = work_query(&b, "en");
        assert!(has(&q, "filters[featured][$eq]", "true"));
        assert!(has(&q, "filters[categories][slug][$in][0]", "web"));
        assert!(has(&q, "filters[itemType][$eq]", "case-study"));
        assert!(has(&q, "sort[0]", "order:asc"));
        assert!(has(&q, "pagination[limit]", "6"));
        assert_eq!(q.locale_value(), Some("en"));
    }

    #[test]
    fn default_work_query_is_unfiltered() {
        let b = work(json!({
            "__component": "blocks.work-block",
            "filterByCategories": [{ "name": "Web", "slug": "web" }]
        }));
        let q = work_query(&b, "fr");
        assert!(!q.pairs().iter().any(|(k, _)| k.starts_with("filters")));
        assert!(has(&q, "pagination[limit]", "12"));
    }

    fn page_with_listings() -> Page {
        serde_json::from_value(json!({
            "slug": "work",
            "locale": "fr",
            "sections": [
                { "blocks": [
                    { "__component": "blocks.work-block" },
                    { "__component": "blocks.text-block", "content": "x" }
                ]},
                { "blocks": [{ "__component": "blocks.portfolio-block" }] }
            ]
        }))
        .expect("page")
    }

    #[tokio::test]
    async fn hydrates_work_and_portfolio_blocks() {
        let mut source = MockContentSource::new();
        source.expect_find_work_items().times(1).returning(|_, _| {
            Ok(vec![WorkItem {
                title: "Atlas".into(),
                ..WorkItem::default()
            }])
        });
        source
            .expect_find_portfolio_items()
            .times(1)
            .returning(|_, _| Err(Error::Status { status: 500, body: String::new() }));
        let loader = ListingLoader::new(
            Arc::new(source),
            ContentCache::new(Duration::from_secs(60), 10),
            ContentCache::new(Duration::from_secs(60), 10),
        );
        let mut page = page_with_listings();
        loader.hydrate(&mut page, Draft::default()).await;

        let Block::Work(w) = &page.sections[0].blocks[0] else { panic!("work") };
        assert_eq!(w.items.len(), 1);
        let Block::Portfolio(p) = &page.sections[1].blocks[0] else { panic!("portfolio") };
        assert!(p.items.is_empty());
    }

    #[tokio::test]
    async fn listings_are_cached_unless_in_draft() {
        let mut source = MockContentSource::new();
        source
            .expect_find_work_items()
            .withf(|_, draft| !draft)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        source
            .expect_find_work_items()
            .withf(|_, draft| *draft)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        source.expect_find_portfolio_items().returning(|_, _| Ok(vec![]));
        let loader = ListingLoader::new(
            Arc::new(source),
            ContentCache::new(Duration::from_secs(60), 10),
            ContentCache::new(Duration::from_secs(60), 10),
        );
        let preview = Draft {
            mode: true,
            requested: true,
        };
        loader.hydrate(&mut page_with_listings(), Draft::default()).await;
        loader.hydrate(&mut page_with_listings(), Draft::default()).await;
        loader.hydrate(&mut page_with_listings(), preview).await;
    }
}
