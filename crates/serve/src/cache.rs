// crates/serve/src/cache.rs

use domain::navigation::Header;
use domain::page::Page;
use domain::setting::CacheSettings;
use domain::work::{PortfolioItem, WorkItem};
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::Error;

/// Tag carried by every page and listing entry.
pub const PAGES_TAG: &str = "cms-pages";
/// Tag carried by header entries.
pub const HEADER_TAG: &str = "cms-header";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tag: &'static str,
    pub key: String,
}

impl CacheKey {
    pub fn new(tag: &'static str, key: impl Into<String>) -> Self {
        CacheKey {
            tag,
            key: key.into(),
        }
    }
}

/// A TTL cache whose entries can also be dropped by tag.
#[derive(Clone)]
pub struct ContentCache<V: Clone + Send + Sync + 'static> {
    inner: Cache<CacheKey, V>,
}

impl<V: Clone + Send + Sync + 'static> ContentCache<V> {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        ContentCache { inner }
    }

    /// Cached value for `key`, or the result of `load` (stored only on
    /// success).
    pub async fn get_or_load<F>(&self, key: CacheKey, load: F) -> Result<V, Error>
    where
        F: Future<Output = Result<V, Error>>,
    {
        if let Some(hit) = self.inner.get(&key).await {
            debug!(tag = key.tag, key = %key.key, "cache hit");
            return Ok(hit);
        }
        let value = load.await?;
        self.inner.insert(key, value.clone()).await;
        Ok(value)
    }

    pub fn invalidate_tag(&self, tag: &str) {
        let tag = tag.to_string();
        if let Err(e) = self.inner.invalidate_entries_if(move |k, _| k.tag == tag) {
            warn!(error = %e, "tag invalidation rejected, clearing everything");
            self.inner.invalidate_all();
        }
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

/// Every cache the site keeps, with one revalidation window.
#[derive(Clone)]
pub struct Caches {
    pub pages: ContentCache<Vec<Page>>,
    pub headers: ContentCache<Option<Header>>,
    pub work_items: ContentCache<Vec<WorkItem>>,
    pub portfolio_items: ContentCache<Vec<PortfolioItem>>,
}

impl Caches {
    pub fn new(settings: &CacheSettings) -> Self {
        let ttl = Duration::from_secs(settings.revalidate_secs);
        let cap = settings.max_capacity;
        Caches {
            pages: ContentCache::new(ttl, cap),
            headers: ContentCache::new(ttl, cap),
            work_items: ContentCache::new(ttl, cap),
            portfolio_items: ContentCache::new(ttl, cap),
        }
    }

    /// Purge one tag, or everything when `tag` is `None`. Returns `false`
    /// for a tag nothing is stored under.
    #[tracing::instrument(skip_all)]
    pub fn invalidate(&self, tag: Option<&str>) -> bool {
        match tag {
            None => {
                self.pages.invalidate_all();
                self.headers.invalidate_all();
                self.work_items.invalidate_all();
                self.portfolio_items.invalidate_all();
            }
            Some(PAGES_TAG) => {
                self.pages.invalidate_tag(PAGES_TAG);
                self.work_items.invalidate_tag(PAGES_TAG);
                self.portfolio_items.invalidate_tag(PAGES_TAG);
            }
            Some(HEADER_TAG) => self.headers.invalidate_tag(HEADER_TAG),
            Some(other) => {
                debug!(tag = other, "unknown cache tag");
                return false;
            }
        }
        tracing::info!(tag = tag.unwrap_or("*"), "cache invalidated");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn load(counter: &AtomicUsize, v: u32) -> Result<u32, Error> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(v)
    }

    #[tokio::test]
    async fn hit_skips_loader() {
        let cache: ContentCache<u32> = ContentCache::new(Duration::from_secs(60), 10);
        let calls = AtomicUsize::new(0);
        let key = CacheKey::new(PAGES_TAG, "about|fr");
        assert_eq!(cache.get_or_load(key.clone(), load(&calls, 1)).await.expect("v"), 1);
        assert_eq!(cache.get_or_load(key, load(&calls, 2)).await.expect("v"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: ContentCache<u32> = ContentCache::new(Duration::from_secs(60), 10);
        let key = CacheKey::new(PAGES_TAG, "x");
        let failed = cache
            .get_or_load(key.clone(), async { Err(Error::InvalidUrl("boom".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get_or_load(key, async { Ok(7) }).await.expect("v"), 7);
    }

    #[tokio::test]
    async fn tag_invalidation_only_hits_that_tag() {
        let cache: ContentCache<u32> = ContentCache::new(Duration::from_secs(60), 10);
        let calls = AtomicUsize::new(0);
        let page = CacheKey::new(PAGES_TAG, "p");
        let header = CacheKey::new(HEADER_TAG, "h");
        cache.get_or_load(page.clone(), load(&calls, 1)).await.expect("v");
        cache.get_or_load(header.clone(), load(&calls, 1)).await.expect("v");

        cache.invalidate_tag(PAGES_TAG);
        // Invalidation closures apply lazily; reads after the call must miss.
        assert_eq!(cache.get_or_load(page, load(&calls, 2)).await.expect("v"), 2);
        assert_eq!(cache.get_or_load(header, load(&calls, 3)).await.expect("v"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unknown_tags_are_reported() {
        let caches = Caches::new(&CacheSettings::default());
        assert!(caches.invalidate(Some(PAGES_TAG)));
        assert!(caches.invalidate(None));
        assert!(!caches.invalidate(Some("nope")));
    }
}
