// crates/serve/src/locale.rs

use domain::locale::LocaleSet;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::client::ContentSource;

/// Supported locales as the CMS currently lists them, refreshed after a
/// short TTL. When the CMS cannot answer, the configured static set is used
/// and remembered for one TTL as well.
pub struct LocaleService {
    source: Arc<dyn ContentSource>,
    fallback: LocaleSet,
    cached: Cache<(), LocaleSet>,
}

impl LocaleService {
    pub fn new(source: Arc<dyn ContentSource>, fallback: LocaleSet, ttl: Duration) -> Self {
        LocaleService {
            source,
            fallback,
            cached: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub fn fallback(&self) -> &LocaleSet {
        &self.fallback
    }

    /// Concurrent callers on a cold entry share one CMS request.
    #[tracing::instrument(skip_all)]
    pub async fn current(&self) -> LocaleSet {
        self.cached
            .get_with((), async {
                match self.source.find_locales().await {
                    Ok(Some(set)) => set,
                    Ok(None) => self.fallback.clone(),
                    Err(e) => {
                        warn!(error = %e, "locale discovery failed, using static locales");
                        self.fallback.clone()
                    }
                }
            })
            .await
    }

    pub fn forget(&self) {
        self.cached.invalidate_all();
    }
}
