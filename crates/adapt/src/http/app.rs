// crates/adapt/src/http/app.rs

use axum::routing::{get, post};
use axum::Router;
use domain::setting::Settings;
use http::{HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};
use serve::cache::Caches;
use serve::client::ContentSource;
use serve::listing::ListingLoader;
use serve::locale::LocaleService;
use serve::navigation::HeaderLoader;
use serve::render::{BlockRenderer, ComponentRegistry};
use serve::resolver::PageResolver;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::http::middleware::{SecurityHeadersLayer, SecurityPolicy};
use crate::http::{api, pages};
use crate::mail::{Addresses, Mailer};

/// Everything a request handler can reach. Built once at start-up.
pub struct Site {
    pub name: String,
    /// Public base URL without a trailing slash.
    pub base_url: String,
    pub cms_origin: String,
    pub production: bool,
    pub locales: Arc<LocaleService>,
    pub resolver: PageResolver,
    pub headers: HeaderLoader,
    pub listings: ListingLoader,
    pub renderer: BlockRenderer,
    pub caches: Caches,
    pub mailer: Arc<dyn Mailer>,
    pub addresses: Addresses,
    pub preview_secret: Option<SecretString>,
    pub use_draft_mode: bool,
    pub revalidate_secret: Option<SecretString>,
    pub security: SecurityPolicy,
}

pub type AppState = Arc<Site>;

fn copy_secret(s: &Option<SecretString>) -> Option<SecretString> {
    s.as_ref().map(|s| SecretString::new(s.expose_secret().into()))
}

impl Site {
    #[tracing::instrument(skip_all)]
    pub fn new(
        settings: &Settings,
        source: Arc<dyn ContentSource>,
        mailer: Arc<dyn Mailer>,
        components: ComponentRegistry,
    ) -> Self {
        let cms_origin = settings.cms.url.trim_end_matches('/').to_string();
        let caches = Caches::new(&settings.cache);
        let locales = Arc::new(LocaleService::new(
            Arc::clone(&source),
            settings.locales.fallback(),
            Duration::from_secs(settings.locales.cache_ttl_secs),
        ));
        Site {
            name: settings.site.name.clone(),
            base_url: settings.site.base().to_string(),
            production: settings.security.production,
            security: SecurityPolicy::new(&cms_origin, &settings.security),
            resolver: PageResolver::new(
                Arc::clone(&source),
                caches.pages.clone(),
                Arc::clone(&locales),
            ),
            headers: HeaderLoader::new(Arc::clone(&source), caches.headers.clone()),
            listings: ListingLoader::new(
                source,
                caches.work_items.clone(),
                caches.portfolio_items.clone(),
            ),
            renderer: BlockRenderer::new(components),
            caches,
            locales,
            mailer,
            addresses: Addresses::from(&settings.mail),
            preview_secret: copy_secret(&settings.preview.secret),
            use_draft_mode: settings.preview.use_draft_mode,
            revalidate_secret: copy_secret(&settings.cache.revalidate_secret),
            cms_origin,
        }
    }
}

/// `/api/*` answers cross-origin requests from the CMS only.
fn cms_cors(cms_origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(cms_origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]),
        ),
        Err(e) => {
            warn!(error = %e, origin = cms_origin, "CMS origin is not a valid header; CORS disabled");
            None
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn build_app(site: Site) -> Router {
    let security = SecurityHeadersLayer::new(site.security.clone());
    let cors = cms_cors(&site.cms_origin);
    let state: AppState = Arc::new(site);

    let mut api = Router::new()
        .route("/preview", get(api::preview))
        .route("/preview/disable", get(api::preview_disable))
        .route("/locales", get(api::locales))
        .route("/contact", post(api::contact))
        .route("/revalidate", post(api::revalidate));
    if let Some(cors) = cors {
        api = api.layer(cors);
    }

    Router::new()
        .route("/", get(pages::root))
        .route("/assets/site.css", get(pages::stylesheet))
        .route("/{locale}", get(pages::home))
        .route("/{locale}/{slug}", get(pages::page))
        .nest("/api", api)
        .fallback(pages::fallback)
        .with_state(state)
        .layer(security)
        .layer(TraceLayer::new_for_http())
}
