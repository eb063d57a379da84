// crates/serve/src/client.rs

use async_trait::async_trait;
use domain::json::strip_nulls;
use domain::locale::LocaleSet;
use domain::navigation::Header;
use domain::page::Page;
use domain::setting::CmsSettings;
use domain::work::{PortfolioItem, WorkItem};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::query::{PublicationState, Query};
use crate::Error;

pub const PAGES: &str = "pages";
pub const HEADER: &str = "header";
pub const WORK_ITEMS: &str = "work-items";
pub const PORTFOLIO_ITEMS: &str = "portfolio-items";
const LOCALES: &str = "i18n/locales";

/// Read access to CMS content.
///
/// `draft` selects unpublished content and the credential allowed to see it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn find_pages(&self, query: &Query, draft: bool) -> Result<Vec<Page>, Error>;

    async fn find_header(&self, query: &Query, draft: bool) -> Result<Option<Header>, Error>;

    async fn find_work_items(&self, query: &Query, draft: bool) -> Result<Vec<WorkItem>, Error>;

    async fn find_portfolio_items(
        &self,
        query: &Query,
        draft: bool,
    ) -> Result<Vec<PortfolioItem>, Error>;

    /// Locales configured in the CMS; `None` when it lists none.
    async fn find_locales(&self) -> Result<Option<LocaleSet>, Error>;
}

// ─────────────────────────────────────────────────────────────────────────────
// REST client
// ─────────────────────────────────────────────────────────────────────────────

pub struct CmsClient {
    http: reqwest::Client,
    base: Url,
    api_token: Option<SecretString>,
    preview_token: Option<SecretString>,
}

fn copy_secret(s: &SecretString) -> SecretString {
    SecretString::new(s.expose_secret().into())
}

impl CmsClient {
    /// Build a client with the configured timeout. No retries are made.
    pub fn new(settings: &CmsSettings) -> Result<Self, Error> {
        let base = Url::parse(&format!("{}/", settings.url.trim_end_matches('/')))
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", settings.url)))?;
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(CmsClient {
            http,
            base,
            api_token: settings.api_token.as_ref().map(copy_secret),
            preview_token: settings.preview_token.as_ref().map(copy_secret),
        })
    }

    pub fn origin(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// The preview token wins for draft reads; the API token is the fallback.
    fn token(&self, draft: bool) -> Option<&SecretString> {
        if draft {
            self.preview_token.as_ref().or(self.api_token.as_ref())
        } else {
            self.api_token.as_ref()
        }
    }

    /// GET `/api/{path}`. A 404 is `Ok(None)`; other non-2xx statuses are
    /// errors.
    #[tracing::instrument(skip_all, fields(path = %path, draft = draft))]
    async fn get(&self, path: &str, query: &Query, draft: bool) -> Result<Option<Value>, Error> {
        let mut url = self
            .base
            .join(&format!("api/{path}"))
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let qs = query.to_query_string();
        if !qs.is_empty() {
            url.set_query(Some(&qs));
        }

        let mut req = self.http.get(url);
        if let Some(token) = self.token(draft) {
            req = req.bearer_auth(token.expose_secret());
        }

        let res = req.send().await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            debug!("CMS returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            let mut body = res.text().await.unwrap_or_default();
            if body.len() > 512 {
                let cut = (0..=512).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
                body.truncate(cut);
            }
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut body: Value = res.json().await?;
        strip_nulls(&mut body);
        Ok(Some(normalize_response(body)))
    }

    async fn find_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
        draft: bool,
    ) -> Result<Vec<T>, Error> {
        let query = query.clone().publication(PublicationState::from_draft(draft));
        let body = self.get(collection, &query, draft).await?;
        Ok(decode_list(body, collection))
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn find_pages(&self, query: &Query, draft: bool) -> Result<Vec<Page>, Error> {
        self.find_collection(PAGES, query, draft).await
    }

    async fn find_header(&self, query: &Query, draft: bool) -> Result<Option<Header>, Error> {
        let query = query.clone().publication(PublicationState::from_draft(draft));
        let Some(mut body) = self.get(HEADER, &query, draft).await? else {
            return Ok(None);
        };
        match body.get_mut("data").map(Value::take) {
            Some(data @ Value::Object(_)) => Ok(Some(serde_json::from_value(data)?)),
            _ => Ok(None),
        }
    }

    async fn find_work_items(&self, query: &Query, draft: bool) -> Result<Vec<WorkItem>, Error> {
        self.find_collection(WORK_ITEMS, query, draft).await
    }

    async fn find_portfolio_items(
        &self,
        query: &Query,
        draft: bool,
    ) -> Result<Vec<PortfolioItem>, Error> {
        self.find_collection(PORTFOLIO_ITEMS, query, draft).await
    }

    async fn find_locales(&self) -> Result<Option<LocaleSet>, Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CmsLocale {
            code: String,
            #[serde(default)]
            is_default: bool,
        }

        let Some(body) = self.get(LOCALES, &Query::new(), false).await? else {
            return Ok(None);
        };
        let list: Vec<CmsLocale> = serde_json::from_value(body)?;
        if list.is_empty() {
            return Ok(None);
        }
        let default = list
            .iter()
            .find(|l| l.is_default)
            .map(|l| l.code.clone())
            .unwrap_or_default();
        let codes = list.into_iter().map(|l| l.code).collect();
        Ok(Some(LocaleSet::new(codes, &default)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response shaping
// ─────────────────────────────────────────────────────────────────────────────

/// Entries that fail validation are dropped with a warning; the rest of the
/// collection still renders.
fn decode_list<T: DeserializeOwned>(body: Option<Value>, collection: &str) -> Vec<T> {
    let items = match body.and_then(|mut b| b.get_mut("data").map(Value::take)) {
        Some(Value::Array(items)) => items,
        Some(single @ Value::Object(_)) => vec![single],
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(collection, error = %e, "skipping CMS entry that failed validation");
                None
            }
        })
        .collect()
}

/// Flatten the older envelope shapes (`{id, attributes: {..}}` entries and
/// `{data: ..}` relations) into plain objects, leaving the top-level
/// `{data, meta}` envelope in place.
fn normalize_response(body: Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, flatten(v))).collect()),
        other => flatten(other),
    }
}

fn flatten(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if map.len() == 1 && map.contains_key("data") {
                if let Some(inner) = map.remove("data") {
                    return flatten(inner);
                }
            }
            if let Some(Value::Object(attrs)) = map.remove("attributes") {
                for (k, v) in attrs {
                    map.entry(k).or_insert(v);
                }
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, flatten(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(flatten).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(url: &str) -> CmsSettings {
        CmsSettings {
            url: url.to_string(),
            api_token: Some(SecretString::new("api".into())),
            preview_token: Some(SecretString::new("preview".into())),
            timeout_secs: 5,
        }
    }

    #[test]
    fn flattens_attribute_envelopes() {
        let body = normalize_response(json!({
            "data": [{
                "id": 1,
                "attributes": {
                    "slug": "about",
                    "seoImage": { "data": { "id": 9, "attributes": { "url": "/a.png" } } }
                }
            }],
            "meta": {}
        }));
        assert_eq!(body["data"][0]["slug"], "about");
        assert_eq!(body["data"][0]["seoImage"]["url"], "/a.png");
        assert_eq!(body["data"][0]["id"], 1);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let pages: Vec<Page> = decode_list(
            Some(json!({ "data": [{ "slug": "ok" }, { "title": "no slug" }] })),
            PAGES,
        );
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn draft_reads_use_preview_token_and_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .and(query_param("filters[slug][$eq]", "about"))
            .and(query_param("publicationState", "preview"))
            .and(header("authorization", "Bearer preview"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "slug": "about", "locale": "fr", "title": "À propos", "seoTitle": null }],
                "meta": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CmsClient::new(&settings(&server.uri())).expect("client");
        let pages = client
            .find_pages(&Query::new().filter_eq("slug", "about"), true)
            .await
            .expect("pages");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "À propos");
        assert_eq!(pages[0].seo_title, None);
    }

    #[tokio::test]
    async fn live_reads_use_api_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .and(query_param("publicationState", "live"))
            .and(header("authorization", "Bearer api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CmsClient::new(&settings(&server.uri())).expect("client");
        let pages = client.find_pages(&Query::new(), false).await.expect("pages");
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = CmsClient::new(&settings(&server.uri())).expect("client");
        let err = client.find_pages(&Query::new(), false).await.expect_err("503");
        assert!(matches!(err, Error::Status { status: 503, .. }));
        assert_eq!(err.to_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn locales_and_missing_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/i18n/locales"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "code": "en", "isDefault": false },
                { "code": "fr", "isDefault": true }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/header"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CmsClient::new(&settings(&server.uri())).expect("client");
        let set = client.find_locales().await.expect("locales").expect("some");
        assert_eq!(set.locales, ["en", "fr"]);
        assert_eq!(set.default_locale, "fr");
        let header = client.find_header(&Query::new(), false).await.expect("header");
        assert!(header.is_none());
    }
}
