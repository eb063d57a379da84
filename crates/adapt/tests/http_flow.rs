// crates/adapt/tests/http_flow.rs

use adapt::mail::{Email, MailError, Mailer};
use adapt::{build_app, Site};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::Router;
use domain::locale::LocaleSet;
use domain::navigation::Header;
use domain::page::Page;
use domain::setting::Settings;
use domain::work::{PortfolioItem, WorkItem};
use http::{header, Request, StatusCode};
use mockall::mock;
use secrecy::SecretString;
use serde_json::{json, Value};
use serve::query::Query;
use serve::render::ComponentRegistry;
use std::sync::Arc;
use tower::ServiceExt;

mock! {
    pub Source {}

    #[async_trait]
    impl serve::client::ContentSource for Source {
        async fn find_pages(&self, query: &Query, draft: bool) -> Result<Vec<Page>, serve::Error>;
        async fn find_header(&self, query: &Query, draft: bool) -> Result<Option<Header>, serve::Error>;
        async fn find_work_items(&self, query: &Query, draft: bool) -> Result<Vec<WorkItem>, serve::Error>;
        async fn find_portfolio_items(&self, query: &Query, draft: bool) -> Result<Vec<PortfolioItem>, serve::Error>;
        async fn find_locales(&self) -> Result<Option<LocaleSet>, serve::Error>;
    }
}

mock! {
    pub Mail {}

    #[async_trait]
    impl Mailer for Mail {
        async fn send(&self, email: Email) -> Result<Option<String>, MailError>;
    }
}

fn slug_of(q: &Query) -> Option<String> {
    q.pairs()
        .into_iter()
        .find(|(k, _)| k == "filters[slug][$eq]")
        .map(|(_, v)| v)
}

/// A CMS holding `about` in French and English, and `team` in English only.
fn source() -> MockSource {
    let mut source = MockSource::new();
    source.expect_find_locales().returning(|| Ok(None));
    source.expect_find_header().returning(|_, _| Ok(None));
    source.expect_find_pages().returning(|q, _| {
        let locale = q.locale_value().map(str::to_string);
        let page = |slug: &str, locale: &str, title: &str| -> Page {
            serde_json::from_value(json!({
                "slug": slug,
                "locale": locale,
                "title": title,
                "sections": [{ "blocks": [
                    { "__component": "blocks.text-block", "content": "Bonjour" },
                    { "__component": "blocks.mystery" }
                ]}]
            }))
            .expect("page")
        };
        Ok(match (slug_of(q).as_deref(), locale.as_deref()) {
            (Some("about"), Some("fr")) => vec![page("about", "fr", "À propos")],
            (Some("about"), Some("en")) => vec![page("about", "en", "About")],
            (Some("team"), None) => vec![page("team", "en", "Team")],
            _ => vec![],
        })
    });
    source
}

fn settings() -> Settings {
    let mut s = Settings::default();
    s.preview.secret = Some(SecretString::new("s3cret".into()));
    s.preview.use_draft_mode = true;
    s.cache.revalidate_secret = Some(SecretString::new("hook".into()));
    s
}

fn app_with(source: MockSource, mailer: MockMail) -> Router {
    build_app(Site::new(
        &settings(),
        Arc::new(source),
        Arc::new(mailer),
        ComponentRegistry::empty(),
    ))
}

fn app() -> Router {
    app_with(source(), MockMail::new())
}

async fn get(app: Router, uri: &str) -> http::Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn body_text(resp: http::Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn location(resp: &http::Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().expect("location")
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_redirects_to_default_locale() {
    let resp = get(app(), "/").await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/fr");
}

#[tokio::test]
async fn renders_a_localized_page_with_security_headers() {
    let resp = get(app(), "/fr/about").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert!(resp.headers()["content-security-policy"]
        .to_str()
        .expect("csp")
        .contains("frame-ancestors 'self' http://localhost:1337"));
    let html = body_text(resp).await;
    assert!(html.contains("<title>À propos | My Website</title>"));
    assert!(html.contains(r#"hreflang="fr" href="http://localhost:3000/fr/about""#));
    assert!(html.contains("Bonjour"));
    assert!(html.contains("block-placeholder"));
    assert!(html.contains(r#"<html lang="fr">"#));
}

#[tokio::test]
async fn page_in_another_locale_redirects_there() {
    let resp = get(app(), "/fr/team").await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/en/team");
}

#[tokio::test]
async fn home_slug_redirects_to_locale_root() {
    let resp = get(app(), "/en/home").await;
    assert_eq!(location(&resp), "/en");
}

#[tokio::test]
async fn missing_home_renders_placeholder() {
    let resp = get(app(), "/it").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Bienvenue"));
    assert!(html.contains("Site en construction"));
}

#[tokio::test]
async fn unknown_locale_with_slug_is_a_localized_404() {
    let resp = get(app(), "/de/about").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let html = body_text(resp).await;
    assert!(html.contains("<title>Page introuvable | My Website</title>"));
    assert!(html.contains("Cette page n'existe pas."));
    assert!(html.contains(r#"<html lang="fr">"#));

    let resp = get(app(), "/en/ghost").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let html = body_text(resp).await;
    assert!(html.contains(r#"<html lang="en">"#));
    assert!(html.contains("<title>Page not found | My Website</title>"));
    assert!(html.contains("This page doesn't exist."));
    assert!(html.contains(r#"href="/en">Back to home</a>"#));
    assert!(!html.contains("Page introuvable"));
}

#[tokio::test]
async fn non_locale_paths_are_rerooted() {
    let resp = get(app(), "/about").await;
    assert_eq!(location(&resp), "/fr");
    let resp = get(app(), "/blog/2024/post").await;
    assert_eq!(location(&resp), "/fr/2024/post");
}

#[tokio::test]
async fn upstream_failure_is_a_500() {
    let mut source = MockSource::new();
    source.expect_find_locales().returning(|| Ok(None));
    source.expect_find_header().returning(|_, _| Ok(None));
    source.expect_find_pages().returning(|_, _| {
        Err(serve::Error::Status {
            status: 502,
            body: "bad gateway".into(),
        })
    });
    let resp = get(app_with(source, MockMail::new()), "/fr/about").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_text(resp).await.contains("bad gateway"));
}

#[tokio::test]
async fn stylesheet_is_served() {
    let resp = get(app(), "/assets/site.css").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .expect("type")
        .starts_with("text/css"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Preview
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preview_rejects_bad_secret() {
    let resp = get(app(), "/api/preview?secret=nope&url=/fr/about").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "Invalid token");
}

#[tokio::test]
async fn preview_sets_draft_mode_and_redirects() {
    let resp = get(app(), "/api/preview?secret=s3cret&url=%2Ffr%2Fabout&status=draft").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/fr/about?draft=true");
    let cookie = resp.headers()[header::SET_COOKIE].to_str().expect("cookie");
    assert!(cookie.starts_with("vitrine_draft=1"));
}

#[tokio::test]
async fn draft_cookie_shows_indicator_and_disable_clears_it() {
    let resp = app()
        .oneshot(
            Request::get("/fr/about")
                .header(header::COOKIE, "vitrine_draft=1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "private, no-store");
    assert!(body_text(resp).await.contains("draft-indicator"));

    let resp = get(app(), "/api/preview/disable").await;
    assert!(resp.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie")
        .contains("Max-Age=0"));
}

// ─────────────────────────────────────────────────────────────────────────────
// API
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn locales_endpoint_is_cacheable() {
    let resp = get(app(), "/api/locales").await;
    assert_eq!(
        resp.headers()[header::CACHE_CONTROL],
        "public, max-age=60, stale-while-revalidate=3600"
    );
    let body: Value = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(body, json!({ "locales": ["fr", "en", "it"], "defaultLocale": "fr" }));
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn contact_validation_errors_are_400() {
    let mut mailer = MockMail::new();
    mailer.expect_send().never();
    let resp = app_with(source(), mailer)
        .oneshot(post_json(
            "/api/contact",
            json!({ "name": "Ada", "email": "nope", "message": "hi", "consent": true }),
        ))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(body["error"], "Adresse email invalide.");
}

#[tokio::test]
async fn contact_succeeds_even_if_auto_reply_fails() {
    let mut mailer = MockMail::new();
    mailer
        .expect_send()
        .withf(|e| e.reply_to.is_some())
        .times(1)
        .returning(|_| Ok(Some("msg-1".into())));
    mailer
        .expect_send()
        .withf(|e| e.reply_to.is_none())
        .times(1)
        .returning(|_| Err(MailError::NotConfigured));
    let resp = app_with(source(), mailer)
        .oneshot(post_json(
            "/api/contact",
            json!({ "name": "Ada", "email": "ada@example.com", "message": "hi", "consent": true }),
        ))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(body["id"], "msg-1");
}

#[tokio::test]
async fn contact_notification_failure_is_500() {
    let mut mailer = MockMail::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| Err(MailError::Status { status: 500, body: String::new() }));
    let resp = app_with(source(), mailer)
        .oneshot(post_json(
            "/api/contact",
            json!({ "name": "Ada", "email": "ada@example.com", "message": "hi", "consent": "on" }),
        ))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn revalidate_requires_the_hook_secret() {
    let resp = app()
        .oneshot(post_json("/api/revalidate?secret=wrong", json!({})))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app()
        .oneshot(post_json("/api/revalidate?secret=hook&tag=cms-pages", json!({})))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(body["revalidated"], true);

    let resp = app()
        .oneshot(post_json("/api/revalidate?secret=hook&tag=bogus", json!({})))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
