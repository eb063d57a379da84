// crates/adapt/src/http/pages.rs

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Datelike;
use domain::locale::LocaleSet;
use domain::navigation::Header;
use domain::page::Page;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum_extra::extract::cookie::CookieJar;
use http::Uri;
use serde::Deserialize;
use serve::metadata::{self, json_ld, SiteInfo};
use serve::render::layout::{not_found_main, not_found_text};
use serve::render::{document, render_page, RenderCtx, Shell};
use serve::resolver::{Draft, Resolution};
use tracing::debug;

use crate::http::app::{AppState, Site};
use crate::http::draft;
use crate::http::error::HttpError;

const STYLESHEET: &str = include_str!("../../assets/site.css");

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub draft: Option<String>,
}

struct Chrome<'a> {
    locale: &'a str,
    path: &'a str,
    head: &'a str,
    header: Option<&'a Header>,
    locales: &'a LocaleSet,
    draft_mode: bool,
}

fn wrap(site: &Site, chrome: Chrome<'_>, main: &str) -> String {
    let shell = Shell {
        site_name: &site.name,
        locale: chrome.locale,
        path: chrome.path,
        head: chrome.head,
        header: chrome.header,
        locales: chrome.locales,
        draft_mode: chrome.draft_mode,
        year: chrono::Utc::now().year(),
        cms_origin: &site.cms_origin,
    };
    document(&shell, main)
}

/// The localized 404 page as an error value.
pub async fn not_found(site: &Site, locale: &str, path: &str, draft: Draft) -> HttpError {
    let locales = site.locales.current().await;
    let locale = locales.resolve(Some(locale)).to_string();
    let header = site.headers.load(&locale, draft).await;
    let head = format!(
        r#"<title>{} | {}</title><meta name="robots" content="noindex">"#,
        not_found_text(&locale).title,
        html_escape::encode_text(&site.name)
    );
    let page = wrap(
        site,
        Chrome {
            locale: &locale,
            path,
            head: &head,
            header: header.as_ref(),
            locales: &locales,
            draft_mode: draft.mode,
        },
        &not_found_main(&locale),
    );
    HttpError::NotFound { locale, page }
}

/// Hydrate listings, load the header, and render the whole document.
#[tracing::instrument(skip_all, fields(slug = %page.slug, locale = %page.locale))]
pub async fn render(site: &Site, mut page: Page, path: &str, draft: Draft) -> Response {
    let locale = page.locale.clone();
    let (_, header, locales) = futures::join!(
        site.listings.hydrate(&mut page, draft),
        site.headers.load(&locale, draft),
        site.locales.current()
    );

    let info = SiteInfo {
        base_url: &site.base_url,
        name: &site.name,
        cms_origin: &site.cms_origin,
    };
    let head = format!(
        "{}{}",
        metadata::build(&page, &info).to_head_html(&site.name),
        json_ld(&info, &locale)
    );
    let ctx = RenderCtx {
        cms_origin: &site.cms_origin,
        locale: &locale,
    };
    let out = render_page(&site.renderer, &page, &ctx);
    if !out.diagnostics.is_empty() {
        debug!(count = out.diagnostics.len(), "blocks rendered as placeholders");
    }

    let html = wrap(
        site,
        Chrome {
            locale: &locale,
            path,
            head: &head,
            header: header.as_ref(),
            locales: &locales,
            draft_mode: draft.mode,
        },
        &out.html,
    );
    let mut resp = Html(html).into_response();
    if draft.bypass_cache() {
        if let Ok(v) = "private, no-store".parse() {
            resp.headers_mut().insert(CACHE_CONTROL, v);
        }
    }
    resp
}

/// Keep a requested draft view across strategy redirects.
fn redirect(to: &str, draft: Draft) -> Response {
    if draft.requested {
        Redirect::temporary(&format!("{to}?draft=true")).into_response()
    } else {
        Redirect::temporary(to).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn root(State(site): State<AppState>) -> Redirect {
    let locales = site.locales.current().await;
    Redirect::temporary(&format!("/{}", locales.default_locale))
}

pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/css; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}

#[tracing::instrument(skip_all, fields(locale = %locale))]
pub async fn home(
    State(site): State<AppState>,
    Path(locale): Path<String>,
    Query(params): Query<PageParams>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, HttpError> {
    let draft = draft::from_request(&jar, params.draft.as_deref());
    let locales = site.locales.current().await;
    if !locales.contains(&locale) {
        if let Some(to) = locales.not_found_redirect(uri.path()) {
            return Ok(Redirect::temporary(&to).into_response());
        }
    }
    match site.resolver.resolve_home(&locale, draft).await? {
        Resolution::Found(page) => Ok(render(&site, *page, uri.path(), draft).await),
        Resolution::Redirect(to) => Ok(redirect(&to, draft)),
        Resolution::NotFound => Err(not_found(&site, &locale, uri.path(), draft).await),
    }
}

#[tracing::instrument(skip_all, fields(locale = %locale, slug = %slug))]
pub async fn page(
    State(site): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
    Query(params): Query<PageParams>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, HttpError> {
    let draft = draft::from_request(&jar, params.draft.as_deref());
    match site.resolver.resolve(&slug, &locale, draft).await? {
        Resolution::Found(mut page) => {
            if page.locale.is_empty() {
                page.locale = locale;
            }
            Ok(render(&site, *page, uri.path(), draft).await)
        }
        Resolution::Redirect(to) => Ok(redirect(&to, draft)),
        Resolution::NotFound => Err(not_found(&site, &locale, uri.path(), draft).await),
    }
}

/// Paths no route matches: re-rooted under the default locale when the
/// first segment is not a locale, else the 404 page.
pub async fn fallback(State(site): State<AppState>, jar: CookieJar, uri: Uri) -> Response {
    let locales = site.locales.current().await;
    if let Some(to) = locales.not_found_redirect(uri.path()) {
        return Redirect::temporary(&to).into_response();
    }
    let first = uri.path().split('/').find(|s| !s.is_empty()).unwrap_or("");
    let draft = draft::from_request(&jar, None);
    not_found(&site, first, uri.path(), draft).await.into_response()
}
