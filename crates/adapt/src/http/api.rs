// crates/adapt/src/http/api.rs

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use domain::contact::{ContactError, ContactSubmission};
use axum_extra::extract::cookie::CookieJar;
use http::header::{CACHE_CONTROL, LOCATION};
use http::{HeaderValue, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use serve::preview::{plan_redirect, PreviewPlan, PreviewRequest};
use tracing::{info, warn};

use crate::http::app::AppState;
use crate::http::draft;
use crate::http::error::HttpError;
use crate::mail::{auto_reply, notification};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    pub secret: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn preview(
    State(site): State<AppState>,
    Query(params): Query<PreviewParams>,
    jar: CookieJar,
) -> Result<Response, HttpError> {
    let req = PreviewRequest {
        secret: params.secret.as_deref(),
        url: params.url.as_deref(),
        status: params.status.as_deref(),
    };
    match plan_redirect(&req, site.preview_secret.as_ref(), site.use_draft_mode) {
        PreviewPlan::Unauthorized => {
            warn!("preview request with a bad secret");
            Err(HttpError::Unauthorized)
        }
        PreviewPlan::Redirect {
            location,
            enable_draft_mode,
        } => {
            let location = HeaderValue::from_str(&location)
                .map_err(|_| HttpError::BadRequest("invalid preview url".into()))?;
            let jar = if enable_draft_mode {
                draft::enable(jar, site.production)
            } else {
                jar
            };
            Ok((StatusCode::FOUND, jar, [(LOCATION, location)]).into_response())
        }
    }
}

pub async fn preview_disable(jar: CookieJar) -> (CookieJar, Redirect) {
    (draft::disable(jar), Redirect::temporary("/"))
}

pub async fn locales(State(site): State<AppState>) -> Response {
    let set = site.locales.current().await;
    (
        [(
            CACHE_CONTROL,
            "public, max-age=60, stale-while-revalidate=3600",
        )],
        Json(json!({ "locales": set.locales, "defaultLocale": set.default_locale })),
    )
        .into_response()
}

/// The notification must go out; the auto-reply is best effort.
#[tracing::instrument(skip_all)]
pub async fn contact(State(site): State<AppState>, body: Bytes) -> Result<Json<Value>, HttpError> {
    let body: Value =
        serde_json::from_slice(&body).map_err(|_| HttpError::Validation(ContactError::MissingFields))?;
    let submission = ContactSubmission::from_json(&body)?;

    let id = site
        .mailer
        .send(notification(&site.addresses, &submission, chrono::Utc::now()))
        .await?;
    if let Err(e) = site.mailer.send(auto_reply(&site.addresses, &submission)).await {
        warn!(error = %e, "auto-reply not sent");
    }
    info!("contact message delivered");
    Ok(Json(json!({ "message": "Message envoyé avec succès !", "id": id })))
}

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateParams {
    pub secret: Option<String>,
    pub tag: Option<String>,
}

/// Closed unless a revalidation secret is configured.
#[tracing::instrument(skip_all)]
pub async fn revalidate(
    State(site): State<AppState>,
    Query(params): Query<RevalidateParams>,
) -> Result<Json<Value>, HttpError> {
    let authorized = match (&site.revalidate_secret, params.secret.as_deref()) {
        (Some(expected), Some(given)) => expected.expose_secret() == given,
        _ => false,
    };
    if !authorized {
        return Err(HttpError::Unauthorized);
    }
    let tag = params.tag.as_deref().filter(|t| !t.is_empty());
    if !site.caches.invalidate(tag) {
        return Err(HttpError::BadRequest(format!(
            "unknown tag: {}",
            tag.unwrap_or_default()
        )));
    }
    if tag.is_none() {
        site.locales.forget();
    }
    Ok(Json(json!({
        "revalidated": true,
        "tag": tag,
        "now": chrono::Utc::now().timestamp_millis(),
    })))
}
