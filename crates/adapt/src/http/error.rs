// crates/adapt/src/http/error.rs

use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use domain::contact::ContactError;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::mail::MailError;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Carries the rendered localized 404 document.
    #[error("page not found ({locale})")]
    NotFound { locale: String, page: String },

    #[error("invalid submission: {0}")]
    Validation(#[from] ContactError),

    #[error("upstream error: {0}")]
    Upstream(#[from] serve::Error),

    #[error("invalid token")]
    Unauthorized,

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl HttpError {
    pub fn to_status(&self) -> StatusCode {
        match self {
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::Validation(_) | HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Upstream(e) => e.to_status(),
            HttpError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

const UPSTREAM_PAGE: &str = r#"<!DOCTYPE html><html lang="fr"><head><meta charset="utf-8"><title>Erreur</title><meta name="robots" content="noindex"></head><body><main><h1>Une erreur est survenue</h1><p>Le contenu est momentanément indisponible. Merci de réessayer plus tard.</p></main></body></html>"#;

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        match self {
            HttpError::NotFound { page, .. } => (status, Html(page)).into_response(),
            HttpError::Validation(e) => {
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
            HttpError::BadRequest(msg) => (status, Json(json!({ "error": msg }))).into_response(),
            HttpError::Unauthorized => (status, "Invalid token").into_response(),
            HttpError::Upstream(e) => {
                error!(error = %e, "upstream failure");
                (status, Html(UPSTREAM_PAGE)).into_response()
            }
            HttpError::Mail(e) => {
                error!(error = %e, "contact notification failed");
                (
                    status,
                    Json(json!({ "error": "Erreur lors de l'envoi du message." })),
                )
                    .into_response()
            }
        }
    }
}
