// crates/serve/src/lib.rs

pub mod cache;
pub mod client;
pub mod listing;
pub mod locale;
pub mod metadata;
pub mod navigation;
pub mod preview;
pub mod query;
pub mod render;
pub mod resolver;

use http::StatusCode;
use thiserror::Error;

use crate::render::error::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// Status a caller should answer with. Upstream trouble is never the
    /// visitor's fault, so everything but a bad URL is a 500.
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
