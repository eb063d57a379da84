// crates/adapt/src/lib.rs

pub mod http;
pub mod mail;

use thiserror::Error;

pub use crate::http::{build_app, HttpError, Site};
pub use crate::mail::{HttpMailer, MailError, Mailer};

#[derive(Debug, Error)]
pub enum Error {
    #[error("serve error: {0}")]
    Serve(#[from] serve::Error),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("render error: {0}")]
    Render(#[from] serve::render::error::RenderError),
}
