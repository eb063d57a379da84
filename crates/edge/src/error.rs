use adapt::{Error as AdaptError, MailError};
use serve::render::error::RenderError;
use serve::Error as ServeError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("adapt error: {0}")]
    Adapt(#[from] AdaptError),

    #[error("serve error: {0}")]
    Serve(#[from] ServeError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("template error: {0}")]
    Render(#[from] RenderError),

    #[error("server stopped: {0}")]
    Server(String),
}
