pub mod api;
pub mod app;
pub mod draft;
pub mod error;
pub mod middleware;
pub mod pages;

pub use app::{build_app, AppState, Site};
pub use error::HttpError;
pub use middleware::{SecurityHeadersLayer, SecurityPolicy};
