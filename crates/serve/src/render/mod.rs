pub mod blocks;
pub mod error;
pub mod html;
pub mod layout;
pub mod page;
pub mod registry;
pub mod rich_text;
pub mod template;
pub mod translation;

pub use html::RenderCtx;
pub use layout::{document, Shell};
pub use page::render_page;
pub use registry::{BlockRenderer, ComponentRegistry, Diagnostic, RenderOutput};
pub use template::{HbsEngine, TemplateEngine};
