// crates/domain/src/lib.rs

pub mod block;
pub mod contact;
pub mod json;
pub mod layout;
pub mod locale;
pub mod media;
pub mod navigation;
pub mod page;
pub mod rich_text;
pub mod setting;
pub mod validate;
pub mod work;
