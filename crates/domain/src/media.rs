// crates/domain/src/media.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An uploaded asset. Blocks only ever reference media; the URL the CMS hands
/// back may be relative to its own origin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub id: Option<u64>,
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub formats: BTreeMap<String, MediaFormat>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaFormat {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Media {
    /// Alt text, or an empty string for decorative images.
    pub fn alt(&self) -> &str {
        self.alternative_text.as_deref().unwrap_or("")
    }

    /// Absolute URL of the original asset.
    pub fn absolute_url(&self, origin: &str) -> String {
        resolve_media_url(&self.url, origin)
    }

    /// Absolute URL of a named derivative (`small`, `medium`, ...), falling
    /// back to the original.
    pub fn format_url(&self, format: &str, origin: &str) -> String {
        match self.formats.get(format) {
            Some(f) => resolve_media_url(&f.url, origin),
            None => self.absolute_url(origin),
        }
    }
}

/// Resolve a CMS media URL against the CMS origin.
///
/// Absolute (`http(s)://`) and protocol-relative URLs are returned untouched.
pub fn resolve_media_url(url: &str, origin: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        return url.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}
