// crates/domain/src/page.rs

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::layout::Spacing;
use crate::media::Media;
use crate::rich_text::{Inline, RichText, RichTextNode, TextRun};

/// Slug the CMS uses for the landing page of each locale.
pub const HOME_SLUG: &str = "home";

/// A string attribute that may also have been authored as rich text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Rich(RichText),
}

impl TextValue {
    /// The usable text: the trimmed string, or the first paragraph with text.
    pub fn text(&self) -> Option<String> {
        match self {
            TextValue::Plain(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            TextValue::Rich(rt) => rt.first_text(),
        }
    }
}

/// Another locale's version of the same logical page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hide_title: bool,
    /// Anchor target for section links in the header navigation.
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub blocks: Vec<Block>,
    // Simple variant: a text body with an optional side image.
    #[serde(default)]
    pub content: RichText,
    #[serde(default)]
    pub image: Option<Media>,
    #[serde(default)]
    pub reverse: bool,
}

impl Section {
    pub fn visible_title(&self) -> Option<&str> {
        if self.hide_title {
            return None;
        }
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Anchor id: the explicit identifier, else one derived from the title.
    pub fn anchor(&self) -> Option<String> {
        if let Some(id) = self.identifier.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(id.trim().to_string());
        }
        self.title.as_deref().map(slugify).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub document_id: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hide_title: bool,
    #[serde(default)]
    pub hero_content: RichText,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<TextValue>,
    #[serde(default)]
    pub seo_image: Option<Media>,
    #[serde(default)]
    pub no_index: bool,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub localizations: Vec<PageRef>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Page {
    /// Sections ascending by `order`; a missing order counts as 0 and ties
    /// keep their position in the CMS array.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order.unwrap_or(0));
        sections
    }

    /// Stand-in home page shown when the CMS has none for any locale.
    pub fn placeholder_home(locale: &str) -> Page {
        Page {
            slug: HOME_SLUG.to_string(),
            locale: locale.to_string(),
            title: "Bienvenue".to_string(),
            hero_content: RichText(vec![RichTextNode::Paragraph {
                children: vec![Inline::Text(TextRun {
                    text: "Site en construction".to_string(),
                    ..TextRun::default()
                })],
            }]),
            seo_title: Some("Accueil".to_string()),
            ..Page::default()
        }
    }
}

/// Lowercase ASCII slug with dashes; accents are dropped rather than mapped.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dash = false;
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
