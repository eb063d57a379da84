// crates/domain/src/rich_text.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// Block-level rich-text node as stored by the CMS blocks editor.
///
/// Anything the renderer does not understand (images, code, future node
/// types, or a known type with a broken shape) becomes `Unsupported` and
/// renders as nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RichTextNode {
    Paragraph {
        #[serde(default, deserialize_with = "lenient_inlines")]
        children: Vec<Inline>,
    },
    Heading {
        #[serde(default = "default_level")]
        level: u8,
        #[serde(default, deserialize_with = "lenient_inlines")]
        children: Vec<Inline>,
    },
    List {
        #[serde(default)]
        format: ListFormat,
        #[serde(default, deserialize_with = "lenient_nodes")]
        children: Vec<RichTextNode>,
    },
    ListItem {
        #[serde(default, deserialize_with = "lenient_inlines")]
        children: Vec<Inline>,
    },
    Quote {
        #[serde(default, deserialize_with = "lenient_inlines")]
        children: Vec<Inline>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inline {
    Text(TextRun),
    Link {
        #[serde(default)]
        url: String,
        #[serde(default, deserialize_with = "lenient_inlines")]
        children: Vec<Inline>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub code: bool,
}

fn default_level() -> u8 {
    2
}

fn lenient_nodes<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RichTextNode>, D::Error> {
    Ok(parse_nodes(Value::deserialize(d)?))
}

fn lenient_inlines<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Inline>, D::Error> {
    let raw = Value::deserialize(d)?;
    let items = match raw {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or(Inline::Unsupported))
        .collect())
}

fn parse_nodes(raw: Value) -> Vec<RichTextNode> {
    match raw {
        Value::Array(items) => items
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap_or(RichTextNode::Unsupported))
            .collect(),
        // Plain text attributes that were later switched to the blocks editor.
        Value::String(s) if !s.trim().is_empty() => vec![RichTextNode::Paragraph {
            children: vec![Inline::Text(TextRun {
                text: s,
                ..TextRun::default()
            })],
        }],
        _ => Vec::new(),
    }
}

impl Inline {
    pub fn text_content(&self) -> String {
        match self {
            Inline::Text(run) => run.text.clone(),
            Inline::Link { children, .. } => children.iter().map(Inline::text_content).collect(),
            Inline::Unsupported => String::new(),
        }
    }
}

impl RichTextNode {
    pub fn text_content(&self) -> String {
        match self {
            RichTextNode::Paragraph { children }
            | RichTextNode::Heading { children, .. }
            | RichTextNode::ListItem { children }
            | RichTextNode::Quote { children } => {
                children.iter().map(Inline::text_content).collect()
            }
            RichTextNode::List { children, .. } => children
                .iter()
                .map(RichTextNode::text_content)
                .collect::<Vec<_>>()
                .join("\n"),
            RichTextNode::Unsupported => String::new(),
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, RichTextNode::Paragraph { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered sequence of block-level nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextNode>);

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(RichText(parse_nodes(Value::deserialize(d)?)))
    }
}

impl RichText {
    pub fn nodes(&self) -> &[RichTextNode] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|n| n.text_content().trim().is_empty())
    }

    /// All text, one line per block node.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .map(RichTextNode::text_content)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the first paragraph that carries any.
    pub fn first_text(&self) -> Option<String> {
        self.0
            .iter()
            .filter(|n| n.is_paragraph())
            .map(RichTextNode::text_content)
            .find(|t| !t.trim().is_empty())
    }

    /// Paragraphs that contain non-blank text, in order.
    pub fn non_empty_paragraphs(&self) -> Vec<&RichTextNode> {
        self.0
            .iter()
            .filter(|n| n.is_paragraph() && !n.text_content().trim().is_empty())
            .collect()
    }
}
