// crates/domain/src/block.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::json::strip_nulls;
use crate::layout::{
    BlockAlignment, ButtonAlignment, ButtonVariant, Columns, HeroHeight, ImagePosition,
    ImageSize, ListingLayout, MaxWidth, TextAlignment, VerticalAlignment, WorkItemType,
};
use crate::media::Media;
use crate::rich_text::RichText;
use crate::work::{PortfolioItem, PortfolioTheme, WorkCategory, WorkItem};

// ─────────────────────────────────────────────────────────────────────────────
// Discriminators
// ─────────────────────────────────────────────────────────────────────────────

pub const NAMESPACE: &str = "blocks.";

pub const TEXT: &str = "blocks.text-block";
pub const IMAGE: &str = "blocks.image-block";
pub const BUTTON: &str = "blocks.button-block";
pub const CARDS: &str = "blocks.cards-block";
pub const TEXT_IMAGE: &str = "blocks.text-image-block";
pub const HERO: &str = "blocks.hero-block-simple-text";
pub const CAROUSEL: &str = "blocks.carousel-block";
pub const CONTACT_FORM: &str = "blocks.contact-form-block";
pub const WORK: &str = "blocks.work-block";
pub const PORTFOLIO: &str = "blocks.portfolio-block";
pub const TIMELINE: &str = "blocks.timeline-block";
pub const TRANSLATION: &str = "blocks.translation-block";

/// Registry name derived from a discriminator: the namespace prefix is
/// stripped and the kebab-case remainder becomes capitalised words
/// (`blocks.pricing-table` → `PricingTable`). Components outside the
/// namespace have no registry name.
pub fn registry_name(component: &str) -> Option<String> {
    let bare = component.strip_prefix(NAMESPACE)?;
    let name: String = bare
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared parts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonLink {
    pub label: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub variant: ButtonVariant,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub file: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: RichText,
    #[serde(default)]
    pub image: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselCard {
    pub front_title: String,
    #[serde(default)]
    pub front_content: RichText,
    #[serde(default)]
    pub back_content: RichText,
    #[serde(default)]
    pub image: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    #[serde(default)]
    pub label: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineImage {
    pub image: Media,
    #[serde(default)]
    pub link: Option<ExternalLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<TimelineImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationExample {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source_text: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub source: RichText,
    #[serde(default)]
    pub translation: RichText,
}

// ─────────────────────────────────────────────────────────────────────────────
// Block attributes
// ─────────────────────────────────────────────────────────────────────────────

fn full_alignment() -> BlockAlignment {
    BlockAlignment::Full
}

fn full_width() -> MaxWidth {
    MaxWidth::Full
}

fn centered_text() -> TextAlignment {
    TextAlignment::Center
}

fn yes() -> bool {
    true
}

fn default_limit() -> u32 {
    12
}

fn default_autoplay_delay() -> u32 {
    5000
}

fn default_contact_title() -> String {
    "Contactez-nous".to_string()
}

fn default_submit_text() -> String {
    "Envoyer".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_translation_language() -> String {
    "fr".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub content: RichText,
    #[serde(default)]
    pub text_alignment: TextAlignment,
    #[serde(default = "full_alignment")]
    pub block_alignment: BlockAlignment,
    #[serde(default = "full_width")]
    pub max_width: MaxWidth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub image: Media,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub alignment: BlockAlignment,
    #[serde(default)]
    pub size: ImageSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonBlock {
    pub buttons: Vec<ButtonLink>,
    #[serde(default)]
    pub alignment: ButtonAlignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub alignment: BlockAlignment,
    #[serde(default)]
    pub block_alignment: BlockAlignment,
    #[serde(default)]
    pub max_width: MaxWidth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextImageBlock {
    pub content: RichText,
    pub image: Media,
    #[serde(default)]
    pub image_position: ImagePosition,
    #[serde(default)]
    pub image_size: ImageSize,
    #[serde(default)]
    pub rounded_image: bool,
    #[serde(default)]
    pub text_alignment: TextAlignment,
    #[serde(default)]
    pub vertical_alignment: VerticalAlignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroBlock {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub height: HeroHeight,
    #[serde(default = "centered_text")]
    pub text_alignment: TextAlignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselBlock {
    pub cards: Vec<CarouselCard>,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default = "default_autoplay_delay")]
    pub autoplay_delay: u32,
    #[serde(default = "yes")]
    pub show_controls: bool,
    #[serde(default = "yes")]
    pub show_indicators: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormBlock {
    #[serde(default = "default_contact_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_submit_text")]
    pub submit_button_text: String,
    #[serde(default)]
    pub block_alignment: BlockAlignment,
    #[serde(default)]
    pub max_width: MaxWidth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub filter_by_categories: Vec<WorkCategory>,
    #[serde(default)]
    pub filter_by_item_type: WorkItemType,
    #[serde(default)]
    pub layout: ListingLayout,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "yes")]
    pub show_all_categories: bool,
    #[serde(default)]
    pub show_featured_only: bool,
    #[serde(default = "yes")]
    pub show_filters: bool,
    /// Filled in by listing hydration before rendering.
    #[serde(skip)]
    pub items: Vec<WorkItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub filter_by_themes: Vec<PortfolioTheme>,
    #[serde(default = "yes")]
    pub show_all_themes: bool,
    #[serde(default)]
    pub show_featured_only: bool,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "yes")]
    pub show_filters: bool,
    #[serde(default)]
    pub layout: ListingLayout,
    /// Filled in by listing hydration before rendering.
    #[serde(skip)]
    pub items: Vec<PortfolioItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub source: RichText,
    #[serde(default)]
    pub translation: RichText,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_translation_language")]
    pub translation_language: String,
    #[serde(default = "yes")]
    pub show_language_label: bool,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source_text: Option<String>,
    #[serde(default)]
    pub examples: Vec<TranslationExample>,
}

impl TranslationBlock {
    /// The base pair followed by every extra example, as one list.
    ///
    /// A base pair with no text on either side is omitted.
    pub fn all_examples(&self) -> Vec<TranslationExample> {
        let mut out = Vec::with_capacity(self.examples.len() + 1);
        if !self.source.is_empty() || !self.translation.is_empty() {
            out.push(TranslationExample {
                title: self.title.clone(),
                author: self.author.clone(),
                source_text: self.source_text.clone(),
                theme: None,
                source_language: Some(self.source_language.clone()),
                description: self.description.clone(),
                source: self.source.clone(),
                translation: self.translation.clone(),
            });
        }
        out.extend(self.examples.iter().cloned());
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block
// ─────────────────────────────────────────────────────────────────────────────

/// One content block of a section, discriminated by `__component`.
///
/// Parsing never fails: a discriminator with no typed variant becomes
/// `Unknown`, and a known discriminator whose attributes do not validate
/// becomes `Malformed`. Both keep the raw attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    Button(ButtonBlock),
    Cards(CardsBlock),
    TextImage(TextImageBlock),
    Hero(HeroBlock),
    Carousel(CarouselBlock),
    ContactForm(ContactFormBlock),
    Work(WorkBlock),
    Portfolio(PortfolioBlock),
    Timeline(TimelineBlock),
    Translation(TranslationBlock),
    Unknown {
        component: String,
        attributes: Value,
    },
    Malformed {
        component: String,
        reason: String,
        attributes: Value,
    },
}

fn typed<T, F>(component: &str, attributes: Value, wrap: F) -> Block
where
    T: for<'de> Deserialize<'de>,
    F: FnOnce(T) -> Block,
{
    match serde_json::from_value::<T>(attributes.clone()) {
        Ok(inner) => wrap(inner),
        Err(e) => Block::Malformed {
            component: component.to_string(),
            reason: e.to_string(),
            attributes,
        },
    }
}

impl Block {
    pub fn from_json(mut attributes: Value) -> Block {
        strip_nulls(&mut attributes);
        let component = attributes
            .get("__component")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match component.as_str() {
            TEXT => typed(&component, attributes, Block::Text),
            IMAGE => typed(&component, attributes, Block::Image),
            BUTTON => typed(&component, attributes, Block::Button),
            CARDS => typed(&component, attributes, Block::Cards),
            TEXT_IMAGE => typed(&component, attributes, Block::TextImage),
            HERO => typed(&component, attributes, Block::Hero),
            CAROUSEL => typed(&component, attributes, Block::Carousel),
            CONTACT_FORM => typed(&component, attributes, Block::ContactForm),
            WORK => typed(&component, attributes, Block::Work),
            PORTFOLIO => typed(&component, attributes, Block::Portfolio),
            TIMELINE => typed(&component, attributes, Block::Timeline),
            TRANSLATION => typed(&component, attributes, Block::Translation),
            _ => Block::Unknown {
                component,
                attributes,
            },
        }
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Block::from_json(Value::deserialize(d)?))
    }
}
