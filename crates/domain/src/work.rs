// crates/domain/src/work.rs
//
// Collection entries listed by the work and portfolio blocks.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::layout::WorkItemType;
use crate::media::Media;
use crate::rich_text::RichText;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCategory {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub item_type: WorkItemType,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub image: Option<Media>,
    #[serde(default)]
    pub categories: Vec<WorkCategory>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTheme {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub image: Option<Media>,
    #[serde(default)]
    pub themes: Vec<PortfolioTheme>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub link: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl WorkItem {
    pub fn in_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }
}

impl PortfolioItem {
    pub fn has_theme(&self, slug: &str) -> bool {
        self.themes.iter().any(|t| t.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn work_item_accepts_numeric_year() {
        let item: WorkItem = serde_json::from_value(json!({
            "title": "Atlas",
            "itemType": "case-study",
            "year": 2023,
            "categories": [{ "name": "Web", "slug": "web" }]
        }))
        .expect("work item");
        assert_eq!(item.year.as_deref(), Some("2023"));
        assert_eq!(item.item_type, WorkItemType::CaseStudy);
        assert!(item.in_category("web"));
        assert!(!item.in_category("print"));
    }
}
