// crates/domain/src/layout.rs
//
// Layout enumerations attached to blocks. Editors can leave them empty or the
// CMS schema can drift ahead of the renderer, so every enum parses leniently:
// an unrecognised value falls back to the variant the CMS itself defaults to.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout value: {0}")]
pub struct UnknownVariant(pub String);

fn lenient<T: FromStr + Default>(raw: &Value) -> T {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return T::default(),
    };
    text.trim().parse().unwrap_or_else(|_| {
        tracing::debug!(value = %text, "unrecognised layout value, using default");
        T::default()
    })
}

macro_rules! layout_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = Value::deserialize(d)?;
                Ok(lenient(&raw))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }
    };
}

layout_enum! {
    TextAlignment {
        Left => "left",
        Center => "center",
        Right => "right",
        Justify => "justify",
    } default Left
}

layout_enum! {
    /// Horizontal placement of a whole block inside its section.
    BlockAlignment {
        Left => "left",
        Center => "center",
        Right => "right",
        Full => "full",
    } default Center
}

layout_enum! {
    MaxWidth {
        Small => "small",
        Medium => "medium",
        Large => "large",
        Full => "full",
    } default Medium
}

layout_enum! {
    ButtonAlignment {
        Left => "left",
        Center => "center",
        Right => "right",
        SpaceBetween => "space-between",
    } default Center
}

layout_enum! {
    ButtonVariant {
        Primary => "primary",
        Secondary => "secondary",
        Outline => "outline",
        Ghost => "ghost",
    } default Primary
}

layout_enum! {
    Columns {
        One => "1",
        Two => "2",
        Three => "3",
        Four => "4",
    } default Three
}

impl Columns {
    pub fn count(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

layout_enum! {
    ImageSize {
        Small => "small",
        Medium => "medium",
        Large => "large",
        Full => "full",
    } default Medium
}

layout_enum! {
    ImagePosition {
        Left => "left",
        Right => "right",
    } default Right
}

layout_enum! {
    VerticalAlignment {
        Top => "top",
        Center => "center",
        Bottom => "bottom",
    } default Center
}

layout_enum! {
    HeroHeight {
        Medium => "medium",
        Large => "large",
        Full => "full",
    } default Large
}

layout_enum! {
    /// Arrangement of work and portfolio listings.
    ListingLayout {
        Grid => "grid",
        Masonry => "masonry",
        List => "list",
    } default Grid
}

layout_enum! {
    Spacing {
        None => "none",
        Small => "small",
        Medium => "medium",
        Large => "large",
    } default Medium
}

layout_enum! {
    WorkItemType {
        All => "all",
        Project => "project",
        CaseStudy => "case-study",
        Service => "service",
        Product => "product",
        Article => "article",
        Achievement => "achievement",
        Custom => "custom",
    } default All
}
