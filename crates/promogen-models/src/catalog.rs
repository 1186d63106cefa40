//! Content categories and the fixed template catalog.
//!
//! The batch run walks this catalog in declaration order: categories in
//! [`Category::ALL`] order, templates in index order within a category.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Content style bucket with its own template set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    /// Product-only lifestyle footage
    #[serde(rename = "B-Roll")]
    BRoll,
    /// User-generated-content style shots with a human model
    #[serde(rename = "UGC")]
    Ugc,
}

impl Category {
    /// Catalog order.
    pub const ALL: &'static [Category] = &[Category::BRoll, Category::Ugc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BRoll => "B-Roll",
            Category::Ugc => "UGC",
        }
    }

    /// Whether images in this category feature a human subject.
    pub fn requires_human_subject(&self) -> bool {
        matches!(self, Category::Ugc)
    }

    /// Templates for this category, in slot index order.
    pub fn templates(&self) -> &'static [PromptTemplate] {
        match self {
            Category::BRoll => BROLL_TEMPLATES,
            Category::Ugc => UGC_TEMPLATES,
        }
    }

    /// Template for a slot index, if the index exists in this category.
    pub fn template(&self, index: usize) -> Option<&'static PromptTemplate> {
        self.templates().get(index)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "b-roll" | "broll" | "b_roll" => Ok(Category::BRoll),
            "ugc" => Ok(Category::Ugc),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown category: {0}")]
pub struct CategoryParseError(String);

/// A content intent: short title plus the concept description fed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PromptTemplate {
    pub title: &'static str,
    pub text: &'static str,
}

const BROLL_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        title: "Hero Product Shot",
        text: "The product centered on a clean pedestal, soft studio key light, subtle reflections, shallow depth of field",
    },
    PromptTemplate {
        title: "Lifestyle Flat Lay",
        text: "Top-down flat lay of the product arranged with complementary everyday props on a textured surface, natural window light",
    },
    PromptTemplate {
        title: "Detail Macro",
        text: "Extreme close-up of the product's material, texture and finishing details, crisp focus with creamy bokeh",
    },
    PromptTemplate {
        title: "In Context",
        text: "The product placed naturally in the environment where it is used, warm ambient light, cinematic composition",
    },
];

const UGC_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        title: "Selfie Review",
        text: "The model holds the product up to the camera in a casual selfie angle, genuine smile, home interior background",
    },
    PromptTemplate {
        title: "Unboxing Moment",
        text: "The model opening the product packaging with an excited expression, hands and product clearly visible",
    },
    PromptTemplate {
        title: "Daily Use",
        text: "The model using the product during an everyday routine, candid documentary framing, natural light",
    },
    PromptTemplate {
        title: "Recommendation",
        text: "The model pointing at the product while talking to the camera as if recommending it to a friend",
    },
];

/// Optional narrative focus for UGC scenario text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioFocus {
    Hook,
    Problem,
    Solution,
    Cta,
}

impl ScenarioFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioFocus::Hook => "Hook",
            ScenarioFocus::Problem => "Problem",
            ScenarioFocus::Solution => "Solution",
            ScenarioFocus::Cta => "CTA",
        }
    }

    /// Writing instruction for this focus.
    pub fn instruction(&self) -> &'static str {
        match self {
            ScenarioFocus::Hook => {
                "Write an opening line (HOOK) that grabs attention within the first 3 seconds."
            }
            ScenarioFocus::Problem => {
                "Focus on the PROBLEM (pain point) the audience often experiences."
            }
            ScenarioFocus::Solution => "Focus on the SOLUTION and the main benefits of the product.",
            ScenarioFocus::Cta => "Focus on the CALL TO ACTION.",
        }
    }
}

/// Dialogue languages offered to the user.
pub const LANGUAGES: &[&str] = &[
    "Indonesian",
    "English",
    "Javanese",
    "Sundanese",
    "Malay",
];

/// Camera-angle transformations offered for slot edits.
pub const CAMERA_ANGLES: &[&str] = &[
    "Close-up shot",
    "Low angle shot",
    "High angle shot",
    "Side profile",
    "Top-down view",
    "Wide establishing shot",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(Category::ALL, &[Category::BRoll, Category::Ugc]);
        for category in Category::ALL {
            assert_eq!(category.templates().len(), 4);
        }
        assert!(Category::Ugc.template(3).is_some());
        assert!(Category::BRoll.template(4).is_none());
    }

    #[test]
    fn test_category_parse_and_order() {
        assert_eq!("B-Roll".parse::<Category>().unwrap(), Category::BRoll);
        assert_eq!("ugc".parse::<Category>().unwrap(), Category::Ugc);
        assert!("portrait".parse::<Category>().is_err());
        assert!(Category::BRoll < Category::Ugc);
    }

    #[test]
    fn test_only_ugc_requires_subject() {
        assert!(Category::Ugc.requires_human_subject());
        assert!(!Category::BRoll.requires_human_subject());
    }
}
