//! Unsupported-feature records
//!
//! IMPORTANT: Category identifiers are serialized into export reports.
//! NEVER rename or remove a category - add new ones only.

use serde::{Deserialize, Serialize};

/// Kind of feature that could not be carried over 1:1
///
/// Declaration order is the order used when rendering the warnings header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// User-defined enum or composite types
    CustomTypes,

    /// PostgreSQL array columns
    Arrays,

    /// Column types without a faithful target equivalent
    TypeConversions,

    /// Index access methods the target does not offer
    IndexChanges,

    /// Default expressions that had to be rewritten lossily
    Defaults,

    /// CHECK constraints copied with source-only syntax
    Constraints,

    /// Schema/namespace semantics that differ on the target
    Schema,
}

impl FeatureCategory {
    /// Every category, in header order
    pub const ALL: [FeatureCategory; 7] = [
        Self::CustomTypes,
        Self::Arrays,
        Self::TypeConversions,
        Self::IndexChanges,
        Self::Defaults,
        Self::Constraints,
        Self::Schema,
    ];

    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomTypes => "custom_types",
            Self::Arrays => "arrays",
            Self::TypeConversions => "type_conversions",
            Self::IndexChanges => "index_changes",
            Self::Defaults => "defaults",
            Self::Constraints => "constraints",
            Self::Schema => "schema",
        }
    }

    /// Section title used in the warnings header
    pub fn title(&self) -> &'static str {
        match self {
            Self::CustomTypes => "Custom Types",
            Self::Arrays => "Array Columns",
            Self::TypeConversions => "Type Conversions",
            Self::IndexChanges => "Index Changes",
            Self::Defaults => "Default Values",
            Self::Constraints => "Constraints",
            Self::Schema => "Schemas",
        }
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FeatureCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown feature category '{}'", s))
    }
}

/// A single feature occurrence that degrades during export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedFeature {
    /// Category tag
    #[serde(rename = "type")]
    pub category: FeatureCategory,

    /// Owning table, when the feature lives inside one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Column, index, constraint, type or schema name
    pub object_name: String,

    /// What changes on the target
    pub feature: String,

    /// What the user can do about it
    pub recommendation: String,
}

impl UnsupportedFeature {
    /// Create a feature that is not attached to a table
    pub fn new(
        category: FeatureCategory,
        object_name: impl Into<String>,
        feature: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            table_name: None,
            object_name: object_name.into(),
            feature: feature.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Attach the owning table
    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// `table.object`, or just `object` for free-standing features
    pub fn location(&self) -> String {
        match &self.table_name {
            Some(table) => format!("{}.{}", table, self.object_name),
            None => self.object_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_identifiers_are_stable() {
        assert_eq!(FeatureCategory::CustomTypes.as_str(), "custom_types");
        assert_eq!(FeatureCategory::IndexChanges.as_str(), "index_changes");
        assert_eq!("defaults".parse::<FeatureCategory>().unwrap(), FeatureCategory::Defaults);
        assert!("bogus".parse::<FeatureCategory>().is_err());
    }

    #[test]
    fn category_order_follows_header_order() {
        let mut shuffled = vec![
            FeatureCategory::Schema,
            FeatureCategory::Arrays,
            FeatureCategory::CustomTypes,
            FeatureCategory::Defaults,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                FeatureCategory::CustomTypes,
                FeatureCategory::Arrays,
                FeatureCategory::Defaults,
                FeatureCategory::Schema,
            ]
        );
    }

    #[test]
    fn feature_location_and_serialization() {
        let feature = UnsupportedFeature::new(
            FeatureCategory::Arrays,
            "tags",
            "Array column stored as JSON",
            "Use a junction table",
        )
        .with_table("posts");

        assert_eq!(feature.location(), "posts.tags");

        let json = serde_json::to_string(&feature).unwrap();
        assert!(json.contains("\"type\":\"arrays\""));
        assert!(json.contains("\"table_name\":\"posts\""));
    }
}
