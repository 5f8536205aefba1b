//! Configuration schema (schemaport.toml)

use serde::{Deserialize, Serialize};
use crate::diagram::DatabaseType;
use crate::feature::{FeatureCategory, UnsupportedFeature};

/// Rules for features the user has already reviewed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    /// Acknowledged feature locations (`table.object` glob patterns)
    #[serde(default)]
    pub acknowledged: Vec<String>,

    /// Categories that never count as unacknowledged
    #[serde(default)]
    pub ignore_categories: Vec<FeatureCategory>,
}

impl AllowlistRules {
    /// Check if a location matches any pattern in the list
    fn matches_pattern(location: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, location)
            } else {
                pattern == location
            }
        })
    }

    /// Check if a feature was reviewed, either by location or by category
    pub fn is_acknowledged(&self, feature: &UnsupportedFeature) -> bool {
        self.ignore_categories.contains(&feature.category)
            || Self::matches_pattern(&feature.location(), &self.acknowledged)
    }

    /// Features that are neither acknowledged nor in an ignored category
    pub fn unacknowledged<'a>(
        &self,
        features: &'a [UnsupportedFeature],
    ) -> Vec<&'a UnsupportedFeature> {
        features.iter().filter(|f| !self.is_acknowledged(f)).collect()
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default export target
    #[serde(default = "default_target")]
    pub target: DatabaseType,

    /// Emit only foreign-key statements
    #[serde(default)]
    pub only_relationships: bool,

    /// Fail `check` when unacknowledged features remain
    #[serde(default)]
    pub strict: bool,

    /// Allowlist rules
    #[serde(default)]
    pub allowlist: AllowlistRules,
}

fn default_target() -> DatabaseType {
    DatabaseType::Mysql
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            only_relationships: false,
            strict: false,
            allowlist: AllowlistRules::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Glob matching where `*` matches any run of characters
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, last) = (parts[0], parts[parts.len() - 1]);

    if !text.starts_with(first) || text.len() < first.len() + last.len() || !text.ends_with(last) {
        return false;
    }

    let mut rest = &text[first.len()..text.len() - last.len()];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(pos) => rest = &rest[pos + middle.len()..],
            None => return false,
        }
    }

    true
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
