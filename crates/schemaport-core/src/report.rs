//! Export report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use crate::diagram::DatabaseType;
use crate::feature::{FeatureCategory, UnsupportedFeature};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Counts gathered while exporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    /// Base tables rendered as CREATE TABLE
    pub tables_exported: usize,

    /// Views encountered and skipped
    pub views_skipped: usize,

    /// FOREIGN KEY statements emitted
    pub foreign_keys: usize,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of unsupported features
    pub total: usize,

    /// Feature count per category (only non-zero categories)
    pub by_category: BTreeMap<FeatureCategory, usize>,

    #[serde(flatten)]
    pub stats: ExportStats,
}

/// Export report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (RFC 3339)
    pub timestamp: String,

    /// Source dialect
    pub source: DatabaseType,

    /// Target dialect
    pub target: DatabaseType,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Every degraded feature, in detection order
    pub features: Vec<UnsupportedFeature>,

    /// SHA-256 of the generated DDL, hex encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sha256: Option<String>,
}

impl ExportReport {
    /// Create a report from detected features
    pub fn new(
        source: DatabaseType,
        target: DatabaseType,
        features: Vec<UnsupportedFeature>,
    ) -> Self {
        let mut by_category = BTreeMap::new();
        for feature in &features {
            *by_category.entry(feature.category).or_insert(0) += 1;
        }

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source,
            target,
            summary: ReportSummary {
                total: features.len(),
                by_category,
                stats: ExportStats::default(),
            },
            features,
            output_sha256: None,
        }
    }

    /// Record export statistics
    pub fn with_stats(mut self, stats: ExportStats) -> Self {
        self.summary.stats = stats;
        self
    }

    /// Record the digest of the generated DDL
    pub fn with_output(mut self, ddl: &str) -> Self {
        self.output_sha256 = Some(digest(ddl));
        self
    }

    /// Number of features in a category
    pub fn count(&self, category: FeatureCategory) -> usize {
        self.summary.by_category.get(&category).copied().unwrap_or(0)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

/// Hex-encoded SHA-256 of a DDL script
pub fn digest(ddl: &str) -> String {
    hex::encode(Sha256::digest(ddl.as_bytes()))
}
