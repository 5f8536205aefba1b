//! schemaport core
//!
//! Read-only diagram model plus the stable types shared by the export
//! engine and its front ends. Never rename feature categories - they are
//! part of the report format.

pub mod diagram;
pub mod feature;
pub mod report;
pub mod config;

pub use diagram::{
    Cardinality, CharLength, CustomTypeField, CustomTypeKind, DBCheckConstraint, DBCustomType,
    DBField, DBIndex, DBRelationship, DBTable, DataType, DatabaseType, Diagram, DiagramError,
};
pub use feature::{FeatureCategory, UnsupportedFeature};
pub use report::{ExportReport, ExportStats, ReportSummary, ReportVersion};
pub use config::{Config, AllowlistRules, ConfigError};
