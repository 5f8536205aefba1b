//! schemaport engine - deterministic cross-dialect DDL export
//!
//! This crate turns a PostgreSQL diagram into DDL for another dialect:
//! - Field type resolution (rule chain over the static mapping tables)
//! - Default-expression conversion
//! - Unsupported-feature detection and the warnings header
//! - MySQL/MariaDB and SQL Server exporters
//! - Routing between dialect pairs
//!
//! Exporters are pure: they never error and never touch shared state.
//! Dangling references and views are left out of the output.

mod common;
pub mod defaults;
pub mod detector;
pub mod dialect;
pub mod mysql;
pub mod resolve;
pub mod routing;
pub mod sqlserver;

pub use defaults::{convert_default, ConvertedDefault};
pub use detector::{detect_unsupported_features, format_warnings_header};
pub use dialect::{MySqlDialect, SqlDialect, SqlServerDialect};
pub use mysql::export_postgres_to_mysql;
pub use resolve::{is_auto_increment, resolve_field_type, ResolvedType, TypeOrigin};
pub use routing::{export_cross_dialect, get_supported_target_dialects, has_cross_dialect_support};
pub use sqlserver::export_postgres_to_sqlserver;

use schemaport_core::{Diagram, ExportStats};

/// Input to an exporter
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub diagram: &'a Diagram,

    /// Emit only the foreign-key section
    pub only_relationships: bool,
}

impl<'a> ExportRequest<'a> {
    pub fn new(diagram: &'a Diagram) -> Self {
        Self { diagram, only_relationships: false }
    }

    pub fn with_only_relationships(mut self, only_relationships: bool) -> Self {
        self.only_relationships = only_relationships;
        self
    }
}

/// Counts describing what an export of this request emits
pub fn export_stats(request: &ExportRequest<'_>) -> ExportStats {
    let diagram = request.diagram;
    if !common::is_exportable(diagram) {
        return ExportStats::default();
    }

    let views_skipped = diagram.tables().iter().filter(|t| t.is_view).count();
    let tables_exported = if request.only_relationships {
        0
    } else {
        diagram.tables().len() - views_skipped
    };

    ExportStats {
        tables_exported,
        views_skipped,
        foreign_keys: common::plan_foreign_keys(diagram).len(),
    }
}
