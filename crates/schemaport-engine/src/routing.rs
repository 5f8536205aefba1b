//! Deterministic exporter routing
//!
//! A static adjacency table lists the (source, target) pairs that have a
//! rule-based exporter. Anything else is left to the caller's fallback path.

use crate::{mysql, sqlserver, ExportRequest};
use schemaport_core::DatabaseType;

const SUPPORTED: &[(DatabaseType, &[DatabaseType])] = &[(
    DatabaseType::Postgresql,
    &[DatabaseType::Mysql, DatabaseType::Mariadb, DatabaseType::Sqlserver],
)];

/// Whether a deterministic exporter exists for the pair
pub fn has_cross_dialect_support(source: DatabaseType, target: DatabaseType) -> bool {
    source != target && get_supported_target_dialects(source).contains(&target)
}

/// Targets reachable from `source`, in table order
pub fn get_supported_target_dialects(source: DatabaseType) -> Vec<DatabaseType> {
    SUPPORTED
        .iter()
        .find(|(from, _)| *from == source)
        .map(|(_, targets)| targets.to_vec())
        .unwrap_or_default()
}

/// Run the exporter for the diagram's dialect and `target`
///
/// Returns `None` when the pair is not routed; MariaDB goes through the
/// MySQL exporter.
pub fn export_cross_dialect(request: &ExportRequest<'_>, target: DatabaseType) -> Option<String> {
    let source = request.diagram.database_type;
    if !has_cross_dialect_support(source, target) {
        tracing::debug!(source = %source, target = %target, "no deterministic exporter");
        return None;
    }

    let ddl = match target {
        DatabaseType::Mysql | DatabaseType::Mariadb => mysql::export_for_target(request, target),
        DatabaseType::Sqlserver => sqlserver::export_postgres_to_sqlserver(request),
        _ => return None,
    };
    Some(ddl)
}
