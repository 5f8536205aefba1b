//! PostgreSQL → SQL Server exporter
//!
//! Output is split into `sqlcmd` batches: schema creation, one batch per
//! table with its indexes, the extended-property batch for comments, and
//! the foreign-key batch.

use crate::common::{
    base_tables, check_lines, column_type, distinct_schemas, is_exportable, plan_foreign_keys,
    plan_indexes, primary_key_line, render_body, BodyLine, IndexPlan,
};
use crate::defaults::convert_default;
use crate::detector::{detect_unsupported_features, format_warnings_header};
use crate::dialect::{SqlDialect, SqlServerDialect};
use crate::resolve::{is_auto_increment, resolve_field_type, ResolvedType};
use crate::ExportRequest;
use schemaport_core::{DBField, DBTable, DatabaseType, Diagram};
use std::collections::BTreeMap;

const DEFAULT_SCHEMA: &str = "dbo";

/// Export a PostgreSQL diagram as SQL Server DDL
pub fn export_postgres_to_sqlserver(request: &ExportRequest<'_>) -> String {
    let diagram = request.diagram;
    if !is_exportable(diagram) {
        return String::new();
    }

    let dialect = SqlServerDialect;
    let features = detect_unsupported_features(diagram, DatabaseType::Sqlserver);
    let mut out = format_warnings_header(
        &features,
        DatabaseType::Postgresql.label(),
        DatabaseType::Sqlserver.label(),
    );

    if !request.only_relationships {
        let schemas = distinct_schemas(diagram);
        if !schemas.is_empty() {
            out.push('\n');
            for schema in schemas {
                let create = format!("CREATE SCHEMA {}", dialect.quote_ident(schema));
                out.push_str(&format!(
                    "IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = {})\n    EXEC({});\n",
                    dialect.string_literal(schema),
                    dialect.string_literal(&create),
                ));
            }
            end_batch(&mut out, &dialect);
        }

        let mut descriptions = Vec::new();
        for table in base_tables(diagram) {
            out.push('\n');
            out.push_str(&render_table(table, diagram, &dialect));
            end_batch(&mut out, &dialect);
            descriptions.extend(describe_table(table, &dialect));
        }

        if !descriptions.is_empty() {
            out.push_str("\n-- Table and column descriptions\n");
            for statement in descriptions {
                out.push_str(&statement);
                out.push('\n');
            }
            end_batch(&mut out, &dialect);
        }
    }

    let mut by_schema: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for fk in plan_foreign_keys(diagram) {
        by_schema
            .entry(fk.table.schema_name().unwrap_or(DEFAULT_SCHEMA))
            .or_default()
            .push(fk.render(&dialect));
    }

    if !by_schema.is_empty() {
        out.push_str("\n-- Foreign key constraints\n");
        for statement in by_schema.into_values().flatten() {
            out.push_str(&statement);
            out.push('\n');
        }
        end_batch(&mut out, &dialect);
    }

    out
}

fn end_batch(out: &mut String, dialect: &dyn SqlDialect) {
    if let Some(separator) = dialect.batch_separator() {
        out.push_str(separator);
        out.push('\n');
    }
}

fn render_table(table: &DBTable, diagram: &Diagram, dialect: &SqlServerDialect) -> String {
    let qualified = dialect.qualify(table.schema_name(), &table.name);

    let mut lines: Vec<BodyLine> = table
        .fields
        .iter()
        .map(|field| {
            let resolved = resolve_field_type(field, diagram, dialect.target());
            BodyLine::new(render_column(field, &resolved, dialect))
                .with_comment(resolved.inline_comment())
        })
        .collect();
    lines.extend(primary_key_line(table, diagram, dialect));
    lines.extend(check_lines(table));

    let mut out = format!("CREATE TABLE {} (\n", qualified);
    out.push_str(&render_body(&lines));
    out.push_str(");\n");

    let mut indexes: Vec<String> = plan_indexes(table, diagram, dialect)
        .iter()
        .map(|plan| render_index(plan, table, &qualified, dialect))
        .collect();
    indexes.sort();

    for statement in indexes {
        out.push_str(&statement);
        out.push('\n');
    }

    out
}

/// Columns that cannot be keys move to `INCLUDE`; an index left without
/// any key column is replaced by a comment
fn render_index(
    plan: &IndexPlan<'_>,
    table: &DBTable,
    qualified: &str,
    dialect: &SqlServerDialect,
) -> String {
    let name = dialect.quote_ident(&plan.name(table));
    let rejected: Vec<String> =
        plan.rejected.iter().map(|c| dialect.quote_ident(&c.field.name)).collect();

    if !plan.is_emitted() {
        return format!(
            "-- Index {} skipped: {} cannot be an index key on SQL Server",
            name,
            rejected.join(", ")
        );
    }

    let mut statement = format!(
        "CREATE {}{} INDEX {} ON {} ({})",
        if plan.index.unique { "UNIQUE " } else { "" },
        plan.mapping.target_type,
        name,
        qualified,
        plan.render_keys(table, dialect),
    );
    if !rejected.is_empty() {
        statement.push_str(&format!(" INCLUDE ({})", rejected.join(", ")));
    }
    statement.push(';');
    if let Some(note) = plan.mapping.note {
        statement.push_str(&format!(" -- {}", note));
    }
    statement
}

fn render_column(
    field: &DBField,
    resolved: &ResolvedType<'_>,
    dialect: &SqlServerDialect,
) -> String {
    let name = dialect.quote_ident(&field.name);
    let mut sql = format!("{} {}", name, column_type(field, resolved, dialect));

    let identity = is_auto_increment(field);
    if identity {
        sql.push_str(" IDENTITY(1,1)");
    }

    if !field.nullable || field.primary_key || identity {
        sql.push_str(" NOT NULL");
    } else {
        sql.push_str(" NULL");
    }

    if field.unique && !field.primary_key {
        sql.push_str(" UNIQUE");
    }

    // IDENTITY columns cannot carry a default
    if !identity {
        let default = field.default.as_deref().and_then(|raw| convert_default(raw, dialect).sql);
        if let Some(default) = default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default);
        }
    }

    sql
}

/// `sp_addextendedproperty` calls for the table comment and column comments
fn describe_table(table: &DBTable, dialect: &SqlServerDialect) -> Vec<String> {
    let schema = table.schema_name().unwrap_or(DEFAULT_SCHEMA);
    let mut statements = Vec::new();

    let table_target = format!(
        "@level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
        dialect.string_literal(schema),
        dialect.string_literal(&table.name),
    );

    if let Some(comment) = table.comment() {
        statements.push(format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, {};",
            dialect.string_literal(comment),
            table_target,
        ));
    }

    for field in &table.fields {
        if let Some(comment) = field.comment() {
            statements.push(format!(
                "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, {}, \
                 @level2type = N'COLUMN', @level2name = {};",
                dialect.string_literal(comment),
                table_target,
                dialect.string_literal(&field.name),
            ));
        }
    }

    statements
}
