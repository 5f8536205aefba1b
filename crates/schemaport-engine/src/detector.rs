//! Unsupported-feature detection and the warnings header
//!
//! Detection runs as a separate pass over the diagram and never influences
//! the generated DDL. It walks:
//! - custom types, in declaration order
//! - base tables in diagram order: fields, then planned indexes, then CHECK
//!   constraints
//! - schemas (MySQL-family targets only), once each
//!
//! One record is produced per occurrence; nothing is merged.

use crate::common::{base_tables, distinct_schemas, plan_indexes, IndexPlan};
use crate::defaults::convert_default;
use crate::dialect::{MySqlDialect, SqlDialect, SqlServerDialect};
use crate::resolve::{resolve_field_type, single_line, TypeOrigin};
use regex::Regex;
use schemaport_core::{
    CustomTypeKind, DBCustomType, DBField, DBTable, DatabaseType, Diagram, FeatureCategory,
    UnsupportedFeature,
};
use std::sync::LazyLock;

static POSTGRES_ONLY_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)::|~|!~|\bI?LIKE\s+ANY\b|\bILIKE\b|\bSIMILAR\s+TO\b|\bANY\s*\(|\bARRAY\s*\[",
    )
    .unwrap()
});

/// Detect everything that will not survive the conversion 1:1
pub fn detect_unsupported_features(
    diagram: &Diagram,
    target: DatabaseType,
) -> Vec<UnsupportedFeature> {
    let target_label = target.label();
    let mut features = Vec::new();

    for custom in diagram.custom_types() {
        features.push(custom_type_feature(custom, diagram, target));
    }

    let mysql_family = matches!(target, DatabaseType::Mysql | DatabaseType::Mariadb);
    let dialect: Box<dyn SqlDialect> = if mysql_family {
        Box::new(MySqlDialect::for_target(target))
    } else {
        Box::new(SqlServerDialect)
    };

    for table in base_tables(diagram) {
        detect_fields(table, diagram, dialect.as_ref(), &mut features);

        for plan in plan_indexes(table, diagram, dialect.as_ref()) {
            detect_index(&plan, table, dialect.as_ref(), &mut features);
        }

        for (position, check) in table.valid_check_constraints().enumerate() {
            if POSTGRES_ONLY_CHECK.is_match(&check.expression) {
                let name = if check.id.trim().is_empty() {
                    format!("check_{}", position + 1)
                } else {
                    check.id.clone()
                };
                features.push(
                    UnsupportedFeature::new(
                        FeatureCategory::Constraints,
                        name,
                        format!(
                            "CHECK ({}) uses PostgreSQL-only syntax and is copied verbatim",
                            single_line(&check.expression)
                        ),
                        format!(
                            "Rewrite the expression for {} before running the script",
                            target_label
                        ),
                    )
                    .with_table(&table.name),
                );
            }
        }
    }

    if mysql_family {
        for schema in distinct_schemas(diagram) {
            features.push(UnsupportedFeature::new(
                FeatureCategory::Schema,
                schema,
                format!("Schema '{}' is created as a separate {} database", schema, target_label),
                "Cross-schema foreign keys become cross-database references; \
                 grant privileges per database",
            ));
        }
    }

    features
}

fn custom_type_feature(
    custom: &DBCustomType,
    diagram: &Diagram,
    target: DatabaseType,
) -> UnsupportedFeature {
    // Resolve through a stand-in field so the reported type matches the DDL
    let stand_in = DBField::new("", "", custom.name.clone());
    let resolved = resolve_field_type(&stand_in, diagram, target);

    match custom.kind {
        CustomTypeKind::Enum => {
            let values: Vec<String> =
                custom.enum_values().iter().map(|v| format!("'{}'", v)).collect();
            UnsupportedFeature::new(
                FeatureCategory::CustomTypes,
                &custom.name,
                format!(
                    "Enum type stored as {}; allowed values ({}) are kept only as a comment",
                    resolved.sql_type,
                    values.join(", ")
                ),
                "Validate values in the application or add a CHECK constraint listing them",
            )
        }
        CustomTypeKind::Composite => UnsupportedFeature::new(
            FeatureCategory::CustomTypes,
            &custom.name,
            format!(
                "Composite type with {} attribute(s) stored as {}",
                custom.composite_fields().len(),
                resolved.sql_type
            ),
            "Split the attributes into separate columns or validate the JSON document \
             in the application",
        ),
    }
}

fn detect_fields(
    table: &DBTable,
    diagram: &Diagram,
    dialect: &dyn SqlDialect,
    features: &mut Vec<UnsupportedFeature>,
) {
    let target = dialect.target();
    for field in &table.fields {
        let resolved = resolve_field_type(field, diagram, target);

        match resolved.origin {
            TypeOrigin::Array => features.push(
                UnsupportedFeature::new(
                    FeatureCategory::Arrays,
                    &field.name,
                    format!(
                        "{} array stored as {}",
                        resolved.source_type.trim_end_matches("[]"),
                        resolved.sql_type
                    ),
                    "Normalize into a child table if elements need constraints, joins or indexing",
                )
                .with_table(&table.name),
            ),
            TypeOrigin::Enum | TypeOrigin::Composite => {
                let kind =
                    if resolved.origin == TypeOrigin::Enum { "enum" } else { "composite" };
                features.push(
                    UnsupportedFeature::new(
                        FeatureCategory::CustomTypes,
                        &field.name,
                        format!(
                            "Column uses {} type '{}' stored as {}",
                            kind, resolved.source_type, resolved.sql_type
                        ),
                        "Enforce the type's rules in the application",
                    )
                    .with_table(&table.name),
                )
            }
            TypeOrigin::Table | TypeOrigin::Fallback => {
                if let Some(note) = resolved.mapping.conversion_note {
                    let recommendation = if resolved.origin == TypeOrigin::Fallback {
                        format!(
                            "Map '{}' to a {} type by hand",
                            resolved.source_type,
                            target.label()
                        )
                    } else {
                        "Review application code that relies on PostgreSQL behaviour of this type"
                            .to_string()
                    };
                    features.push(
                        UnsupportedFeature::new(
                            FeatureCategory::TypeConversions,
                            &field.name,
                            format!("{} → {}: {}", resolved.source_type, resolved.sql_type, note),
                            recommendation,
                        )
                        .with_table(&table.name),
                    );
                }
            }
        }

        if let Some(feature) = key_column_feature(field, &resolved.sql_type, dialect) {
            features.push(feature.with_table(&table.name));
        }

        if let Some(raw) = field.default.as_deref() {
            if let Some(note) = convert_default(raw, dialect).note {
                features.push(
                    UnsupportedFeature::new(
                        FeatureCategory::Defaults,
                        &field.name,
                        format!("{}: DEFAULT {}", note, single_line(raw)),
                        "Set the default in application code if the exact value matters",
                    )
                    .with_table(&table.name),
                );
            }
        }
    }
}

/// PRIMARY KEY and UNIQUE columns whose type the target cannot key in full
fn key_column_feature(
    field: &DBField,
    sql_type: &str,
    dialect: &dyn SqlDialect,
) -> Option<UnsupportedFeature> {
    if !field.primary_key && !field.unique {
        return None;
    }
    let constraint = if field.primary_key { "PRIMARY KEY" } else { "UNIQUE" };

    if let Some(bounded) = dialect.bounded_key_type(sql_type) {
        return Some(UnsupportedFeature::new(
            FeatureCategory::TypeConversions,
            &field.name,
            format!("{} column narrowed from {} to {}", constraint, sql_type, bounded),
            "Longer values are rejected; key on a shorter column or a hash of the value",
        ));
    }

    let length = dialect.key_prefix_length(sql_type)?;
    Some(UnsupportedFeature::new(
        FeatureCategory::Constraints,
        &field.name,
        format!("{} on {} only covers the first {} characters", constraint, sql_type, length),
        "Use VARCHAR with an explicit length so the whole value is compared",
    ))
}

fn detect_index(
    plan: &IndexPlan<'_>,
    table: &DBTable,
    dialect: &dyn SqlDialect,
    features: &mut Vec<UnsupportedFeature>,
) {
    let target_label = dialect.target().label();
    let name = plan.name(table);
    let rejected: Vec<&str> = plan.rejected.iter().map(|c| c.field.name.as_str()).collect();

    if !plan.is_emitted() {
        features.push(
            UnsupportedFeature::new(
                FeatureCategory::IndexChanges,
                name,
                format!(
                    "Index skipped: {} cannot be an index key on {}",
                    rejected.join(", "),
                    target_label
                ),
                "Index a computed column holding a hash or prefix of the value",
            )
            .with_table(&table.name),
        );
        return;
    }

    if let Some(note) = plan.mapping.note {
        features.push(
            UnsupportedFeature::new(
                FeatureCategory::IndexChanges,
                name.clone(),
                note,
                index_recommendation(&plan.index.method(), target_label),
            )
            .with_table(&table.name),
        );
    }

    if !rejected.is_empty() {
        features.push(
            UnsupportedFeature::new(
                FeatureCategory::IndexChanges,
                name.clone(),
                format!(
                    "{} cannot be an index key on {}; moved to INCLUDE",
                    rejected.join(", "),
                    target_label
                ),
                "Queries filtering on the included columns cannot seek on this index",
            )
            .with_table(&table.name),
        );
    }

    let prefix = plan.columns.iter().find_map(|c| c.prefix_length(dialect));
    if let (true, Some(length)) = (plan.index.unique, prefix) {
        features.push(
            UnsupportedFeature::new(
                FeatureCategory::IndexChanges,
                name,
                format!("Unique index only compares the first {} characters of text keys", length),
                "Use VARCHAR with an explicit length so the whole value is compared",
            )
            .with_table(&table.name),
        );
    }
}

fn index_recommendation(method: &str, target_label: &str) -> String {
    match method {
        "gin" => format!("Consider a full-text index or generated columns on {}", target_label),
        "gist" | "spgist" => {
            format!("Consider a spatial index on {} if the column holds geometry", target_label)
        }
        "hash" => "Equality lookups still work; expect a B-tree on disk".to_string(),
        "brin" => "Expect a larger index; partition the table if it is append-only".to_string(),
        _ => format!("Check that queries using this index still perform on {}", target_label),
    }
}

/// Render the advisory comment block prepended to every export
pub fn format_warnings_header(
    features: &[UnsupportedFeature],
    source_label: &str,
    target_label: &str,
) -> String {
    let mut out = format!(
        "-- {} to {} conversion\n-- Generated by schemaport; review before running\n",
        source_label, target_label
    );

    if features.is_empty() {
        return out;
    }

    out.push_str("--\n");
    out.push_str(&format!(
        "-- CONVERSION NOTES: {} feature(s) could not be converted 1:1\n",
        features.len()
    ));

    for category in FeatureCategory::ALL {
        let group: Vec<&UnsupportedFeature> =
            features.iter().filter(|f| f.category == category).collect();
        if group.is_empty() {
            continue;
        }

        out.push_str("--\n");
        out.push_str(&format!("-- {}:\n", category.title()));
        for feature in group {
            out.push_str(&format!(
                "--   {}: {}\n",
                single_line(&feature.location()),
                single_line(&feature.feature)
            ));
            out.push_str(&format!(
                "--     Recommendation: {}\n",
                single_line(&feature.recommendation)
            ));
        }
    }

    out
}
