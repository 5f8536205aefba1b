//! PostgreSQL → MySQL/MariaDB exporter

use crate::common::{
    base_tables, check_lines, column_type, distinct_schemas, is_exportable, plan_foreign_keys,
    plan_indexes, primary_key_line, render_body, BodyLine,
};
use crate::defaults::convert_default;
use crate::detector::{detect_unsupported_features, format_warnings_header};
use crate::dialect::{MySqlDialect, SqlDialect};
use crate::resolve::{is_auto_increment, resolve_field_type, ResolvedType};
use crate::ExportRequest;
use schemaport_core::{DBField, DBTable, DatabaseType, Diagram};

const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

/// Export a PostgreSQL diagram as MySQL DDL
pub fn export_postgres_to_mysql(request: &ExportRequest<'_>) -> String {
    export_for_target(request, DatabaseType::Mysql)
}

/// Export for MySQL or a MySQL-compatible target
pub(crate) fn export_for_target(request: &ExportRequest<'_>, target: DatabaseType) -> String {
    let diagram = request.diagram;
    if !is_exportable(diagram) {
        return String::new();
    }

    let dialect = MySqlDialect::for_target(target);
    let features = detect_unsupported_features(diagram, target);
    let mut out =
        format_warnings_header(&features, DatabaseType::Postgresql.label(), target.label());

    if !request.only_relationships {
        let schemas = distinct_schemas(diagram);
        if !schemas.is_empty() {
            out.push('\n');
            for schema in schemas {
                out.push_str(&format!(
                    "CREATE DATABASE IF NOT EXISTS {};\n",
                    dialect.quote_ident(schema)
                ));
            }
        }

        for table in base_tables(diagram) {
            out.push('\n');
            out.push_str(&render_table(table, diagram, &dialect));
        }
    }

    let foreign_keys = plan_foreign_keys(diagram);
    if !foreign_keys.is_empty() {
        out.push_str("\n-- Foreign key constraints\n");
        for fk in &foreign_keys {
            out.push_str(&fk.render(&dialect));
            out.push('\n');
        }
    }

    out
}

fn render_table(table: &DBTable, diagram: &Diagram, dialect: &MySqlDialect) -> String {
    let qualified = dialect.qualify(table.schema_name(), &table.name);

    let mut lines = Vec::new();
    let mut unique_keys = Vec::new();
    for field in &table.fields {
        let resolved = resolve_field_type(field, diagram, dialect.target());
        let column = render_column(field, &resolved, dialect);
        lines.push(BodyLine::new(column).with_comment(resolved.inline_comment()));
        unique_keys.extend(unique_key_line(field, &resolved, dialect));
    }
    lines.extend(primary_key_line(table, diagram, dialect));
    lines.extend(unique_keys);
    lines.extend(check_lines(table));

    let mut out = format!("CREATE TABLE {} (\n", qualified);
    out.push_str(&render_body(&lines));
    out.push_str(&format!(") {}", TABLE_OPTIONS));
    if let Some(comment) = table.comment() {
        out.push_str(&format!(" COMMENT={}", dialect.string_literal(comment)));
    }
    out.push_str(";\n");

    let mut indexes: Vec<String> = plan_indexes(table, diagram, dialect)
        .iter()
        .map(|plan| {
            let mut statement = format!(
                "CREATE {}INDEX {} ON {} ({}) USING {};",
                if plan.index.unique { "UNIQUE " } else { "" },
                dialect.quote_ident(&plan.name(table)),
                qualified,
                plan.render_keys(table, dialect),
                plan.mapping.target_type,
            );
            if let Some(note) = plan.mapping.note {
                statement.push_str(&format!(" -- {}", note));
            }
            statement
        })
        .collect();
    indexes.sort();

    for statement in indexes {
        out.push_str(&statement);
        out.push('\n');
    }

    out
}

fn render_column(field: &DBField, resolved: &ResolvedType<'_>, dialect: &MySqlDialect) -> String {
    let name = dialect.quote_ident(&field.name);
    let mut sql = format!("{} {}", name, column_type(field, resolved, dialect));

    if !field.nullable || field.primary_key {
        sql.push_str(" NOT NULL");
    }

    let auto_increment = is_auto_increment(field);
    if auto_increment {
        sql.push_str(" AUTO_INCREMENT");
    }

    let prefixed = dialect.key_prefix_length(&resolved.sql_type).is_some();
    if field.unique && !field.primary_key && !prefixed {
        sql.push_str(" UNIQUE");
    }

    // AUTO_INCREMENT columns reject a DEFAULT clause
    if let Some(raw) = field.default.as_deref().filter(|_| !auto_increment) {
        if let Some(default) = convert_default(raw, dialect).sql {
            sql.push_str(" DEFAULT ");
            sql.push_str(&wrap_lob_default(default, resolved));
        }
    }

    if let Some(comment) = field.comment() {
        sql.push_str(&format!(" COMMENT {}", dialect.string_literal(comment)));
    }

    sql
}

/// `UNIQUE KEY` with a prefix, for unique TEXT and BLOB columns
fn unique_key_line(
    field: &DBField,
    resolved: &ResolvedType<'_>,
    dialect: &MySqlDialect,
) -> Option<BodyLine> {
    if !field.unique || field.primary_key {
        return None;
    }
    let length = dialect.key_prefix_length(&resolved.sql_type)?;
    let name = dialect.quote_ident(&field.name);
    Some(BodyLine::new(format!("UNIQUE KEY ({}({}))", name, length)))
}

/// TEXT, BLOB and JSON columns only take parenthesised expression defaults
fn wrap_lob_default(default: String, resolved: &ResolvedType<'_>) -> String {
    if resolved.is_lob() && !default.starts_with('(') && !default.eq_ignore_ascii_case("NULL") {
        format!("({})", default)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemaport_core::{Cardinality, DBIndex, DBRelationship};

    fn export(diagram: &Diagram) -> String {
        export_postgres_to_mysql(&ExportRequest::new(diagram))
    }

    fn diagram(tables: Vec<DBTable>) -> Diagram {
        Diagram::new("d", DatabaseType::Postgresql).with_tables(tables)
    }

    fn users() -> DBTable {
        DBTable::new(
            "t1",
            "users",
            vec![
                DBField::new("f1", "id", "serial").with_primary_key().with_unique(true),
                DBField::new("f2", "email", "varchar")
                    .with_length("120")
                    .with_nullable(false)
                    .with_unique(true),
                DBField::new("f3", "bio", "text")
                    .with_default("'none'::text")
                    .with_comments("Shown on the profile"),
                DBField::new("f4", "active", "boolean").with_default("true"),
            ],
        )
    }

    #[test]
    fn test_renders_columns_in_mysql_order() {
        let ddl = export(&diagram(vec![users()]));

        assert!(ddl.contains("    `id` INT NOT NULL AUTO_INCREMENT,\n"));
        assert!(ddl.contains("    `email` VARCHAR(120) NOT NULL UNIQUE,\n"));
        assert!(ddl.contains("    `bio` TEXT DEFAULT ('none') COMMENT 'Shown on the profile',\n"));
        assert!(ddl.contains("    `active` TINYINT(1) DEFAULT true,\n"));
        assert!(ddl.contains("    PRIMARY KEY (`id`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;\n"));
    }

    #[test]
    fn test_primary_keys_never_repeat_unique() {
        let ddl = export(&diagram(vec![users()]));
        let id_line = ddl.lines().find(|l| l.trim_start().starts_with("`id`")).unwrap();
        assert!(!id_line.contains("UNIQUE"));
    }

    #[test]
    fn test_auto_increment_drops_default() {
        let table = DBTable::new(
            "t1",
            "counters",
            vec![DBField::new("f1", "id", "int")
                .with_primary_key()
                .with_increment(true)
                .with_default("0")],
        );
        let ddl = export(&diagram(vec![table]));
        assert!(ddl.contains("    `id` INT NOT NULL AUTO_INCREMENT,\n"));
        assert!(!ddl.contains("DEFAULT 0"));
    }

    #[test]
    fn test_text_keys_use_prefixes() {
        let table = DBTable::new(
            "t1",
            "codes",
            vec![
                DBField::new("f1", "code", "text").with_primary_key(),
                DBField::new("f2", "email", "text").with_unique(true),
                DBField::new("f3", "label", "varchar").with_length("40").with_unique(true),
            ],
        );
        let ddl = export(&diagram(vec![table]));

        assert_eq!(
            ddl.lines().skip_while(|l| !l.starts_with("CREATE TABLE")).collect::<Vec<_>>(),
            vec![
                "CREATE TABLE `codes` (",
                "    `code` TEXT NOT NULL,",
                "    `email` TEXT,",
                "    `label` VARCHAR(40) UNIQUE,",
                "    PRIMARY KEY (`code`(255)),",
                "    UNIQUE KEY (`email`(255))",
                ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;",
            ]
        );
    }

    #[test]
    fn test_table_comment_is_a_table_option() {
        let table = users().with_comments("People's accounts");
        let ddl = export(&diagram(vec![table]));
        assert!(ddl.contains(
            ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='People''s accounts';\n"
        ));
    }

    #[test]
    fn test_indexes_are_sorted_and_prefixed_for_text() {
        let table = users().with_indexes(vec![
            DBIndex::new("i1", "idx_bio", vec!["f3".into()]),
            DBIndex::new("i2", "idx_active", vec!["f4".into()]).with_type("hash"),
            DBIndex::new("i3", "users_pkey", vec!["f1".into()]).with_primary_key(true),
        ]);
        let ddl = export(&diagram(vec![table]));

        let active = ddl.find("CREATE INDEX `idx_active`").unwrap();
        let bio = ddl.find("CREATE INDEX `idx_bio` ON `users` (`bio`(255)) USING BTREE;").unwrap();
        assert!(active < bio);
        assert!(!ddl.contains("users_pkey"));
    }

    #[test]
    fn test_only_relationships_emits_just_foreign_keys() {
        let orders = DBTable::new(
            "t2",
            "orders",
            vec![
                DBField::new("o1", "id", "int").with_primary_key(),
                DBField::new("o2", "user_id", "int"),
            ],
        );
        let relationship =
            DBRelationship::new("r1", "t2", "o2", "t1", "f1", Cardinality::Many, Cardinality::One)
                .with_name("orders_user_fk");
        let diagram = diagram(vec![users().with_schema("app"), orders])
            .with_relationships(vec![relationship]);

        let request = ExportRequest::new(&diagram).with_only_relationships(true);
        let ddl = export_postgres_to_mysql(&request);
        assert!(!ddl.contains("CREATE TABLE"));
        assert!(!ddl.contains("CREATE DATABASE"));
        assert!(ddl.contains(concat!(
            "ALTER TABLE `orders` ADD CONSTRAINT `orders_user_fk` FOREIGN KEY (`user_id`) ",
            "REFERENCES `app`.`users` (`id`);"
        )));
    }

    #[test]
    fn test_missing_lists_short_circuit() {
        let mut diagram = diagram(vec![users()]);
        diagram.relationships = None;
        assert_eq!(export(&diagram), "");

        assert_eq!(export(&Diagram::new("d", DatabaseType::Postgresql)), "");
    }
}
