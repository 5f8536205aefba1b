//! Rendering and planning shared by both exporters
//!
//! Index and foreign-key planning decide *what* gets emitted; the detector
//! uses the same plans so reported features always match the DDL.

use crate::dialect::{truncate_identifier, SqlDialect};
use crate::resolve::{resolve_field_type, ResolvedType};
use schemaport_core::{Cardinality, DBField, DBIndex, DBRelationship, DBTable, Diagram};
use schemaport_typemap::{resolve_index_type, IndexTypeMapping};
use std::collections::{BTreeSet, HashSet};

/// Whether the diagram carries enough to export anything
pub(crate) fn is_exportable(diagram: &Diagram) -> bool {
    matches!(&diagram.tables, Some(tables) if !tables.is_empty()) && diagram.relationships.is_some()
}

/// Non-view tables in diagram order
pub(crate) fn base_tables(diagram: &Diagram) -> impl Iterator<Item = &DBTable> {
    diagram.tables().iter().filter(|table| {
        if table.is_view {
            tracing::debug!(table = %table.name, "skipping view");
        }
        !table.is_view
    })
}

/// Distinct non-blank schemas of base tables, in first-seen order
pub(crate) fn distinct_schemas(diagram: &Diagram) -> Vec<&str> {
    let mut seen = HashSet::new();
    diagram
        .tables()
        .iter()
        .filter(|t| !t.is_view)
        .filter_map(|t| t.schema_name())
        .filter(|schema| seen.insert(*schema))
        .collect()
}

/// One line inside `CREATE TABLE (...)`
pub(crate) struct BodyLine {
    pub sql: String,
    pub comment: Option<String>,
}

impl BodyLine {
    pub fn new(sql: String) -> Self {
        Self { sql, comment: None }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// Render body lines with separating commas ahead of any trailing comment
pub(crate) fn render_body(lines: &[BodyLine]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str("    ");
        out.push_str(&line.sql);
        if i + 1 < lines.len() {
            out.push(',');
        }
        if let Some(comment) = &line.comment {
            out.push(' ');
            out.push_str(comment);
        }
        out.push('\n');
    }
    out
}

/// Declared type of a column, narrowed for PRIMARY KEY and UNIQUE columns
pub(crate) fn column_type(
    field: &DBField,
    resolved: &ResolvedType<'_>,
    dialect: &dyn SqlDialect,
) -> String {
    if field.primary_key || field.unique {
        if let Some(bounded) = dialect.bounded_key_type(&resolved.sql_type) {
            return bounded.to_string();
        }
    }
    resolved.sql_type.clone()
}

/// A column used in a key, with the type it is declared as
pub(crate) struct KeyColumn<'a> {
    pub field: &'a DBField,
    pub sql_type: String,
}

impl<'a> KeyColumn<'a> {
    pub fn new(field: &'a DBField, diagram: &Diagram, dialect: &dyn SqlDialect) -> Self {
        let resolved = resolve_field_type(field, diagram, dialect.target());
        let sql_type = column_type(field, &resolved, dialect);
        Self { field, sql_type }
    }

    pub fn prefix_length(&self, dialect: &dyn SqlDialect) -> Option<u32> {
        dialect.key_prefix_length(&self.sql_type)
    }

    /// Quoted name, with a prefix length when the type needs one
    pub fn render(&self, dialect: &dyn SqlDialect) -> String {
        let name = dialect.quote_ident(&self.field.name);
        match self.prefix_length(dialect) {
            Some(length) => format!("{}({})", name, length),
            None => name,
        }
    }
}

/// `PRIMARY KEY (...)` over primary-key fields in field order
pub(crate) fn primary_key_line(
    table: &DBTable,
    diagram: &Diagram,
    dialect: &dyn SqlDialect,
) -> Option<BodyLine> {
    let columns: Vec<String> = table
        .primary_key_fields()
        .into_iter()
        .map(|field| KeyColumn::new(field, diagram, dialect).render(dialect))
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(BodyLine::new(format!("PRIMARY KEY ({})", columns.join(", "))))
}

/// `CHECK (...)` lines for non-blank expressions, copied verbatim
pub(crate) fn check_lines(table: &DBTable) -> impl Iterator<Item = BodyLine> + '_ {
    table
        .valid_check_constraints()
        .map(|check| BodyLine::new(format!("CHECK ({})", check.expression.trim())))
}

/// An index that survived filtering
pub(crate) struct IndexPlan<'a> {
    pub index: &'a DBIndex,

    /// Resolvable fields in index order
    pub fields: Vec<&'a DBField>,

    /// Columns the target accepts as keys
    pub columns: Vec<KeyColumn<'a>>,

    /// Columns whose type cannot be a key on the target
    pub rejected: Vec<KeyColumn<'a>>,

    pub mapping: &'static IndexTypeMapping,
}

impl IndexPlan<'_> {
    /// Index name, generated when the diagram leaves it blank
    pub fn name(&self, table: &DBTable) -> String {
        if !self.index.name.trim().is_empty() {
            return self.index.name.clone();
        }
        let columns: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        format!("idx_{}_{}", table.name, columns.join("_"))
    }

    /// False when no column can be a key, so no index can be created
    pub fn is_emitted(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Key columns, cut down to the dialect's limit
    pub fn key_columns(&self, table: &DBTable, dialect: &dyn SqlDialect) -> &[KeyColumn<'_>] {
        let max = dialect.max_index_columns();
        if self.columns.len() > max {
            tracing::warn!(
                table = %table.name,
                index = %self.index.name,
                columns = self.columns.len(),
                limit = max,
                "index has more key columns than {} allows; truncating",
                dialect.target().label()
            );
            return &self.columns[..max];
        }
        &self.columns
    }

    /// Comma-separated key columns, prefixed where the type needs it
    pub fn render_keys(&self, table: &DBTable, dialect: &dyn SqlDialect) -> String {
        let keys: Vec<String> =
            self.key_columns(table, dialect).iter().map(|c| c.render(dialect)).collect();
        keys.join(", ")
    }
}

/// Indexes of a table that survive filtering, in index order
///
/// Primary-key indexes, indexes whose field set equals the primary key,
/// and indexes without any resolvable field are dropped; dangling field ids
/// inside an index are skipped. Fields are split into key columns and
/// columns the target cannot index.
pub(crate) fn plan_indexes<'a>(
    table: &'a DBTable,
    diagram: &Diagram,
    dialect: &dyn SqlDialect,
) -> Vec<IndexPlan<'a>> {
    let pk: BTreeSet<&str> = table.primary_key_fields().iter().map(|f| f.id.as_str()).collect();

    table
        .indexes
        .iter()
        .filter(|index| !index.is_primary_key())
        .filter_map(|index| {
            let fields: Vec<&DBField> = index
                .field_ids
                .iter()
                .filter_map(|id| {
                    let field = table.find_field(id);
                    if field.is_none() {
                        tracing::debug!(
                            table = %table.name,
                            index = %index.name,
                            field_id = %id,
                            "dangling index field"
                        );
                    }
                    field
                })
                .collect();

            if fields.is_empty() {
                return None;
            }

            let ids: BTreeSet<&str> = fields.iter().map(|f| f.id.as_str()).collect();
            if !pk.is_empty() && ids == pk {
                return None;
            }

            let (columns, rejected): (Vec<_>, Vec<_>) = fields
                .iter()
                .map(|field| KeyColumn::new(field, diagram, dialect))
                .partition(|column| dialect.is_index_key_type(&column.sql_type));

            Some(IndexPlan {
                index,
                fields,
                columns,
                rejected,
                mapping: resolve_index_type(&index.method(), dialect.target()),
            })
        })
        .collect()
}

/// A foreign key that will be emitted
pub(crate) struct ForeignKeyPlan<'a> {
    pub relationship: &'a DBRelationship,

    /// Table receiving the constraint
    pub table: &'a DBTable,
    pub column: &'a DBField,

    pub ref_table: &'a DBTable,
    pub ref_column: &'a DBField,
}

impl ForeignKeyPlan<'_> {
    pub fn name(&self, dialect: &dyn SqlDialect) -> String {
        let name = match self.relationship.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("fk_{}_{}_{}", self.table.name, self.column.name, self.ref_table.name),
        };
        truncate_identifier(&name, dialect.max_identifier_length())
    }

    pub fn render(&self, dialect: &dyn SqlDialect) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}){}",
            dialect.qualify(self.table.schema_name(), &self.table.name),
            dialect.quote_ident(&self.name(dialect)),
            dialect.quote_ident(&self.column.name),
            dialect.qualify(self.ref_table.schema_name(), &self.ref_table.name),
            dialect.quote_ident(&self.ref_column.name),
            dialect.statement_terminator(),
        )
    }
}

/// Foreign keys in relationship order
///
/// The constraint goes on the "many" side; one-to-one relationships put it
/// on the target table. Many-to-many relationships and relationships with
/// an endpoint that is missing or a view are skipped.
pub(crate) fn plan_foreign_keys(diagram: &Diagram) -> Vec<ForeignKeyPlan<'_>> {
    diagram
        .relationships()
        .iter()
        .filter_map(|rel| {
            let endpoints = resolve_endpoint(diagram, &rel.source_table_id, &rel.source_field_id)
                .zip(resolve_endpoint(diagram, &rel.target_table_id, &rel.target_field_id));
            let Some(((source_table, source_field), (target_table, target_field))) = endpoints
            else {
                tracing::debug!(relationship = %rel.id, "relationship endpoint missing or a view");
                return None;
            };

            match (rel.source_cardinality, rel.target_cardinality) {
                (Cardinality::Many, Cardinality::Many) => {
                    tracing::debug!(relationship = %rel.id, "skipping many-to-many relationship");
                    None
                }
                (Cardinality::Many, Cardinality::One) => Some(ForeignKeyPlan {
                    relationship: rel,
                    table: source_table,
                    column: source_field,
                    ref_table: target_table,
                    ref_column: target_field,
                }),
                (Cardinality::One, _) => Some(ForeignKeyPlan {
                    relationship: rel,
                    table: target_table,
                    column: target_field,
                    ref_table: source_table,
                    ref_column: source_field,
                }),
            }
        })
        .collect()
}

fn resolve_endpoint<'a>(
    diagram: &'a Diagram,
    table_id: &str,
    field_id: &str,
) -> Option<(&'a DBTable, &'a DBField)> {
    let table = diagram.find_table(table_id).filter(|t| !t.is_view)?;
    let field = table.find_field(field_id)?;
    Some((table, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, SqlServerDialect};
    use schemaport_core::DatabaseType;

    fn table() -> DBTable {
        DBTable::new(
            "t1",
            "users",
            vec![
                DBField::new("f1", "id", "int").with_primary_key(),
                DBField::new("f2", "email", "varchar"),
                DBField::new("f3", "name", "text"),
            ],
        )
    }

    fn empty_diagram() -> Diagram {
        Diagram::new("d", DatabaseType::Postgresql)
    }

    #[test]
    fn test_body_commas_precede_comments() {
        let lines = vec![
            BodyLine::new("`a` JSON".into())
                .with_comment(Some("-- Was: text[] (PostgreSQL array)".into())),
            BodyLine::new("`b` INT".into()),
            BodyLine::new("`c` TEXT".into()).with_comment(Some("-- Was: ltree".into())),
        ];
        assert_eq!(
            render_body(&lines),
            concat!(
                "    `a` JSON, -- Was: text[] (PostgreSQL array)\n",
                "    `b` INT,\n",
                "    `c` TEXT -- Was: ltree\n",
            )
        );
    }

    #[test]
    fn test_index_plans_skip_primary_key_duplicates_and_dangling_fields() {
        let table = table().with_indexes(vec![
            DBIndex::new("i1", "users_pkey", vec!["f1".into()]).with_primary_key(true),
            DBIndex::new("i2", "idx_id", vec!["f1".into()]),
            DBIndex::new("i3", "idx_email", vec!["f2".into(), "missing".into()]),
            DBIndex::new("i4", "idx_ghost", vec!["missing".into()]),
            DBIndex::new("i5", "idx_name", vec!["f3".into()]).with_type("gin"),
        ]);

        let plans = plan_indexes(&table, &empty_diagram(), &MySqlDialect::new());
        let names: Vec<&str> = plans.iter().map(|p| p.index.name.as_str()).collect();
        assert_eq!(names, vec!["idx_email", "idx_name"]);
        assert_eq!(plans[0].columns.len(), 1);
        assert!(plans[1].mapping.note.is_some());
    }

    #[test]
    fn test_index_columns_are_truncated_to_the_dialect_limit() {
        let fields: Vec<DBField> =
            (0..40).map(|i| DBField::new(format!("f{i}"), format!("c{i}"), "int")).collect();
        let ids: Vec<String> = fields.iter().map(|f| f.id.clone()).collect();
        let table = DBTable::new("t1", "wide", fields)
            .with_indexes(vec![DBIndex::new("i1", "idx_wide", ids)]);
        let diagram = empty_diagram();

        let plans = plan_indexes(&table, &diagram, &SqlServerDialect);
        assert_eq!(plans[0].key_columns(&table, &SqlServerDialect).len(), 32);

        let plans = plan_indexes(&table, &diagram, &MySqlDialect::new());
        assert_eq!(plans[0].key_columns(&table, &MySqlDialect::new()).len(), 16);
    }

    #[test]
    fn test_blank_index_names_are_generated() {
        let table =
            table().with_indexes(vec![DBIndex::new("i1", "", vec!["f2".into(), "f3".into()])]);
        let plans = plan_indexes(&table, &empty_diagram(), &SqlServerDialect);
        assert_eq!(plans[0].name(&table), "idx_users_email_name");
    }

    #[test]
    fn test_text_keys_are_prefixed_on_mysql() {
        let table = table().with_indexes(vec![DBIndex::new(
            "i1",
            "idx_email_name",
            vec!["f2".into(), "f3".into()],
        )]);
        let dialect = MySqlDialect::new();

        let plans = plan_indexes(&table, &empty_diagram(), &dialect);
        assert!(plans[0].rejected.is_empty());
        assert_eq!(plans[0].render_keys(&table, &dialect), "`email`, `name`(255)");
    }

    #[test]
    fn test_max_types_are_rejected_as_sql_server_keys() {
        let table = table().with_indexes(vec![
            DBIndex::new("i1", "idx_email_name", vec!["f2".into(), "f3".into()]),
            DBIndex::new("i2", "idx_name", vec!["f3".into()]),
        ]);

        let plans = plan_indexes(&table, &empty_diagram(), &SqlServerDialect);
        assert_eq!(plans[0].render_keys(&table, &SqlServerDialect), "[email]");
        assert_eq!(plans[0].rejected[0].field.name, "name");
        assert!(plans[0].is_emitted());
        assert!(!plans[1].is_emitted());
    }

    #[test]
    fn test_key_columns_are_narrowed_or_prefixed() {
        let table = DBTable::new(
            "t1",
            "codes",
            vec![
                DBField::new("f1", "code", "text").with_primary_key(),
                DBField::new("f2", "label", "text"),
            ],
        );
        let diagram = empty_diagram();

        let line = primary_key_line(&table, &diagram, &MySqlDialect::new()).unwrap();
        assert_eq!(line.sql, "PRIMARY KEY (`code`(255))");

        let line = primary_key_line(&table, &diagram, &SqlServerDialect).unwrap();
        assert_eq!(line.sql, "PRIMARY KEY ([code])");

        let code = KeyColumn::new(&table.fields[0], &diagram, &SqlServerDialect);
        assert_eq!(code.sql_type, "NVARCHAR(450)");
        let label = KeyColumn::new(&table.fields[1], &diagram, &SqlServerDialect);
        assert_eq!(label.sql_type, "NVARCHAR(MAX)");
    }

    #[test]
    fn test_foreign_key_placement() {
        use Cardinality::{Many, One};

        let users = table();
        let orders = DBTable::new(
            "t2",
            "orders",
            vec![
                DBField::new("o1", "id", "int").with_primary_key(),
                DBField::new("o2", "user_id", "int"),
            ],
        );
        let diagram = Diagram::new("d", DatabaseType::Postgresql)
            .with_tables(vec![users, orders])
            .with_relationships(vec![
                DBRelationship::new("r1", "t2", "o2", "t1", "f1", Many, One),
                DBRelationship::new("r2", "t1", "f1", "t2", "o2", One, Many),
                DBRelationship::new("r3", "t1", "f1", "t2", "o2", Many, Many),
                DBRelationship::new("r4", "t1", "f1", "t9", "o2", Many, One),
                DBRelationship::new("r5", "t2", "o2", "t1", "f1", One, One),
            ]);

        let plans = plan_foreign_keys(&diagram);
        assert_eq!(plans.len(), 3);
        for plan in &plans[..2] {
            assert_eq!(plan.table.name, "orders");
            assert_eq!(plan.column.name, "user_id");
            assert_eq!(plan.ref_table.name, "users");
        }
        assert_eq!(
            plans[0].render(&MySqlDialect::new()),
            concat!(
                "ALTER TABLE `orders` ADD CONSTRAINT `fk_orders_user_id_users` ",
                "FOREIGN KEY (`user_id`) REFERENCES `users` (`id`);",
            )
        );

        // One-to-one puts the constraint on the target and references the source
        let one_to_one = &plans[2];
        assert_eq!(one_to_one.relationship.id, "r5");
        assert_eq!(one_to_one.table.name, "users");
        assert_eq!(one_to_one.column.name, "id");
        assert_eq!(one_to_one.ref_table.name, "orders");
        assert_eq!(one_to_one.ref_column.name, "user_id");
    }

    #[test]
    fn test_exportability() {
        let mut diagram = empty_diagram();
        assert!(!is_exportable(&diagram));

        diagram = diagram.with_tables(vec![table()]);
        assert!(is_exportable(&diagram));

        diagram.relationships = None;
        assert!(!is_exportable(&diagram));
    }

    #[test]
    fn test_schemas_are_deduplicated_in_order() {
        let diagram = empty_diagram().with_tables(vec![
            DBTable::new("t1", "a", vec![]).with_schema("sales"),
            DBTable::new("t2", "b", vec![]).with_schema("app"),
            DBTable::new("t3", "c", vec![]).with_schema("sales"),
            DBTable::new("t4", "d", vec![]).with_schema("hidden").with_view(true),
            DBTable::new("t5", "e", vec![]),
        ]);
        assert_eq!(distinct_schemas(&diagram), vec!["sales", "app"]);
    }
}
