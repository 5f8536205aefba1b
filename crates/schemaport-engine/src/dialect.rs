//! Per-target formatting strategy
//!
//! Both exporters share their column, index and foreign-key rendering; the
//! pieces of syntax that differ between targets live behind [`SqlDialect`].

use schemaport_core::DatabaseType;

/// Key prefix MySQL needs to index a TEXT or BLOB column
pub const MYSQL_KEY_PREFIX: u32 = 255;

/// Target-specific SQL syntax
pub trait SqlDialect {
    /// Dialect whose mapping tables drive type resolution
    fn target(&self) -> DatabaseType;

    /// Quote a single identifier
    fn quote_ident(&self, name: &str) -> String;

    /// Quote a string literal
    fn string_literal(&self, value: &str) -> String;

    /// `schema.name` with both parts quoted, or just the quoted name
    fn qualify(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(name)),
            None => self.quote_ident(name),
        }
    }

    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    /// Line separating batches, if the target's tooling uses one
    fn batch_separator(&self) -> Option<&'static str> {
        None
    }

    /// Longest identifier the target accepts
    fn max_identifier_length(&self) -> usize;

    /// Most key columns allowed in one index
    fn max_index_columns(&self) -> usize;

    /// Default expression for "now"
    fn current_timestamp(&self) -> &'static str;

    /// Default expression for "today"
    fn current_date(&self) -> &'static str;

    /// Default expression generating a random UUID
    fn random_uuid(&self) -> &'static str;

    /// Render a boolean default
    fn boolean_literal(&self, value: bool) -> String;

    /// Render a JSON document as a default expression
    fn json_literal(&self, json: &str) -> String;

    /// Prefix length a key on a column of this type must declare
    fn key_prefix_length(&self, _sql_type: &str) -> Option<u32> {
        None
    }

    /// Bounded type for a PRIMARY KEY or UNIQUE column of an unbounded type
    fn bounded_key_type(&self, _sql_type: &str) -> Option<&'static str> {
        None
    }

    /// Whether a column of this type can be an index key
    fn is_index_key_type(&self, _sql_type: &str) -> bool {
        true
    }
}

/// MySQL 8 (also used for MariaDB)
#[derive(Debug, Clone, Copy)]
pub struct MySqlDialect {
    target: DatabaseType,
}

impl MySqlDialect {
    pub fn new() -> Self {
        Self { target: DatabaseType::Mysql }
    }

    /// MySQL syntax labelled as a compatible target such as MariaDB
    pub fn for_target(target: DatabaseType) -> Self {
        Self { target }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for MySqlDialect {
    fn target(&self) -> DatabaseType {
        self.target
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn max_identifier_length(&self) -> usize {
        64
    }

    fn max_index_columns(&self) -> usize {
        16
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn current_date(&self) -> &'static str {
        "(CURRENT_DATE)"
    }

    fn random_uuid(&self) -> &'static str {
        "(UUID())"
    }

    fn boolean_literal(&self, value: bool) -> String {
        if value { "true" } else { "false" }.to_string()
    }

    // JSON columns only accept expression defaults
    fn json_literal(&self, json: &str) -> String {
        format!("({})", self.string_literal(json))
    }

    fn key_prefix_length(&self, sql_type: &str) -> Option<u32> {
        let upper = sql_type.to_uppercase();
        (upper.ends_with("TEXT") || upper.ends_with("BLOB")).then_some(MYSQL_KEY_PREFIX)
    }
}

/// Microsoft SQL Server (T-SQL, `sqlcmd` batches)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn target(&self) -> DatabaseType {
        DatabaseType::Sqlserver
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn string_literal(&self, value: &str) -> String {
        format!("N'{}'", value.replace('\'', "''"))
    }

    fn batch_separator(&self) -> Option<&'static str> {
        Some("GO")
    }

    fn max_identifier_length(&self) -> usize {
        128
    }

    fn max_index_columns(&self) -> usize {
        32
    }

    fn current_timestamp(&self) -> &'static str {
        "GETDATE()"
    }

    fn current_date(&self) -> &'static str {
        "CAST(GETDATE() AS DATE)"
    }

    fn random_uuid(&self) -> &'static str {
        "NEWID()"
    }

    fn boolean_literal(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    fn json_literal(&self, json: &str) -> String {
        self.string_literal(json)
    }

    // Key columns are limited to 900 bytes
    fn bounded_key_type(&self, sql_type: &str) -> Option<&'static str> {
        match sql_type.to_uppercase().as_str() {
            "NVARCHAR(MAX)" => Some("NVARCHAR(450)"),
            "VARCHAR(MAX)" => Some("VARCHAR(900)"),
            "VARBINARY(MAX)" => Some("VARBINARY(900)"),
            _ => None,
        }
    }

    fn is_index_key_type(&self, sql_type: &str) -> bool {
        let upper = sql_type.to_uppercase();
        let unbounded = matches!(
            upper.as_str(),
            "XML" | "TEXT" | "NTEXT" | "IMAGE" | "GEOGRAPHY" | "GEOMETRY"
        );
        !upper.ends_with("(MAX)") && !unbounded
    }
}

/// Cut a generated identifier down to the target's limit
pub(crate) fn truncate_identifier(name: &str, max_len: usize) -> String {
    name.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting_escapes_the_quote_character() {
        assert_eq!(MySqlDialect::new().quote_ident("we`ird"), "`we``ird`");
        assert_eq!(SqlServerDialect.quote_ident("we]ird"), "[we]]ird]");
    }

    #[test]
    fn test_qualification() {
        let mysql = MySqlDialect::new();
        assert_eq!(mysql.qualify(Some("app"), "users"), "`app`.`users`");
        assert_eq!(mysql.qualify(None, "users"), "`users`");
        assert_eq!(SqlServerDialect.qualify(Some("app"), "users"), "[app].[users]");
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(MySqlDialect::new().string_literal("it's"), "'it''s'");
        assert_eq!(MySqlDialect::new().string_literal(r"C:\tmp"), r"'C:\\tmp'");
        assert_eq!(SqlServerDialect.string_literal("it's"), "N'it''s'");
    }

    #[test]
    fn test_batches_only_on_sql_server() {
        assert_eq!(MySqlDialect::new().batch_separator(), None);
        assert_eq!(SqlServerDialect.batch_separator(), Some("GO"));
    }

    #[test]
    fn test_mariadb_reuses_mysql_syntax() {
        let mariadb = MySqlDialect::for_target(DatabaseType::Mariadb);
        assert_eq!(mariadb.target(), DatabaseType::Mariadb);
        assert_eq!(mariadb.quote_ident("t"), "`t`");
    }

    #[test]
    fn test_identifiers_are_truncated_by_characters() {
        assert_eq!(truncate_identifier("abcdef", 4), "abcd");
        assert_eq!(truncate_identifier("ab", 4), "ab");
    }

    #[test]
    fn test_mysql_keys_on_text_need_a_prefix() {
        let mysql = MySqlDialect::new();
        assert_eq!(mysql.key_prefix_length("TEXT"), Some(255));
        assert_eq!(mysql.key_prefix_length("LONGBLOB"), Some(255));
        assert_eq!(mysql.key_prefix_length("VARCHAR(40)"), None);
        assert_eq!(mysql.key_prefix_length("JSON"), None);
        assert_eq!(mysql.bounded_key_type("TEXT"), None);
    }

    #[test]
    fn test_sql_server_max_types_are_not_keys() {
        assert_eq!(SqlServerDialect.bounded_key_type("NVARCHAR(MAX)"), Some("NVARCHAR(450)"));
        assert_eq!(SqlServerDialect.bounded_key_type("VARBINARY(MAX)"), Some("VARBINARY(900)"));
        assert_eq!(SqlServerDialect.bounded_key_type("NVARCHAR(40)"), None);

        assert!(!SqlServerDialect.is_index_key_type("NVARCHAR(MAX)"));
        assert!(!SqlServerDialect.is_index_key_type("XML"));
        assert!(SqlServerDialect.is_index_key_type("NVARCHAR(450)"));
        assert_eq!(SqlServerDialect.key_prefix_length("NVARCHAR(MAX)"), None);
    }
}
