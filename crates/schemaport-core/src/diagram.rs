//! Diagram domain model
//!
//! These types mirror the diagram JSON persisted by the modelling front end.
//! The export engine treats them as read-only input: nothing in this
//! workspace mutates a diagram after it has been loaded.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Database dialects a diagram can be authored against or exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// Dialect-agnostic diagram
    Generic,

    /// PostgreSQL
    Postgresql,

    /// MySQL
    Mysql,

    /// Microsoft SQL Server
    Sqlserver,

    /// MariaDB
    Mariadb,

    /// SQLite
    Sqlite,

    /// ClickHouse
    Clickhouse,

    /// CockroachDB
    Cockroachdb,

    /// Oracle
    Oracle,
}

impl DatabaseType {
    /// Every dialect, in declaration order
    pub const ALL: [DatabaseType; 9] = [
        Self::Generic,
        Self::Postgresql,
        Self::Mysql,
        Self::Sqlserver,
        Self::Mariadb,
        Self::Sqlite,
        Self::Clickhouse,
        Self::Cockroachdb,
        Self::Oracle,
    ];

    /// Stable lowercase identifier (matches the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Sqlserver => "sqlserver",
            Self::Mariadb => "mariadb",
            Self::Sqlite => "sqlite",
            Self::Clickhouse => "clickhouse",
            Self::Cockroachdb => "cockroachdb",
            Self::Oracle => "oracle",
        }
    }

    /// Human-readable product name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "Generic SQL",
            Self::Postgresql => "PostgreSQL",
            Self::Mysql => "MySQL",
            Self::Sqlserver => "SQL Server",
            Self::Mariadb => "MariaDB",
            Self::Sqlite => "SQLite",
            Self::Clickhouse => "ClickHouse",
            Self::Cockroachdb => "CockroachDB",
            Self::Oracle => "Oracle",
        }
    }
}

impl Default for DatabaseType {
    fn default() -> Self {
        Self::Generic
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            "mysql" => Ok(Self::Mysql),
            "sqlserver" | "mssql" | "sql server" => Ok(Self::Sqlserver),
            "mariadb" => Ok(Self::Mariadb),
            "sqlite" => Ok(Self::Sqlite),
            "clickhouse" => Ok(Self::Clickhouse),
            "cockroachdb" => Ok(Self::Cockroachdb),
            "oracle" => Ok(Self::Oracle),
            other => Err(DiagramError::UnknownDatabaseType(other.to_string())),
        }
    }
}

/// Relationship end cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// Field data type as stored in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub id: String,
    pub name: String,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase().replace(' ', "_"),
            name,
        }
    }
}

/// Declared character length of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharLength {
    /// An explicit number of characters
    Chars(u32),

    /// The dialect's unbounded variant (`max`)
    Max,
}

/// A column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBField {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: DataType,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default = "default_true")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,

    /// Raw length as written in the source model (`"255"`, `"max"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_maximum_length: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Raw PostgreSQL default expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

fn default_true() -> bool {
    true
}

impl DBField {
    /// Create a nullable, non-key field of the given type
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type: DataType::new(type_name),
            primary_key: false,
            unique: false,
            nullable: true,
            increment: None,
            is_array: None,
            character_maximum_length: None,
            precision: None,
            scale: None,
            default: None,
            comments: None,
        }
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_increment(mut self, increment: bool) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = Some(is_array);
        self
    }

    pub fn with_length(mut self, length: impl Into<String>) -> Self {
        self.character_maximum_length = Some(length.into());
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Type name as written in the diagram
    pub fn type_name(&self) -> &str {
        &self.data_type.name
    }

    /// True when the field holds a PostgreSQL array, either flagged or
    /// spelled with a trailing `[]`
    pub fn is_array(&self) -> bool {
        self.is_array.unwrap_or(false) || self.data_type.name.trim_end().ends_with("[]")
    }

    /// Parsed character length, ignoring values that are neither a number nor `max`
    pub fn char_length(&self) -> Option<CharLength> {
        let raw = self.character_maximum_length.as_deref()?.trim();
        if raw.eq_ignore_ascii_case("max") {
            return Some(CharLength::Max);
        }
        raw.parse::<u32>().ok().filter(|n| *n > 0).map(CharLength::Chars)
    }

    /// Non-blank comment text
    pub fn comment(&self) -> Option<&str> {
        non_blank(self.comments.as_deref())
    }
}

/// A secondary or primary index on a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBIndex {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub field_ids: Vec<String>,

    /// Index access method (`btree`, `gin`, ...)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary_key: Option<bool>,
}

impl DBIndex {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unique: false,
            field_ids,
            index_type: None,
            is_primary_key: None,
        }
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = Some(index_type.into());
        self
    }

    pub fn with_primary_key(mut self, is_primary_key: bool) -> Self {
        self.is_primary_key = Some(is_primary_key);
        self
    }

    /// Lowercase access method, `btree` when unspecified
    pub fn method(&self) -> String {
        match non_blank(self.index_type.as_deref()) {
            Some(method) => method.to_lowercase(),
            None => "btree".to_string(),
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key.unwrap_or(false)
    }
}

/// Table-level CHECK constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DBCheckConstraint {
    pub id: String,
    pub expression: String,
}

/// A table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBTable {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub is_view: bool,

    #[serde(default)]
    pub fields: Vec<DBField>,

    #[serde(default)]
    pub indexes: Vec<DBIndex>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_constraints: Option<Vec<DBCheckConstraint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl DBTable {
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<DBField>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema: None,
            is_view: false,
            fields,
            indexes: Vec::new(),
            check_constraints: None,
            comments: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_view(mut self, is_view: bool) -> Self {
        self.is_view = is_view;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<DBIndex>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_check(mut self, id: impl Into<String>, expression: impl Into<String>) -> Self {
        self.check_constraints
            .get_or_insert_with(Vec::new)
            .push(DBCheckConstraint {
                id: id.into(),
                expression: expression.into(),
            });
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Non-blank schema name
    pub fn schema_name(&self) -> Option<&str> {
        non_blank(self.schema.as_deref())
    }

    /// Non-blank comment text
    pub fn comment(&self) -> Option<&str> {
        non_blank(self.comments.as_deref())
    }

    /// Find a field by id
    pub fn find_field(&self, id: &str) -> Option<&DBField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Primary-key fields in field order
    pub fn primary_key_fields(&self) -> Vec<&DBField> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }

    /// CHECK constraints with a non-blank expression
    pub fn valid_check_constraints(&self) -> impl Iterator<Item = &DBCheckConstraint> {
        self.check_constraints
            .iter()
            .flatten()
            .filter(|c| !c.expression.trim().is_empty())
    }
}

/// A foreign-key style link between two table fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBRelationship {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub source_table_id: String,
    pub source_field_id: String,
    pub target_table_id: String,
    pub target_field_id: String,
    pub source_cardinality: Cardinality,
    pub target_cardinality: Cardinality,
}

impl DBRelationship {
    pub fn new(
        id: impl Into<String>,
        source_table_id: impl Into<String>,
        source_field_id: impl Into<String>,
        target_table_id: impl Into<String>,
        target_field_id: impl Into<String>,
        source_cardinality: Cardinality,
        target_cardinality: Cardinality,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            source_table_id: source_table_id.into(),
            source_field_id: source_field_id.into(),
            target_table_id: target_table_id.into(),
            target_field_id: target_field_id.into(),
            source_cardinality,
            target_cardinality,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Kind of user-defined type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomTypeKind {
    Enum,
    Composite,
}

/// One attribute of a composite type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTypeField {
    pub field: String,

    #[serde(rename = "type")]
    pub field_type: String,
}

/// A user-defined enum or composite type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DBCustomType {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub kind: CustomTypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<CustomTypeField>>,
}

impl DBCustomType {
    pub fn new_enum(id: impl Into<String>, name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema: None,
            kind: CustomTypeKind::Enum,
            values: Some(values),
            fields: None,
        }
    }

    pub fn new_composite(
        id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<CustomTypeField>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema: None,
            kind: CustomTypeKind::Composite,
            values: None,
            fields: Some(fields),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn enum_values(&self) -> &[String] {
        self.values.as_deref().unwrap_or(&[])
    }

    pub fn composite_fields(&self) -> &[CustomTypeField] {
        self.fields.as_deref().unwrap_or(&[])
    }

    /// Whether a field type name refers to this type, with or without schema
    /// qualification
    pub fn matches(&self, type_name: &str) -> bool {
        let wanted = type_name.trim().trim_matches('"');
        if wanted.eq_ignore_ascii_case(&self.name) {
            return true;
        }
        match (wanted.rsplit_once('.'), non_blank(self.schema.as_deref())) {
            (Some((schema, name)), Some(own_schema)) => {
                schema.trim_matches('"').eq_ignore_ascii_case(own_schema)
                    && name.trim_matches('"').eq_ignore_ascii_case(&self.name)
            }
            (Some((_, name)), None) => name.trim_matches('"').eq_ignore_ascii_case(&self.name),
            _ => false,
        }
    }
}

/// Root aggregate of a schema model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub database_type: DatabaseType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<DBTable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<DBRelationship>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_types: Option<Vec<DBCustomType>>,
}

impl Diagram {
    /// Create an empty diagram with table and relationship lists present
    pub fn new(name: impl Into<String>, database_type: DatabaseType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            database_type,
            tables: Some(Vec::new()),
            relationships: Some(Vec::new()),
            custom_types: None,
        }
    }

    pub fn with_tables(mut self, tables: Vec<DBTable>) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<DBRelationship>) -> Self {
        self.relationships = Some(relationships);
        self
    }

    pub fn with_custom_types(mut self, custom_types: Vec<DBCustomType>) -> Self {
        self.custom_types = Some(custom_types);
        self
    }

    /// Load a diagram from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, DiagramError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DiagramError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse a diagram from a JSON string
    pub fn from_json(json: &str) -> Result<Self, DiagramError> {
        serde_json::from_str(json).map_err(|e| DiagramError::ParseError(e.to_string()))
    }

    pub fn tables(&self) -> &[DBTable] {
        self.tables.as_deref().unwrap_or(&[])
    }

    pub fn relationships(&self) -> &[DBRelationship] {
        self.relationships.as_deref().unwrap_or(&[])
    }

    pub fn custom_types(&self) -> &[DBCustomType] {
        self.custom_types.as_deref().unwrap_or(&[])
    }

    /// Find a table by id
    pub fn find_table(&self, id: &str) -> Option<&DBTable> {
        self.tables().iter().find(|t| t.id == id)
    }

    /// Resolve a field type name against the declared custom types
    pub fn find_custom_type(&self, type_name: &str) -> Option<&DBCustomType> {
        self.custom_types().iter().find(|ct| ct.matches(type_name))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Errors raised while loading a diagram
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("Failed to read diagram {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse diagram JSON: {0}")]
    ParseError(String),

    #[error("Unknown database type: {0}")]
    UnknownDatabaseType(String),
}
