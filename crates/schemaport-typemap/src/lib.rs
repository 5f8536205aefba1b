//! Static type and index mapping tables
//!
//! Each supported (source, target) pair owns a plain data table keyed by
//! lowercase source type name. Tables are built once per process and never
//! mutated afterwards; lookups are pure.
//!
//! Supported pairs:
//! - PostgreSQL → MySQL (MariaDB shares the MySQL table)
//! - PostgreSQL → SQL Server

pub mod mapping;
mod postgres_mysql;
mod postgres_sqlserver;

pub use mapping::{IndexTypeMapping, TypeMapping};

use schemaport_core::DatabaseType;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Everything known about one target dialect
struct DialectTables {
    types: HashMap<&'static str, TypeMapping>,
    indexes: HashMap<&'static str, IndexTypeMapping>,
    fallback: TypeMapping,
    array: TypeMapping,
    enum_type: TypeMapping,
    composite: TypeMapping,
    index_fallback: IndexTypeMapping,
}

impl DialectTables {
    fn build(
        types: &[(&[&'static str], TypeMapping)],
        indexes: &[(&'static str, IndexTypeMapping)],
        fallback: TypeMapping,
        array: TypeMapping,
        enum_type: TypeMapping,
        composite: TypeMapping,
        index_fallback: IndexTypeMapping,
    ) -> Self {
        let types = types
            .iter()
            .flat_map(|(names, mapping)| names.iter().map(move |name| (*name, *mapping)))
            .collect();

        Self {
            types,
            indexes: indexes.iter().copied().collect(),
            fallback,
            array,
            enum_type,
            composite,
            index_fallback,
        }
    }
}

static POSTGRES_TO_MYSQL: LazyLock<DialectTables> = LazyLock::new(|| {
    DialectTables::build(
        postgres_mysql::TYPES,
        postgres_mysql::INDEXES,
        postgres_mysql::FALLBACK,
        postgres_mysql::ARRAY,
        postgres_mysql::ENUM,
        postgres_mysql::COMPOSITE,
        postgres_mysql::INDEX_FALLBACK,
    )
});

static POSTGRES_TO_SQLSERVER: LazyLock<DialectTables> = LazyLock::new(|| {
    DialectTables::build(
        postgres_sqlserver::TYPES,
        postgres_sqlserver::INDEXES,
        postgres_sqlserver::FALLBACK,
        postgres_sqlserver::ARRAY,
        postgres_sqlserver::ENUM,
        postgres_sqlserver::COMPOSITE,
        postgres_sqlserver::INDEX_FALLBACK,
    )
});

/// Fallback for targets without a dedicated table
const GENERIC_FALLBACK: TypeMapping = TypeMapping::lossy("TEXT", "Unknown type; stored as TEXT");

const GENERIC_INDEX_FALLBACK: IndexTypeMapping = IndexTypeMapping::degraded(
    "BTREE",
    "Index method not supported by the target; default index used",
);

fn tables(target: DatabaseType) -> Option<&'static DialectTables> {
    match target {
        DatabaseType::Mysql | DatabaseType::Mariadb => Some(&*POSTGRES_TO_MYSQL),
        DatabaseType::Sqlserver => Some(&*POSTGRES_TO_SQLSERVER),
        _ => None,
    }
}

/// Canonical lookup key for a PostgreSQL type name
///
/// Lowercases, drops quoting, a `pg_catalog.` prefix and any parenthesised
/// arguments, and collapses whitespace: `"Timestamp(3) With Time Zone"`
/// becomes `timestamp with time zone`.
pub fn normalize_type_name(type_name: &str) -> String {
    let lowered = type_name.trim().to_lowercase().replace('"', "");
    let unqualified = lowered.strip_prefix("pg_catalog.").unwrap_or(&lowered);

    let mut without_args = String::with_capacity(unqualified.len());
    let mut depth = 0usize;
    for ch in unqualified.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => without_args.push(ch),
            _ => {}
        }
    }

    without_args.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Look up the mapping for a source type name
///
/// Returns `None` for names the table does not know, and for targets
/// without a table; callers substitute [`get_fallback_type_mapping`].
pub fn get_type_mapping(source_type: &str, target: DatabaseType) -> Option<&'static TypeMapping> {
    let tables = tables(target)?;
    tables.types.get(normalize_type_name(source_type).as_str())
}

/// Mapping used when [`get_type_mapping`] has no entry; never absent
pub fn get_fallback_type_mapping(target: DatabaseType) -> &'static TypeMapping {
    tables(target).map_or(&GENERIC_FALLBACK, |t| &t.fallback)
}

/// Mapping for any PostgreSQL array column, whatever its element type
pub fn get_array_type_mapping(target: DatabaseType) -> &'static TypeMapping {
    tables(target).map_or(&GENERIC_FALLBACK, |t| &t.array)
}

/// Mapping for columns typed with a user-defined enum
pub fn get_enum_type_mapping(target: DatabaseType) -> &'static TypeMapping {
    tables(target).map_or(&GENERIC_FALLBACK, |t| &t.enum_type)
}

/// Mapping for columns typed with a user-defined composite type
pub fn get_composite_type_mapping(target: DatabaseType) -> &'static TypeMapping {
    tables(target).map_or(&GENERIC_FALLBACK, |t| &t.composite)
}

/// Look up the target index keyword for a PostgreSQL access method
pub fn get_index_type_mapping(
    method: &str,
    target: DatabaseType,
) -> Option<&'static IndexTypeMapping> {
    let tables = tables(target)?;
    tables.indexes.get(method.trim().to_lowercase().as_str())
}

/// Index mapping used for unknown methods; never absent
pub fn get_fallback_index_mapping(target: DatabaseType) -> &'static IndexTypeMapping {
    tables(target).map_or(&GENERIC_INDEX_FALLBACK, |t| &t.index_fallback)
}

/// Index mapping with the fallback applied
pub fn resolve_index_type(method: &str, target: DatabaseType) -> &'static IndexTypeMapping {
    get_index_type_mapping(method, target).unwrap_or_else(|| get_fallback_index_mapping(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaport_core::CharLength;

    const TARGETS: [DatabaseType; 3] =
        [DatabaseType::Mysql, DatabaseType::Mariadb, DatabaseType::Sqlserver];

    fn target_type(source: &str, target: DatabaseType) -> &'static str {
        get_type_mapping(source, target).unwrap().target_type
    }

    #[test]
    fn test_normalizes_type_names() {
        assert_eq!(normalize_type_name("VARCHAR(50)"), "varchar");
        assert_eq!(
            normalize_type_name("  Timestamp(3)  With Time Zone "),
            "timestamp with time zone"
        );
        assert_eq!(normalize_type_name("pg_catalog.\"int4\""), "int4");
        assert_eq!(normalize_type_name("numeric(10, 2)"), "numeric");
    }

    #[test]
    fn test_integer_family_is_lossless() {
        for (source, mysql, mssql) in [
            ("int2", "SMALLINT", "SMALLINT"),
            ("integer", "INT", "INT"),
            ("int", "INT", "INT"),
            ("bigint", "BIGINT", "BIGINT"),
            ("int8", "BIGINT", "BIGINT"),
        ] {
            let m = get_type_mapping(source, DatabaseType::Mysql).unwrap();
            let s = get_type_mapping(source, DatabaseType::Sqlserver).unwrap();
            assert_eq!(m.target_type, mysql);
            assert_eq!(s.target_type, mssql);
            assert!(m.conversion_note.is_none() && s.conversion_note.is_none());
        }
    }

    #[test]
    fn test_serial_family_maps_to_plain_integers() {
        assert_eq!(target_type("serial", DatabaseType::Mysql), "INT");
        assert_eq!(target_type("bigserial", DatabaseType::Sqlserver), "BIGINT");
        assert_eq!(target_type("smallserial", DatabaseType::Mysql), "SMALLINT");
    }

    #[test]
    fn test_decimal_defaults_differ_per_target() {
        let mysql = get_type_mapping("numeric", DatabaseType::Mysql).unwrap();
        let mssql = get_type_mapping("decimal", DatabaseType::Sqlserver).unwrap();

        assert_eq!(mysql.render(None, None, None), "DECIMAL(10,2)");
        assert_eq!(mssql.render(None, None, None), "DECIMAL(18,2)");
        assert_eq!(mssql.render(None, Some(9), Some(3)), "DECIMAL(9,3)");
    }

    #[test]
    fn test_varchar_defaults_to_255() {
        let mysql = get_type_mapping("character varying", DatabaseType::Mysql).unwrap();
        let mssql = get_type_mapping("varchar", DatabaseType::Sqlserver).unwrap();

        assert_eq!(mysql.render(None, None, None), "VARCHAR(255)");
        assert_eq!(mssql.render(None, None, None), "NVARCHAR(255)");
        assert_eq!(mssql.render(Some(CharLength::Chars(5000)), None, None), "NVARCHAR(MAX)");
    }

    #[test]
    fn test_booleans_and_uuids() {
        assert_eq!(target_type("boolean", DatabaseType::Mysql), "TINYINT(1)");
        assert_eq!(target_type("bool", DatabaseType::Sqlserver), "BIT");

        let mysql_uuid = get_type_mapping("uuid", DatabaseType::Mysql).unwrap();
        assert_eq!(mysql_uuid.target_type, "CHAR(36)");
        assert!(mysql_uuid.conversion_note.is_some());

        let mssql_uuid = get_type_mapping("uuid", DatabaseType::Sqlserver).unwrap();
        assert_eq!(mssql_uuid.target_type, "UNIQUEIDENTIFIER");
        assert!(mssql_uuid.conversion_note.is_none());
    }

    #[test]
    fn test_json_family() {
        assert_eq!(target_type("json", DatabaseType::Mysql), "JSON");
        let jsonb = get_type_mapping("jsonb", DatabaseType::Mysql).unwrap();
        assert_eq!(jsonb.target_type, "JSON");
        assert!(jsonb.conversion_note.unwrap().contains("JSONB"));

        assert_eq!(target_type("jsonb", DatabaseType::Sqlserver), "NVARCHAR(MAX)");
    }

    #[test]
    fn test_types_without_equivalent_are_flagged() {
        let sources = [
            "interval", "tsvector", "tsquery", "int4range", "inet", "cidr", "polygon", "oid",
            "regclass",
        ];
        for source in sources {
            for target in TARGETS {
                let mapping = get_type_mapping(source, target).unwrap();
                assert!(mapping.include_inline_comment, "{} -> {:?}", source, target);
                assert!(mapping.conversion_note.is_some(), "{} -> {:?}", source, target);
            }
        }

        let money = get_type_mapping("money", DatabaseType::Mysql).unwrap();
        assert!(money.include_inline_comment);
        assert_eq!(money.render(None, None, None), "DECIMAL(19,4)");
        assert!(get_type_mapping("xml", DatabaseType::Mysql).unwrap().include_inline_comment);
    }

    #[test]
    fn test_fallback_is_total() {
        for target in DatabaseType::ALL {
            assert!(get_type_mapping("definitely_not_a_type", target).is_none());
            let fallback = get_fallback_type_mapping(target);
            assert!(fallback.include_inline_comment);
            assert!(fallback.conversion_note.is_some());
        }
    }

    #[test]
    fn test_lookups_are_idempotent() {
        for target in TARGETS {
            for (names, _) in postgres_mysql::TYPES {
                for name in *names {
                    assert_eq!(get_type_mapping(name, target), get_type_mapping(name, target));
                    let mapping = get_type_mapping(name, target);
                    assert!(mapping.is_some(), "{} missing for {:?}", name, target);
                }
            }
        }
    }

    #[test]
    fn test_index_methods() {
        assert_eq!(resolve_index_type("btree", DatabaseType::Mysql).target_type, "BTREE");
        assert!(resolve_index_type("btree", DatabaseType::Mysql).note.is_none());

        let gin = resolve_index_type("GIN", DatabaseType::Mysql);
        assert_eq!(gin.target_type, "BTREE");
        assert!(gin.note.unwrap().contains("GIN index downgraded to BTREE"));

        let gist = resolve_index_type("gist", DatabaseType::Sqlserver);
        assert_eq!(gist.target_type, "NONCLUSTERED");
        assert!(gist.note.unwrap().contains("GiST index downgraded to NONCLUSTERED"));

        assert!(get_index_type_mapping("bloom", DatabaseType::Mysql).is_none());
        assert!(resolve_index_type("bloom", DatabaseType::Sqlserver).note.is_some());
    }
}
