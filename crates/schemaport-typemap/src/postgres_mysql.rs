//! PostgreSQL → MySQL/MariaDB type table

use crate::mapping::{IndexTypeMapping, TypeMapping};

pub(crate) const FALLBACK: TypeMapping = TypeMapping::lossy(
    "TEXT",
    "Unknown PostgreSQL type; stored as TEXT",
);

pub(crate) const ARRAY: TypeMapping = TypeMapping::lossy(
    "JSON",
    "PostgreSQL array stored as a JSON array; \
     array operators and element constraints are unavailable",
);

pub(crate) const COMPOSITE: TypeMapping = TypeMapping::lossy(
    "JSON",
    "Composite type stored as a JSON object; attribute types are not enforced",
);

pub(crate) const ENUM: TypeMapping = TypeMapping::lossy(
    "VARCHAR",
    "Enum type stored as VARCHAR; allowed values are not enforced",
)
.sized(255, 65535, "TEXT");

pub(crate) const TYPES: &[(&[&str], TypeMapping)] = &[
    // Integers
    (&["int2", "smallint"], TypeMapping::native("SMALLINT")),
    (&["int", "int4", "integer"], TypeMapping::native("INT")),
    (&["int8", "bigint"], TypeMapping::native("BIGINT")),
    (&["smallserial", "serial2"], TypeMapping::native("SMALLINT")),
    (&["serial", "serial4"], TypeMapping::native("INT")),
    (&["bigserial", "serial8"], TypeMapping::native("BIGINT")),

    // Exact and approximate numerics
    (&["decimal", "numeric"], TypeMapping::native("DECIMAL").exact(10, 2, 65)),
    (&["real", "float4"], TypeMapping::native("FLOAT")),
    (&["double precision", "float8", "float"], TypeMapping::native("DOUBLE")),
    (
        &["money"],
        TypeMapping::lossy(
            "DECIMAL",
            "money stored as DECIMAL(19,4); currency formatting and locale rules are lost",
        )
        .exact(19, 4, 65),
    ),

    // Boolean
    (&["bool", "boolean"], TypeMapping::native("TINYINT(1)")),

    // Character types
    (&["char", "character", "bpchar"], TypeMapping::native("CHAR").sized(1, 255, "TEXT")),
    (
        &["varchar", "character varying"],
        TypeMapping::native("VARCHAR").sized(255, 65535, "LONGTEXT"),
    ),
    (&["text"], TypeMapping::native("TEXT")),
    (
        &["citext"],
        TypeMapping::noted(
            "VARCHAR",
            "citext relies on the column collation for case-insensitive comparison",
        )
        .sized(255, 65535, "LONGTEXT"),
    ),
    (&["name"], TypeMapping::native("VARCHAR(63)")),

    // Binary
    (&["bytea"], TypeMapping::native("LONGBLOB")),
    (&["bit"], TypeMapping::native("BIT").sized(1, 64, "VARBINARY(255)")),
    (
        &["varbit", "bit varying"],
        TypeMapping::lossy(
            "VARBINARY(255)",
            "bit varying stored as raw bytes; bit string operators are lost",
        ),
    ),

    // Date and time
    (&["date"], TypeMapping::native("DATE")),
    (&["time", "time without time zone"], TypeMapping::native("TIME")),
    (
        &["timetz", "time with time zone"],
        TypeMapping::lossy("TIME", "time with time zone loses its UTC offset"),
    ),
    (&["timestamp", "timestamp without time zone"], TypeMapping::native("DATETIME")),
    (
        &["timestamptz", "timestamp with time zone"],
        TypeMapping::lossy(
            "DATETIME",
            "timestamp with time zone loses its offset; store values as UTC",
        ),
    ),
    (
        &["interval"],
        TypeMapping::lossy(
            "VARCHAR(255)",
            "interval stored as text; interval arithmetic is unavailable",
        ),
    ),

    // Identifiers and documents
    (
        &["uuid"],
        TypeMapping::noted(
            "CHAR(36)",
            "UUID stored as CHAR(36) text instead of a native 16-byte value",
        ),
    ),
    (&["json"], TypeMapping::native("JSON")),
    (
        &["jsonb"],
        TypeMapping::noted(
            "JSON",
            "JSONB binary storage and GIN-indexable operators are lost; stored as JSON",
        ),
    ),
    (
        &["hstore"],
        TypeMapping::lossy("JSON", "hstore key/value pairs stored as a JSON object"),
    ),
    (
        &["xml"],
        TypeMapping::lossy(
            "LONGTEXT",
            "XML stored as text; XML validation and XPath functions are unavailable",
        ),
    ),

    // Full-text search
    (
        &["tsvector", "tsquery"],
        TypeMapping::lossy(
            "LONGTEXT",
            "Full-text search type stored as text; use a FULLTEXT index instead",
        ),
    ),

    // Ranges
    (
        &[
            "int4range", "int8range", "numrange", "tsrange", "tstzrange", "daterange",
            "int4multirange", "int8multirange", "nummultirange",
            "tsmultirange", "tstzmultirange", "datemultirange",
        ],
        TypeMapping::lossy(
            "VARCHAR(255)",
            "Range type stored as text; containment and overlap operators are unavailable",
        ),
    ),

    // Network addresses
    (
        &["inet", "cidr"],
        TypeMapping::lossy(
            "VARCHAR(43)",
            "Network address stored as text; subnet operators are unavailable",
        ),
    ),
    (&["macaddr"], TypeMapping::lossy("VARCHAR(17)", "MAC address stored as text")),
    (&["macaddr8"], TypeMapping::lossy("VARCHAR(23)", "MAC address stored as text")),

    // Geometry
    (
        &["point"],
        TypeMapping::lossy(
            "POINT",
            "Geometric point stored as a spatial POINT; PostgreSQL operators differ",
        ),
    ),
    (
        &["line", "lseg", "path"],
        TypeMapping::lossy(
            "LINESTRING",
            "Geometric type stored as a spatial LINESTRING; PostgreSQL operators differ",
        ),
    ),
    (
        &["box", "polygon"],
        TypeMapping::lossy(
            "POLYGON",
            "Geometric type stored as a spatial POLYGON; PostgreSQL operators differ",
        ),
    ),
    (&["circle"], TypeMapping::lossy("TEXT", "circle has no spatial equivalent; stored as text")),

    // System types
    (
        &["oid", "xid", "cid"],
        TypeMapping::lossy(
            "INT UNSIGNED",
            "PostgreSQL system identifier stored as a plain integer",
        ),
    ),
    (
        &[
            "regclass", "regproc", "regprocedure", "regoper", "regoperator", "regtype",
            "regnamespace", "regrole", "regconfig", "regdictionary", "regcollation",
        ],
        TypeMapping::lossy("VARCHAR(255)", "PostgreSQL catalog reference stored as its text name"),
    ),
    (&["tid"], TypeMapping::lossy("VARCHAR(32)", "PostgreSQL tuple identifier stored as text")),
    (&["pg_lsn"], TypeMapping::lossy("VARCHAR(32)", "Log sequence number stored as text")),
];

pub(crate) const INDEX_FALLBACK: IndexTypeMapping =
    IndexTypeMapping::degraded("BTREE", "Unknown index method downgraded to BTREE");

pub(crate) const INDEXES: &[(&str, IndexTypeMapping)] = &[
    ("btree", IndexTypeMapping::native("BTREE")),
    (
        "hash",
        IndexTypeMapping::degraded(
            "HASH",
            "HASH index is only honoured by the MEMORY engine; InnoDB builds a BTREE",
        ),
    ),
    (
        "gin",
        IndexTypeMapping::degraded(
            "BTREE",
            "GIN index downgraded to BTREE; containment and full-text lookups will not use it",
        ),
    ),
    (
        "gist",
        IndexTypeMapping::degraded(
            "BTREE",
            "GiST index downgraded to BTREE; geometric and range lookups will not use it",
        ),
    ),
    (
        "spgist",
        IndexTypeMapping::degraded("BTREE", "SP-GiST index downgraded to BTREE"),
    ),
    (
        "brin",
        IndexTypeMapping::degraded(
            "BTREE",
            "BRIN index downgraded to BTREE; expect a larger index",
        ),
    ),
];
