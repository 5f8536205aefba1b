//! PostgreSQL → SQL Server type table

use crate::mapping::{IndexTypeMapping, TypeMapping};

pub(crate) const FALLBACK: TypeMapping = TypeMapping::lossy(
    "NVARCHAR(MAX)",
    "Unknown PostgreSQL type; stored as NVARCHAR(MAX)",
);

pub(crate) const ARRAY: TypeMapping = TypeMapping::lossy(
    "NVARCHAR(MAX)",
    "PostgreSQL array stored as a JSON string; query elements with OPENJSON",
);

pub(crate) const COMPOSITE: TypeMapping = TypeMapping::lossy(
    "NVARCHAR(MAX)",
    "Composite type stored as a JSON string; attribute types are not enforced",
);

pub(crate) const ENUM: TypeMapping = TypeMapping::lossy(
    "NVARCHAR",
    "Enum type stored as NVARCHAR; allowed values are not enforced",
)
.sized(255, 4000, "NVARCHAR(MAX)");

pub(crate) const TYPES: &[(&[&str], TypeMapping)] = &[
    // Integers
    (&["int2", "smallint"], TypeMapping::native("SMALLINT")),
    (&["int", "int4", "integer"], TypeMapping::native("INT")),
    (&["int8", "bigint"], TypeMapping::native("BIGINT")),
    (&["smallserial", "serial2"], TypeMapping::native("SMALLINT")),
    (&["serial", "serial4"], TypeMapping::native("INT")),
    (&["bigserial", "serial8"], TypeMapping::native("BIGINT")),

    // Exact and approximate numerics
    (&["decimal", "numeric"], TypeMapping::native("DECIMAL").exact(18, 2, 38)),
    (&["real", "float4"], TypeMapping::native("REAL")),
    (&["double precision", "float8", "float"], TypeMapping::native("FLOAT")),
    (&["money"], TypeMapping::native("MONEY")),

    // Boolean
    (&["bool", "boolean"], TypeMapping::native("BIT")),

    // Character types
    (
        &["char", "character", "bpchar"],
        TypeMapping::native("NCHAR").sized(1, 4000, "NVARCHAR(MAX)"),
    ),
    (
        &["varchar", "character varying"],
        TypeMapping::native("NVARCHAR").sized(255, 4000, "NVARCHAR(MAX)"),
    ),
    (&["text"], TypeMapping::native("NVARCHAR(MAX)")),
    (
        &["citext"],
        TypeMapping::noted(
            "NVARCHAR",
            "citext relies on the column collation for case-insensitive comparison",
        )
        .sized(255, 4000, "NVARCHAR(MAX)"),
    ),
    (&["name"], TypeMapping::native("NVARCHAR(128)")),

    // Binary
    (&["bytea"], TypeMapping::native("VARBINARY(MAX)")),
    (&["bit"], TypeMapping::native("BIT")),
    (
        &["varbit", "bit varying"],
        TypeMapping::lossy(
            "VARBINARY(MAX)",
            "bit varying stored as raw bytes; bit string operators are lost",
        ),
    ),

    // Date and time
    (&["date"], TypeMapping::native("DATE")),
    (&["time", "time without time zone"], TypeMapping::native("TIME")),
    (
        &["timetz", "time with time zone"],
        TypeMapping::lossy(
            "DATETIMEOFFSET",
            "time with time zone stored as DATETIMEOFFSET with a placeholder date",
        ),
    ),
    (&["timestamp", "timestamp without time zone"], TypeMapping::native("DATETIME2")),
    (&["timestamptz", "timestamp with time zone"], TypeMapping::native("DATETIMEOFFSET")),
    (
        &["interval"],
        TypeMapping::lossy(
            "NVARCHAR(255)",
            "interval stored as text; interval arithmetic is unavailable",
        ),
    ),

    // Identifiers and documents
    (&["uuid"], TypeMapping::native("UNIQUEIDENTIFIER")),
    (
        &["json"],
        TypeMapping::lossy(
            "NVARCHAR(MAX)",
            "JSON stored as text; validate with ISJSON and query with JSON_VALUE",
        ),
    ),
    (
        &["jsonb"],
        TypeMapping::lossy(
            "NVARCHAR(MAX)",
            "JSONB stored as text; binary storage and GIN-indexable operators are lost",
        ),
    ),
    (
        &["hstore"],
        TypeMapping::lossy("NVARCHAR(MAX)", "hstore key/value pairs stored as a JSON string"),
    ),
    (&["xml"], TypeMapping::native("XML")),

    // Full-text search
    (
        &["tsvector", "tsquery"],
        TypeMapping::lossy(
            "NVARCHAR(MAX)",
            "Full-text search type stored as text; use a SQL Server full-text index instead",
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
            "NVARCHAR(255)",
            "Range type stored as text; containment and overlap operators are unavailable",
        ),
    ),

    // Network addresses
    (
        &["inet", "cidr"],
        TypeMapping::lossy(
            "NVARCHAR(45)",
            "Network address stored as text; subnet operators are unavailable",
        ),
    ),
    (&["macaddr"], TypeMapping::lossy("NVARCHAR(17)", "MAC address stored as text")),
    (&["macaddr8"], TypeMapping::lossy("NVARCHAR(23)", "MAC address stored as text")),

    // Geometry
    (
        &["point", "line", "lseg", "box", "path", "polygon", "circle"],
        TypeMapping::lossy(
            "GEOMETRY",
            "Geometric type stored as GEOMETRY; PostgreSQL operators differ",
        ),
    ),

    // System types
    (
        &["oid", "xid", "cid"],
        TypeMapping::lossy("BIGINT", "PostgreSQL system identifier stored as a plain integer"),
    ),
    (
        &[
            "regclass", "regproc", "regprocedure", "regoper", "regoperator", "regtype",
            "regnamespace", "regrole", "regconfig", "regdictionary", "regcollation",
        ],
        TypeMapping::lossy("NVARCHAR(255)", "PostgreSQL catalog reference stored as its text name"),
    ),
    (&["tid"], TypeMapping::lossy("NVARCHAR(32)", "PostgreSQL tuple identifier stored as text")),
    (&["pg_lsn"], TypeMapping::lossy("NVARCHAR(32)", "Log sequence number stored as text")),
];

pub(crate) const INDEX_FALLBACK: IndexTypeMapping =
    IndexTypeMapping::degraded("NONCLUSTERED", "Unknown index method downgraded to NONCLUSTERED");

pub(crate) const INDEXES: &[(&str, IndexTypeMapping)] = &[
    ("btree", IndexTypeMapping::native("NONCLUSTERED")),
    (
        "hash",
        IndexTypeMapping::degraded(
            "NONCLUSTERED",
            "HASH index downgraded to NONCLUSTERED; hash indexes require memory-optimized tables",
        ),
    ),
    (
        "gin",
        IndexTypeMapping::degraded(
            "NONCLUSTERED",
            "GIN index downgraded to NONCLUSTERED; consider a full-text index",
        ),
    ),
    (
        "gist",
        IndexTypeMapping::degraded(
            "NONCLUSTERED",
            "GiST index downgraded to NONCLUSTERED; consider a spatial index",
        ),
    ),
    (
        "spgist",
        IndexTypeMapping::degraded("NONCLUSTERED", "SP-GiST index downgraded to NONCLUSTERED"),
    ),
    (
        "brin",
        IndexTypeMapping::degraded(
            "NONCLUSTERED",
            "BRIN index downgraded to NONCLUSTERED; consider a columnstore index",
        ),
    ),
];
