//! Field type resolution
//!
//! Resolution is an ordered rule chain; the first rule that applies wins:
//!
//! 1. array columns become the target's JSON-capable type
//! 2. columns typed with a diagram custom type (enum / composite)
//! 3. the static mapping table for the target
//! 4. the target's fallback mapping

use regex::Regex;
use schemaport_core::{CharLength, CustomTypeKind, DBCustomType, DBField, DatabaseType, Diagram};
use schemaport_typemap::{
    get_array_type_mapping, get_composite_type_mapping, get_enum_type_mapping,
    get_fallback_type_mapping, get_type_mapping, normalize_type_name, TypeMapping,
};
use std::sync::LazyLock;

static TYPE_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").unwrap());

const SERIAL_TYPES: &[&str] =
    &["serial", "serial2", "serial4", "serial8", "smallserial", "bigserial"];

/// Which rule produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    Array,
    Enum,
    Composite,
    Table,
    Fallback,
}

/// Target type chosen for one field
#[derive(Debug, Clone)]
pub struct ResolvedType<'a> {
    /// Full target type, size arguments included
    pub sql_type: String,

    /// Mapping record the type was rendered from
    pub mapping: &'static TypeMapping,

    pub origin: TypeOrigin,

    /// Custom type the field refers to, for enum and composite origins
    pub custom_type: Option<&'a DBCustomType>,

    /// Original type text, used in `-- Was:` comments
    pub source_type: String,
}

impl ResolvedType<'_> {
    /// Inline `-- Was: ...` comment, when the mapping asks for one
    pub fn inline_comment(&self) -> Option<String> {
        if !self.mapping.include_inline_comment {
            return None;
        }

        let detail = match (self.origin, self.custom_type) {
            (TypeOrigin::Array, _) => format!("{} (PostgreSQL array)", self.source_type),
            (TypeOrigin::Enum, Some(custom)) => {
                let values: Vec<String> =
                    custom.enum_values().iter().map(|v| format!("'{}'", v)).collect();
                format!("{} (enum: {})", self.source_type, values.join(", "))
            }
            (TypeOrigin::Composite, Some(_)) => format!("{} (composite type)", self.source_type),
            _ => self.source_type.clone(),
        };

        Some(format!("-- Was: {}", single_line(&detail)))
    }

    /// Whether the target type is a large text, binary or JSON type
    ///
    /// MySQL rejects plain literal defaults on these.
    pub fn is_lob(&self) -> bool {
        let upper = self.sql_type.to_uppercase();
        upper.ends_with("TEXT") || upper.ends_with("BLOB") || upper == "JSON"
    }
}

/// Resolve the target type of a field
pub fn resolve_field_type<'a>(
    field: &DBField,
    diagram: &'a Diagram,
    target: DatabaseType,
) -> ResolvedType<'a> {
    let type_name = field.type_name().trim();

    if field.is_array() {
        let element = type_name.trim_end_matches("[]").trim_end();
        let mapping = get_array_type_mapping(target);
        return ResolvedType {
            sql_type: mapping.render(None, None, None),
            mapping,
            origin: TypeOrigin::Array,
            custom_type: None,
            source_type: format!("{}[]", element),
        };
    }

    if let Some(custom) = diagram.find_custom_type(type_name) {
        return resolve_custom_type(custom, type_name, target);
    }

    let (length, precision, scale) = declared_size(field);
    let (mapping, origin) = match get_type_mapping(type_name, target) {
        Some(mapping) => (mapping, TypeOrigin::Table),
        None => (get_fallback_type_mapping(target), TypeOrigin::Fallback),
    };

    ResolvedType {
        sql_type: mapping.render(length, precision, scale),
        mapping,
        origin,
        custom_type: None,
        source_type: type_name.to_string(),
    }
}

fn resolve_custom_type<'a>(
    custom: &'a DBCustomType,
    type_name: &str,
    target: DatabaseType,
) -> ResolvedType<'a> {
    match custom.kind {
        CustomTypeKind::Enum => {
            let mapping = get_enum_type_mapping(target);
            let longest = custom.enum_values().iter().map(|v| v.chars().count()).max().unwrap_or(0);
            let length = mapping
                .default_length
                .filter(|default| *default as usize >= longest)
                .unwrap_or(longest as u32);

            ResolvedType {
                sql_type: mapping.render(Some(CharLength::Chars(length)), None, None),
                mapping,
                origin: TypeOrigin::Enum,
                custom_type: Some(custom),
                source_type: type_name.to_string(),
            }
        }
        CustomTypeKind::Composite => {
            let mapping = get_composite_type_mapping(target);
            ResolvedType {
                sql_type: mapping.render(None, None, None),
                mapping,
                origin: TypeOrigin::Composite,
                custom_type: Some(custom),
                source_type: type_name.to_string(),
            }
        }
    }
}

/// Declared length/precision/scale, from the field attributes or, failing
/// those, from arguments written in the type name (`varchar(40)`)
fn declared_size(field: &DBField) -> (Option<CharLength>, Option<u32>, Option<u32>) {
    let (arg1, arg2) = match TYPE_ARGS.captures(field.type_name()) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()),
            caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
        ),
        None => (None, None),
    };

    let length = field
        .char_length()
        .or_else(|| arg1.filter(|n| *n > 0).map(CharLength::Chars));
    let precision = field.precision.or(arg1);
    let scale = field.scale.or(if field.precision.is_none() { arg2 } else { None });

    (length, precision, scale)
}

/// Whether a field is generated by the database on insert
///
/// Any one of the explicit flag, a serial type name or a `nextval(...)`
/// default is enough.
pub fn is_auto_increment(field: &DBField) -> bool {
    if field.increment.unwrap_or(false) {
        return true;
    }

    let normalized = normalize_type_name(field.type_name());
    if SERIAL_TYPES.contains(&normalized.as_str()) {
        return true;
    }

    field
        .default
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains("nextval"))
}

/// Collapse line breaks so text can sit inside a `--` comment
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
