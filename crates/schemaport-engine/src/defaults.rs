//! PostgreSQL default-expression conversion
//!
//! Rewrites are applied in a fixed order: sequence defaults are dropped,
//! array literals become JSON arrays, casts are stripped, then well-known
//! functions and literals are translated. String literals are re-quoted for
//! the target; anything left over is passed through when it already looks
//! like SQL, or quoted as a string.

use crate::dialect::SqlDialect;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^::\s*(?:"[^"]+"|[A-Za-z_][\w.]*)"#,
        r"(?:\s+(?:varying|precision|with(?:out)?\s+time\s+zone))*",
        r"(?:\s*\(\s*\d+(?:\s*,\s*\d+)?\s*\))?",
        r"(?:\s*\[\s*\])*",
    ))
    .unwrap()
});

static ARRAY_TEXT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'\{(.*)\}'\s*::.*\[\s*\]\s*$").unwrap());

static ARRAY_CONSTRUCTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^ARRAY\s*\[(.*)\](?:\s*::.*)?$").unwrap());

static NOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:now\(\)",
        r"|current_timestamp(?:\(\s*\d*\s*\))?",
        r"|localtimestamp(?:\(\s*\d*\s*\))?",
        r"|transaction_timestamp\(\)|statement_timestamp\(\)|clock_timestamp\(\)",
        r"|'now')$",
    ))
    .unwrap()
});

static TODAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:current_date|'today')$").unwrap());

static UUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:gen_random_uuid|uuid_generate_\w+)\s*\(.*\)$").unwrap());

static BUILD_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^jsonb?_build_object\s*\((.*)\)$").unwrap());

static BUILD_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\w*_build_array\s*\((.*)\)$").unwrap());

static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^[A-Za-z_][\w.]*\s*\(.*\)$").unwrap());

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").unwrap());

static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^'.*'$").unwrap());

const KEYWORDS: &[&str] = &[
    "NULL",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "SESSION_USER",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "DEFAULT",
];

/// Note attached to array literals rewritten as JSON
pub const ARRAY_LITERAL_NOTE: &str = "Array default re-encoded as a JSON array literal";

/// Note attached to JSON builder calls whose arguments were dropped
pub const JSON_BUILDER_NOTE: &str =
    "JSON builder default collapsed to an empty literal; its arguments are dropped";

/// Result of converting one default expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDefault {
    /// Target expression, or `None` when the default is dropped
    pub sql: Option<String>,

    /// Set when the rewrite lost information
    pub note: Option<&'static str>,
}

impl ConvertedDefault {
    fn dropped() -> Self {
        Self { sql: None, note: None }
    }

    fn exact(sql: impl Into<String>) -> Self {
        Self { sql: Some(sql.into()), note: None }
    }

    fn lossy(sql: impl Into<String>, note: &'static str) -> Self {
        Self { sql: Some(sql.into()), note: Some(note) }
    }
}

/// Convert a PostgreSQL default expression for the dialect
pub fn convert_default(raw: &str, dialect: &dyn SqlDialect) -> ConvertedDefault {
    let raw = raw.trim();
    if raw.is_empty() || raw.to_lowercase().contains("nextval(") {
        return ConvertedDefault::dropped();
    }

    if let Some(converted) = convert_array_literal(raw, dialect) {
        return converted;
    }

    let uncast = strip_casts(raw);
    let stripped = strip_outer_parens(uncast.trim());
    if stripped.is_empty() {
        return ConvertedDefault::dropped();
    }

    if NOW.is_match(stripped) {
        return ConvertedDefault::exact(dialect.current_timestamp());
    }
    if TODAY.is_match(stripped) {
        return ConvertedDefault::exact(dialect.current_date());
    }
    if UUID.is_match(stripped) {
        return ConvertedDefault::exact(dialect.random_uuid());
    }
    if let Some(caps) = BUILD_OBJECT.captures(stripped) {
        return json_builder(dialect.json_literal("{}"), &caps[1]);
    }
    if let Some(caps) = BUILD_ARRAY.captures(stripped) {
        return json_builder(dialect.json_literal("[]"), &caps[1]);
    }

    match stripped.to_lowercase().as_str() {
        "true" => return ConvertedDefault::exact(dialect.boolean_literal(true)),
        "false" => return ConvertedDefault::exact(dialect.boolean_literal(false)),
        _ => {}
    }

    if let Some(text) = quoted_literal(stripped) {
        return ConvertedDefault::exact(dialect.string_literal(&text));
    }

    if FUNCTION_CALL.is_match(stripped)
        || KEYWORDS.contains(&stripped.to_uppercase().as_str())
        || QUOTED.is_match(stripped)
        || NUMBER.is_match(stripped)
    {
        return ConvertedDefault::exact(stripped);
    }

    ConvertedDefault::exact(dialect.string_literal(stripped))
}

fn json_builder(literal: String, args: &str) -> ConvertedDefault {
    if args.trim().is_empty() {
        ConvertedDefault::exact(literal)
    } else {
        ConvertedDefault::lossy(literal, JSON_BUILDER_NOTE)
    }
}

/// `'{a,b}'::text[]` and `ARRAY['a','b']` become a JSON array document
fn convert_array_literal(raw: &str, dialect: &dyn SqlDialect) -> Option<ConvertedDefault> {
    // Elements of a text literal are plain text, so `::` inside them is kept
    let (body, quote, has_casts) = if let Some(caps) = ARRAY_TEXT_LITERAL.captures(raw) {
        (caps.get(1)?.as_str(), '"', false)
    } else if let Some(caps) = ARRAY_CONSTRUCTOR.captures(raw) {
        (caps.get(1)?.as_str(), '\'', true)
    } else {
        return None;
    };

    let elements: Vec<Value> = split_elements(body)
        .into_iter()
        .map(|element| if has_casts { strip_casts(&element) } else { element })
        .map(|element| element_value(&element, quote))
        .collect();

    let json = Value::Array(elements).to_string();
    let literal = dialect.json_literal(&json);

    Some(if json == "[]" {
        ConvertedDefault::exact(literal)
    } else {
        ConvertedDefault::lossy(literal, ARRAY_LITERAL_NOTE)
    })
}

/// Split on top-level commas, leaving quoted commas alone
fn split_elements(body: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;

    for ch in body.chars() {
        match (ch, in_quote) {
            ('\'' | '"', None) => {
                in_quote = Some(ch);
                current.push(ch);
            }
            (c, Some(q)) if c == q => {
                in_quote = None;
                current.push(ch);
            }
            (',', None) => elements.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    elements.push(current);

    elements
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn element_value(element: &str, quote: char) -> Value {
    let element = element.trim();

    let is_quoted = element.len() >= 2 && element.starts_with(quote) && element.ends_with(quote);
    if is_quoted {
        let inner = &element[1..element.len() - 1];
        let doubled = format!("{}{}", quote, quote);
        return Value::String(inner.replace(&doubled, &quote.to_string()));
    }

    if element.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if element.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if element.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if NUMBER.is_match(element) {
        if let Ok(n) = element.parse::<i64>() {
            return Value::from(n);
        }
        if let Some(n) = element.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(element.to_string())
}

/// Drop `::type` casts that sit outside quotes
fn strip_casts(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut in_quote: Option<char> = None;
    let mut rest = expr;

    while let Some(ch) = rest.chars().next() {
        match in_quote {
            Some(q) if ch == q => in_quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => in_quote = Some(ch),
            None => {
                if let Some(cast) = CAST.find(rest) {
                    rest = &rest[cast.end()..];
                    continue;
                }
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Text of an expression that is exactly one `'...'` literal
fn quoted_literal(expr: &str) -> Option<String> {
    let inner = expr.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        // A lone quote ends the literal early, as in `'a' || 'b'`
        if ch == '\'' && chars.next() != Some('\'') {
            return None;
        }
        text.push(ch);
    }
    Some(text)
}

/// Remove parentheses wrapping the whole expression, e.g. `('a')`
fn strip_outer_parens(mut expr: &str) -> &str {
    while expr.starts_with('(') && expr.ends_with(')') && wraps_whole(expr) {
        expr = expr[1..expr.len() - 1].trim();
    }
    expr
}

fn wraps_whole(expr: &str) -> bool {
    let mut depth = 0i32;
    let mut in_quote = false;
    let last = expr.len() - 1;

    for (i, ch) in expr.char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, SqlServerDialect};

    fn mysql(raw: &str) -> Option<String> {
        convert_default(raw, &MySqlDialect::new()).sql
    }

    fn mssql(raw: &str) -> Option<String> {
        convert_default(raw, &SqlServerDialect).sql
    }

    #[test]
    fn test_sequence_defaults_are_dropped() {
        assert_eq!(mysql("nextval('users_id_seq'::regclass)"), None);
        assert_eq!(mssql("NEXTVAL('seq')"), None);
        assert_eq!(mysql("   "), None);
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(mysql("now()").as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(mysql("CURRENT_TIMESTAMP").as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(mssql("now()").as_deref(), Some("GETDATE()"));
        assert_eq!(
            mssql("('now'::text)::timestamp without time zone").as_deref(),
            Some("GETDATE()")
        );
        assert_eq!(mysql("current_date").as_deref(), Some("(CURRENT_DATE)"));
        assert_eq!(mssql("CURRENT_DATE").as_deref(), Some("CAST(GETDATE() AS DATE)"));
    }

    #[test]
    fn test_uuids() {
        assert_eq!(mysql("gen_random_uuid()").as_deref(), Some("(UUID())"));
        assert_eq!(mssql("gen_random_uuid()").as_deref(), Some("NEWID()"));
        assert_eq!(mssql("uuid_generate_v4()").as_deref(), Some("NEWID()"));
    }

    #[test]
    fn test_json_builders() {
        assert_eq!(mysql("json_build_object()").as_deref(), Some("('{}')"));
        assert_eq!(mssql("jsonb_build_object()").as_deref(), Some("N'{}'"));
        assert_eq!(mysql("jsonb_build_array()").as_deref(), Some("('[]')"));

        let lossy = convert_default("jsonb_build_object('a', 1)", &MySqlDialect::new());
        assert_eq!(lossy.sql.as_deref(), Some("('{}')"));
        assert_eq!(lossy.note, Some(JSON_BUILDER_NOTE));
    }

    #[test]
    fn test_array_literals_become_json() {
        assert_eq!(mysql("'{}'::text[]").as_deref(), Some("('[]')"));
        assert_eq!(mssql("'{}'::integer[]").as_deref(), Some("N'[]'"));

        let tags = convert_default("'{a,\"b c\"}'::character varying[]", &MySqlDialect::new());
        assert_eq!(tags.sql.as_deref(), Some(r#"('["a","b c"]')"#));
        assert_eq!(tags.note, Some(ARRAY_LITERAL_NOTE));

        assert_eq!(mysql("ARRAY[1, 2, 3]").as_deref(), Some("('[1,2,3]')"));
        assert_eq!(
            mssql("ARRAY['x'::text, 'y''z'::text]").as_deref(),
            Some(r#"N'["x","y''z"]'"#)
        );
    }

    #[test]
    fn test_array_elements_keep_quoted_double_colons() {
        assert_eq!(mysql("ARRAY['a::b'::text]").as_deref(), Some(r#"('["a::b"]')"#));
        assert_eq!(mysql("'{a::b}'::text[]").as_deref(), Some(r#"('["a::b"]')"#));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(mysql("true").as_deref(), Some("true"));
        assert_eq!(mssql("true").as_deref(), Some("1"));
        assert_eq!(mssql("FALSE").as_deref(), Some("0"));
        assert_eq!(mssql("false::boolean").as_deref(), Some("0"));
    }

    #[test]
    fn test_casts_are_stripped() {
        assert_eq!(mysql("'active'::character varying").as_deref(), Some("'active'"));
        assert_eq!(mssql("'0.00'::numeric(10,2)").as_deref(), Some("N'0.00'"));
        assert_eq!(mysql("42::bigint").as_deref(), Some("42"));
        assert_eq!(mysql("('a'::text || 'b'::text)").as_deref(), Some("'a' || 'b'"));
    }

    #[test]
    fn test_casts_inside_literals_are_kept() {
        assert_eq!(mysql("'a::b'::text").as_deref(), Some("'a::b'"));
        assert_eq!(mysql("'x::int'").as_deref(), Some("'x::int'"));
        assert_eq!(mssql("'x::int'").as_deref(), Some("N'x::int'"));
    }

    #[test]
    fn test_string_literals_are_requoted_for_the_target() {
        assert_eq!(mssql("'pending'::order_status").as_deref(), Some("N'pending'"));
        assert_eq!(mssql("'it''s'").as_deref(), Some("N'it''s'"));
        assert_eq!(mysql("'it''s'").as_deref(), Some("'it''s'"));
        assert_eq!(mysql(r"'C:\tmp'").as_deref(), Some(r"'C:\\tmp'"));
    }

    #[test]
    fn test_passthrough_and_quoting() {
        assert_eq!(mysql("0").as_deref(), Some("0"));
        assert_eq!(mysql("-1.5").as_deref(), Some("-1.5"));
        assert_eq!(mysql("NULL").as_deref(), Some("NULL"));
        assert_eq!(mysql("'draft'").as_deref(), Some("'draft'"));
        assert_eq!(mysql("lower('X')").as_deref(), Some("lower('X')"));
        assert_eq!(mysql("draft").as_deref(), Some("'draft'"));
        assert_eq!(mssql("it's").as_deref(), Some("N'it''s'"));
    }

    #[test]
    fn test_outer_parens() {
        assert_eq!(strip_outer_parens("(('a'))"), "'a'");
        assert_eq!(strip_outer_parens("(a) + (b)"), "(a) + (b)");
    }
}
