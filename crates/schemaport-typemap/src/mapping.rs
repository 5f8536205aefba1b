//! Mapping records and sized-type rendering

use schemaport_core::CharLength;

/// How one source type name lands on a target dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type, without length/precision arguments for sized types
    pub target_type: &'static str,

    /// Human-readable description of what is lost, if anything
    pub conversion_note: Option<&'static str>,

    /// Whether rendered columns carry a `-- Was: <type>` comment
    pub include_inline_comment: bool,

    /// Length used when the field declares none (sized string/binary types)
    pub default_length: Option<u32>,

    /// Precision used when the field declares none (exact numerics)
    pub default_precision: Option<u32>,

    /// Scale used when the field declares neither precision nor scale
    pub default_scale: Option<u32>,

    /// Largest length or precision the target accepts for this type
    pub max_size: Option<u32>,

    /// Type used when the declared length is `max` or above `max_size`
    pub overflow_type: Option<&'static str>,
}

impl TypeMapping {
    /// A lossless 1:1 mapping
    pub const fn native(target_type: &'static str) -> Self {
        Self {
            target_type,
            conversion_note: None,
            include_inline_comment: false,
            default_length: None,
            default_precision: None,
            default_scale: None,
            max_size: None,
            overflow_type: None,
        }
    }

    /// A mapping that loses behaviour and must be visible in the DDL
    pub const fn lossy(target_type: &'static str, note: &'static str) -> Self {
        let mut mapping = Self::native(target_type);
        mapping.conversion_note = Some(note);
        mapping.include_inline_comment = true;
        mapping
    }

    /// A mapping worth reporting that does not need an inline comment
    pub const fn noted(target_type: &'static str, note: &'static str) -> Self {
        let mut mapping = Self::native(target_type);
        mapping.conversion_note = Some(note);
        mapping
    }

    /// Make this a length-parameterised type
    pub const fn sized(
        mut self,
        default_length: u32,
        max_size: u32,
        overflow_type: &'static str,
    ) -> Self {
        self.default_length = Some(default_length);
        self.max_size = Some(max_size);
        self.overflow_type = Some(overflow_type);
        self
    }

    /// Make this a precision/scale-parameterised type
    pub const fn exact(mut self, precision: u32, scale: u32, max_precision: u32) -> Self {
        self.default_precision = Some(precision);
        self.default_scale = Some(scale);
        self.max_size = Some(max_precision);
        self
    }

    /// Render the full target type for a field's declared size
    ///
    /// Declared values win over defaults; lengths beyond `max_size` switch
    /// to `overflow_type` and precisions beyond it are clamped.
    pub fn render(
        &self,
        length: Option<CharLength>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> String {
        if let Some(default_length) = self.default_length {
            let overflow = self.overflow_type.unwrap_or(self.target_type);
            return match length {
                Some(CharLength::Max) => overflow.to_string(),
                Some(CharLength::Chars(n)) if self.max_size.is_some_and(|max| n > max) => {
                    overflow.to_string()
                }
                Some(CharLength::Chars(n)) => format!("{}({})", self.target_type, n),
                None => format!("{}({})", self.target_type, default_length),
            };
        }

        if let Some(default_precision) = self.default_precision {
            let (p, s) = match precision {
                Some(p) if p > 0 => (p, scale.unwrap_or(0)),
                _ => (default_precision, scale.or(self.default_scale).unwrap_or(0)),
            };
            let p = self.max_size.map_or(p, |max| p.min(max));
            return format!("{}({},{})", self.target_type, p, s.min(p));
        }

        self.target_type.to_string()
    }
}

/// How one index access method lands on a target dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTypeMapping {
    /// Target index keyword (`BTREE`, `HASH`, `NONCLUSTERED`)
    pub target_type: &'static str,

    /// Degradation note, when the method is not preserved
    pub note: Option<&'static str>,
}

impl IndexTypeMapping {
    pub const fn native(target_type: &'static str) -> Self {
        Self { target_type, note: None }
    }

    pub const fn degraded(target_type: &'static str, note: &'static str) -> Self {
        Self { target_type, note: Some(note) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sized_types_use_declared_or_default_length() {
        let varchar = TypeMapping::native("VARCHAR").sized(255, 65535, "LONGTEXT");

        assert_eq!(varchar.render(None, None, None), "VARCHAR(255)");
        assert_eq!(varchar.render(Some(CharLength::Chars(40)), None, None), "VARCHAR(40)");
        assert_eq!(varchar.render(Some(CharLength::Chars(70000)), None, None), "LONGTEXT");
        assert_eq!(varchar.render(Some(CharLength::Max), None, None), "LONGTEXT");
    }

    #[test]
    fn test_exact_types_use_declared_or_default_precision() {
        let decimal = TypeMapping::native("DECIMAL").exact(10, 2, 65);

        assert_eq!(decimal.render(None, None, None), "DECIMAL(10,2)");
        assert_eq!(decimal.render(None, Some(12), Some(4)), "DECIMAL(12,4)");
        assert_eq!(decimal.render(None, Some(12), None), "DECIMAL(12,0)");
        assert_eq!(decimal.render(None, Some(90), Some(5)), "DECIMAL(65,5)");
        assert_eq!(decimal.render(None, Some(3), Some(7)), "DECIMAL(3,3)");
    }

    #[test]
    fn test_plain_types_ignore_size_arguments() {
        let json = TypeMapping::native("JSON");
        assert_eq!(json.render(Some(CharLength::Chars(10)), Some(5), Some(1)), "JSON");
    }

    #[test]
    fn test_lossy_mappings_request_inline_comments() {
        let lossy = TypeMapping::lossy("VARCHAR(255)", "interval stored as text");
        assert!(lossy.include_inline_comment);
        assert!(lossy.conversion_note.is_some());

        let noted = TypeMapping::noted("JSON", "binary storage lost");
        assert!(!noted.include_inline_comment);
        assert!(noted.conversion_note.is_some());
    }
}
