/// Text-to-value coercion
///
/// Cell edits arrive as text. A `ParserRegistry` maps a type tag to the
/// function that turns text into a `CellValue` of that type. The built-in set
/// covers every `ColumnType`; callers can register additional tags or a
/// fallback parser for tags nobody registered.
///
/// Blank text parses to `CellValue::Null` for every type; whether the null is
/// allowed is the column's decision, not the parser's.

use crate::column::{CellValue, ColumnType};
use crate::error::CoerceError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A parser for one type tag. Receives text that is already trimmed and non-empty.
pub type ParseFn = Arc<dyn Fn(&str) -> Result<CellValue, CoerceError> + Send + Sync>;

#[derive(Clone)]
pub struct ParserRegistry {
    parsers: HashMap<String, ParseFn>,
    fallback: Option<ParseFn>,
}

impl ParserRegistry {
    /// An empty registry with no parsers at all
    pub fn empty() -> Self {
        ParserRegistry {
            parsers: HashMap::new(),
            fallback: None,
        }
    }

    /// A registry holding the built-in parsers and their aliases
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register_with_aliases("int32", &["int", "integer", "i32"], |s| {
            s.parse::<i32>()
                .map(CellValue::Int32)
                .map_err(|_| invalid(s, "int32"))
        });
        registry.register_with_aliases("int64", &["long", "i64"], |s| {
            s.parse::<i64>()
                .map(CellValue::Int64)
                .map_err(|_| invalid(s, "int64"))
        });
        registry.register_with_aliases("float32", &["float", "f32"], |s| {
            s.parse::<f32>()
                .map(CellValue::Float32)
                .map_err(|_| invalid(s, "float32"))
        });
        registry.register_with_aliases("float64", &["double", "f64"], |s| {
            s.parse::<f64>()
                .map(CellValue::Float64)
                .map_err(|_| invalid(s, "float64"))
        });
        registry.register_with_aliases("bool", &["boolean"], parse_bool);
        registry.register_with_aliases("string", &["str", "text"], |s| {
            Ok(CellValue::String(s.to_string()))
        });
        registry.register("any", |s| Ok(infer(s)));

        registry
    }

    /// Register (or replace) the parser for `tag`. Tags are case-insensitive.
    pub fn register<F>(&mut self, tag: &str, parser: F)
    where
        F: Fn(&str) -> Result<CellValue, CoerceError> + Send + Sync + 'static,
    {
        self.parsers.insert(tag.to_ascii_lowercase(), Arc::new(parser));
    }

    fn register_with_aliases<F>(&mut self, tag: &str, aliases: &[&str], parser: F)
    where
        F: Fn(&str) -> Result<CellValue, CoerceError> + Send + Sync + 'static,
    {
        let parser: ParseFn = Arc::new(parser);
        for name in std::iter::once(&tag).chain(aliases) {
            self.parsers.insert(name.to_ascii_lowercase(), parser.clone());
        }
    }

    /// Parser used for tags with no registered parser
    pub fn set_fallback<F>(&mut self, parser: F)
    where
        F: Fn(&str) -> Result<CellValue, CoerceError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(parser));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.parsers.contains_key(&tag.to_ascii_lowercase())
    }

    /// Parse `text` as a value of the type named by `tag`
    pub fn parse(&self, tag: &str, text: &str) -> Result<CellValue, CoerceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(CellValue::Null);
        }

        match self.parsers.get(&tag.to_ascii_lowercase()).or(self.fallback.as_ref()) {
            Some(parser) => parser(trimmed),
            None => Err(CoerceError::UnknownType(tag.to_string())),
        }
    }

    /// Parse `text` for a column of the given type
    pub fn parse_for(&self, column_type: ColumnType, text: &str) -> Result<CellValue, CoerceError> {
        self.parse(column_type.tag(), text)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.parsers.keys().map(|k| k.as_str()).collect();
        tags.sort_unstable();
        f.debug_struct("ParserRegistry")
            .field("tags", &tags)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

fn invalid(text: &str, type_name: &str) -> CoerceError {
    CoerceError::Invalid {
        text: text.to_string(),
        type_name: type_name.to_string(),
    }
}

fn parse_bool(text: &str) -> Result<CellValue, CoerceError> {
    if text.eq_ignore_ascii_case("true") {
        Ok(CellValue::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(CellValue::Bool(false))
    } else {
        Err(invalid(text, "bool"))
    }
}

/// Infer the narrowest value for untyped text: bool, int32, int64, float64,
/// then string.
pub fn infer(text: &str) -> CellValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }

    if let Ok(value) = parse_bool(trimmed) {
        return value;
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return i32::try_from(n)
            .map(CellValue::Int32)
            .unwrap_or(CellValue::Int64(n));
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float64(f);
    }

    CellValue::String(trimmed.to_string())
}

/// The column type `infer` would pick for `text`, or `None` for blank text
pub fn infer_type(text: &str) -> Option<ColumnType> {
    match infer(text) {
        CellValue::Null => None,
        CellValue::Bool(_) => Some(ColumnType::Bool),
        CellValue::Int32(_) => Some(ColumnType::Int32),
        CellValue::Int64(_) => Some(ColumnType::Int64),
        CellValue::Float32(_) => Some(ColumnType::Float32),
        CellValue::Float64(_) => Some(ColumnType::Float64),
        CellValue::String(_) => Some(ColumnType::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_parsers() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.parse("int32", " 42 ").unwrap(), CellValue::Int32(42));
        assert_eq!(registry.parse("LONG", "9000000000").unwrap(), CellValue::Int64(9_000_000_000));
        assert_eq!(registry.parse("double", "2.5").unwrap(), CellValue::Float64(2.5));
        assert_eq!(registry.parse("boolean", "TRUE").unwrap(), CellValue::Bool(true));
        assert_eq!(registry.parse("string", " hi ").unwrap(), CellValue::from("hi"));
    }

    #[test]
    fn test_blank_text_is_null() {
        let registry = ParserRegistry::default();
        assert!(registry.parse("int32", "   ").unwrap().is_null());
        assert!(registry.parse("no-such-type", "").unwrap().is_null());
    }

    #[test]
    fn test_invalid_text() {
        let registry = ParserRegistry::default();
        let err = registry.parse("int32", "twelve").unwrap_err();
        assert_eq!(
            err,
            CoerceError::Invalid {
                text: "twelve".to_string(),
                type_name: "int32".to_string()
            }
        );
        assert!(registry.parse("bool", "yes").is_err());
    }

    #[test]
    fn test_unknown_tag_and_fallback() {
        let mut registry = ParserRegistry::default();
        assert_eq!(
            registry.parse("ObjectName", "d:type=Foo").unwrap_err(),
            CoerceError::UnknownType("ObjectName".to_string())
        );

        registry.set_fallback(|s| Ok(CellValue::String(s.to_uppercase())));
        assert_eq!(registry.parse("ObjectName", "abc").unwrap(), CellValue::from("ABC"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ParserRegistry::empty();
        assert!(!registry.contains("percent"));
        registry.register("percent", |s| {
            s.trim_end_matches('%')
                .parse::<f64>()
                .map(|v| CellValue::Float64(v / 100.0))
                .map_err(|_| invalid(s, "percent"))
        });
        assert!(registry.contains("PERCENT"));
        assert_eq!(registry.parse("percent", "50%").unwrap(), CellValue::Float64(0.5));
    }

    #[test]
    fn test_parse_for_any_column_infers() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.parse_for(ColumnType::Any, "12").unwrap(), CellValue::Int32(12));
        assert_eq!(registry.parse_for(ColumnType::Any, "false").unwrap(), CellValue::Bool(false));
        assert_eq!(registry.parse_for(ColumnType::Any, "1.25").unwrap(), CellValue::Float64(1.25));
        assert_eq!(registry.parse_for(ColumnType::Any, "apple").unwrap(), CellValue::from("apple"));
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(""), None);
        assert_eq!(infer_type("3000000000"), Some(ColumnType::Int64));
        assert_eq!(infer_type("-7"), Some(ColumnType::Int32));
        assert_eq!(infer_type("x1"), Some(ColumnType::String));
    }
}
