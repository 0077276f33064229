/// TableSorter Cell Values
///
/// A cell holds one `CellValue`. Every column of a table has a `ColumnType`
/// restricting which non-null variants it accepts; `ColumnType::Any` accepts
/// them all, which is how heterogeneous columns (attribute values of mixed
/// kinds, for instance) are represented.

use std::fmt;

/// One table row: a cell per schema column
pub type Row = Vec<CellValue>;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bool,
    /// Any non-null variant is accepted
    Any,
}

impl ColumnType {
    /// Canonical type tag used by the parser registry
    pub fn tag(&self) -> &'static str {
        match self {
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
            ColumnType::Any => "any",
        }
    }

    /// Returns true if a cell of this column may hold `value` (ignoring nullability)
    pub fn accepts(&self, value: &CellValue) -> bool {
        match (self, value) {
            (_, CellValue::Null) => true,
            (ColumnType::Any, _) => true,
            (ColumnType::Int32, CellValue::Int32(_)) => true,
            (ColumnType::Int64, CellValue::Int64(_)) => true,
            (ColumnType::Float32, CellValue::Float32(_)) => true,
            (ColumnType::Float64, CellValue::Float64(_)) => true,
            (ColumnType::String, CellValue::String(_)) => true,
            (ColumnType::Bool, CellValue::Bool(_)) => true,
            _ => false,
        }
    }
}

/// Cell value enum to support multiple types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Name of the concrete variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Int32(_) => "int32",
            CellValue::Int64(_) => "int64",
            CellValue::Float32(_) => "float32",
            CellValue::Float64(_) => "float64",
            CellValue::String(_) => "string",
            CellValue::Bool(_) => "bool",
            CellValue::Null => "null",
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            CellValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Int32(n) => serde_json::Value::Number((*n).into()),
            CellValue::Int64(n) => serde_json::Value::Number((*n).into()),
            CellValue::Float32(f) => serde_json::Number::from_f64(*f as f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::String(s) => serde_json::Value::String(s.clone()),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Null => serde_json::Value::Null,
        }
    }
}

/// Textual rendering, also the fallback sort key for mismatched types
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int32(v) => write!(f, "{}", v),
            CellValue::Int64(v) => write!(f, "{}", v),
            CellValue::Float32(v) => write!(f, "{}", v),
            CellValue::Float64(v) => write!(f, "{}", v),
            CellValue::String(v) => f.write_str(v),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Null => f.write_str("null"),
        }
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int32(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int64(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float64(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_accepts() {
        assert!(ColumnType::Int32.accepts(&CellValue::Int32(1)));
        assert!(ColumnType::Int32.accepts(&CellValue::Null));
        assert!(!ColumnType::Int32.accepts(&CellValue::Int64(1)));
        assert!(ColumnType::Any.accepts(&CellValue::String("x".to_string())));
        assert!(ColumnType::Any.accepts(&CellValue::Bool(true)));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Int32(2).to_string(), "2");
        assert_eq!(CellValue::from("apple").to_string(), "apple");
        assert_eq!(CellValue::Bool(false).to_string(), "false");
        assert_eq!(CellValue::Float64(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_cell_from_option() {
        assert!(CellValue::from(None::<i32>).is_null());
        assert_eq!(CellValue::from(Some(7)).as_i32(), Some(7));
    }
}
