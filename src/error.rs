/// Error types for TableSorter
///
/// Table operations return `TableError`; text-to-value coercion returns
/// `CoerceError`, which converts into `TableError` with `?`.

use thiserror::Error;

/// Failure to turn text into a typed cell value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("no parser registered for type '{0}'")]
    UnknownType(String),
    #[error("cannot parse '{text}' as {type_name}")]
    Invalid { text: String, type_name: String },
}

/// Failure of a table or sorter operation.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("column {column} out of range [0, {columns})")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("row {row} out of range [0, {rows})")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("row has {found} values but the schema has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },

    #[error("type mismatch in column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("column '{0}' is not nullable")]
    NotNullable(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("no cell edit is in progress")]
    NoActiveEdit,

    #[error("CSV input is empty")]
    EmptyCsv,

    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;
