use thiserror::Error;

/// Error type for table construction and serialization.
///
/// The dataset and indexer never fail; errors only appear where a rectangular table is
/// assembled or read back with a specific column type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("all columns must have the same number of rows: column {column:?} has {actual}, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column {column:?} holds {actual} values, not {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unable to determine timestamp column")]
    MissingTimeColumn,

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Serialization(err.to_string())
    }
}
