//! Error types for ora2my-reverse

use thiserror::Error;

/// Result type alias for ora2my-reverse operations
pub type Result<T> = std::result::Result<T, ReverseError>;

/// How far a failure reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Only the table being synthesized is abandoned
    Table,
    /// The whole run must stop
    Run,
}

/// Errors that can occur while reversing an Oracle schema
#[derive(Error, Debug)]
pub enum ReverseError {
    #[error("oracle table [{table}] column [{column}] {field} [{value}] is not an integer")]
    MalformedNumeric {
        table: String,
        column: String,
        field: &'static str,
        value: String,
    },

    #[error("oracle schema [{schema}] table [{table}] primary key exist multiple values: {rows:?}")]
    AmbiguousPrimaryKey {
        schema: String,
        table: String,
        rows: Vec<String>,
    },

    #[error("oracle schema [{schema}] table [{table}] comments exist multiple values: {rows:?}")]
    AmbiguousTableComment {
        schema: String,
        table: String,
        rows: Vec<String>,
    },

    #[error(
        "column [{column}] type [{source_type}] matches conflicting override rules: custom {custom:?}, plan {plan:?}"
    )]
    ConflictingOverrides {
        column: String,
        source_type: String,
        custom: Vec<String>,
        plan: Vec<String>,
    },

    #[error("oracle table [{table}] index [{index}] type [{index_type}] on ({columns}) isn't supported by mysql")]
    UnsupportedIndexType {
        table: String,
        index: String,
        index_type: String,
        columns: String,
    },

    #[error("oracle table [{table}] index [{index}] expected {expected} but catalog reported {found}")]
    UniquenessMismatch {
        table: String,
        index: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("oracle table [{table}] index [{index}] has no columns or expressions")]
    EmptyIndex { table: String, index: String },

    #[error("oracle schema [{schema}] table [{table}] has no columns")]
    EmptyTable { schema: String, table: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReverseError {
    /// Whether this error abandons a single table or the whole run
    pub fn scope(&self) -> ErrorScope {
        match self {
            ReverseError::MalformedNumeric { .. }
            | ReverseError::AmbiguousPrimaryKey { .. }
            | ReverseError::AmbiguousTableComment { .. }
            | ReverseError::UnsupportedIndexType { .. }
            | ReverseError::UniquenessMismatch { .. }
            | ReverseError::EmptyIndex { .. }
            | ReverseError::EmptyTable { .. } => ErrorScope::Table,
            // Contradictory rules are a configuration defect, not a data condition.
            ReverseError::ConflictingOverrides { .. }
            | ReverseError::Catalog(_)
            | ReverseError::Config(_)
            | ReverseError::Validation(_)
            | ReverseError::Io(_)
            | ReverseError::Json(_) => ErrorScope::Run,
        }
    }
}

impl From<config::ConfigError> for ReverseError {
    fn from(err: config::ConfigError) -> Self {
        ReverseError::Config(err.to_string())
    }
}
