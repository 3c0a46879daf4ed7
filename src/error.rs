//! Error types for the report pipeline.

use thiserror::Error;

/// Errors raised while loading, joining or aggregating district data.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An input file could not be opened or read.
    #[error("cannot read {source_name} from '{path}': {source}")]
    SourceUnavailable {
        source_name: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required header is missing from an input table.
    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn {
        source_name: &'static str,
        column: &'static str,
    },

    /// A row could not be parsed into its expected types.
    #[error("{source_name} line {line}: {message}")]
    Malformed {
        source_name: &'static str,
        line: u64,
        message: String,
    },

    /// Rows for the same school disagree on a value that must be constant.
    #[error("school '{school}' has conflicting values for {field}")]
    InconsistentSchool { school: String, field: &'static str },

    /// The student table lists the same student id twice.
    #[error("student id {student_id} appears more than once")]
    DuplicateStudent { student_id: u64 },

    /// The report configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
