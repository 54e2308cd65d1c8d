//! Error taxonomy for the assignment pipeline.
//!
//! Every fatal condition aborts the whole run: a partial assignment (some
//! students left unplaced) would violate the one-class-per-student
//! invariant, so no stage degrades partially and nothing is retried.
//! Malformed individual rows are not errors at all — ingestion skips them
//! locally and logs a warning.

use thiserror::Error;

/// Fatal errors surfaced by the assignment pipeline.
///
/// Each variant identifies the stage and the structural cause, so a run
/// terminates with exactly one descriptive error.
#[derive(Debug, Error)]
pub enum Error {
    /// An expected column is absent or the survey structure is malformed
    /// (e.g. the number of detected choice columns is not exactly five).
    #[error("[{table}] {message}")]
    Schema {
        /// Which input table the problem was found in.
        table: String,
        /// Description of the missing or malformed structure.
        message: String,
    },

    /// Zero canonical class titles matched the requested category.
    ///
    /// Indicates a data/category-name mismatch rather than a transient
    /// condition.
    #[error("no class titles found for category '{category}'")]
    EmptyCatalog {
        /// The category name that was requested.
        category: String,
    },

    /// Invalid configuration (cost tables, capacities).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The LP had no feasible point or the solver returned a non-success
    /// status. Carries the solver's diagnostic message.
    #[error("assignment solve failed: {0}")]
    Solver(String),

    /// CSV-level failure while ingesting a source file.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading a source file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a [`Error::Schema`] with the given table label.
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            table: table.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_table_and_cause() {
        let err = Error::schema("Signups", "missing 'Email Address' column");
        assert_eq!(err.to_string(), "[Signups] missing 'Email Address' column");
    }

    #[test]
    fn test_empty_catalog_message() {
        let err = Error::EmptyCatalog {
            category: "Academic".into(),
        };
        assert!(err.to_string().contains("Academic"));
    }
}
