//! Error types for pgbuild.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pgbuild operations.
#[derive(Debug, Error)]
pub enum PgBuildError {
    /// Structured description has an unrecognized shape or lacks a required key.
    #[error("Malformed description: {0}")]
    Malformed(String),

    /// Primary key names a column the table does not define.
    #[error("Primary key of table '{table}' references unknown column '{column}'")]
    UnresolvedPrimaryKey { table: String, column: String },

    /// Role item with an unsupported type key.
    #[error("Unknown role item type '{0}'")]
    UnknownRoleItem(String),

    /// Location is neither a file nor a database table URL.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Failed to read an input file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or shape error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PgBuildError {
    /// Create a malformed description error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Create a read error for the given path.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pgbuild operations.
pub type PgBuildResult<T> = Result<T, PgBuildError>;

/// Read a whole file, tagging failures with the path.
pub(crate) fn read_file(path: &std::path::Path) -> PgBuildResult<String> {
    std::fs::read_to_string(path).map_err(|e| PgBuildError::read(path, e))
}
