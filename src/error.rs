//! Error types for the deleted-field audit.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the external query boundary.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query tool is not available: {0}")]
    Unavailable(String),

    #[error("Command execution failed: {args:?}\nOUTPUT: {output}")]
    CommandFailed { args: Vec<String>, output: String },

    #[error("Failed to spawn query command {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode query output: {message}\nOUTPUT: {output}")]
    Decode { message: String, output: String },
}

/// Errors touching the persisted report file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Existing report {path:?} is not valid: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Failed to encode report: {0}")]
    Encode(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level error for an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Please provide a Salesforce organization alias; use --org")]
    MissingOrg,

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<config::ConfigError> for AuditError {
    fn from(err: config::ConfigError) -> Self {
        AuditError::ConfigError(err.to_string())
    }
}
