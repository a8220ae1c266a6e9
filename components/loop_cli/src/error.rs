//! Error types for the CLI

use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// No scenario with that name
    #[error("unknown scenario '{0}' (run `evloop list` to see them)")]
    UnknownScenario(String),

    /// Config file could not be read
    #[error("could not read config '{}': {source}", path.display())]
    ConfigIo {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid loop configuration
    #[error("invalid config '{}': {source}", path.display())]
    ConfigParse {
        /// Path that was requested
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Report could not be encoded as JSON
    #[error("could not encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
