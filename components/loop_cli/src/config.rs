//! Loop configuration loading for the CLI.

use crate::error::{CliError, CliResult};
use async_runtime::LoopConfig;
use std::path::Path;

/// Builds the loop configuration from an optional JSON file and flag
/// overrides.
///
/// Fields missing from the file keep their defaults; `step_limit` from the
/// command line wins over the file.
///
/// # Errors
/// Returns `CliError::ConfigIo` or `CliError::ConfigParse` when the file
/// cannot be read or decoded.
pub fn load_config(path: Option<&Path>, step_limit: Option<u64>) -> CliResult<LoopConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => LoopConfig::default(),
    };

    if step_limit.is_some() {
        config.step_limit = step_limit;
    }

    tracing::debug!(?config, "loop configuration loaded");
    Ok(config)
}
