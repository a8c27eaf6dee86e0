//! Error types for scenario loading, input data and result export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Problems reading a wind power series.
#[derive(Debug, Error)]
pub enum WindDataError {
    #[error("cannot read wind data \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("wind data \"{}\" row {row}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        /// One-based row number in the file.
        row: usize,
        message: String,
    },
    #[error("wind data \"{}\" contains no samples", .path.display())]
    Empty { path: PathBuf },
}

/// Top-level error for building and running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{}", join_config_errors(.0))]
    Config(Vec<ConfigError>),
    #[error(transparent)]
    Wind(#[from] WindDataError),
    #[error("failed to write telemetry: {0}")]
    Export(#[from] io::Error),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::Config(vec![err])
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
