use std::path::PathBuf;
use thiserror::Error;
use vibration::SummaryError;

/// Errors raised while loading and summarizing a payload file.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} must contain a telemetry object or an array of them, found {found}")]
    UnexpectedShape { path: PathBuf, found: &'static str },

    #[error("payload #{index} in {path} is invalid: {source}")]
    InvalidPayload {
        path: PathBuf,
        index: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Summary(#[from] SummaryError),
}
