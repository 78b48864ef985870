pub mod file_sink;
pub mod recent;

use async_trait::async_trait;
use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Where a sample entered the system. Used as the file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Rest,
    Mqtt,
}

impl Source {
    pub fn prefix(&self) -> &'static str {
        match self {
            Source::Rest => "rest",
            Source::Mqtt => "mqtt",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot prepare directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {name} after {attempts} attempt(s): {source}")]
    Write {
        name: String,
        attempts: u32,
        source: std::io::Error,
    },
}

/// Durable storage for raw telemetry payloads.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Stores `contents` under a name derived from `source` and
    /// `timestamp_ms`, never replacing an existing entry. Returns once the
    /// data is durable.
    async fn store(
        &self,
        source: Source,
        timestamp_ms: i64,
        contents: &[u8],
    ) -> Result<PathBuf, StorageError>;
}
