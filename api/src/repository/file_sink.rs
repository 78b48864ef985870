use super::{Source, StorageError, TelemetrySink};
use crate::config::StorageConfig;
use async_trait::async_trait;
use log::{debug, warn};
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{fs, io::AsyncWriteExt};

/// Default upper bound on `-<n>` suffixes tried for a single timestamp.
const MAX_SUFFIX: u32 = 10_000;

/// Writes each payload to its own file under a data directory.
///
/// Files are named `<source>_<timestamp_ms>.json`; when that name is taken
/// the next free `<source>_<timestamp_ms>-<n>.json` is used instead. Files
/// are opened with `create_new`, so concurrent writers never clobber each
/// other.
pub struct FileSink {
    data_dir: PathBuf,
    attempts: u32,
    retry_delay: Duration,
    max_suffix: u32,
}

impl FileSink {
    pub fn new(data_dir: impl Into<PathBuf>, attempts: u32, retry_delay: Duration) -> Self {
        Self {
            data_dir: data_dir.into(),
            attempts: attempts.max(1),
            retry_delay,
            max_suffix: MAX_SUFFIX,
        }
    }

    /// Limits how many `-<n>` suffixes are tried before a timestamp counts
    /// as exhausted.
    pub fn with_max_suffix(mut self, max_suffix: u32) -> Self {
        self.max_suffix = max_suffix.max(1);
        self
    }

    /// Creates the data directory if needed and returns a sink writing into it.
    pub async fn create(config: &StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|source| StorageError::Directory {
                path: config.data_dir.clone(),
                source,
            })?;

        Ok(Self::new(
            config.data_dir.clone(),
            config.write_attempts,
            config.retry_delay(),
        ))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn write_unique(&self, stem: &str, contents: &[u8]) -> io::Result<PathBuf> {
        for n in 0..self.max_suffix {
            let name = if n == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, n)
            };
            let path = self.data_dir.join(name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            let written = async {
                file.write_all(contents).await?;
                file.sync_all().await
            }
            .await;

            return match written {
                Ok(()) => Ok(path),
                Err(e) => {
                    // Free the name so a retry does not leave a truncated file behind.
                    let _ = fs::remove_file(&path).await;
                    Err(e)
                }
            };
        }

        Err(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name left for {}", stem),
        ))
    }
}

#[async_trait]
impl TelemetrySink for FileSink {
    async fn store(
        &self,
        source: Source,
        timestamp_ms: i64,
        contents: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let stem = format!("{}_{}", source.prefix(), timestamp_ms);
        let mut attempt = 1;

        loop {
            match self.write_unique(&stem, contents).await {
                Ok(path) => {
                    debug!("Stored {} bytes to {}", contents.len(), path.display());
                    return Ok(path);
                }
                // Every suffix is taken; another pass would find the same.
                Err(e) if attempt < self.attempts && e.kind() != ErrorKind::AlreadyExists => {
                    warn!(
                        "Write of {} failed (attempt {}/{}): {}",
                        stem, attempt, self.attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(source) => {
                    return Err(StorageError::Write {
                        name: stem,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}
