use crate::{config::StorageConfig, repository::StorageError};
use log::info;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

/// Holds the single firmware image served to sensor nodes for OTA updates.
pub struct FirmwareStore {
    path: PathBuf,
    max_bytes: usize,
}

impl FirmwareStore {
    pub fn new(path: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.firmware_path.clone(), config.max_firmware_bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Largest accepted upload, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Replaces the stored image and returns its size on disk.
    ///
    /// The image is written beside the target and renamed into place, so a
    /// failed upload never leaves a truncated firmware file.
    pub async fn store(&self, image: &[u8]) -> Result<u64, StorageError> {
        let name = self.path.display().to_string();
        let write_err = |source| StorageError::Write {
            name: name.clone(),
            attempts: 1,
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut partial = self.path.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let mut file = fs::File::create(&partial).await.map_err(write_err)?;
        file.write_all(image).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&partial, &self.path).await.map_err(write_err)?;
        let bytes = fs::metadata(&self.path).await.map_err(write_err)?.len();

        info!("Stored firmware image ({} bytes) at {}", bytes, self.path.display());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn stores_and_replaces_image() {
        let dir = TempDir::new().unwrap();
        let store = FirmwareStore::new(dir.path().join("fw").join("firmware.bin"), 1024);

        assert_eq!(store.store(&[0xAA; 300]).await.unwrap(), 300);
        assert_eq!(store.store(b"v2").await.unwrap(), 2);

        assert_eq!(std::fs::read(store.path()).unwrap(), b"v2");
        assert!(!dir.path().join("fw").join("firmware.bin.part").exists());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let store = FirmwareStore::new(blocker.join("firmware.bin"), 1024);

        assert!(store.store(b"image").await.is_err());
    }
}
