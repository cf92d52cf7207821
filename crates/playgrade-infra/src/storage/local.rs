//! Filesystem-backed image store.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use playgrade_core::ports::{ImageStore, StorageError};

/// URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Stores images as flat files in one directory.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    /// Use `root` as the upload directory, creating it if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::info!(upload_dir = %root.display(), "Image store ready");
        Ok(Self { root })
    }

    /// Resolve a bare file name inside the root, refusing anything that
    /// could escape it.
    fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let valid = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\'])
            && !filename.contains("..");
        if !valid {
            return Err(StorageError::InvalidName);
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let filename = format!("{}.{}", Uuid::new_v4().simple(), extension);
        let path = self.resolve(&filename)?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(file = %filename, size = bytes.len(), "Stored image");
        Ok(format!("{UPLOADS_URL_PREFIX}{filename}"))
    }

    async fn open(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(filename)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let filename = url.rsplit('/').next().unwrap_or_default();
        let path = self.resolve(filename)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %filename, "Removed image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}
