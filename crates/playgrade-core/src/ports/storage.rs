//! Image storage port.

use async_trait::async_trait;

/// Where uploaded images live. Rows reference them by public URL path.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under a fresh random name with the given extension.
    /// Returns the public URL path (e.g. `/uploads/<name>`).
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Read a stored image by file name.
    async fn open(&self, filename: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove the file behind a public URL. Missing files are not an error.
    async fn remove(&self, url: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found")]
    NotFound,

    #[error("Invalid file name")]
    InvalidName,

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
