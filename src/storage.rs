//! File storage keyed by filename under one root directory.
//!
//! There is no locking between workers. Concurrent access to different
//! names is independent; a read racing a write of the same name may observe
//! a partially written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Files larger than this are refused rather than truncated.
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no such file")]
    NotFound,
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("file exceeds {} bytes", MAX_FILE_BYTES)]
    TooLarge,
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::Io(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a name to a path directly inside the root. Names come from a
    /// single target segment, so they never contain `/`.
    fn resolve(&self, name: &[u8]) -> Result<PathBuf, StorageError> {
        let name = std::str::from_utf8(name)
            .map_err(|_| StorageError::InvalidName(String::from_utf8_lossy(name).into_owned()))?;

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(name))
    }

    pub async fn read(&self, name: &[u8]) -> Result<Bytes, StorageError> {
        let path = self.resolve(name)?;
        let file = tokio::fs::File::open(&path).await?;

        let mut contents = Vec::new();
        let n = file
            .take(MAX_FILE_BYTES + 1)
            .read_to_end(&mut contents)
            .await?;

        if n as u64 > MAX_FILE_BYTES {
            return Err(StorageError::TooLarge);
        }

        tracing::debug!(path = %path.display(), bytes = n, "file read");
        Ok(Bytes::from(contents))
    }

    /// Creates or truncates `name` and writes `contents`.
    pub async fn write(&self, name: &[u8], contents: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, contents).await?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "file written");
        Ok(())
    }
}
