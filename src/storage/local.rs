//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `.tmp` file that is renamed over the target, so a
//! process killed mid-write leaves the previous record intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::HistoryBackend;

/// Single-file storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a LocalStorage for `file` inside `root_dir`.
    pub fn in_dir(root_dir: impl AsRef<Path>, file: &str) -> Self {
        Self::new(root_dir.as_ref().join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryBackend for LocalStorage {
    async fn read(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::in_dir(tmp.path(), "history.json");

        storage.write(b"hello").await.unwrap();
        let data = storage.read().await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("history.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::in_dir(tmp.path(), "nope.json");

        let data = storage.read().await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested/dir/history.json"));

        storage.write(b"{}").await.unwrap();
        assert!(storage.path().exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::in_dir(tmp.path(), "history.json");

        storage.write(b"first record, longer").await.unwrap();
        storage.write(b"second").await.unwrap();
        assert_eq!(storage.read().await.unwrap(), Some(b"second".to_vec()));
    }
}
