// Object storage - binary media upload returning a publicly resolvable URL

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::error::{AppError, AppResult};

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path` and return the public URL for it.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// Remove the object at `path`. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    fn public_url(&self, path: &str) -> String;
}

/// Stores objects on the local filesystem; served under `/media`.
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !is_plain {
            return Err(AppError::Validation(format!("Invalid object path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> AppResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let size = bytes.len();
        tokio::fs::write(&target, bytes).await.map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {}", target.display(), e))
        })?;

        info!("Stored object {} ({} bytes)", path, size);
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                info!("Deleted object {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(format!(
                "Failed to delete {}: {}",
                target.display(),
                e
            ))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/media/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://cdn.local/");

        let url = storage.upload("user-1/123.mp4", b"frames".to_vec()).await.unwrap();
        assert_eq!(url, "http://cdn.local/media/user-1/123.mp4");

        let written = tokio::fs::read(dir.path().join("user-1/123.mp4")).await.unwrap();
        assert_eq!(written, b"frames");
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://cdn.local");

        let err = storage.upload("../escape.mp4", vec![1]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = storage.upload("/abs.mp4", vec![1]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://cdn.local");
        storage.upload("user-1/9.mp4", b"frames".to_vec()).await.unwrap();

        storage.delete("user-1/9.mp4").await.unwrap();
        assert!(!dir.path().join("user-1/9.mp4").exists());
        storage.delete("user-1/9.mp4").await.unwrap();

        let err = storage.delete("../escape.mp4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
