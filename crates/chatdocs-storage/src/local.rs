use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chatdocs_core::StorageBackend;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/chatdocs/files")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// The storage key must not contain path traversal sequences that could
    /// escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let key = generate_storage_key(owner_id, file_id);
        let path = self.key_to_path(&key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // File::create truncates an existing file, giving upsert semantics.
        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // Local storage cannot sign URLs; callers get the plain serving URL.
        self.key_to_path(storage_key)?;
        Ok(self.generate_url(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn upload_download_roundtrip() {
        let (_dir, storage) = test_storage().await;
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();

        let key = storage
            .upload(owner, file, "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(key, generate_storage_key(owner, file));
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(storage.download(&key).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn upload_overwrites_existing_key() {
        let (_dir, storage) = test_storage().await;
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();

        let first = storage
            .upload(owner, file, "text/plain", Bytes::from_static(b"one"))
            .await
            .unwrap();
        let second = storage
            .upload(owner, file, "text/plain", Bytes::from_static(b"two"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(storage.download(&second).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, storage) = test_storage().await;
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();

        let key = storage
            .upload(owner, file, "text/plain", Bytes::from_static(b"bye"))
            .await
            .unwrap();

        storage.delete(&key).await.unwrap();
        assert!(!storage.exists(&key).await.unwrap());
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.download("../outside").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.download("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn presigned_url_is_serving_url() {
        let (_dir, storage) = test_storage().await;
        let url = storage
            .get_presigned_url("files/a/b", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/files/files/a/b");
    }
}
