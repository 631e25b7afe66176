use crate::errors::ServiceError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Object store for uploaded resource files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key` and returns its public download URL.
    async fn put(&self, key: &str, data: Bytes) -> Result<String, ServiceError>;

    async fn get(&self, key: &str) -> Result<Bytes, ServiceError>;

    async fn delete(&self, key: &str) -> Result<(), ServiceError>;
}

/// Stores blobs on the local filesystem beneath `root`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn download_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ServiceError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(ServiceError::ValidationError(format!(
                "invalid storage key: {}",
                key
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_error(key: &str, e: std::io::Error) -> ServiceError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ServiceError::NotFound(format!("blob {}", key))
    } else {
        ServiceError::StorageError(format!("{}: {}", key, e))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> Result<String, ServiceError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(key, e))?;
        }
        fs::write(&path, &data)
            .await
            .map_err(|e| storage_error(key, e))?;
        debug!(path = %path.display(), "blob written");
        Ok(self.download_url(key))
    }

    async fn get(&self, key: &str) -> Result<Bytes, ServiceError> {
        let path = self.path_for(key)?;
        let data = fs::read(&path).await.map_err(|e| storage_error(key, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(key, e)),
        }
    }
}
