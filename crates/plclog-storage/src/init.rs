// Backend selection from StorageConfig

use crate::opendal_store::OpenDalObjectStore;
use crate::s3::S3ObjectStore;
use crate::store::ObjectStore;
use plclog_config::{FsConfig, S3Config, StorageBackend, StorageConfig};
use std::sync::Arc;
use tracing::info;

/// Build the configured object store
///
/// Missing backend sections fall back to their defaults.
pub async fn build_object_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    info!("Initializing storage backend: {}", config.backend);

    match config.backend {
        StorageBackend::S3 => {
            let s3 = config.s3.clone().unwrap_or_else(S3Config::default);
            info!(region = %s3.region, endpoint = ?s3.endpoint, "Using S3 storage");
            Arc::new(S3ObjectStore::from_config(&s3).await)
        }
        StorageBackend::Fs => {
            let fs = config.fs.clone().unwrap_or_else(FsConfig::default);
            info!("Using filesystem storage at: {}", fs.root);
            Arc::new(OpenDalObjectStore::new_fs(fs.root))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Arc::new(OpenDalObjectStore::new_memory())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backends() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            s3: None,
            fs: None,
        };
        assert_eq!(build_object_store(&config).await.name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Fs,
            s3: None,
            fs: Some(FsConfig {
                root: dir.path().display().to_string(),
            }),
        };
        assert_eq!(build_object_store(&config).await.name(), "fs");
    }
}
