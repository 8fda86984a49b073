//! Object storage capability consumed by the uploader

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A local file staged for transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBody {
    path: PathBuf,
    len: u64,
}

impl ObjectBody {
    /// Stat `path`; it must be a readable regular file at this point
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }
        // Opening proves readability; the handle is dropped straight away
        tokio::fs::File::open(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole file; fails with `LocalRead` if it vanished since `open`
    pub async fn read_all(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| StorageError::local_read(&self.path, e))
    }
}

/// Acknowledgement of a completed `put_object`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub bytes: u64,
    pub etag: Option<String>,
}

/// Minimal object storage surface: write one object, create one bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Store `body` under `bucket/key`, overwriting any existing object
    async fn put_object(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<PutReceipt>;

    /// Create `bucket`; reports `BucketAlreadyOwnedByYou` / `BucketAlreadyExists` as errors
    async fn create_bucket(&self, bucket: &str) -> Result<()>;
}
