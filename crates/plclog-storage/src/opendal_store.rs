// OpenDAL-based storage for local runs and tests
//
// - Filesystem: each bucket is a directory under the configured root
// - Memory: buckets live for the lifetime of the store

use crate::error::{Result, StorageError};
use crate::store::{ObjectBody, ObjectStore, PutReceipt};
use async_trait::async_trait;
use opendal::{services, ErrorKind, Operator};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
enum LocalBackend {
    Fs { root: PathBuf },
    Memory,
}

pub struct OpenDalObjectStore {
    backend: LocalBackend,
    buckets: Mutex<HashMap<String, Operator>>,
}

impl OpenDalObjectStore {
    /// Buckets are directories under `root`
    pub fn new_fs(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: LocalBackend::Fs { root: root.into() },
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Buckets are in-memory operators
    pub fn new_memory() -> Self {
        Self {
            backend: LocalBackend::Memory,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Read an object back (used for inspection and tests)
    pub async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let op = self.operator(bucket)?;
        let data = op
            .read(key)
            .await
            .map_err(|e| map_opendal_error("read", e))?;
        Ok(data.to_vec())
    }

    /// Check if an object exists
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let op = self.operator(bucket)?;
        match op.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_opendal_error("stat", e)),
        }
    }

    fn operator(&self, bucket: &str) -> Result<Operator> {
        check_bucket_name("open_bucket", bucket)?;
        let mut buckets = self.buckets.lock();
        if let Some(op) = buckets.get(bucket) {
            return Ok(op.clone());
        }

        match &self.backend {
            LocalBackend::Memory => Err(StorageError::NoSuchBucket {
                bucket: bucket.to_string(),
            }),
            LocalBackend::Fs { root } => {
                let dir = root.join(bucket);
                if !dir.is_dir() {
                    return Err(StorageError::NoSuchBucket {
                        bucket: bucket.to_string(),
                    });
                }
                let op = build_fs_operator(&dir)?;
                buckets.insert(bucket.to_string(), op.clone());
                Ok(op)
            }
        }
    }
}

#[async_trait]
impl ObjectStore for OpenDalObjectStore {
    fn name(&self) -> &'static str {
        match self.backend {
            LocalBackend::Fs { .. } => "fs",
            LocalBackend::Memory => "memory",
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<PutReceipt> {
        let op = self.operator(bucket)?;
        let data = body.read_all().await?;
        let bytes = data.len() as u64;

        op.write(key, data)
            .await
            .map_err(|e| map_opendal_error("put_object", e))?;

        debug!(backend = self.name(), bucket, key, bytes, "object written");
        Ok(PutReceipt { bytes, etag: None })
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        check_bucket_name("create_bucket", bucket)?;

        match &self.backend {
            LocalBackend::Memory => {
                let mut buckets = self.buckets.lock();
                if buckets.contains_key(bucket) {
                    return Err(StorageError::BucketAlreadyOwnedByYou {
                        bucket: bucket.to_string(),
                    });
                }
                let op = Operator::new(services::Memory::default())
                    .map_err(|e| map_opendal_error("create_bucket", e))?
                    .finish();
                buckets.insert(bucket.to_string(), op);
                Ok(())
            }
            LocalBackend::Fs { root } => {
                let dir = root.join(bucket);
                if dir.is_dir() {
                    return Err(StorageError::BucketAlreadyOwnedByYou {
                        bucket: bucket.to_string(),
                    });
                }
                tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                    StorageError::provider("create_bucket", "Io", format!("{}: {}", dir.display(), e))
                })?;
                let op = build_fs_operator(&dir)?;
                self.buckets.lock().insert(bucket.to_string(), op);
                Ok(())
            }
        }
    }
}

/// Bucket names map to a single directory under the fs root
fn check_bucket_name(operation: &'static str, bucket: &str) -> Result<()> {
    if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
        return Err(StorageError::provider(
            operation,
            "InvalidBucketName",
            format!("'{}' is not a valid bucket name", bucket),
        ));
    }
    Ok(())
}

fn build_fs_operator(dir: &std::path::Path) -> Result<Operator> {
    let root = dir.to_string_lossy();
    let builder = services::Fs::default().root(&root);
    Ok(Operator::new(builder)
        .map_err(|e| map_opendal_error("open_bucket", e))?
        .finish())
}

fn map_opendal_error(operation: &'static str, err: opendal::Error) -> StorageError {
    match err.kind() {
        ErrorKind::PermissionDenied => StorageError::AccessDenied {
            operation,
            message: err.to_string(),
        },
        kind => StorageError::provider(operation, kind.to_string(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn body(contents: &[u8]) -> (tempfile::NamedTempFile, ObjectBody) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        let body = ObjectBody::open(file.path()).await.unwrap();
        (file, body)
    }

    #[tokio::test]
    async fn test_memory_put_and_read() {
        let store = OpenDalObjectStore::new_memory();
        store.create_bucket("b1").await.unwrap();

        let (_file, body) = body(b"1,2025-06-01,08:00:00,1.50\n").await;
        let receipt = store.put_object("b1", "plc-logs/a.csv", body).await.unwrap();
        assert_eq!(receipt.bytes, 27);

        let data = store.read("b1", "plc-logs/a.csv").await.unwrap();
        assert_eq!(data, b"1,2025-06-01,08:00:00,1.50\n");
        assert!(store.exists("b1", "plc-logs/a.csv").await.unwrap());
        assert!(!store.exists("b1", "plc-logs/b.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_into_missing_bucket() {
        let store = OpenDalObjectStore::new_memory();
        let (_file, body) = body(b"x").await;
        let err = store.put_object("nope", "k", body).await.unwrap_err();
        assert!(matches!(err, StorageError::NoSuchBucket { .. }));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = OpenDalObjectStore::new_memory();
        store.create_bucket("b1").await.unwrap();

        let (_f1, first) = body(b"first").await;
        let (_f2, second) = body(b"second").await;
        store.put_object("b1", "k", first).await.unwrap();
        store.put_object("b1", "k", second).await.unwrap();

        assert_eq!(store.read("b1", "k").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_create_bucket_twice() {
        let store = OpenDalObjectStore::new_memory();
        store.create_bucket("b1").await.unwrap();
        let err = store.create_bucket("b1").await.unwrap_err();
        assert!(matches!(err, StorageError::BucketAlreadyOwnedByYou { .. }));
    }

    #[tokio::test]
    async fn test_fs_buckets_are_directories() {
        let root = tempfile::tempdir().unwrap();
        let store = OpenDalObjectStore::new_fs(root.path());
        store.create_bucket("b1").await.unwrap();
        assert!(root.path().join("b1").is_dir());

        let (_file, body) = body(b"hello").await;
        store
            .put_object("b1", "plc-logs/year=2025/month=06/day=24/a.csv", body)
            .await
            .unwrap();
        let written = root
            .path()
            .join("b1/plc-logs/year=2025/month=06/day=24/a.csv");
        assert_eq!(std::fs::read(written).unwrap(), b"hello");

        // A fresh store over the same root sees the existing bucket
        let reopened = OpenDalObjectStore::new_fs(root.path());
        assert!(matches!(
            reopened.create_bucket("b1").await.unwrap_err(),
            StorageError::BucketAlreadyOwnedByYou { .. }
        ));
    }

    #[tokio::test]
    async fn test_bucket_names_cannot_leave_the_root() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("buckets");
        std::fs::create_dir(&root).unwrap();
        let store = OpenDalObjectStore::new_fs(&root);

        for bucket in ["..", ".", "", "a/b", "a\\b"] {
            let err = store.create_bucket(bucket).await.unwrap_err();
            assert!(
                matches!(&err, StorageError::Provider { code, .. } if code == "InvalidBucketName"),
                "bucket {:?}: {}",
                bucket,
                err
            );
        }

        let (_file, body) = body(b"x").await;
        let err = store.put_object("..", "escaped.csv", body).await.unwrap_err();
        assert!(matches!(err, StorageError::Provider { .. }));
        assert!(!parent.path().join("escaped.csv").exists());
    }
}
