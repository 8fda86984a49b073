//! Error types for storage and upload operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by an [`ObjectStore`](crate::ObjectStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("[S001] Bucket '{bucket}' does not exist")]
    NoSuchBucket { bucket: String },

    #[error("[S002] Bucket '{bucket}' already exists and is owned by another account")]
    BucketAlreadyExists { bucket: String },

    #[error("[S003] Bucket '{bucket}' already exists and is owned by you")]
    BucketAlreadyOwnedByYou { bucket: String },

    #[error("[S004] Access denied during {operation}: {message}")]
    AccessDenied {
        operation: &'static str,
        message: String,
    },

    #[error("[S005] Network failure during {operation}: {message}")]
    Network {
        operation: &'static str,
        message: String,
    },

    #[error("[S006] Failed to read local file '{}': {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[S007] {operation} failed ({code}): {message}")]
    Provider {
        operation: &'static str,
        code: String,
        message: String,
    },
}

impl StorageError {
    pub fn local_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalRead {
            path: path.into(),
            source,
        }
    }

    pub fn provider(
        operation: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Transfer failure; no cleanup happens when this is returned
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("[U001] Local file '{}' not found", path.display())]
    LocalFileNotFound { path: PathBuf },

    #[error("[U002] Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("[U003] Network failure: {message}")]
    Network { message: String },

    #[error("[U004] Upload to s3://{bucket}/{key} failed: {source}")]
    Storage {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("[U006] Failed to read local file '{}': {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Classify a local file-system error for `path`
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match root_kind(&err) {
            std::io::ErrorKind::NotFound => Self::LocalFileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                message: format!("cannot read '{}': {}", path.display(), err),
            },
            _ => Self::LocalRead { path, source: err },
        }
    }

    /// Classify a backend failure for the transfer of `bucket/key`
    pub fn from_storage(bucket: &str, key: &str, err: StorageError) -> Self {
        match err {
            StorageError::AccessDenied { message, .. } => Self::PermissionDenied { message },
            StorageError::Network { message, .. } => Self::Network { message },
            StorageError::LocalRead { path, source } => Self::from_io(path, source),
            other => Self::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: other,
            },
        }
    }
}

/// Kind of the innermost `io::Error` when errors were wrapped with `io::Error::other`
fn root_kind(err: &std::io::Error) -> std::io::ErrorKind {
    let mut current = err;
    while current.kind() == std::io::ErrorKind::Other {
        match current
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<std::io::Error>())
        {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current.kind()
}

/// Local file could not be removed after a successful transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[U005] Uploaded, but failed to delete local file '{}': {reason}", path.display())]
pub struct CleanupFailed {
    pub path: PathBuf,
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, StorageError>;
