//! Upload workflow: transfer one local file, then optionally delete it
//!
//! The transfer is the primary result. Deleting the local copy is best-effort
//! and its failure is reported alongside a successful outcome, never instead
//! of it.

use crate::error::{CleanupFailed, UploadError};
use crate::store::{ObjectBody, ObjectStore};
use std::path::Path;
use tracing::{info, instrument, warn};

/// What happened to the local file after the transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    NotRequested,
    Deleted,
    Failed(CleanupFailed),
}

/// Successful transfer, with the cleanup side note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub bucket: String,
    pub key: String,
    pub bytes: u64,
    pub cleanup: CleanupStatus,
}

impl UploadOutcome {
    pub fn cleanup_failed(&self) -> Option<&CleanupFailed> {
        match &self.cleanup {
            CleanupStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Transfer `local_path` to `bucket/key`; delete it afterwards if asked
///
/// Nothing is retried. On transfer failure the local file is left untouched.
#[instrument(skip(store), fields(backend = store.name()))]
pub async fn upload_and_cleanup(
    store: &dyn ObjectStore,
    local_path: &Path,
    bucket: &str,
    key: &str,
    delete_on_success: bool,
) -> Result<UploadOutcome, UploadError> {
    let body = ObjectBody::open(local_path)
        .await
        .map_err(|e| UploadError::from_io(local_path, e))?;

    let receipt = store
        .put_object(bucket, key, body)
        .await
        .map_err(|e| UploadError::from_storage(bucket, key, e))?;

    info!(
        bucket,
        key,
        bytes = receipt.bytes,
        "Uploaded {} to s3://{}/{}",
        local_path.display(),
        bucket,
        key
    );

    let cleanup = if delete_on_success {
        remove_local_file(local_path).await
    } else {
        CleanupStatus::NotRequested
    };

    Ok(UploadOutcome {
        bucket: bucket.to_string(),
        key: key.to_string(),
        bytes: receipt.bytes,
        cleanup,
    })
}

async fn remove_local_file(path: &Path) -> CleanupStatus {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Deleted local file");
            CleanupStatus::Deleted
        }
        Err(e) => {
            let reason = if e.kind() == std::io::ErrorKind::NotFound {
                "file disappeared before it could be deleted".to_string()
            } else {
                e.to_string()
            };
            warn!(path = %path.display(), %reason, "Local cleanup failed after successful upload");
            CleanupStatus::Failed(CleanupFailed {
                path: path.to_path_buf(),
                reason,
            })
        }
    }
}
