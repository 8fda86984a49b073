//! One-time bucket provisioning

use crate::error::StorageError;
use crate::store::ObjectStore;
use tracing::{error, info, warn};

/// Result of a successful `create_bucket`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    Created,
    /// The bucket already exists in the caller's account
    AlreadyOwned,
}

/// Create `bucket`, treating "already owned by you" as success
///
/// A bucket owned by another account is still an error.
pub async fn create_bucket(
    store: &dyn ObjectStore,
    bucket: &str,
) -> Result<BucketCreation, StorageError> {
    match store.create_bucket(bucket).await {
        Ok(()) => {
            info!(bucket, backend = store.name(), "Bucket created");
            Ok(BucketCreation::Created)
        }
        Err(StorageError::BucketAlreadyOwnedByYou { .. }) => {
            warn!(bucket, "Bucket already exists and is owned by you");
            Ok(BucketCreation::AlreadyOwned)
        }
        Err(e) => {
            error!(bucket, error = %e, "Bucket creation failed");
            Err(e)
        }
    }
}
