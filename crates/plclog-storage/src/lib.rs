//! Object storage for plclog: upload a daily log, provision a bucket
//!
//! Backends implement [`ObjectStore`]. S3 goes through aws-sdk-s3; local
//! filesystem and in-memory buckets go through OpenDAL.

mod bucket;
mod error;
mod init;
mod opendal_store;
mod s3;
mod store;
mod upload;

pub use bucket::{create_bucket, BucketCreation};
pub use error::{CleanupFailed, Result, StorageError, UploadError};
pub use init::build_object_store;
pub use opendal_store::OpenDalObjectStore;
pub use s3::S3ObjectStore;
pub use store::{ObjectBody, ObjectStore, PutReceipt};
pub use upload::{upload_and_cleanup, CleanupStatus, UploadOutcome};
