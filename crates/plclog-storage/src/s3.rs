//! Amazon S3 backend via aws-sdk-s3

use crate::error::{Result, StorageError};
use crate::store::{ObjectBody, ObjectStore, PutReceipt};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use plclog_config::S3Config;
use tracing::{debug, instrument};

/// S3 region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

pub struct S3ObjectStore {
    client: Client,
    region: String,
}

impl S3ObjectStore {
    /// Build a client from the default AWS credential chain
    pub async fn from_config(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
        }
    }

    /// Wrap an existing client (lifecycle owned by the caller)
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self, body), fields(bytes = body.len()))]
    async fn put_object(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<PutReceipt> {
        // ByteStream streams from disk instead of buffering the whole file
        let stream = match ByteStream::from_path(body.path()).await {
            Ok(stream) => stream,
            Err(e) => {
                // Surface the file-system cause so a vanished file reads as not found
                let source = match tokio::fs::metadata(body.path()).await {
                    Err(io_err) => io_err,
                    Ok(_) => std::io::Error::other(e),
                };
                return Err(StorageError::local_read(body.path(), source));
            }
        };

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(body.len() as i64)
            .body(stream)
            .send()
            .await
            .map_err(|e| map_sdk_error("put_object", bucket, e))?;

        debug!(etag = ?output.e_tag(), "put_object acknowledged");

        Ok(PutReceipt {
            bytes: body.len(),
            etag: output.e_tag().map(str::to_string),
        })
    }

    #[instrument(skip(self))]
    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| map_sdk_error("create_bucket", bucket, e))?;
        Ok(())
    }
}

/// Translate an SDK failure into a [`StorageError`] using the service error code
fn map_sdk_error<E, R>(operation: &'static str, bucket: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();

    if matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) {
        return StorageError::Network { operation, message };
    }

    classify_error_code(operation, bucket, err.code(), message)
}

fn classify_error_code(
    operation: &'static str,
    bucket: &str,
    code: Option<&str>,
    message: String,
) -> StorageError {
    match code {
        Some("NoSuchBucket") => StorageError::NoSuchBucket {
            bucket: bucket.to_string(),
        },
        Some("BucketAlreadyExists") => StorageError::BucketAlreadyExists {
            bucket: bucket.to_string(),
        },
        Some("BucketAlreadyOwnedByYou") => StorageError::BucketAlreadyOwnedByYou {
            bucket: bucket.to_string(),
        },
        Some("AccessDenied" | "Forbidden" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
            StorageError::AccessDenied { operation, message }
        }
        Some(code) => StorageError::provider(operation, code, message),
        None => StorageError::provider(operation, "Unknown", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bucket_codes() {
        let err = classify_error_code("create_bucket", "b1", Some("BucketAlreadyOwnedByYou"), "x".into());
        assert!(matches!(err, StorageError::BucketAlreadyOwnedByYou { .. }));

        let err = classify_error_code("create_bucket", "b1", Some("BucketAlreadyExists"), "x".into());
        assert!(matches!(err, StorageError::BucketAlreadyExists { .. }));

        let err = classify_error_code("put_object", "b1", Some("NoSuchBucket"), "x".into());
        assert!(matches!(err, StorageError::NoSuchBucket { bucket } if bucket == "b1"));
    }

    #[test]
    fn test_classify_access_and_unknown() {
        let err = classify_error_code("put_object", "b1", Some("AccessDenied"), "denied".into());
        assert!(matches!(err, StorageError::AccessDenied { .. }));

        let err = classify_error_code("put_object", "b1", Some("SlowDown"), "busy".into());
        assert!(err.to_string().contains("SlowDown"));

        let err = classify_error_code("put_object", "b1", None, "?".into());
        assert!(matches!(err, StorageError::Provider { code, .. } if code == "Unknown"));
    }

    fn offline_store() -> S3ObjectStore {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(DEFAULT_REGION))
            .build();
        S3ObjectStore::from_client(Client::from_conf(config), DEFAULT_REGION)
    }

    #[tokio::test]
    async fn test_vanished_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-plc-log.csv");
        std::fs::write(&path, "record,date,time,vibration_mm_sec\n").unwrap();

        let body = ObjectBody::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = offline_store()
            .put_object("b1", "plc-logs/k.csv", body)
            .await
            .unwrap_err();
        match err {
            StorageError::LocalRead { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected LocalRead, got {other}"),
        }
    }
}
