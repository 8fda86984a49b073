use anyhow::{Context, Result};
use clap::Args;
use plclog_config::{RuntimeConfig, UploadConfig};
use plclog_storage::{build_object_store, create_bucket, BucketCreation};

#[derive(Args)]
pub struct CreateBucketArgs {
    /// Bucket name (default: upload.bucket from config)
    #[arg(long)]
    pub bucket: Option<String>,
}

impl CreateBucketArgs {
    pub(crate) fn apply(&self, upload: &mut UploadConfig) {
        if let Some(bucket) = &self.bucket {
            upload.bucket = bucket.clone();
        }
    }
}

pub(crate) async fn execute(_args: CreateBucketArgs, config: &RuntimeConfig) -> Result<()> {
    let store = build_object_store(&config.storage).await;
    let bucket = &config.upload.bucket;

    match create_bucket(store.as_ref(), bucket)
        .await
        .with_context(|| format!("Failed to create bucket '{}'", bucket))?
    {
        BucketCreation::Created => println!("Bucket '{}' created", bucket),
        BucketCreation::AlreadyOwned => {
            println!("Bucket '{}' already exists and is owned by you", bucket)
        }
    }
    Ok(())
}
