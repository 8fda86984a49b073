use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use plclog_config::{normalize_prefix, RuntimeConfig, UploadConfig};
use plclog_core::derive_key;
use plclog_storage::{build_object_store, upload_and_cleanup, ObjectStore, UploadOutcome};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Args)]
pub struct UploadArgs {
    /// Local log file (default: upload.local_path from config)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Destination bucket (default: upload.bucket from config)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix (default: upload.prefix from config)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Partition date as YYYY-MM-DD (default: today, local time)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Delete the local file after a successful upload
    #[arg(long)]
    pub delete: bool,
}

impl UploadArgs {
    pub(crate) fn apply(&self, upload: &mut UploadConfig) {
        if let Some(file) = &self.file {
            upload.local_path = file.to_string_lossy().to_string();
        }
        if let Some(bucket) = &self.bucket {
            upload.bucket = bucket.clone();
        }
        if let Some(prefix) = &self.prefix {
            upload.prefix = normalize_prefix(prefix);
        }
        if self.delete {
            upload.delete_on_success = true;
        }
    }
}

/// Upload `upload.local_path` under the partition key for `date`
pub async fn upload_daily_log(
    store: &dyn ObjectStore,
    upload: &UploadConfig,
    date: NaiveDate,
) -> Result<UploadOutcome> {
    let key = derive_key(&upload.prefix, date, &upload.filename_template)?;
    let outcome = upload_and_cleanup(
        store,
        Path::new(&upload.local_path),
        &upload.bucket,
        &key,
        upload.delete_on_success,
    )
    .await
    .context("Upload failed")?;
    Ok(outcome)
}

pub(crate) async fn execute(args: UploadArgs, config: &RuntimeConfig) -> Result<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let store = build_object_store(&config.storage).await;

    let outcome = upload_daily_log(store.as_ref(), &config.upload, date).await?;
    println!(
        "Uploaded {} bytes to s3://{}/{}",
        outcome.bytes, outcome.bucket, outcome.key
    );

    if let Some(failure) = outcome.cleanup_failed() {
        warn!(error = %failure, "Upload succeeded but local cleanup failed");
        eprintln!("warning: {}", failure);
    }
    Ok(())
}
