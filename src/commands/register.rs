use anyhow::{bail, Context, Result};
use clap::Args;
use plclog_catalog::{AthenaQueryClient, PartitionRegistrar, RegistrarSettings};
use plclog_config::RuntimeConfig;
use plclog_core::{ObjectCreatedEvent, ObjectCreatedRecord};
use std::path::PathBuf;

#[derive(Args)]
pub struct RegisterArgs {
    /// S3 event notification JSON file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["bucket", "key"])]
    pub event: Option<PathBuf>,

    /// Bucket of the created object
    #[arg(long, requires = "key")]
    pub bucket: Option<String>,

    /// Object key, URL-encoded as S3 delivers it
    #[arg(long, requires = "bucket")]
    pub key: Option<String>,

    /// Print the statement(s) without submitting
    #[arg(long)]
    pub dry_run: bool,
}

/// Event from `--event`, or a one-record event from `--bucket`/`--key`
pub fn load_event(args: &RegisterArgs) -> Result<ObjectCreatedEvent> {
    if let Some(path) = &args.event {
        let payload = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?;
        return Ok(ObjectCreatedEvent::from_json(&payload)?);
    }

    match (&args.bucket, &args.key) {
        (Some(bucket), Some(key)) => Ok(ObjectCreatedEvent::new(vec![
            ObjectCreatedRecord::from_encoded(bucket.as_str(), key)?,
        ])?),
        _ => bail!("either --event or both --bucket and --key are required"),
    }
}

pub(crate) async fn execute(args: RegisterArgs, config: &RuntimeConfig) -> Result<()> {
    let event = load_event(&args)?;
    let settings = RegistrarSettings::from(&config.catalog);

    if args.dry_run {
        for statement in settings.plan(&event)? {
            println!("{};", statement);
        }
        return Ok(());
    }

    let engine = AthenaQueryClient::from_config(&config.catalog)
        .await
        .context("Failed to initialize Athena client")?;
    let registrar = PartitionRegistrar::new(engine, settings);

    for id in registrar.register(&event).await? {
        println!("QueryExecutionId: {}", id);
    }
    Ok(())
}
