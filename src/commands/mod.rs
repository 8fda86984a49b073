//! CLI subcommands

mod bucket;
mod generate;
mod register;
mod upload;

use anyhow::Result;
use clap::Subcommand;
use plclog_config::RuntimeConfig;

pub use bucket::CreateBucketArgs;
pub use generate::{generate_to_file, GenerateArgs};
pub use register::{load_event, RegisterArgs};
pub use upload::{upload_daily_log, UploadArgs};

#[derive(Subcommand)]
pub enum Command {
    /// Upload the local daily log under today's partition
    Upload(UploadArgs),
    /// Create the log bucket (succeeds if you already own it)
    CreateBucket(CreateBucketArgs),
    /// Write a synthetic vibration log CSV
    Generate(GenerateArgs),
    /// Register the Athena partition for a created object
    Register(RegisterArgs),
}

impl Command {
    /// Config-section overrides a subcommand applies before validation
    pub fn apply_overrides(&self, config: &mut RuntimeConfig) {
        match self {
            Command::Upload(args) => args.apply(&mut config.upload),
            Command::CreateBucket(args) => args.apply(&mut config.upload),
            Command::Generate(_) | Command::Register(_) => {}
        }
    }

    pub async fn run(self, config: RuntimeConfig) -> Result<()> {
        match self {
            Command::Upload(args) => upload::execute(args, &config).await,
            Command::CreateBucket(args) => bucket::execute(args, &config).await,
            Command::Generate(args) => generate::execute(args, &config),
            Command::Register(args) => register::execute(args, &config).await,
        }
    }
}
