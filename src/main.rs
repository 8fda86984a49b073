use anyhow::{Context, Result};
use clap::Parser;
use plclog::commands::Command;
use plclog_config::{init_tracing, LogFormat, LogOutput, RuntimeConfig};
use std::path::PathBuf;

/// Upload daily PLC vibration logs to S3 and register their Athena partitions
#[derive(Parser)]
#[command(name = "plclog")]
#[command(version)]
#[command(about = "Upload daily PLC vibration logs to S3 and register their Athena partitions", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };

    // CLI flags take priority over file and environment
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    cli.command.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging, LogOutput::Terminal);
    cli.command.run(config).await
}
