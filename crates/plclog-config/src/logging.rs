// Tracing subscriber setup shared by the CLI and the Lambda function

use crate::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where log lines end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// stderr with timestamps; stdout stays free for command output
    Terminal,
    /// stdout without timestamps or ANSI colors; CloudWatch stamps each line
    CloudWatch,
}

/// Install the global subscriber; returns false if one was already set
pub fn init_tracing(logging: &LoggingConfig, output: LogOutput) -> bool {
    let env_filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match (output, logging.format) {
        (LogOutput::Terminal, LogFormat::Json) => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
        (LogOutput::Terminal, LogFormat::Text) => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr)),
        ),
        (LogOutput::CloudWatch, LogFormat::Json) => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().without_time()),
        ),
        (LogOutput::CloudWatch, LogFormat::Text) => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_ansi(false).without_time()),
        ),
    };
    installed.is_ok()
}
