// Platform detection based on environment variables
//
// - AWS Lambda: AWS_LAMBDA_FUNCTION_NAME env var present
// - CLI: anything else (default)

use crate::{LogFormat, StorageBackend};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Cli,
    Lambda,
}

impl Platform {
    /// Auto-detect the current platform based on environment variables
    pub fn detect() -> Self {
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            Platform::Lambda
        } else {
            Platform::Cli
        }
    }

    /// Get platform-specific defaults
    pub fn defaults(&self) -> PlatformDefaults {
        match self {
            Platform::Cli => PlatformDefaults {
                storage_backend: StorageBackend::S3,
                log_format: LogFormat::Text,
                log_level: "info",
            },
            // CloudWatch ingests one JSON object per line
            Platform::Lambda => PlatformDefaults {
                storage_backend: StorageBackend::S3,
                log_format: LogFormat::Json,
                log_level: "info",
            },
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Cli => write!(f, "cli"),
            Platform::Lambda => write!(f, "lambda"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    pub storage_backend: StorageBackend,
    pub log_format: LogFormat,
    pub log_level: &'static str,
}
