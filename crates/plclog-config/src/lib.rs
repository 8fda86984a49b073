// plclog-config - Unified configuration for the CLI and the Lambda registrar
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from PLCLOG_CONFIG env var
// 3. Config file contents from PLCLOG_CONFIG_CONTENT env var
// 4. Default config file locations (./plclog.toml, ./.plclog.toml)
// 5. Platform-specific defaults (lowest priority)

use anyhow::{Context, Result};
use plclog_core::PrefixPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod logging;
mod platform;
mod sources;
mod validation;

pub use env_overrides::{normalize_prefix, EnvSource, MapEnvSource, ENV_PREFIX};
pub use logging::{init_tracing, LogOutput};
pub use platform::{Platform, PlatformDefaults};

pub const DEFAULT_PREFIX: &str = "plc-logs";

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::S3
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            s3: Some(S3Config::default()),
            fs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Fs,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" | "aws" => Ok(StorageBackend::S3),
            "fs" | "filesystem" => Ok(StorageBackend::Fs),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            _ => anyhow::bail!("Unsupported storage backend: {}. Supported: s3, fs, memory", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    pub root: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: "./buckets".to_string(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Daily log upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub bucket: String,
    pub prefix: String,
    pub local_path: String,
    pub filename_template: String,
    pub delete_on_success: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: "vibration-daily-readings-project".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            local_path: "local-plc-log.csv".to_string(),
            filename_template: "plc-data-YYYYMMDD.csv".to_string(),
            delete_on_success: false,
        }
    }
}

/// Athena partition registration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: String,
    pub table: String,
    pub output_location: String,
    /// Prefix used in partition locations; authoritative over the key's first segment
    pub prefix: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup: Option<String>,
    pub strict_prefix: bool,
    pub process_all_records: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: "plc_analytics".to_string(),
            table: "daily_logs".to_string(),
            output_location: "s3://athena-query-results-plc-analytics-db/".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            region: default_region(),
            endpoint: None,
            workgroup: None,
            strict_prefix: false,
            process_all_records: false,
        }
    }
}

impl CatalogConfig {
    pub fn prefix_policy(&self) -> PrefixPolicy {
        if self.strict_prefix {
            PrefixPolicy::RequireMatch
        } else {
            PrefixPolicy::Configured
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config(Platform::detect())
    }

    /// Load configuration for a specific platform (useful for testing)
    pub fn load_for_platform(platform: Platform) -> Result<Self> {
        sources::load_config(platform)
    }

    /// Load from an explicit file (CLI `--config`), then apply env overrides
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    pub fn from_platform_defaults(platform: Platform) -> Self {
        let defaults = platform.defaults();
        let mut config = RuntimeConfig::default();
        config.storage.backend = defaults.storage_backend;
        config.logging.format = defaults.log_format;
        config.logging.level = defaults.log_level.to_string();
        config
    }

    /// Layer a TOML document over this config.
    ///
    /// Only sections the document names are replaced. Within `[logging]` and
    /// for `storage.backend`, unset fields keep their platform defaults.
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let file: RuntimeConfig = toml::from_str(content)?;
        let present: toml::Table = toml::from_str(content)?;
        let sets = |section: &str, field: &str| {
            present
                .get(section)
                .and_then(|table| table.get(field))
                .is_some()
        };

        if present.contains_key("storage") {
            let backend = self.storage.backend;
            self.storage = file.storage;
            if !sets("storage", "backend") {
                self.storage.backend = backend;
            }
        }
        if present.contains_key("upload") {
            self.upload = file.upload;
        }
        if present.contains_key("catalog") {
            self.catalog = file.catalog;
        }
        if sets("logging", "level") {
            self.logging.level = file.logging.level;
        }
        if sets("logging", "format") {
            self.logging.format = file.logging.format;
        }
        Ok(())
    }

    /// Defaults, inline TOML, then overrides from `env`; validated
    pub fn load_with_env<E: EnvSource>(
        platform: Platform,
        inline_config: Option<&str>,
        env: &E,
    ) -> Result<Self> {
        let mut config = RuntimeConfig::from_platform_defaults(platform);

        if let Some(inline) = inline_config {
            config
                .merge_toml(inline)
                .context("Failed to parse inline config content")?;
        }

        env_overrides::apply_env_overrides(&mut config, env)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
