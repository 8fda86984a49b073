use super::{FsConfig, LogFormat, RuntimeConfig, S3Config, StorageBackend};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;

pub const ENV_PREFIX: &str = "PLCLOG_";

/// Abstraction over environment-variable lookups so tests and embedders
/// can supply their own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the PLCLOG_ prefix
    /// Used for AWS standard variables (AWS_REGION)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// In-memory environment keyed by full variable name
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(&format!("{}{}", ENV_PREFIX, key)).cloned()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // AWS standard region first so PLCLOG_* values can still override it
    if let Some(region) = env.get_raw("AWS_REGION") {
        ensure_s3(config).region = region.clone();
        config.catalog.region = region;
    }

    // Storage backend
    if let Some(backend) = env.get("STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid PLCLOG_STORAGE_BACKEND value")?;
    }
    if let Some(root) = env.get("STORAGE_PATH") {
        config.storage.fs.get_or_insert_with(FsConfig::default).root = root;
    }
    if let Some(region) = env.get("S3_REGION") {
        ensure_s3(config).region = region;
    }
    if let Some(endpoint) = env.get("S3_ENDPOINT") {
        ensure_s3(config).endpoint = Some(endpoint);
    }
    if let Some(val) = get_env_bool(env, "S3_FORCE_PATH_STYLE")? {
        ensure_s3(config).force_path_style = val;
    }

    // Upload
    if let Some(bucket) = env.get("UPLOAD_BUCKET") {
        config.upload.bucket = bucket;
    }
    if let Some(prefix) = env.get("UPLOAD_PREFIX") {
        config.upload.prefix = normalize_prefix(&prefix);
    }
    if let Some(path) = env.get("UPLOAD_LOCAL_PATH") {
        config.upload.local_path = path;
    }
    if let Some(template) = env.get("UPLOAD_FILENAME_TEMPLATE") {
        config.upload.filename_template = template;
    }
    if let Some(val) = get_env_bool(env, "UPLOAD_DELETE_ON_SUCCESS")? {
        config.upload.delete_on_success = val;
    }

    // Catalog
    if let Some(database) = env.get("CATALOG_DATABASE") {
        config.catalog.database = database;
    }
    if let Some(table) = env.get("CATALOG_TABLE") {
        config.catalog.table = table;
    }
    if let Some(location) = env.get("CATALOG_OUTPUT_LOCATION") {
        config.catalog.output_location = location;
    }
    if let Some(prefix) = env.get("CATALOG_PREFIX") {
        config.catalog.prefix = normalize_prefix(&prefix);
    }
    if let Some(region) = env.get("CATALOG_REGION") {
        config.catalog.region = region;
    }
    if let Some(endpoint) = env.get("CATALOG_ENDPOINT") {
        config.catalog.endpoint = Some(endpoint);
    }
    if let Some(workgroup) = env.get("CATALOG_WORKGROUP") {
        config.catalog.workgroup = Some(workgroup);
    }
    if let Some(val) = get_env_bool(env, "CATALOG_STRICT_PREFIX")? {
        config.catalog.strict_prefix = val;
    }
    if let Some(val) = get_env_bool(env, "CATALOG_PROCESS_ALL_RECORDS")? {
        config.catalog.process_all_records = val;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        config.logging.format = format.parse::<LogFormat>()?;
    }

    Ok(())
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(S3Config::default)
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match env.get(key) {
        Some(val) => {
            let parsed = match val.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): '{}'",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Strip leading and trailing slashes from a key prefix
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}
