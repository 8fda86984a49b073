// Configuration source loading
//
// Priority order:
// 1. Environment variables (PLCLOG_* prefix)
// 2. Config file path from PLCLOG_CONFIG
// 3. Inline config content from PLCLOG_CONFIG_CONTENT
// 4. Default config files (./plclog.toml, ./.plclog.toml)
// 5. Platform defaults (based on auto-detected Platform)

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::platform::Platform;
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_FILES: [&str; 2] = ["./plclog.toml", "./.plclog.toml"];

/// Load configuration for the detected platform using native environment/file access.
pub fn load_config(platform: Platform) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_platform_defaults(platform);

    if let Some((origin, content)) = load_from_file()? {
        config
            .merge_toml(&content)
            .with_context(|| format!("Failed to parse {}", origin))?;
    }

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

/// Raw TOML of the highest-priority config source, with a description of where it came from
fn load_from_file() -> Result<Option<(String, String)>> {
    if let Ok(path) = env::var("PLCLOG_CONFIG") {
        let content = read_config_file(Path::new(&path))?;
        return Ok(Some((format!("config file: {}", path), content)));
    }

    if let Ok(content) = env::var("PLCLOG_CONFIG_CONTENT") {
        return Ok(Some((
            "inline config from PLCLOG_CONFIG_CONTENT".to_string(),
            content,
        )));
    }

    for path in DEFAULT_CONFIG_FILES {
        let path = Path::new(path);
        if path.exists() {
            let content = read_config_file(path)?;
            return Ok(Some((format!("config file: {}", path.display()), content)));
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let path = path.as_ref();
    let content = read_config_file(path)?;

    let mut config = RuntimeConfig::from_platform_defaults(Platform::detect());
    config
        .merge_toml(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[catalog]\ntable = \"vibration\"\n\n[logging]\nformat = \"json\"\n"
        )
        .unwrap();

        let content = read_config_file(file.path()).unwrap();
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Cli);
        config.merge_toml(&content).unwrap();
        assert_eq!(config.catalog.table, "vibration");
        assert_eq!(config.logging.format, crate::LogFormat::Json);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_config_file(Path::new("/nonexistent/plclog.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upload\nbucket = ").unwrap();
        let err = load_from_file_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
