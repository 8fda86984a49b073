// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use plclog_core::registration::validate_table_name;
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_storage_config(&config.storage)?;
    validate_upload_config(&config.upload)?;
    validate_catalog_config(&config.catalog)?;

    if config.upload.prefix != config.catalog.prefix {
        warn!(
            upload_prefix = %config.upload.prefix,
            catalog_prefix = %config.catalog.prefix,
            "upload.prefix and catalog.prefix differ; registered locations will not match uploaded keys"
        );
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    match config.backend {
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("s3 storage backend requires 's3' configuration"))?;

            if s3.region.is_empty() {
                bail!("storage.s3.region is required for S3 backend");
            }
        }
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("fs storage backend requires 'fs' configuration"))?;

            if fs.root.is_empty() {
                bail!("storage.fs.root must not be empty");
            }
        }
        StorageBackend::Memory => {}
    }

    Ok(())
}

fn validate_upload_config(config: &UploadConfig) -> Result<()> {
    if config.bucket.is_empty() {
        bail!("upload.bucket must not be empty");
    }

    validate_prefix("upload.prefix", &config.prefix)?;

    if config.filename_template.is_empty() {
        bail!("upload.filename_template must not be empty");
    }

    if config.filename_template.contains('/') {
        bail!("upload.filename_template must not contain '/'");
    }

    if !config.filename_template.contains(plclog_core::DATE_TOKEN) {
        warn!(
            template = %config.filename_template,
            "upload.filename_template has no {} token; each day reuses the same filename",
            plclog_core::DATE_TOKEN
        );
    }

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<()> {
    if config.database.is_empty() {
        bail!("catalog.database must not be empty");
    }

    if let Err(e) = validate_table_name(&config.table) {
        bail!("catalog.table is invalid: {}", e);
    }

    if !config.output_location.starts_with("s3://") {
        bail!(
            "catalog.output_location must be an s3:// URI, got '{}'",
            config.output_location
        );
    }

    if config.region.is_empty() {
        bail!("catalog.region must not be empty");
    }

    validate_prefix("catalog.prefix", &config.prefix)?;

    Ok(())
}

fn validate_prefix(field: &str, prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("{} must not be empty", field);
    }

    // A single segment: the registrar reads year/month/day at fixed positions
    if prefix.contains('/') {
        bail!("{} must be a single path segment, got '{}'", field, prefix);
    }

    if prefix.contains('=') {
        bail!("{} must not contain '=', got '{}'", field, prefix);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_config() {
        let valid = UploadConfig::default();
        assert!(validate_upload_config(&valid).is_ok());

        let empty_bucket = UploadConfig {
            bucket: String::new(),
            ..UploadConfig::default()
        };
        assert!(validate_upload_config(&empty_bucket).is_err());

        let nested_template = UploadConfig {
            filename_template: "a/b.csv".to_string(),
            ..UploadConfig::default()
        };
        assert!(validate_upload_config(&nested_template).is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("p", "plc-logs").is_ok());
        assert!(validate_prefix("p", "").is_err());
        assert!(validate_prefix("p", "a/b").is_err());
        assert!(validate_prefix("p", "year=2025").is_err());
    }

    #[test]
    fn test_validate_catalog_config() {
        assert!(validate_catalog_config(&CatalogConfig::default()).is_ok());

        let bad_output = CatalogConfig {
            output_location: "/tmp/results".to_string(),
            ..CatalogConfig::default()
        };
        assert!(validate_catalog_config(&bad_output).is_err());

        let bad_table = CatalogConfig {
            table: "daily logs".to_string(),
            ..CatalogConfig::default()
        };
        assert!(validate_catalog_config(&bad_table).is_err());
    }

    #[test]
    fn test_validate_storage_config() {
        let fs_without_root = StorageConfig {
            backend: StorageBackend::Fs,
            s3: None,
            fs: None,
        };
        assert!(validate_storage_config(&fs_without_root).is_err());

        let memory = StorageConfig {
            backend: StorageBackend::Memory,
            s3: None,
            fs: None,
        };
        assert!(validate_storage_config(&memory).is_ok());
    }
}
