//! Partition descriptors and the Athena `ALTER TABLE ... ADD PARTITION` statement

use crate::error::{CoreError, Result};
use crate::event::ObjectCreatedRecord;
use crate::partition::{parse_object_key, partition_path};
use serde::{Deserialize, Serialize};

/// URI scheme used for partition locations
pub const LOCATION_SCHEME: &str = "s3";

/// How the key's leading segment is reconciled with the configured prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixPolicy {
    /// Always use the configured prefix for the location
    #[default]
    Configured,
    /// Reject keys whose leading segment differs from the configured prefix
    RequireMatch,
}

/// Registrar's parsed view of a created object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    pub bucket: String,
    pub prefix: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

impl PartitionDescriptor {
    /// Parse the record's key and attach the configured prefix
    pub fn from_record(
        record: &ObjectCreatedRecord,
        configured_prefix: &str,
        policy: PrefixPolicy,
    ) -> Result<Self> {
        let parsed = parse_object_key(record.key())?;
        let configured = configured_prefix.trim_matches('/');

        if policy == PrefixPolicy::RequireMatch && parsed.prefix != configured {
            return Err(CoreError::malformed_key(
                record.key(),
                format!(
                    "leading segment '{}' does not match configured prefix '{}'",
                    parsed.prefix, configured
                ),
            ));
        }

        Ok(Self {
            bucket: record.bucket().to_string(),
            prefix: configured.to_string(),
            year: parsed.year,
            month: parsed.month,
            day: parsed.day,
        })
    }

    /// `s3://{bucket}/{prefix}/year=../month=../day=../`
    pub fn location_uri(&self) -> String {
        format!(
            "{}://{}/{}",
            LOCATION_SCHEME,
            self.bucket,
            partition_path(&self.prefix, &self.year, &self.month, &self.day)
        )
    }

    /// `(year='YYYY', month='MM', day='DD')`
    pub fn partition_spec(&self) -> String {
        format!(
            "(year='{}', month='{}', day='{}')",
            self.year, self.month, self.day
        )
    }
}

/// Conditional partition-add statement for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationStatement {
    table: String,
    descriptor: PartitionDescriptor,
}

impl RegistrationStatement {
    pub fn new(table: impl Into<String>, descriptor: PartitionDescriptor) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { table, descriptor })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn descriptor(&self) -> &PartitionDescriptor {
        &self.descriptor
    }

    /// Render the statement text submitted to the query engine
    pub fn sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD IF NOT EXISTS PARTITION {} LOCATION '{}'",
            self.table,
            self.descriptor.partition_spec(),
            escape_literal(&self.descriptor.location_uri())
        )
    }
}

impl std::fmt::Display for RegistrationStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Table names may be `table` or `database.table` made of `[A-Za-z0-9_]`
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table.split('.').count() <= 2
        && table.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(CoreError::invalid_argument(format!(
            "'{}' is not a valid table name",
            table
        )))
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
