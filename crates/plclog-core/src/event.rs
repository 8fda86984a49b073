//! Typed view of an S3 `ObjectCreated` notification
//!
//! Validated at the boundary: every record has a bucket name and a decoded
//! object key, and the event carries at least one record.

use crate::error::{CoreError, Result};
use serde::Deserialize;

/// One object-created notification record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreatedRecord {
    bucket: String,
    key: String,
}

impl ObjectCreatedRecord {
    /// Build a record from the bucket name and the URL-encoded key as delivered by S3
    pub fn from_encoded(bucket: impl Into<String>, encoded_key: &str) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(CoreError::invalid_event("record has an empty bucket name"));
        }
        if encoded_key.is_empty() {
            return Err(CoreError::invalid_event("record has an empty object key"));
        }
        Ok(Self {
            bucket,
            key: decode_object_key(encoded_key)?,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Decoded object key
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Notification carrying one or more created objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreatedEvent {
    records: Vec<ObjectCreatedRecord>,
}

impl ObjectCreatedEvent {
    pub fn new(records: Vec<ObjectCreatedRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(CoreError::invalid_event("event contains no records"));
        }
        Ok(Self { records })
    }

    /// Parse the raw S3 notification JSON (`{"Records": [{"s3": {...}}]}`)
    pub fn from_json(payload: &str) -> Result<Self> {
        let raw: RawNotification = serde_json_from_str(payload)?;
        let records = raw
            .records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                let entity = record.s3.ok_or_else(|| {
                    CoreError::invalid_event(format!("record {} has no 's3' entity", idx))
                })?;
                let bucket = entity.bucket.name.ok_or_else(|| {
                    CoreError::invalid_event(format!("record {} has no bucket name", idx))
                })?;
                let key = entity.object.key.ok_or_else(|| {
                    CoreError::invalid_event(format!("record {} has no object key", idx))
                })?;
                ObjectCreatedRecord::from_encoded(bucket, &key)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(records)
    }

    pub fn first(&self) -> &ObjectCreatedRecord {
        &self.records[0]
    }

    pub fn records(&self) -> &[ObjectCreatedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Undo S3's key encoding: `+` is a space, everything else is percent-encoded
pub fn decode_object_key(encoded: &str) -> Result<String> {
    let plus_decoded = encoded.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CoreError::invalid_event(format!("object key '{}' is not valid UTF-8: {}", encoded, e)))
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    #[serde(rename = "Records", default)]
    records: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    s3: Option<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    bucket: RawBucket,
    object: RawObject,
}

#[derive(Debug, Deserialize)]
struct RawBucket {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    key: Option<String>,
}

fn serde_json_from_str<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .map_err(|e| CoreError::invalid_event(format!("failed to parse notification JSON: {}", e)))
}
