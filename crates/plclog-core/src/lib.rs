//! plclog-core - partition key grammar shared by the uploader and the registrar
//!
//! Pure logic only: no async, no I/O beyond `std::io::Write` for the
//! generator. The key layout is the one contract both sides agree on:
//! `{prefix}/year={YYYY}/month={MM}/day={DD}/{filename}`.

mod error;
pub mod event;
pub mod generator;
pub mod partition;
pub mod registration;

pub use error::{CoreError, ErrorCode, Result};
pub use event::{decode_object_key, ObjectCreatedEvent, ObjectCreatedRecord};
pub use generator::{generate_vibration_csv, GeneratorSpec, GeneratorSummary};
pub use partition::{
    derive_key, derive_key_from_ymd, parse_object_key, partition_path, ParsedKey, PartitionKey,
    DATE_TOKEN,
};
pub use registration::{PartitionDescriptor, PrefixPolicy, RegistrationStatement};
