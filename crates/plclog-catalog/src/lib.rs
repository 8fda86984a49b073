//! Athena partition registration for daily PLC logs
//!
//! [`PartitionRegistrar`] turns an object-created event into an
//! `ALTER TABLE ... ADD IF NOT EXISTS PARTITION` statement and submits it
//! through a [`QueryEngine`]. [`AthenaQueryClient`] is the production engine:
//! a SigV4-signed `StartQueryExecution` call.

mod athena;
mod aws;
mod error;
mod http;
mod registrar;

pub use athena::{regional_endpoint, AthenaQueryClient, QueryEngine, SubmittedQueryId};
pub use aws::AwsSigV4HttpClient;
pub use error::{CatalogError, RegistrarError};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use registrar::{PartitionRegistrar, RegistrarSettings};
