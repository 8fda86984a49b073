//! Error types for query submission and partition registration

use plclog_core::CoreError;
use thiserror::Error;

/// Failure to get a statement accepted by the query service
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("[C001] Query service unreachable: {0:#}")]
    Transport(anyhow::Error),

    #[error("[C002] Query service rejected the request (HTTP {status}, {error_type}): {message}")]
    Rejected {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("[C003] Unexpected response from query service: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Short error type without the `namespace#` qualifier Athena sometimes sends
    pub fn rejected(status: u16, error_type: Option<&str>, message: impl Into<String>) -> Self {
        let error_type = error_type
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        Self::Rejected {
            status,
            error_type,
            message: message.into(),
        }
    }
}

/// Failure while turning a storage event into a submitted registration
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("[R001] Malformed object key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("[R002] Invalid storage event: {message}")]
    InvalidEvent { message: String },

    #[error("[R003] Invalid registration settings: {message}")]
    InvalidSettings { message: String },

    #[error("[R004] Partition registration for '{location}' was not submitted: {source}")]
    SubmissionFailed {
        location: String,
        #[source]
        source: CatalogError,
    },
}

impl From<CoreError> for RegistrarError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedKey { key, reason, .. } => Self::MalformedKey { key, reason },
            CoreError::InvalidEvent { message, .. } => Self::InvalidEvent { message },
            CoreError::InvalidArgument { message, .. } => Self::InvalidSettings { message },
            other @ CoreError::Write { .. } => Self::InvalidSettings {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_strips_namespace() {
        let err = CatalogError::rejected(
            400,
            Some("com.amazonaws.athena#InvalidRequestException"),
            "Table not found",
        );
        assert!(matches!(
            &err,
            CatalogError::Rejected { error_type, .. } if error_type == "InvalidRequestException"
        ));
        assert!(err.to_string().contains("Table not found"));
    }

    #[test]
    fn test_core_errors_map_to_registrar_kinds() {
        let err: RegistrarError = CoreError::malformed_key("onlyoneseg", "too short").into();
        assert!(matches!(err, RegistrarError::MalformedKey { key, .. } if key == "onlyoneseg"));

        let err: RegistrarError = CoreError::invalid_event("no records").into();
        assert!(matches!(err, RegistrarError::InvalidEvent { .. }));
    }
}
