//! Error types for partition key handling

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Invalid argument (bad date, bad generator parameters)
    E001InvalidArgument,
    /// E002: Object key does not follow the partition grammar
    E002MalformedKey,
    /// E003: Storage event payload is missing required fields
    E003InvalidEvent,
    /// E004: Generated output could not be written
    E004WriteFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001InvalidArgument => "E001",
            Self::E002MalformedKey => "E002",
            Self::E003InvalidEvent => "E003",
            Self::E004WriteFailed => "E004",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the pure key/statement logic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("[{code}] Invalid argument: {message}")]
    InvalidArgument { code: ErrorCode, message: String },

    #[error("[{code}] Malformed object key '{key}': {reason}")]
    MalformedKey {
        code: ErrorCode,
        key: String,
        reason: String,
    },

    #[error("[{code}] Invalid storage event: {message}")]
    InvalidEvent { code: ErrorCode, message: String },

    #[error("[{code}] Failed to write output: {message}")]
    Write {
        code: ErrorCode,
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            code: ErrorCode::E001InvalidArgument,
            message: message.into(),
        }
    }

    pub fn malformed_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            code: ErrorCode::E002MalformedKey,
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            code: ErrorCode::E003InvalidEvent,
            message: message.into(),
        }
    }

    pub fn write(err: &std::io::Error) -> Self {
        Self::Write {
            code: ErrorCode::E004WriteFailed,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { code, .. }
            | Self::MalformedKey { code, .. }
            | Self::InvalidEvent { code, .. }
            | Self::Write { code, .. } => *code,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T> = std::result::Result<T, CoreError>;
