//! Shared error type across callcast crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Consumer identity missing or malformed.
    Unauthenticated,
    /// Consumer has no ACL entry matching the method.
    PermissionDenied,
    /// Invalid input / malformed request.
    InvalidArgument,
    /// Unknown service or method.
    NotFound,
    /// Outbound stream send failed.
    Delivery,
    /// Startup configuration rejected.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::PermissionDenied => "PERMISSION_DENIED",
            ClientCode::InvalidArgument => "INVALID_ARGUMENT",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Delivery => "DELIVERY",
            ClientCode::Config => "CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CallcastError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum CallcastError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl CallcastError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CallcastError::Unauthenticated(_) => ClientCode::Unauthenticated,
            CallcastError::PermissionDenied(_) => ClientCode::PermissionDenied,
            CallcastError::InvalidArgument(_) => ClientCode::InvalidArgument,
            CallcastError::NotFound(_) => ClientCode::NotFound,
            CallcastError::Delivery(_) => ClientCode::Delivery,
            CallcastError::Config(_) => ClientCode::Config,
            CallcastError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            CallcastError::Internal(_) => ClientCode::Internal,
        }
    }
}
