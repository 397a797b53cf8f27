use std::fmt;
use thiserror::Error;

/// Failures surfaced to editorial write requests.
///
/// The messages are the ones the host shows when it terminates the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityFailure {
    SecurityCheckFailed,
    PermissionDenied,
    MissingRequiredData,
    NoChangeSelected,
}

impl fmt::Display for SecurityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SecurityFailure::SecurityCheckFailed => "Security check failed",
            SecurityFailure::PermissionDenied => "Permission denied",
            SecurityFailure::MissingRequiredData => "Missing required data",
            SecurityFailure::NoChangeSelected => "No change selected",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum VvcError {
    #[error("Content item not found: {0}")]
    ItemNotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),

    #[error("{0}")]
    Security(SecurityFailure),
}

pub type Result<T> = std::result::Result<T, VvcError>;
