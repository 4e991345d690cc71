// Error types shared by the envelope builder, the normalizers and the dispatcher
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected response shape: {reason} (seen: [{}])", .seen.join(", "))]
    ProtocolShapeMismatch { reason: String, seen: Vec<String> },

    #[error("Domain validation failed: {0}")]
    DomainValidation(String),

    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    #[error("Seat map unavailable: {0}")]
    SeatMapUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure classification handed to the dispatcher.
///
/// `BusinessEmpty` never appears here: an empty result is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    UpstreamUnavailable,
    ProtocolShapeMismatch,
    DomainValidationFailure,
    BackendRejected,
    SeatMapUnavailable,
    InvalidRequest,
    Internal,
}

impl AdapterError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AdapterError::UpstreamUnavailable(_) => FailureKind::UpstreamUnavailable,
            AdapterError::ProtocolShapeMismatch { .. } => FailureKind::ProtocolShapeMismatch,
            AdapterError::DomainValidation(_) => FailureKind::DomainValidationFailure,
            AdapterError::BackendRejected(_) => FailureKind::BackendRejected,
            AdapterError::SeatMapUnavailable(_) => FailureKind::SeatMapUnavailable,
            AdapterError::InvalidRequest(_) => FailureKind::InvalidRequest,
            AdapterError::Internal(_) => FailureKind::Internal,
        }
    }

    // HTTP-style status for the outer front-end
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            FailureKind::InvalidRequest => 400,
            FailureKind::SeatMapUnavailable => 404,
            FailureKind::DomainValidationFailure => 422,
            FailureKind::UpstreamUnavailable
            | FailureKind::ProtocolShapeMismatch
            | FailureKind::BackendRejected => 502,
            FailureKind::Internal => 500,
        }
    }

    pub(crate) fn shape(reason: impl Into<String>, seen: Vec<String>) -> Self {
        AdapterError::ProtocolShapeMismatch {
            reason: reason.into(),
            seen,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}
