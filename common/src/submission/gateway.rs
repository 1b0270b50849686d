//! Remote submit boundary.

use crate::model::form_data::FieldErrors;
use crate::model::submission::SubmissionReceipt;
use crate::requests::SubmissionRequest;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    /// The server refused the answers as invalid.
    #[error("submission rejected: {} invalid field(s)", .0.len())]
    Rejected(FieldErrors),
}

impl GatewayError {
    pub fn is_validation(&self) -> bool {
        matches!(self, GatewayError::Rejected(_))
    }

    /// Client errors that a resend of the same request cannot fix: invalid
    /// answers, an unknown template or an unreadable body. Timeouts and rate
    /// limiting are retried like any other failure.
    pub fn is_permanent(&self) -> bool {
        match self {
            GatewayError::Rejected(_) => true,
            GatewayError::Server { status, .. } => {
                (400..500).contains(status) && !matches!(status, 408 | 429)
            }
            GatewayError::Network(_) => false,
        }
    }
}

/// Sends one submission to the backend.
///
/// Implementations must be safe to call again with the same request; the
/// backend deduplicates on `client_submission_id`.
#[allow(async_fn_in_trait)]
pub trait SubmissionGateway {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: u16) -> GatewayError {
        GatewayError::Server {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn client_errors_are_permanent_except_timeouts_and_throttling() {
        assert!(GatewayError::Rejected(FieldErrors::new()).is_permanent());
        assert!(server(400).is_permanent());
        assert!(server(404).is_permanent());
        assert!(!server(408).is_permanent());
        assert!(!server(429).is_permanent());
        assert!(!server(503).is_permanent());
        assert!(!GatewayError::Network("offline".into()).is_permanent());
    }
}
