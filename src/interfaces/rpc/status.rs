use crate::error::{ErrorKind, PaymentError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Status codes reported at the RPC boundary, named after their gRPC
/// counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    InvalidArgument,
    NotFound,
    FailedPrecondition,
    Internal,
    Unavailable,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::NotFound => "NOT_FOUND",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Maps an engine error onto a status.
    ///
    /// Internal failures are logged in full here and reported with a message
    /// that names only the failed operation.
    pub fn from_error(err: PaymentError, operation: &str) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => Self::new(Code::InvalidArgument, err.to_string()),
            ErrorKind::NotFound => Self::new(Code::NotFound, err.to_string()),
            ErrorKind::PreconditionFailed => {
                Self::new(Code::FailedPrecondition, err.to_string())
            }
            ErrorKind::Internal => {
                error!(operation, error = %err, "Internal error");
                Self::new(
                    Code::Internal,
                    format!("Internal error while processing {}", operation),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;

    #[test]
    fn test_error_mapping() {
        let status = Status::from_error(PaymentError::NotFound(9), "GetPayment");
        assert_eq!(status.code, Code::NotFound);
        assert_eq!(status.message, "Payment with ID 9 not found");

        let status = Status::from_error(
            PaymentError::PreconditionFailed {
                payment_id: 9,
                operation: "refund",
                status: PaymentStatus::Pending,
            },
            "RefundPayment",
        );
        assert_eq!(status.code, Code::FailedPrecondition);
        assert!(status.message.contains("Pending"));

        let status = Status::from_error(
            PaymentError::InvalidInput("Order ID must be greater than 0".to_string()),
            "ProcessPayment",
        );
        assert_eq!(status.code, Code::InvalidArgument);
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let status = Status::from_error(
            PaymentError::StorageError("column family payments not found".to_string()),
            "RefundPayment",
        );
        assert_eq!(status.code, Code::Internal);
        assert!(!status.message.contains("column family"));
        assert!(status.message.contains("RefundPayment"));
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&Status::invalid_argument("bad")).unwrap();
        assert_eq!(json, r#"{"code":"INVALID_ARGUMENT","message":"bad"}"#);
    }
}
