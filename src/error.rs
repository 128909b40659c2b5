use crate::domain::payment::{PaymentId, PaymentStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Payment with ID {0} not found")]
    NotFound(PaymentId),
    #[error("Cannot {operation} payment {payment_id}. Current status: {status}")]
    PreconditionFailed {
        payment_id: PaymentId,
        operation: &'static str,
        status: PaymentStatus,
    },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
}

/// The four classes of failure a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PreconditionFailed,
    Internal,
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidInput(_) => ErrorKind::InvalidInput,
            PaymentError::NotFound(_) => ErrorKind::NotFound,
            PaymentError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            PaymentError::StorageError(_)
            | PaymentError::InternalError(_)
            | PaymentError::IoError(_)
            | PaymentError::SerdeError(_) => ErrorKind::Internal,
            #[cfg(feature = "storage-rocksdb")]
            PaymentError::RocksDbError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
