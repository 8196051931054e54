use thiserror::Error;

/// Failures the order repository reports to domain code.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No order row has the requested id.
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Store, pool or row-decoding failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
