use thiserror::Error;

/// Errors produced by quota operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuotaError {
    #[error("monthly invoice quota exhausted: {issued} of {limit} used")]
    Exceeded { issued: u32, limit: u32 },
}
