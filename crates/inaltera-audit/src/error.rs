use thiserror::Error;

/// Errors produced by audit log operations.
///
/// A failed append is a transaction failure of the caller: the operation
/// that triggered the event must roll back rather than commit without its
/// audit record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("audit chain violation at event {id}: {reason}")]
    ChainViolation { id: u64, reason: String },
}
