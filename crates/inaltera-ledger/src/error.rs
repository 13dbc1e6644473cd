use inaltera_audit::AuditError;
use inaltera_quota::QuotaError;

/// Errors produced by ledger operations.
///
/// Business-rule and validation failures leave no side effects; an
/// `IntegrityViolation` is surfaced to the caller and never auto-corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid invoice draft: {0}")]
    Validation(String),

    #[error("monthly invoice quota exhausted: {issued} of {limit} used")]
    QuotaExceeded { issued: u32, limit: u32 },

    #[error("entry not found for this tenant")]
    NotFound,

    #[error("invoice is already cancelled")]
    AlreadyCancelled,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("tenant writer lock not acquired within {timeout_ms} ms")]
    ConcurrencyTimeout { timeout_ms: u64 },

    #[error("integrity violation at seq {seq}: {reason}")]
    IntegrityViolation { seq: u64, reason: String },

    #[error("chain hash collision detected")]
    HashCollision,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("audit log failure: {0}")]
    Audit(String),
}

impl From<QuotaError> for LedgerError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::Exceeded { issued, limit } => Self::QuotaExceeded { issued, limit },
        }
    }
}

impl From<AuditError> for LedgerError {
    fn from(err: AuditError) -> Self {
        Self::Audit(err.to_string())
    }
}

impl From<inaltera_crypto::HasherError> for LedgerError {
    fn from(err: inaltera_crypto::HasherError) -> Self {
        Self::Serialization(err.to_string())
    }
}
