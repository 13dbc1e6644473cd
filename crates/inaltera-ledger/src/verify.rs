use std::sync::Arc;

use inaltera_types::ChainHash;

use crate::records::LedgerEntry;
use crate::traits::LedgerReader;

/// Outcome of a public verification query.
#[derive(Clone, Debug)]
pub struct Verification {
    pub valid: bool,
    pub entry: Option<LedgerEntry>,
    pub message: &'static str,
}

/// Message for a successful verification.
pub const VERIFIED_MESSAGE: &str = "document verified";

/// Single message for unknown and corrupted hashes alike, so a response
/// never tells a forger how close a guess came.
pub const FAILURE_MESSAGE: &str = "document is not authentic or not found";

/// Public, read-only hash verification.
///
/// A hash is valid only if it resolves to a committed entry AND the stored
/// chain hash still reproduces from `payload_hash` and `prev_hash` — a
/// corrupted read path must not vouch for a document.
pub struct VerificationService {
    reader: Arc<dyn LedgerReader>,
}

impl VerificationService {
    pub fn new(reader: Arc<dyn LedgerReader>) -> Self {
        Self { reader }
    }

    pub fn verify(&self, hash: &ChainHash) -> Verification {
        let entry = match self.reader.lookup(hash) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Self::failure(),
            Err(err) => {
                tracing::error!(hash = %hash.short_hex(), %err, "verification lookup failed");
                return Self::failure();
            }
        };

        if !inaltera_crypto::verify_link(&entry) {
            // Tamper evidence is surfaced to the operator, never repaired.
            tracing::error!(
                hash = %hash.short_hex(),
                tenant = %entry.tenant.short_id(),
                seq = entry.seq,
                "stored chain hash does not reproduce; entry corrupted or tampered"
            );
            return Self::failure();
        }

        Verification {
            valid: true,
            entry: Some(entry),
            message: VERIFIED_MESSAGE,
        }
    }

    fn failure() -> Verification {
        Verification {
            valid: false,
            entry: None,
            message: FAILURE_MESSAGE,
        }
    }
}
