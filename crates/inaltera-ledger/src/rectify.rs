use chrono::Utc;

use inaltera_types::{ChainHash, EntryId, EntryKind, EntryStatus};

use crate::error::LedgerError;
use crate::records::LedgerEntry;

/// Cancellation semantics: a voided invoice is never deleted or rewritten;
/// it is paired with a negative counter-entry that extends the same chain.
pub struct RectificationEngine;

impl RectificationEngine {
    /// Preconditions for cancelling a target entry.
    pub fn check_cancellable(target: &LedgerEntry) -> Result<(), LedgerError> {
        match target.kind {
            EntryKind::Rectification => Err(LedgerError::InvalidState(
                "a rectification entry cannot be cancelled".into(),
            )),
            EntryKind::Issued => match target.status {
                EntryStatus::Cancelled => Err(LedgerError::AlreadyCancelled),
                EntryStatus::Valid => Ok(()),
            },
        }
    }

    /// Build the unsealed rectification for a cancellable target.
    ///
    /// The total is the exact negation of the target's; reference data is
    /// carried over so the counter-entry is self-describing. Sequence number
    /// and hashes are zeroed here and assigned by the ledger's normal
    /// append path — a rectification is a chained entry, not an annotation.
    pub fn rectification_of(target: &LedgerEntry, reason: &str) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(),
            tenant: target.tenant,
            seq: 0,
            kind: EntryKind::Rectification,
            status: EntryStatus::Valid,
            issued_at: Utc::now(),
            invoice_number: target.invoice_number.clone(),
            client_ref: target.client_ref.clone(),
            client_nif: target.client_nif.clone(),
            notes: target.notes.clone(),
            line_items: target.line_items.clone(),
            total: -target.total,
            cancel_reason: Some(reason.to_string()),
            payload_hash: ChainHash::GENESIS,
            prev_hash: ChainHash::GENESIS,
            chain_hash: ChainHash::GENESIS,
            linked_entry: Some(target.id),
        }
    }
}
