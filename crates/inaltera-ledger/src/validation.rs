use std::collections::HashMap;

use inaltera_crypto::verify_link;
use inaltera_types::{ChainHash, EntryId, EntryKind, EntryStatus, TenantId};

use crate::error::LedgerError;
use crate::records::LedgerEntry;
use crate::traits::LedgerReader;

/// Result of stream validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub tenant: TenantId,
    pub entry_count: u64,
    pub hash_chain_valid: bool,
    pub sequence_monotonic: bool,
    pub pairings_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub seq: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    HashMismatch,
    PairingBroken,
    TotalNotNegated,
    CancelledWithoutRectification,
}

/// Full-stream invariant validator.
///
/// Recomputes every payload digest and chain link and checks the
/// rectification pairing rules: each rectification voids exactly one earlier
/// Issued entry, the pair is linked both ways, and the totals cancel out.
pub struct StreamValidator;

impl StreamValidator {
    pub fn validate_stream<R: LedgerReader + ?Sized>(
        reader: &R,
        tenant: &TenantId,
    ) -> Result<ValidationReport, LedgerError> {
        let entries = reader.entries(tenant)?;
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut sequence_monotonic = true;
        let mut pairings_valid = true;

        let by_id: HashMap<EntryId, &LedgerEntry> =
            entries.iter().map(|e| (e.id, e)).collect();

        for (index, entry) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if entry.seq != expected_seq {
                sequence_monotonic = false;
                violations.push(Violation {
                    seq: entry.seq,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected seq {expected_seq}, got {}", entry.seq),
                });
            }

            let expected_prev = if index == 0 {
                ChainHash::GENESIS
            } else {
                entries[index - 1].chain_hash
            };
            if entry.prev_hash != expected_prev {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: entry.seq,
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            match entry.compute_payload_hash() {
                Ok(computed) if computed != entry.payload_hash => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        seq: entry.seq,
                        kind: ViolationKind::HashMismatch,
                        description: "payload hash does not match content".into(),
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        seq: entry.seq,
                        kind: ViolationKind::HashMismatch,
                        description: format!("payload could not be recomputed: {err}"),
                    });
                }
            }

            if !verify_link(entry) {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: entry.seq,
                    kind: ViolationKind::HashMismatch,
                    description: "stored chain hash does not reproduce".into(),
                });
            }

            match entry.kind {
                EntryKind::Rectification => {
                    Self::check_rectification(entry, &by_id, &mut violations, &mut pairings_valid);
                }
                EntryKind::Issued => {
                    if entry.status == EntryStatus::Cancelled {
                        Self::check_voided(entry, &by_id, &mut violations, &mut pairings_valid);
                    }
                }
            }
        }

        Ok(ValidationReport {
            tenant: *tenant,
            entry_count: entries.len() as u64,
            hash_chain_valid,
            sequence_monotonic,
            pairings_valid,
            violations,
        })
    }

    /// Validate every tenant stream in the ledger.
    pub fn validate_all<R: LedgerReader + ?Sized>(
        reader: &R,
    ) -> Result<Vec<ValidationReport>, LedgerError> {
        let tenants = reader.tenants()?;
        let mut reports = Vec::new();
        for tenant in &tenants {
            reports.push(Self::validate_stream(reader, tenant)?);
        }
        Ok(reports)
    }

    fn check_rectification(
        entry: &LedgerEntry,
        by_id: &HashMap<EntryId, &LedgerEntry>,
        violations: &mut Vec<Violation>,
        pairings_valid: &mut bool,
    ) {
        let Some(target) = entry.linked_entry.and_then(|id| by_id.get(&id)) else {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::PairingBroken,
                description: "rectification does not reference an entry in this stream".into(),
            });
            return;
        };

        if target.kind != EntryKind::Issued || target.seq >= entry.seq {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::PairingBroken,
                description: "rectification must void an earlier issued entry".into(),
            });
        }
        if target.status != EntryStatus::Cancelled {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::PairingBroken,
                description: "voided entry is not marked cancelled".into(),
            });
        }
        if target.linked_entry != Some(entry.id) {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::PairingBroken,
                description: "voided entry does not link back to its rectification".into(),
            });
        }
        if entry.total != -target.total {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::TotalNotNegated,
                description: format!(
                    "rectification total {} is not the negation of {}",
                    entry.total, target.total
                ),
            });
        }
    }

    fn check_voided(
        entry: &LedgerEntry,
        by_id: &HashMap<EntryId, &LedgerEntry>,
        violations: &mut Vec<Violation>,
        pairings_valid: &mut bool,
    ) {
        let rectified = entry
            .linked_entry
            .and_then(|id| by_id.get(&id))
            .is_some_and(|rect| {
                rect.kind == EntryKind::Rectification && rect.linked_entry == Some(entry.id)
            });
        if !rectified {
            *pairings_valid = false;
            violations.push(Violation {
                seq: entry.seq,
                kind: ViolationKind::CancelledWithoutRectification,
                description: "cancelled entry has no matching rectification".into(),
            });
        }
    }
}
