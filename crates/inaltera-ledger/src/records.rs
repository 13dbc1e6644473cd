use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inaltera_crypto::{ChainLink, ContentHasher};
use inaltera_types::{ChainHash, EntryId, EntryKind, EntryStatus, TenantId};

use crate::error::LedgerError;

/// One line of an invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// Tax percentage applied to this line (e.g. 21 for 21% IVA).
    pub tax_rate: Decimal,
}

impl LineItem {
    /// Line total including tax, rounded to cents.
    pub fn line_total(&self) -> Decimal {
        let base = Decimal::from(self.quantity) * self.unit_price;
        (base * (Decimal::ONE + self.tax_rate / Decimal::ONE_HUNDRED)).round_dp(2)
    }
}

/// Validated input for issuing an invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_ref: String,
    pub client_nif: String,
    pub line_items: Vec<LineItem>,
    pub notes: String,
}

impl InvoiceDraft {
    /// Reject drafts the ledger must never hash: empty invoices, zero
    /// quantities, non-positive prices, negative tax rates.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.line_items.is_empty() {
            return Err(LedgerError::Validation("invoice has no line items".into()));
        }
        for (index, item) in self.line_items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(LedgerError::Validation(format!(
                    "line {index}: quantity must be positive"
                )));
            }
            if item.unit_price <= Decimal::ZERO {
                return Err(LedgerError::Validation(format!(
                    "line {index}: unit price must be positive"
                )));
            }
            if item.tax_rate < Decimal::ZERO {
                return Err(LedgerError::Validation(format!(
                    "line {index}: tax rate cannot be negative"
                )));
            }
        }
        Ok(())
    }

    /// Invoice total including tax, rounded to cents.
    pub fn total(&self) -> Decimal {
        self.line_items
            .iter()
            .map(LineItem::line_total)
            .sum::<Decimal>()
            .round_dp(2)
    }
}

/// One issuance or rectification record in a tenant's stream.
///
/// Immutable after commit, with two exceptions applied together at
/// cancellation time: `status` flips Valid → Cancelled exactly once, and
/// `linked_entry` on the voided entry is set to its rectification. Neither
/// participates in the hashed payload, so cancellation never changes
/// `payload_hash` or `chain_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub tenant: TenantId,
    /// 1-based position in the tenant's stream; gapless, never reused.
    pub seq: u64,
    pub kind: EntryKind,
    pub status: EntryStatus,
    pub issued_at: DateTime<Utc>,
    pub invoice_number: String,
    pub client_ref: String,
    pub client_nif: String,
    pub notes: String,
    pub line_items: Vec<LineItem>,
    /// Invoice total; negative only on rectifications.
    pub total: Decimal,
    /// Rectification only: why the voided invoice was cancelled.
    pub cancel_reason: Option<String>,
    /// Digest of the canonical payload.
    pub payload_hash: ChainHash,
    /// Chain hash of the previous entry, or genesis for `seq == 1`.
    pub prev_hash: ChainHash,
    /// `link(payload_hash, prev_hash)` — the externally verifiable value.
    pub chain_hash: ChainHash,
    /// Rectification → the entry it voids; voided entry → its rectification.
    pub linked_entry: Option<EntryId>,
}

impl LedgerEntry {
    /// Recompute the digest of this entry's canonical payload.
    ///
    /// Panics if an issued entry carries no line items: such a payload can
    /// only come from a bug upstream of validation, and hashing partial data
    /// would poison the chain.
    pub fn compute_payload_hash(&self) -> Result<ChainHash, LedgerError> {
        assert!(
            self.kind == EntryKind::Rectification || !self.line_items.is_empty(),
            "issued entry payload must carry line items"
        );

        // status and the issued-side back-link mutate on cancellation and
        // stay outside the payload; the rectification's forward link and
        // reason are part of its immutable content.
        let (voids, cancel_reason) = match self.kind {
            EntryKind::Rectification => (
                self.linked_entry.map(|id| id.to_string()),
                self.cancel_reason.as_deref(),
            ),
            EntryKind::Issued => (None, None),
        };

        let canonical = CanonicalPayload {
            tenant: self.tenant.to_string(),
            seq: self.seq,
            kind: self.kind,
            issued_at: self.issued_at.to_rfc3339(),
            invoice_number: &self.invoice_number,
            client_ref: &self.client_ref,
            client_nif: &self.client_nif,
            notes: &self.notes,
            line_items: self.line_items.iter().map(CanonicalLine::from).collect(),
            total: money(self.total),
            voids,
            cancel_reason,
        };
        Ok(ContentHasher::ENTRY.hash_json(&canonical)?)
    }
}

impl ChainLink for LedgerEntry {
    fn payload_hash(&self) -> ChainHash {
        self.payload_hash
    }
    fn prev_hash(&self) -> ChainHash {
        self.prev_hash
    }
    fn chain_hash(&self) -> ChainHash {
        self.chain_hash
    }
}

/// Stable encoding of the hashed entry content. Field order is fixed by the
/// struct definition; amounts are fixed-precision strings so re-hashing is
/// deterministic regardless of how a `Decimal` was constructed.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    tenant: String,
    seq: u64,
    kind: EntryKind,
    issued_at: String,
    invoice_number: &'a str,
    client_ref: &'a str,
    client_nif: &'a str,
    notes: &'a str,
    line_items: Vec<CanonicalLine<'a>>,
    total: String,
    voids: Option<String>,
    cancel_reason: Option<&'a str>,
}

#[derive(Serialize)]
struct CanonicalLine<'a> {
    description: &'a str,
    quantity: u32,
    unit_price: String,
    tax_rate: String,
}

impl<'a> From<&'a LineItem> for CanonicalLine<'a> {
    fn from(item: &'a LineItem) -> Self {
        Self {
            description: &item.description,
            quantity: item.quantity,
            unit_price: money(item.unit_price),
            tax_rate: money(item.tax_rate),
        }
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
