use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use inaltera_audit::{AuditLog, EventCategory, Severity};
use inaltera_crypto::link;
use inaltera_quota::QuotaTracker;
use inaltera_types::{ChainHash, EntryId, EntryKind, EntryStatus, TenantId};

use crate::error::LedgerError;
use crate::records::{InvoiceDraft, LedgerEntry};
use crate::rectify::RectificationEngine;
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory tenant ledger for tests, local demos, and embedding.
///
/// Writes for one tenant are serialized by that tenant's writer mutex:
/// `reserve quota → assign seq → compute chain hash → commit` runs as one
/// unit, so two issuances can never link against the same tail. Tenants
/// never contend with each other. Committed entries live behind a separate
/// read-write lock that writers hold only for the append itself, so readers
/// always observe a consistent last-committed snapshot.
pub struct InMemoryLedger {
    tenants: RwLock<HashMap<TenantId, Arc<TenantStream>>>,
    /// Global unique index over every committed chain hash.
    hash_index: RwLock<HashMap<ChainHash, (TenantId, u64)>>,
    quota: Arc<QuotaTracker>,
    audit: Arc<AuditLog>,
    write_timeout: Duration,
}

struct TenantStream {
    writer: Mutex<()>,
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(quota: Arc<QuotaTracker>, audit: Arc<AuditLog>) -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            hash_index: RwLock::new(HashMap::new()),
            quota,
            audit,
            write_timeout: Self::DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Bound how long a writer may wait for a tenant's lock before the
    /// operation fails as retryable.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    fn stream(&self, tenant: &TenantId) -> Arc<TenantStream> {
        if let Some(stream) = self.tenants.read().get(tenant) {
            return Arc::clone(stream);
        }
        let mut tenants = self.tenants.write();
        Arc::clone(tenants.entry(*tenant).or_insert_with(|| {
            Arc::new(TenantStream {
                writer: Mutex::new(()),
                entries: RwLock::new(Vec::new()),
            })
        }))
    }

    fn stream_if_exists(&self, tenant: &TenantId) -> Option<Arc<TenantStream>> {
        self.tenants.read().get(tenant).map(Arc::clone)
    }

    fn lock_writer<'a>(
        &self,
        stream: &'a TenantStream,
    ) -> Result<parking_lot::MutexGuard<'a, ()>, LedgerError> {
        stream
            .writer
            .try_lock_for(self.write_timeout)
            .ok_or(LedgerError::ConcurrencyTimeout {
                timeout_ms: self.write_timeout.as_millis() as u64,
            })
    }

    /// Assign seq and prev, compute the hashes, and commit entry + audit as
    /// one unit. Caller must hold the tenant's writer lock.
    ///
    /// `flip_target_seq` carries the seq of the entry being voided when the
    /// commit is a rectification; the status flip and back-link land in the
    /// same write-guard as the append.
    fn seal_and_commit(
        &self,
        stream: &TenantStream,
        mut entry: LedgerEntry,
        flip_target_seq: Option<u64>,
    ) -> Result<LedgerEntry, LedgerError> {
        let (seq, prev) = {
            let entries = stream.entries.read();
            let prev = entries
                .last()
                .map(|e| e.chain_hash)
                .unwrap_or(ChainHash::GENESIS);
            (entries.len() as u64 + 1, prev)
        };
        entry.seq = seq;
        entry.prev_hash = prev;
        if entry.invoice_number.is_empty() {
            entry.invoice_number =
                format!("F-{}-{:04}", entry.issued_at.format("%Y%m%d"), seq);
        }
        entry.payload_hash = entry.compute_payload_hash()?;
        entry.chain_hash = link(&entry.payload_hash, &entry.prev_hash);

        {
            let mut index = self.hash_index.write();
            if index.contains_key(&entry.chain_hash) {
                return Err(LedgerError::HashCollision);
            }
            let mut entries = stream.entries.write();
            if let Some(target_seq) = flip_target_seq {
                let target = &mut entries[(target_seq - 1) as usize];
                target.status = EntryStatus::Cancelled;
                target.linked_entry = Some(entry.id);
            }
            entries.push(entry.clone());
            index.insert(entry.chain_hash, (entry.tenant, entry.seq));
        }

        let (category, severity, description) = audit_note(&entry);
        match self.audit.append(Some(entry.tenant), category, severity, description) {
            Ok(_) => Ok(entry),
            Err(err) => {
                // An entry whose audit record failed to write must not
                // survive the commit.
                let mut index = self.hash_index.write();
                let mut entries = stream.entries.write();
                entries.pop();
                if let Some(target_seq) = flip_target_seq {
                    let target = &mut entries[(target_seq - 1) as usize];
                    target.status = EntryStatus::Valid;
                    target.linked_entry = None;
                }
                index.remove(&entry.chain_hash);
                Err(err.into())
            }
        }
    }

    /// Flip one bit of a committed payload hash to simulate store
    /// corruption in tests.
    #[cfg(test)]
    pub(crate) fn corrupt_payload_hash(&self, tenant: &TenantId, seq: u64) {
        let stream = self.stream(tenant);
        let mut entries = stream.entries.write();
        let entry = &mut entries[(seq - 1) as usize];
        let mut bytes = *entry.payload_hash.as_bytes();
        bytes[0] ^= 0x01;
        entry.payload_hash = ChainHash::from_hash(bytes);
    }
}

fn audit_note(entry: &LedgerEntry) -> (EventCategory, Severity, String) {
    match entry.kind {
        EntryKind::Issued => (
            EventCategory::Invoicing,
            Severity::Info,
            format!(
                "Factura emitida: {} ({:.2} €)",
                entry.invoice_number, entry.total
            ),
        ),
        EntryKind::Rectification => (
            EventCategory::Cancellation,
            Severity::Warning,
            format!(
                "Factura {} anulada. Motivo: {}",
                entry.invoice_number,
                entry.cancel_reason.as_deref().unwrap_or("")
            ),
        ),
    }
}

impl LedgerWriter for InMemoryLedger {
    fn issue(&self, tenant: &TenantId, draft: &InvoiceDraft) -> Result<LedgerEntry, LedgerError> {
        draft.validate()?;

        let stream = self.stream(tenant);
        let _writer = self.lock_writer(&stream)?;

        self.quota.reserve(tenant)?;

        let entry = LedgerEntry {
            id: EntryId::new(),
            tenant: *tenant,
            seq: 0,
            kind: EntryKind::Issued,
            status: EntryStatus::Valid,
            issued_at: Utc::now(),
            invoice_number: String::new(),
            client_ref: draft.client_ref.clone(),
            client_nif: draft.client_nif.clone(),
            notes: draft.notes.clone(),
            line_items: draft.line_items.clone(),
            total: draft.total(),
            cancel_reason: None,
            payload_hash: ChainHash::GENESIS,
            prev_hash: ChainHash::GENESIS,
            chain_hash: ChainHash::GENESIS,
            linked_entry: None,
        };

        match self.seal_and_commit(&stream, entry, None) {
            Ok(committed) => {
                tracing::info!(
                    tenant = %tenant.short_id(),
                    seq = committed.seq,
                    number = %committed.invoice_number,
                    hash = %committed.chain_hash.short_hex(),
                    "invoice issued"
                );
                Ok(committed)
            }
            Err(err) => {
                // Compensate the reservation; nothing was committed.
                self.quota.release(tenant);
                Err(err)
            }
        }
    }

    fn cancel(
        &self,
        tenant: &TenantId,
        entry: EntryId,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let stream = self
            .stream_if_exists(tenant)
            .ok_or(LedgerError::NotFound)?;
        let _writer = self.lock_writer(&stream)?;

        let target = stream
            .entries
            .read()
            .iter()
            .find(|e| e.id == entry)
            .cloned()
            .ok_or(LedgerError::NotFound)?;

        RectificationEngine::check_cancellable(&target)?;

        let rectification = RectificationEngine::rectification_of(&target, reason);
        let committed = self.seal_and_commit(&stream, rectification, Some(target.seq))?;
        tracing::info!(
            tenant = %tenant.short_id(),
            seq = committed.seq,
            number = %committed.invoice_number,
            "invoice cancelled"
        );
        Ok(committed)
    }
}

impl LedgerReader for InMemoryLedger {
    fn tail(&self, tenant: &TenantId) -> Result<ChainHash, LedgerError> {
        Ok(self
            .stream_if_exists(tenant)
            .and_then(|stream| stream.entries.read().last().map(|e| e.chain_hash))
            .unwrap_or(ChainHash::GENESIS))
    }

    fn lookup(&self, hash: &ChainHash) -> Result<Option<LedgerEntry>, LedgerError> {
        let Some((tenant, seq)) = self.hash_index.read().get(hash).copied() else {
            return Ok(None);
        };
        let Some(stream) = self.stream_if_exists(&tenant) else {
            return Err(LedgerError::IntegrityViolation {
                seq,
                reason: "hash index references a missing tenant stream".into(),
            });
        };
        let entry = stream.entries.read().get((seq - 1) as usize).cloned();
        Ok(entry)
    }

    fn entry_by_id(
        &self,
        tenant: &TenantId,
        entry: EntryId,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.stream_if_exists(tenant).and_then(|stream| {
            stream
                .entries
                .read()
                .iter()
                .find(|e| e.id == entry)
                .cloned()
        }))
    }

    fn entries(&self, tenant: &TenantId) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .stream_if_exists(tenant)
            .map(|stream| stream.entries.read().clone())
            .unwrap_or_default())
    }

    fn entry_count(&self, tenant: &TenantId) -> Result<u64, LedgerError> {
        Ok(self
            .stream_if_exists(tenant)
            .map(|stream| stream.entries.read().len() as u64)
            .unwrap_or(0))
    }

    fn tenants(&self) -> Result<Vec<TenantId>, LedgerError> {
        let mut ids: Vec<_> = self.tenants.read().keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
