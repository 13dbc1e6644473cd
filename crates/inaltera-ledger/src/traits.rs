use inaltera_types::{ChainHash, EntryId, TenantId};

use crate::error::LedgerError;
use crate::records::{InvoiceDraft, LedgerEntry};

/// Write boundary for ledger mutations.
///
/// Only implementations of this trait may assign sequence numbers and chain
/// hashes; collaborators (quota, audit) never touch entries directly.
pub trait LedgerWriter: Send + Sync {
    /// Issue an invoice: reserve quota, allocate the next sequence number,
    /// link the chain, commit atomically.
    fn issue(&self, tenant: &TenantId, draft: &InvoiceDraft) -> Result<LedgerEntry, LedgerError>;

    /// Cancel an issued invoice by appending a rectification entry and
    /// flipping the target's status. Consumes no quota.
    fn cancel(
        &self,
        tenant: &TenantId,
        entry: EntryId,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError>;
}

/// Read boundary for ledger queries. Reads observe the last committed
/// snapshot and never wait on an in-flight writer.
pub trait LedgerReader: Send + Sync {
    /// The most recent chain hash for a tenant, or genesis when empty.
    fn tail(&self, tenant: &TenantId) -> Result<ChainHash, LedgerError>;

    /// Tenant-agnostic lookup by chain hash.
    fn lookup(&self, hash: &ChainHash) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Find an entry by id within a tenant's stream.
    fn entry_by_id(
        &self,
        tenant: &TenantId,
        entry: EntryId,
    ) -> Result<Option<LedgerEntry>, LedgerError>;

    /// All committed entries for a tenant, in sequence order.
    fn entries(&self, tenant: &TenantId) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Number of committed entries for a tenant.
    fn entry_count(&self, tenant: &TenantId) -> Result<u64, LedgerError>;

    /// All tenants with at least one entry.
    fn tenants(&self) -> Result<Vec<TenantId>, LedgerError>;
}
