use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use inaltera_crypto::{HashChainVerifier, link};
use inaltera_types::{ChainHash, TenantId};

use crate::error::AuditError;
use crate::event::{AuditEvent, EventCategory, Severity};

/// Filters for querying the log. Results are newest-first and paginated.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    pub category: Option<EventCategory>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub offset: usize,
    /// Page size; `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

/// Append-only, hash-chained event log.
pub struct AuditLog {
    inner: RwLock<AuditState>,
}

struct AuditState {
    events: Vec<AuditEvent>,
    tail: ChainHash,
    next_id: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AuditState {
                events: Vec::new(),
                tail: ChainHash::GENESIS,
                next_id: 1,
            }),
        }
    }

    /// Append one event.
    ///
    /// On error nothing is recorded, and the caller must treat its own
    /// operation as failed: the audit trail is a compliance requirement, not
    /// best-effort telemetry.
    pub fn append(
        &self,
        tenant: Option<TenantId>,
        category: EventCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Result<AuditEvent, AuditError> {
        let mut state = self.inner.write();

        let mut event = AuditEvent {
            id: state.next_id,
            tenant,
            at: Utc::now(),
            category,
            severity,
            description: description.into(),
            payload_hash: ChainHash::GENESIS,
            prev_hash: state.tail,
            event_hash: ChainHash::GENESIS,
        };
        event.payload_hash = event
            .compute_payload_hash()
            .map_err(|e| AuditError::Serialization(e.to_string()))?;
        event.event_hash = link(&event.payload_hash, &event.prev_hash);

        state.tail = event.event_hash;
        state.next_id += 1;
        state.events.push(event.clone());

        tracing::debug!(
            id = event.id,
            category = %event.category,
            severity = %event.severity,
            "audit event recorded"
        );
        Ok(event)
    }

    /// Events for one tenant, newest-first, filtered and paginated.
    pub fn query(&self, tenant: &TenantId, filter: &EventFilter) -> Vec<AuditEvent> {
        let state = self.inner.read();
        let matches = state
            .events
            .iter()
            .rev()
            .filter(|e| e.tenant.as_ref() == Some(tenant))
            .filter(|e| filter.category.map_or(true, |c| e.category == c))
            .filter(|e| filter.from.map_or(true, |from| e.at >= from))
            .filter(|e| filter.to.map_or(true, |to| e.at <= to))
            .skip(filter.offset);
        match filter.limit {
            Some(limit) => matches.take(limit).cloned().collect(),
            None => matches.cloned().collect(),
        }
    }

    /// Total number of recorded events.
    pub fn len(&self) -> u64 {
        self.inner.read().events.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }

    /// Recompute every payload digest and chain link.
    pub fn verify_chain(&self) -> Result<(), AuditError> {
        let state = self.inner.read();

        for event in &state.events {
            let computed = event
                .compute_payload_hash()
                .map_err(|e| AuditError::Serialization(e.to_string()))?;
            if computed != event.payload_hash {
                return Err(AuditError::ChainViolation {
                    id: event.id,
                    reason: "payload hash does not match content".into(),
                });
            }
        }

        HashChainVerifier::verify_chain(&state.events).map_err(|e| {
            let id = match e {
                inaltera_crypto::ChainError::GenesisMismatch => 1,
                inaltera_crypto::ChainError::BrokenLink { index }
                | inaltera_crypto::ChainError::HashMismatch { index } => {
                    state.events[index].id
                }
            };
            AuditError::ChainViolation {
                id,
                reason: e.to_string(),
            }
        })
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
