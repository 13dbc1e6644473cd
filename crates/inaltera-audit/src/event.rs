use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inaltera_crypto::{ChainLink, ContentHasher, HasherError};
use inaltera_types::{ChainHash, TenantId};

/// Category of an audit event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Login,
    Invoicing,
    Cancellation,
    Download,
    Config,
    Other,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "Login",
            Self::Invoicing => "Invoicing",
            Self::Cancellation => "Cancellation",
            Self::Download => "Download",
            Self::Config => "Config",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Severity of an audit event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// One immutable record in the audit log.
///
/// `tenant` is `None` for system-level events (e.g. service startup).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Creation-order identifier, 1-based.
    pub id: u64,
    pub tenant: Option<TenantId>,
    pub at: DateTime<Utc>,
    pub category: EventCategory,
    pub severity: Severity,
    pub description: String,
    /// Digest of this event's canonical content.
    pub payload_hash: ChainHash,
    /// Event hash of the preceding record (genesis for the first).
    pub prev_hash: ChainHash,
    /// This event's own chain hash.
    pub event_hash: ChainHash,
}

impl AuditEvent {
    /// Recompute the digest of this event's canonical content.
    pub fn compute_payload_hash(&self) -> Result<ChainHash, HasherError> {
        let canonical = CanonicalEvent {
            id: self.id,
            tenant: self.tenant.map(|t| t.to_string()),
            at: self.at.to_rfc3339(),
            category: self.category,
            severity: self.severity,
            description: &self.description,
        };
        ContentHasher::EVENT.hash_json(&canonical)
    }
}

impl ChainLink for AuditEvent {
    fn payload_hash(&self) -> ChainHash {
        self.payload_hash
    }
    fn prev_hash(&self) -> ChainHash {
        self.prev_hash
    }
    fn chain_hash(&self) -> ChainHash {
        self.event_hash
    }
}

/// Stable encoding of the hashed event content. Field order is fixed by the
/// struct definition; timestamps serialize as RFC-3339 strings.
#[derive(Serialize)]
struct CanonicalEvent<'a> {
    id: u64,
    tenant: Option<String>,
    at: String,
    category: EventCategory,
    severity: Severity,
    description: &'a str,
}
