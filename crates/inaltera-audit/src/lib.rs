//! Append-only audit log (bitácora) for the Inaltera invoice ledger.
//!
//! Every system-relevant event — login, issuance, cancellation, download,
//! configuration change — lands here as an immutable record. The log is
//! independent of the invoice chain but carries its own hash chain, so the
//! trail itself is tamper-evident. Events are never edited or deleted;
//! ordering is creation order.

pub mod error;
pub mod event;
pub mod log;

pub use error::AuditError;
pub use event::{AuditEvent, EventCategory, Severity};
pub use log::{AuditLog, EventFilter};
