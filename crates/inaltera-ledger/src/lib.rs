//! Tenant-scoped tamper-evident invoice ledger.
//!
//! This crate is the heart of Inaltera. It provides:
//! - Issuance and rectification records with hash-linked integrity
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` implementation with per-tenant write serialization
//! - Cancellation as paired negative entries, never deletion
//! - Public hash verification that recomputes the chain link
//! - Stream validation (hash chain, sequence, rectification pairing)

pub mod error;
pub mod memory;
pub mod records;
pub mod rectify;
pub mod traits;
pub mod validation;
pub mod verify;

pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use records::{InvoiceDraft, LedgerEntry, LineItem};
pub use rectify::RectificationEngine;
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};
pub use verify::{Verification, VerificationService};
