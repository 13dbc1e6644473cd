//! Foundation types for the Inaltera invoice ledger.
//!
//! This crate provides the identity, digest, and calendar types used
//! throughout the Inaltera system. Every other Inaltera crate depends on
//! `inaltera-types`.
//!
//! # Key Types
//!
//! - [`TenantId`] — Opaque tenant identity supplied by the auth boundary
//! - [`EntryId`] — UUID v7 ledger entry identifier
//! - [`ChainHash`] — 256-bit chain digest with a well-known genesis value
//! - [`BillingCycle`] — Calendar month a quota counter is scoped to

pub mod cycle;
pub mod entry;
pub mod error;
pub mod hash;
pub mod tenant;

pub use cycle::BillingCycle;
pub use entry::{EntryId, EntryKind, EntryStatus};
pub use error::TypeError;
pub use hash::ChainHash;
pub use tenant::TenantId;
