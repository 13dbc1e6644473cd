//! Monthly issuance quota tracking for the Inaltera invoice ledger.
//!
//! Each tenant has a plan tier with a monthly invoice limit. Issuance
//! reserves quota atomically (check and increment are indivisible), failed
//! issuances release their reservation, and billing-cycle rollover is an
//! explicit external trigger — a counter is never silently rolled over.

pub mod error;
pub mod plan;
pub mod tracker;

pub use error::QuotaError;
pub use plan::Plan;
pub use tracker::{QuotaStatus, QuotaTracker};
