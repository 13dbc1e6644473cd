use std::sync::Arc;
use std::time::Duration;

use inaltera_audit::AuditLog;
use inaltera_ledger::{InMemoryLedger, LedgerReader, VerificationService};
use inaltera_quota::QuotaTracker;

use crate::config::ServerConfig;

/// Shared application state behind the router.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<InMemoryLedger>,
    pub quota: Arc<QuotaTracker>,
    pub audit: Arc<AuditLog>,
    pub verifier: Arc<VerificationService>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let quota = Arc::new(QuotaTracker::new(config.default_plan));
        let audit = Arc::new(AuditLog::new());
        let ledger = Arc::new(
            InMemoryLedger::new(Arc::clone(&quota), Arc::clone(&audit))
                .with_write_timeout(Duration::from_millis(config.write_timeout_ms)),
        );
        let verifier = Arc::new(VerificationService::new(
            Arc::clone(&ledger) as Arc<dyn LedgerReader>
        ));
        Self {
            ledger,
            quota,
            audit,
            verifier,
        }
    }
}
