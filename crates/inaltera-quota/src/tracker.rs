use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use inaltera_types::{BillingCycle, TenantId};

use crate::error::QuotaError;
use crate::plan::Plan;

/// Read-only snapshot of a tenant's quota consumption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaStatus {
    pub plan: Plan,
    pub issued_count: u32,
    pub limit: u32,
    /// Consumption as a whole percentage, capped at 100.
    pub percentage: u32,
    pub cycle: BillingCycle,
    /// First day of the next cycle.
    pub reset_date: DateTime<Utc>,
}

struct QuotaCounter {
    plan: Plan,
    issued_count: u32,
    limit: u32,
    cycle: BillingCycle,
}

impl QuotaCounter {
    fn new(plan: Plan, cycle: BillingCycle) -> Self {
        Self {
            plan,
            issued_count: 0,
            limit: plan.monthly_limit(),
            cycle,
        }
    }
}

/// Per-tenant monthly issuance counters.
///
/// Each counter sits behind its own mutex so the check-then-increment in
/// [`reserve`](QuotaTracker::reserve) is indivisible with respect to
/// concurrent issuances for the same tenant. Counters for different tenants
/// never contend.
pub struct QuotaTracker {
    default_plan: Plan,
    tenants: RwLock<HashMap<TenantId, Arc<Mutex<QuotaCounter>>>>,
}

impl QuotaTracker {
    pub fn new(default_plan: Plan) -> Self {
        Self {
            default_plan,
            tenants: RwLock::new(HashMap::new()),
        }
    }

    fn counter(&self, tenant: &TenantId) -> Arc<Mutex<QuotaCounter>> {
        if let Some(counter) = self.tenants.read().get(tenant) {
            return Arc::clone(counter);
        }
        let mut tenants = self.tenants.write();
        Arc::clone(tenants.entry(*tenant).or_insert_with(|| {
            Arc::new(Mutex::new(QuotaCounter::new(
                self.default_plan,
                BillingCycle::current(),
            )))
        }))
    }

    /// Put a tenant on a plan. The issued count and cycle are untouched;
    /// the limit follows the new plan immediately.
    pub fn enroll(&self, tenant: &TenantId, plan: Plan) {
        let counter = self.counter(tenant);
        let mut guard = counter.lock();
        guard.plan = plan;
        guard.limit = plan.monthly_limit();
        tracing::info!(tenant = %tenant.short_id(), plan = %plan, "tenant enrolled");
    }

    /// Atomically reserve one invoice slot for the current cycle.
    ///
    /// Check and increment happen under the counter's lock; two
    /// near-simultaneous issuances can never both pass the check when only
    /// one slot remains.
    pub fn reserve(&self, tenant: &TenantId) -> Result<(), QuotaError> {
        let counter = self.counter(tenant);
        let mut guard = counter.lock();
        if guard.issued_count >= guard.limit {
            tracing::warn!(
                tenant = %tenant.short_id(),
                issued = guard.issued_count,
                limit = guard.limit,
                "quota exhausted"
            );
            return Err(QuotaError::Exceeded {
                issued: guard.issued_count,
                limit: guard.limit,
            });
        }
        guard.issued_count += 1;
        Ok(())
    }

    /// Return a reservation that did not reach commit.
    ///
    /// Never called after a successful commit: a later cancellation does not
    /// refund quota, since the invoice was still issued this cycle.
    pub fn release(&self, tenant: &TenantId) {
        let counter = self.counter(tenant);
        let mut guard = counter.lock();
        guard.issued_count = guard.issued_count.saturating_sub(1);
    }

    /// Billing-cycle rollover: zero the count, apply the plan's limit, and
    /// stamp the new cycle. Explicit external trigger — counts are never
    /// rolled over lazily.
    pub fn reset_cycle(&self, tenant: &TenantId, plan: Plan) {
        let counter = self.counter(tenant);
        let mut guard = counter.lock();
        guard.plan = plan;
        guard.limit = plan.monthly_limit();
        guard.issued_count = 0;
        guard.cycle = BillingCycle::current();
        tracing::info!(
            tenant = %tenant.short_id(),
            cycle = %guard.cycle,
            plan = %plan,
            "billing cycle reset"
        );
    }

    /// Read-only snapshot; never blocks an in-flight issuance for longer
    /// than the counter increment itself.
    pub fn status(&self, tenant: &TenantId) -> QuotaStatus {
        let counter = self.counter(tenant);
        let guard = counter.lock();
        let percentage = if guard.limit == 0 {
            100
        } else {
            (guard.issued_count * 100 / guard.limit).min(100)
        };
        QuotaStatus {
            plan: guard.plan,
            issued_count: guard.issued_count,
            limit: guard.limit,
            percentage,
            cycle: guard.cycle,
            reset_date: guard.cycle.next().first_day(),
        }
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(Plan::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unseen_tenant_gets_default_plan() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();
        let status = tracker.status(&tenant);
        assert_eq!(status.plan, Plan::Free);
        assert_eq!(status.limit, 5);
        assert_eq!(status.issued_count, 0);
        assert_eq!(status.percentage, 0);
    }

    #[test]
    fn reserve_increments_until_limit() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();

        for _ in 0..5 {
            tracker.reserve(&tenant).unwrap();
        }
        let err = tracker.reserve(&tenant).unwrap_err();
        assert_eq!(err, QuotaError::Exceeded { issued: 5, limit: 5 });

        // A failed reserve leaves the count unchanged.
        assert_eq!(tracker.status(&tenant).issued_count, 5);
    }

    #[test]
    fn release_returns_a_reservation() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();

        tracker.reserve(&tenant).unwrap();
        tracker.release(&tenant);
        assert_eq!(tracker.status(&tenant).issued_count, 0);
    }

    #[test]
    fn release_saturates_at_zero() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();
        tracker.release(&tenant);
        assert_eq!(tracker.status(&tenant).issued_count, 0);
    }

    #[test]
    fn enroll_changes_limit_without_touching_count() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();

        tracker.reserve(&tenant).unwrap();
        tracker.enroll(&tenant, Plan::Basic);

        let status = tracker.status(&tenant);
        assert_eq!(status.plan, Plan::Basic);
        assert_eq!(status.limit, 20);
        assert_eq!(status.issued_count, 1);
    }

    #[test]
    fn reset_cycle_zeroes_count_and_applies_plan() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();

        for _ in 0..5 {
            tracker.reserve(&tenant).unwrap();
        }
        tracker.reset_cycle(&tenant, Plan::Pro);

        let status = tracker.status(&tenant);
        assert_eq!(status.issued_count, 0);
        assert_eq!(status.plan, Plan::Pro);
        assert_eq!(status.limit, 1000);
        assert_eq!(status.cycle, BillingCycle::current());
        assert_eq!(status.reset_date, BillingCycle::current().next().first_day());
    }

    #[test]
    fn percentage_is_capped_at_100() {
        let tracker = QuotaTracker::default();
        let tenant = TenantId::new();
        for _ in 0..5 {
            tracker.reserve(&tenant).unwrap();
        }
        assert_eq!(tracker.status(&tenant).percentage, 100);
    }

    #[test]
    fn concurrent_reserves_never_exceed_limit() {
        let tracker = Arc::new(QuotaTracker::new(Plan::Basic));
        let tenant = TenantId::new();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || tracker.reserve(&tenant).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 20);
        assert_eq!(tracker.status(&tenant).issued_count, 20);
    }

    #[test]
    fn tenants_are_isolated() {
        let tracker = QuotaTracker::default();
        let a = TenantId::new();
        let b = TenantId::new();

        for _ in 0..5 {
            tracker.reserve(&a).unwrap();
        }
        assert!(tracker.reserve(&a).is_err());
        assert!(tracker.reserve(&b).is_ok());
    }
}
