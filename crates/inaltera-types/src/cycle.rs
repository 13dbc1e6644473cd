use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Calendar month a quota counter is scoped to.
///
/// Quota consumption is tracked per `(tenant, cycle)`. A cycle never rolls
/// over on its own: the billing trigger calls the tracker's explicit reset,
/// which stamps the next cycle. Ordering follows the calendar.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingCycle {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
}

impl BillingCycle {
    /// Create a cycle, validating the month.
    pub fn new(year: i32, month: u32) -> Result<Self, TypeError> {
        if !(1..=12).contains(&month) {
            return Err(TypeError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// The cycle a given instant falls into.
    pub fn of(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// The current cycle by wall clock.
    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    /// The following cycle.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Midnight UTC on the first day of this cycle.
    pub fn first_day(&self) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month validated on construction");
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
    }

    /// Returns `true` if the instant falls inside this cycle.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        Self::of(instant) == *self
    }
}

impl fmt::Debug for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BillingCycle({self})")
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
