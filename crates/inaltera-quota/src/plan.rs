use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
///
/// The tier fixes how many invoices a tenant may issue per billing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    Free,
    Basic,
    Pro,
}

impl Plan {
    /// Invoices the tier allows per calendar month.
    pub fn monthly_limit(&self) -> u32 {
        match self {
            Self::Free => 5,
            Self::Basic => 20,
            Self::Pro => 1000,
        }
    }

    /// Wire-facing plan name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Basic => "Basic",
            Self::Pro => "Pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
