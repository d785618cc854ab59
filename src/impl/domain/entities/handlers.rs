use chrono::{DateTime, Utc};

use super::party::OperatorId;

// Collaborators.
// ---

/// Source of "now" for payment stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Identity of the user acting through a session, for `paid_by` stamps.
pub trait OperatorContext: Send + Sync {
    fn current_operator(&self) -> OperatorId;
}

// Defaults.
// ---

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct FixedOperator(pub OperatorId);

impl OperatorContext for FixedOperator {
    fn current_operator(&self) -> OperatorId {
        self.0.clone()
    }
}
