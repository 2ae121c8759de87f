//! Wall-clock budget for a run.

use std::time::{Duration, Instant};

/// A point in time after which remaining work is abandoned.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget now.
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Whether the budget is used up.
    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    /// The configured budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_expired() {
        assert!(Deadline::after(Duration::ZERO).expired());
    }

    #[test]
    fn long_budget_is_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(3600));
        assert!(!deadline.expired());
        assert_eq!(deadline.budget(), Duration::from_secs(3600));
    }
}
