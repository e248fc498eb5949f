//! Wall-clock budget shared by the bounded loops of the pipeline.

use std::time::{Duration, Instant};

/// A start instant plus a budget.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts the clock now with the given budget.
    pub fn new(budget_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            budget: Duration::from_millis(budget_ms),
        }
    }

    /// A deadline that never expires in practice.
    #[cfg(test)]
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: Duration::MAX,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}
