use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time slice granted by the host for one tick.
///
/// Mirrors an idle-callback deadline: how much time is left, and whether the
/// host gave up waiting for idle time and forces the tick to run.
pub trait Deadline {
	fn time_remaining(&self) -> Duration;

	fn did_timeout(&self) -> bool {
		false
	}

	/// Notified after each chunk processed during the tick.
	fn chunk_done(&self) {}
}

/// Wall-clock budget measured from its creation.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
	until: Instant,
	timed_out: bool,
}

impl TimeBudget {
	pub fn starting_now(budget: Duration) -> Self {
		Self { until: Instant::now() + budget, timed_out: false }
	}

	/// A budget whose tick must run at least one chunk even with no time left.
	pub fn forced(budget: Duration) -> Self {
		Self { timed_out: true, ..Self::starting_now(budget) }
	}
}

impl Deadline for TimeBudget {
	fn time_remaining(&self) -> Duration {
		self.until.saturating_duration_since(Instant::now())
	}

	fn did_timeout(&self) -> bool {
		self.timed_out
	}
}

/// Budget counted in chunks instead of time.
///
/// Reports time remaining until `steps` chunks have been processed, which
/// makes tick boundaries independent of machine speed.
#[derive(Debug)]
pub struct StepBudget {
	steps: usize,
	used: Cell<usize>,
}

impl StepBudget {
	pub fn new(steps: usize) -> Self {
		Self { steps, used: Cell::new(0) }
	}

	pub fn used(&self) -> usize {
		self.used.get()
	}
}

impl Deadline for StepBudget {
	fn time_remaining(&self) -> Duration {
		if self.used.get() < self.steps {
			Duration::from_millis(1)
		} else {
			Duration::ZERO
		}
	}

	fn chunk_done(&self) {
		self.used.set(self.used.get() + 1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn step_budget_runs_out() {
		let budget = StepBudget::new(2);
		assert!(!budget.time_remaining().is_zero());
		budget.chunk_done();
		budget.chunk_done();
		assert!(budget.time_remaining().is_zero());
		assert_eq!(budget.used(), 2);
	}

	#[test]
	fn zero_time_budget_is_exhausted() {
		let budget = TimeBudget::starting_now(Duration::ZERO);
		assert!(budget.time_remaining().is_zero());
		assert!(!budget.did_timeout());
		assert!(TimeBudget::forced(Duration::ZERO).did_timeout());
	}
}
