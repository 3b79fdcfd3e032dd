use std::future::Future;
use std::thread;
use std::time::Duration;

use tracing::{debug, instrument};

use super::deadline::{Deadline, StepBudget, TimeBudget};
use super::executor::{Outcome, PolicyTick, Scheduler, SchedulerError, Tick};
use super::policy::WorkPolicy;
use crate::config::ConfigError;

/// Ticks in a row that may pass without any work before the next one is forced.
pub const IDLE_TICK_LIMIT: usize = 16;

/// Source of ticks for a scheduler run.
///
/// Adapts whatever the environment uses to find spare time (a timer, an
/// event-loop turn, a sleeping thread) into deadlines.
pub trait IdleHost {
	type Deadline: Deadline;

	/// Waits for the next idle opportunity and returns its deadline.
	fn next_tick(&mut self) -> Self::Deadline;
}

/// Grants a fixed wall-clock budget per tick, sleeping `pause` before each one.
#[derive(Clone, Copy, Debug)]
pub struct FixedBudgetHost {
	budget: Duration,
	pause: Duration,
}

impl FixedBudgetHost {
	pub fn new(budget: Duration, pause: Duration) -> Self {
		Self { budget, pause }
	}
}

impl IdleHost for FixedBudgetHost {
	type Deadline = TimeBudget;

	/// A zero budget yields forced deadlines, one chunk per tick.
	fn next_tick(&mut self) -> TimeBudget {
		if !self.pause.is_zero() {
			thread::sleep(self.pause);
		}
		if self.budget.is_zero() {
			TimeBudget::forced(self.budget)
		} else {
			TimeBudget::starting_now(self.budget)
		}
	}
}

/// Grants a fixed number of chunks per tick, without waiting.
#[derive(Clone, Copy, Debug)]
pub struct StepHost {
	steps_per_tick: usize,
}

impl StepHost {
	/// # Errors
	/// Returns an error if `steps_per_tick` is 0.
	pub fn new(steps_per_tick: usize) -> Result<Self, ConfigError> {
		if steps_per_tick == 0 {
			return Err(ConfigError::Zero("steps_per_tick"));
		}
		Ok(Self { steps_per_tick })
	}
}

/// Deadline that reports a timeout on behalf of the one it wraps.
struct TimedOut<'d, D: ?Sized>(&'d D);

impl<D: Deadline + ?Sized> Deadline for TimedOut<'_, D> {
	fn time_remaining(&self) -> Duration {
		self.0.time_remaining()
	}

	fn did_timeout(&self) -> bool {
		true
	}

	fn chunk_done(&self) {
		self.0.chunk_done();
	}
}

/// Runs one tick, forcing it once `idle_ticks` reaches [`IDLE_TICK_LIMIT`].
///
/// A host that keeps granting exhausted deadlines still gets one chunk done
/// every `IDLE_TICK_LIMIT + 1` ticks, so the run always settles.
fn tick_with_timeout<P, D>(
	scheduler: &mut Scheduler<P>,
	deadline: &D,
	idle_ticks: &mut usize,
) -> Result<PolicyTick<P>, SchedulerError>
where
	P: WorkPolicy,
	D: Deadline,
{
	let before = scheduler.ticks();
	let tick = if *idle_ticks >= IDLE_TICK_LIMIT {
		debug!(idle_ticks = *idle_ticks, "forcing a tick");
		scheduler.tick(&TimedOut(deadline))?
	} else {
		scheduler.tick(deadline)?
	};
	if scheduler.ticks() == before {
		*idle_ticks += 1;
	} else {
		*idle_ticks = 0;
	}
	Ok(tick)
}

impl IdleHost for StepHost {
	type Deadline = StepBudget;

	fn next_tick(&mut self) -> StepBudget {
		StepBudget::new(self.steps_per_tick)
	}
}

/// Drives `scheduler` to completion on the current thread.
///
/// Returns the settled result, or the first error raised by the policy.
/// After [`IDLE_TICK_LIMIT`] ticks in a row without work, the next tick is forced.
#[instrument(skip_all, fields(input_len = scheduler.input_len()))]
pub fn run_blocking<P, H>(mut scheduler: Scheduler<P>, host: &mut H) -> Result<Outcome<P>, SchedulerError>
where
	P: WorkPolicy,
	H: IdleHost,
{
	let mut idle_ticks = 0;
	loop {
		let deadline = host.next_tick();
		if let Tick::Settled(result) = tick_with_timeout(&mut scheduler, &deadline, &mut idle_ticks)? {
			return Ok(result);
		}
	}
}

/// Drives `scheduler` to completion from an async task.
///
/// `idle` is awaited before every tick and is where control goes back to the
/// event loop (for instance a `yield_now`). The returned future settles with
/// the result or the first policy error.
#[instrument(skip_all, fields(input_len = scheduler.input_len()))]
pub async fn run_async<P, H, F, Fut>(
	mut scheduler: Scheduler<P>,
	host: &mut H,
	mut idle: F,
) -> Result<Outcome<P>, SchedulerError>
where
	P: WorkPolicy,
	H: IdleHost,
	F: FnMut() -> Fut,
	Fut: Future<Output = ()>,
{
	let mut idle_ticks = 0;
	loop {
		idle().await;
		let deadline = host.next_tick();
		if let Tick::Settled(result) = tick_with_timeout(&mut scheduler, &deadline, &mut idle_ticks)? {
			return Ok(result);
		}
	}
}
