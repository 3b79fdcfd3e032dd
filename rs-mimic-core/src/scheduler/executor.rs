use std::collections::VecDeque;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::deadline::Deadline;
use super::policy::{PolicyError, PolicyStage, WorkPolicy};

/// Failure of a scheduler run.
#[derive(Debug, Error)]
pub enum SchedulerError {
	#[error("{stage} failed: {source}")]
	Policy {
		stage: PolicyStage,
		#[source]
		source: PolicyError,
	},

	#[error("split_work returned an empty chunk with {remaining} items pending")]
	Stalled { remaining: usize },

	#[error("all work was consumed but is_complete did not accept the result")]
	Incomplete,

	#[error("the run has already settled")]
	Settled,
}

impl SchedulerError {
	fn policy(stage: PolicyStage) -> impl FnOnce(PolicyError) -> Self {
		move |source| SchedulerError::Policy { stage, source }
	}
}

/// Accumulator of a run in progress.
#[derive(Debug)]
pub struct WorkState<T, I> {
	remaining: VecDeque<I>,
	done: T,
	busy_duration: Duration,
}

impl<T, I> WorkState<T, I> {
	/// Items not processed yet, in original order.
	pub fn remaining(&self) -> &VecDeque<I> {
		&self.remaining
	}

	/// Aggregate of every chunk processed so far.
	pub fn done(&self) -> &T {
		&self.done
	}

	/// Time spent processing chunks, idle waits excluded.
	pub fn busy_duration(&self) -> Duration {
		self.busy_duration
	}
}

/// Final record of a completed run.
#[derive(Debug)]
pub struct WorkResult<T, I> {
	pub done: T,
	/// Items left when `is_complete` ended the run early; usually empty.
	pub remaining: Vec<I>,
	pub busy_duration: Duration,
	/// Time from scheduler creation to completion, idle waits included.
	pub wall_clock_duration: Duration,
}

/// What the host should do after a tick.
#[derive(Debug)]
pub enum Tick<T, I> {
	/// More work remains: grant another tick later.
	Pending,
	/// The run completed; no further ticks are accepted.
	Settled(WorkResult<T, I>),
}

/// Settled result type of a scheduler running policy `P`.
pub type Outcome<P> = WorkResult<<P as WorkPolicy>::Output, <P as WorkPolicy>::Item>;

/// Tick outcome type of a scheduler running policy `P`.
pub type PolicyTick<P> = Tick<<P as WorkPolicy>::Output, <P as WorkPolicy>::Item>;

/// Incremental executor running a [`WorkPolicy`] over time-bounded ticks.
///
/// Each call to [`tick`](Self::tick) processes chunks while the deadline has
/// time left, then reports progress once and returns. Work is consumed in
/// input order and never reordered, so the final aggregate only depends on
/// the chunking if `aggregate_work` does.
///
/// The first policy error settles the run as failed: the accumulator is
/// dropped and later ticks return [`SchedulerError::Settled`].
pub struct Scheduler<P: WorkPolicy> {
	policy: P,
	input_len: usize,
	state: Option<WorkState<P::Output, P::Item>>,
	started: Instant,
	ticks: usize,
}

impl<P: WorkPolicy> Scheduler<P> {
	/// Prepares a run over `input`, starting the aggregate at `initial`.
	pub fn new<I>(policy: P, input: I, initial: P::Output) -> Self
	where
		I: IntoIterator<Item = P::Item>,
	{
		let remaining: VecDeque<P::Item> = input.into_iter().collect();
		Self {
			policy,
			input_len: remaining.len(),
			state: Some(WorkState { remaining, done: initial, busy_duration: Duration::ZERO }),
			started: Instant::now(),
			ticks: 0,
		}
	}

	pub fn input_len(&self) -> usize {
		self.input_len
	}

	/// Number of ticks that processed at least one chunk.
	pub fn ticks(&self) -> usize {
		self.ticks
	}

	pub fn policy(&self) -> &P {
		&self.policy
	}

	/// Current accumulator, or `None` once the run has settled.
	pub fn state(&self) -> Option<&WorkState<P::Output, P::Item>> {
		self.state.as_ref()
	}

	pub fn is_settled(&self) -> bool {
		self.state.is_none()
	}

	/// Runs one tick against `deadline`.
	///
	/// A deadline with no time remaining that has not timed out does nothing
	/// and returns [`Tick::Pending`]. A timed-out deadline processes at least
	/// one chunk.
	pub fn tick<D: Deadline + ?Sized>(&mut self, deadline: &D) -> Result<PolicyTick<P>, SchedulerError> {
		let state = self.state.take().ok_or(SchedulerError::Settled)?;

		if deadline.time_remaining().is_zero() && !deadline.did_timeout() {
			self.state = Some(state);
			return Ok(Tick::Pending);
		}

		self.ticks += 1;
		match self.run_tick(state, deadline) {
			Ok(Tick::Settled(result)) => {
				info!(
					ticks = self.ticks,
					busy_ms = result.busy_duration.as_millis() as u64,
					wall_ms = result.wall_clock_duration.as_millis() as u64,
					"work settled"
				);
				Ok(Tick::Settled(result))
			}
			Ok(Tick::Pending) => Ok(Tick::Pending),
			Err(e) => {
				warn!(ticks = self.ticks, error = %e, "work failed");
				Err(e)
			}
		}
	}

	fn run_tick<D: Deadline + ?Sized>(
		&mut self,
		mut state: WorkState<P::Output, P::Item>,
		deadline: &D,
	) -> Result<PolicyTick<P>, SchedulerError> {
		let mut forced = deadline.did_timeout();
		let mut chunks = 0usize;

		while forced || !deadline.time_remaining().is_zero() {
			forced = false;
			let (next, complete) = self.step(state)?;
			state = next;
			chunks += 1;
			deadline.chunk_done();

			if complete {
				return Ok(Tick::Settled(WorkResult {
					done: state.done,
					remaining: state.remaining.into(),
					busy_duration: state.busy_duration,
					wall_clock_duration: self.started.elapsed(),
				}));
			}
		}

		debug!(tick = self.ticks, chunks, remaining = state.remaining.len(), "yielding");
		self.policy.report_progress(self.input_len, &state.done, &state.remaining);
		self.state = Some(state);
		Ok(Tick::Pending)
	}

	/// Processes a single chunk and says whether the run is complete.
	fn step(
		&mut self,
		mut state: WorkState<P::Output, P::Item>,
	) -> Result<(WorkState<P::Output, P::Item>, bool), SchedulerError> {
		let started = Instant::now();

		let chunk = self
			.policy
			.split_work(&mut state.remaining)
			.map_err(SchedulerError::policy(PolicyStage::Split))?;
		let chunk_len = chunk.len();
		let partial = self.policy.do_work(chunk).map_err(SchedulerError::policy(PolicyStage::Work))?;
		let done = self
			.policy
			.aggregate_work(state.done, &partial)
			.map_err(SchedulerError::policy(PolicyStage::Aggregate))?;
		state.busy_duration += started.elapsed();

		let complete = self
			.policy
			.is_complete(self.input_len, &partial, &done, &state.remaining)
			.map_err(SchedulerError::policy(PolicyStage::Complete))?;
		state.done = done;

		if !complete {
			if state.remaining.is_empty() {
				return Err(SchedulerError::Incomplete);
			}
			if chunk_len == 0 {
				return Err(SchedulerError::Stalled { remaining: state.remaining.len() });
			}
		}
		Ok((state, complete))
	}
}
