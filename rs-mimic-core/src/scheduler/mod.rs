//! Cooperative incremental executor.
//!
//! Long computations are described by a [`WorkPolicy`] and run by a
//! [`Scheduler`] one tick at a time, so the thread that drives them is never
//! blocked for longer than the deadline the host grants. Between ticks the
//! host is free to do something else; the drivers in this module show the two
//! usual ways of doing so.

mod deadline;
mod executor;
mod host;
mod policy;

pub use deadline::{Deadline, StepBudget, TimeBudget};
pub use executor::{Outcome, PolicyTick, Scheduler, SchedulerError, Tick, WorkResult, WorkState};
pub use host::{FixedBudgetHost, IDLE_TICK_LIMIT, IdleHost, StepHost, run_async, run_blocking};
pub use policy::{PolicyError, PolicyStage, WorkPolicy, split_front};
