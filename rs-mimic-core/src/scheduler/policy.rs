use std::collections::VecDeque;
use std::fmt;

/// Error raised by a policy function. Any such error ends the run.
pub type PolicyError = Box<dyn std::error::Error + Send + Sync>;

/// Policy function that raised a [`PolicyError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyStage {
	Split,
	Work,
	Aggregate,
	Complete,
}

impl fmt::Display for PolicyStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			PolicyStage::Split => "split_work",
			PolicyStage::Work => "do_work",
			PolicyStage::Aggregate => "aggregate_work",
			PolicyStage::Complete => "is_complete",
		})
	}
}

/// Describes a unit of work the [`Scheduler`](super::Scheduler) runs in slices.
///
/// The scheduler owns the pending items and the accumulator; the policy only
/// says how to cut, compute, fold and judge completion. Items are always
/// consumed from the front, in their original order.
pub trait WorkPolicy {
	/// One pending input element.
	type Item;
	/// Result of processing one chunk.
	type Partial;
	/// Running accumulator, and final result of the run.
	type Output;

	/// Removes the next chunk from the front of `remaining`.
	fn split_work(&mut self, remaining: &mut VecDeque<Self::Item>) -> Result<Vec<Self::Item>, PolicyError>;

	/// Computes the partial result of one chunk.
	fn do_work(&mut self, chunk: Vec<Self::Item>) -> Result<Self::Partial, PolicyError>;

	/// Folds a partial result into the accumulator.
	fn aggregate_work(&mut self, previous: Self::Output, partial: &Self::Partial) -> Result<Self::Output, PolicyError>;

	/// Decides whether the run is over.
	///
	/// Must return true once `remaining` is empty; may return true earlier.
	fn is_complete(
		&self,
		_input_len: usize,
		_partial: &Self::Partial,
		_done: &Self::Output,
		remaining: &VecDeque<Self::Item>,
	) -> Result<bool, PolicyError> {
		Ok(remaining.is_empty())
	}

	/// Called once per tick boundary, with the state at the end of the tick.
	fn report_progress(&mut self, _input_len: usize, _done: &Self::Output, _remaining: &VecDeque<Self::Item>) {}
}

/// Takes up to `size` items from the front of `remaining`.
///
/// A `size` of 0 is treated as 1 so a run always moves forward.
pub fn split_front<T>(remaining: &mut VecDeque<T>, size: usize) -> Vec<T> {
	let size = size.max(1).min(remaining.len());
	remaining.drain(..size).collect()
}
