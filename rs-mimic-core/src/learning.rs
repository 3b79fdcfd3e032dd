//! Background construction of a chain from example text.
//!
//! Learning runs in two scheduler passes. The first tokenizes example lines
//! into matches, the second folds the matches into a [`ChainModel`]. The
//! second pass only starts once the first one has settled successfully.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::LearningConfig;
use crate::model::chain::{ChainModel, split_lines, tokenize_example};
use crate::model::symbol::Match;
use crate::scheduler::{
	FixedBudgetHost, IdleHost, PolicyError, Scheduler, SchedulerError, WorkPolicy, run_async, run_blocking,
	split_front,
};

const SPLIT_LABEL: &str = "Reading examples";
const BUILD_LABEL: &str = "Building chain";
const READY_LABEL: &str = "Chain ready";

/// Progress of a learning run, for status displays.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Progress {
	/// From 0 to 100 over the whole run (both passes).
	pub percent_complete: f32,
	pub label: String,
	pub is_completed: bool,
}

impl Progress {
	pub fn completed(label: impl Into<String>) -> Self {
		Self { percent_complete: 100.0, label: label.into(), is_completed: true }
	}
}

/// Which pass of a learning run failed.
#[derive(Debug, Error)]
pub enum LearnError {
	#[error("splitting examples failed: {0}")]
	Split(#[source] SchedulerError),

	#[error("building the chain failed: {0}")]
	Build(#[source] SchedulerError),
}

/// Chain produced by a successful learning run.
#[derive(Debug)]
pub struct Learned {
	pub chain: ChainModel,
	/// Non-blank example lines.
	pub lines: usize,
	/// Matches folded into the chain.
	pub matches: usize,
	/// Busy time of both passes.
	pub busy_duration: Duration,
	/// Wall-clock time of both passes, idle time included.
	pub wall_clock_duration: Duration,
}

/// Maps a pass's own completion onto its share of the overall percentage.
struct Stage<'o, O> {
	offset: f32,
	span: f32,
	label: &'static str,
	observer: &'o mut O,
}

impl<O: FnMut(&Progress)> Stage<'_, O> {
	fn report(&mut self, input_len: usize, remaining: usize) {
		let ratio = if input_len == 0 { 1.0 } else { (input_len - remaining) as f32 / input_len as f32 };
		(self.observer)(&Progress {
			percent_complete: self.offset + self.span * ratio,
			label: self.label.to_owned(),
			is_completed: false,
		});
	}
}

/// First pass: example lines to matches.
struct SplitExamples<'o, O> {
	chunk_size: usize,
	stage: Stage<'o, O>,
}

impl<O: FnMut(&Progress)> WorkPolicy for SplitExamples<'_, O> {
	type Item = String;
	type Partial = Vec<Match>;
	type Output = Vec<Match>;

	fn split_work(&mut self, remaining: &mut VecDeque<String>) -> Result<Vec<String>, PolicyError> {
		Ok(split_front(remaining, self.chunk_size))
	}

	fn do_work(&mut self, chunk: Vec<String>) -> Result<Vec<Match>, PolicyError> {
		Ok(chunk.iter().flat_map(|line| tokenize_example(line)).collect())
	}

	fn aggregate_work(&mut self, mut previous: Vec<Match>, partial: &Vec<Match>) -> Result<Vec<Match>, PolicyError> {
		previous.extend_from_slice(partial);
		Ok(previous)
	}

	fn report_progress(&mut self, input_len: usize, _done: &Vec<Match>, remaining: &VecDeque<String>) {
		self.stage.report(input_len, remaining.len());
	}
}

/// Second pass: matches to chain, one partial chain per chunk.
struct BuildChain<'o, O> {
	chunk_size: usize,
	stage: Stage<'o, O>,
}

impl<O: FnMut(&Progress)> WorkPolicy for BuildChain<'_, O> {
	type Item = Match;
	type Partial = ChainModel;
	type Output = ChainModel;

	fn split_work(&mut self, remaining: &mut VecDeque<Match>) -> Result<Vec<Match>, PolicyError> {
		Ok(split_front(remaining, self.chunk_size))
	}

	fn do_work(&mut self, chunk: Vec<Match>) -> Result<ChainModel, PolicyError> {
		Ok(chunk.into_iter().fold(ChainModel::new(), ChainModel::fold))
	}

	fn aggregate_work(&mut self, mut previous: ChainModel, partial: &ChainModel) -> Result<ChainModel, PolicyError> {
		previous.merge(partial);
		Ok(previous)
	}

	fn report_progress(&mut self, input_len: usize, _done: &ChainModel, remaining: &VecDeque<Match>) {
		self.stage.report(input_len, remaining.len());
	}
}

/// Runs the two learning passes.
///
/// Holds no learned state itself: each call returns a fresh chain, and the
/// caller decides where to keep it.
#[derive(Clone, Debug, Default)]
pub struct Learner {
	config: LearningConfig,
}

impl Learner {
	pub fn new(config: LearningConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &LearningConfig {
		&self.config
	}

	fn split_scheduler<'o, O: FnMut(&Progress)>(
		&self,
		text: &str,
		observer: &'o mut O,
	) -> Scheduler<SplitExamples<'o, O>> {
		let lines: Vec<String> = split_lines(text).into_iter().map(str::to_owned).collect();
		let policy = SplitExamples {
			chunk_size: self.config.lines_per_chunk(),
			stage: Stage { offset: 0.0, span: 50.0, label: SPLIT_LABEL, observer },
		};
		Scheduler::new(policy, lines, Vec::new())
	}

	fn build_scheduler<'o, O: FnMut(&Progress)>(
		&self,
		matches: Vec<Match>,
		observer: &'o mut O,
	) -> Scheduler<BuildChain<'o, O>> {
		let policy = BuildChain {
			chunk_size: self.config.matches_per_chunk(),
			stage: Stage { offset: 50.0, span: 50.0, label: BUILD_LABEL, observer },
		};
		Scheduler::new(policy, matches, ChainModel::new())
	}

	/// Learns `text` on the current thread, with ticks granted by the configured budget.
	pub fn learn_blocking<O: FnMut(&Progress)>(&self, text: &str, observer: O) -> Result<Learned, LearnError> {
		let mut host = FixedBudgetHost::new(self.config.tick_budget(), self.config.tick_pause);
		self.learn_with(text, &mut host, observer)
	}

	/// Learns `text` on the current thread, with ticks granted by `host`.
	///
	/// `observer` receives one [`Progress`] per tick boundary and a final
	/// completed report on success. On failure no chain is returned.
	#[instrument(skip_all, fields(bytes = text.len()))]
	pub fn learn_with<H, O>(&self, text: &str, host: &mut H, mut observer: O) -> Result<Learned, LearnError>
	where
		H: IdleHost,
		O: FnMut(&Progress),
	{
		let split = self.split_scheduler(text, &mut observer);
		let lines = split.input_len();
		let split = run_blocking(split, host).map_err(LearnError::Split)?;
		info!(lines, matches = split.done.len(), "examples split");

		let build = self.build_scheduler(split.done, &mut observer);
		let matches = build.input_len();
		let built = run_blocking(build, host).map_err(LearnError::Build)?;
		observer(&Progress::completed(READY_LABEL));

		Ok(Learned {
			chain: built.done,
			lines,
			matches,
			busy_duration: split.busy_duration + built.busy_duration,
			wall_clock_duration: split.wall_clock_duration + built.wall_clock_duration,
		})
	}

	/// Learns `text` from an async task.
	///
	/// `idle` is awaited before every tick of both passes; it is how the task
	/// hands control back to its event loop.
	#[instrument(skip_all, fields(bytes = text.len()))]
	pub async fn learn_async<H, O, F, Fut>(
		&self,
		text: &str,
		host: &mut H,
		mut observer: O,
		mut idle: F,
	) -> Result<Learned, LearnError>
	where
		H: IdleHost,
		O: FnMut(&Progress),
		F: FnMut() -> Fut,
		Fut: Future<Output = ()>,
	{
		let split = self.split_scheduler(text, &mut observer);
		let lines = split.input_len();
		let split = run_async(split, host, &mut idle).await.map_err(LearnError::Split)?;
		info!(lines, matches = split.done.len(), "examples split");

		let build = self.build_scheduler(split.done, &mut observer);
		let matches = build.input_len();
		let built = run_async(build, host, &mut idle).await.map_err(LearnError::Build)?;
		observer(&Progress::completed(READY_LABEL));

		Ok(Learned {
			chain: built.done,
			lines,
			matches,
			busy_duration: split.busy_duration + built.busy_duration,
			wall_clock_duration: split.wall_clock_duration + built.wall_clock_duration,
		})
	}
}
