use std::time::Duration;

use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{0} must be greater than 0")]
	Zero(&'static str),

	#[error("minimum length {min} is greater than maximum length {max}")]
	LengthBounds { min: usize, max: usize },
}

/// Tuning of a background learning run.
///
/// # Invariants
/// - Chunk sizes are >= 1
/// - The tick budget is not zero
#[derive(Clone, Debug)]
pub struct LearningConfig {
	/// Example lines tokenized per chunk (first pass).
	lines_per_chunk: usize,

	/// Matches folded per chunk (second pass).
	matches_per_chunk: usize,

	/// Time granted to each tick by blocking hosts.
	tick_budget: Duration,

	/// Idle time left to the rest of the program between two ticks.
	pub tick_pause: Duration,
}

impl Default for LearningConfig {
	fn default() -> Self {
		Self {
			lines_per_chunk: 64,
			matches_per_chunk: 512,
			tick_budget: Duration::from_millis(8),
			tick_pause: Duration::ZERO,
		}
	}
}

impl LearningConfig {
	pub fn lines_per_chunk(&self) -> usize {
		self.lines_per_chunk
	}

	pub fn matches_per_chunk(&self) -> usize {
		self.matches_per_chunk
	}

	pub fn tick_budget(&self) -> Duration {
		self.tick_budget
	}

	/// # Errors
	/// Returns an error if `lines` is 0.
	pub fn set_lines_per_chunk(&mut self, lines: usize) -> Result<(), ConfigError> {
		if lines == 0 {
			return Err(ConfigError::Zero("lines_per_chunk"));
		}
		self.lines_per_chunk = lines;
		Ok(())
	}

	/// # Errors
	/// Returns an error if `matches` is 0.
	pub fn set_matches_per_chunk(&mut self, matches: usize) -> Result<(), ConfigError> {
		if matches == 0 {
			return Err(ConfigError::Zero("matches_per_chunk"));
		}
		self.matches_per_chunk = matches;
		Ok(())
	}

	/// # Errors
	/// Returns an error if `budget` is zero.
	pub fn set_tick_budget(&mut self, budget: Duration) -> Result<(), ConfigError> {
		if budget.is_zero() {
			return Err(ConfigError::Zero("tick_budget"));
		}
		self.tick_budget = budget;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chunk_sizes_reject_zero() {
		let mut config = LearningConfig::default();
		assert_eq!(config.set_lines_per_chunk(0), Err(ConfigError::Zero("lines_per_chunk")));
		assert_eq!(config.set_matches_per_chunk(0), Err(ConfigError::Zero("matches_per_chunk")));
		config.set_lines_per_chunk(3).unwrap();
		assert_eq!(config.lines_per_chunk(), 3);
	}

	#[test]
	fn tick_budget_rejects_zero() {
		let mut config = LearningConfig::default();
		assert_eq!(config.set_tick_budget(Duration::ZERO), Err(ConfigError::Zero("tick_budget")));
		assert_eq!(config.tick_budget(), Duration::from_millis(8));
		config.set_tick_budget(Duration::from_millis(2)).unwrap();
		assert_eq!(config.tick_budget(), Duration::from_millis(2));
	}
}
