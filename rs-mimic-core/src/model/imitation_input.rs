use crate::config::ConfigError;

/// Parameters of a batch of imitations.
///
/// # Invariants
/// - `word_length_min <= word_length_max`
/// - `word_length_max >= 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImitationInput {
	/// Number of strings generated per batch.
	pub imitation_count: usize,

	/// Steps taken before `END` may be drawn.
	word_length_min: usize,

	/// Maximum number of generated characters.
	word_length_max: usize,

	/// Seed of the imitator's RNG.
	pub seed: u32,
}

impl Default for ImitationInput {
	fn default() -> Self {
		Self { imitation_count: 10, word_length_min: 4, word_length_max: 15, seed: 0 }
	}
}

impl ImitationInput {
	pub fn word_length_min(&self) -> usize {
		self.word_length_min
	}

	pub fn word_length_max(&self) -> usize {
		self.word_length_max
	}

	/// Sets both length bounds at once.
	///
	/// # Errors
	/// Returns an error if `min > max` or `max == 0`.
	pub fn set_word_lengths(&mut self, min: usize, max: usize) -> Result<(), ConfigError> {
		if max == 0 {
			return Err(ConfigError::Zero("word_length_max"));
		}
		if min > max {
			return Err(ConfigError::LengthBounds { min, max });
		}
		self.word_length_min = min;
		self.word_length_max = max;
		Ok(())
	}
}
