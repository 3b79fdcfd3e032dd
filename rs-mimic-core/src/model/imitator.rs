use std::fmt;

use thiserror::Error;

use super::chain::ChainModel;
use super::symbol::Symbol;
use crate::random::{DeterministicRng, RngState};

/// Marker appended when the walk hits a dead end before the minimum length.
pub const PREMATURE_MARKER: &str = "!";
/// Marker appended when no eligible next symbol could be drawn.
pub const NO_PATH_MARKER: &str = "!!";
/// Marker appended when the walk drew `END` within bounds.
pub const CLEAN_MARKER: &str = ".";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImitateError {
	#[error("invalid length bounds: min {min}, max {max} (need min <= max and max >= 1)")]
	InvalidBounds { min: usize, max: usize },
}

/// How a walk ended.
///
/// `Walking` is the only non-terminal state; it never appears in a returned
/// [`Imitation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkState {
	Walking,
	/// Drew `END` once ending was allowed.
	EndedClean,
	/// Reached a symbol with no outgoing transition before ending was allowed.
	EndedPremature,
	/// Ran out of length, or reached a dead end once ending was allowed.
	EndedForced,
	/// Every candidate was excluded from the draw.
	EndedNoPath,
}

impl WalkState {
	/// Text appended after the generated characters.
	pub fn marker(self) -> &'static str {
		match self {
			WalkState::Walking | WalkState::EndedForced => "",
			WalkState::EndedClean => CLEAN_MARKER,
			WalkState::EndedPremature => PREMATURE_MARKER,
			WalkState::EndedNoPath => NO_PATH_MARKER,
		}
	}
}

/// One generated string and how its walk ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imitation {
	/// Generated characters, markers excluded.
	pub text: String,
	pub ending: WalkState,
}

impl fmt::Display for Imitation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.text, self.ending.marker())
	}
}

/// Generates strings by walking a learned chain.
///
/// # Responsibilities
/// - Own a completed chain and the RNG used to walk it
/// - Apply the length bounds and termination markers
///
/// Each call advances the RNG, so successive calls give different strings
/// while a fresh imitator with the same seed replays the same sequence.
#[derive(Clone, Debug)]
pub struct Imitator {
	chain: ChainModel,
	rng: DeterministicRng,
}

impl Imitator {
	/// Creates an imitator over a chain from a successfully completed learning run.
	pub fn new(chain: ChainModel, seed: u32) -> Self {
		Self { chain, rng: DeterministicRng::new(seed) }
	}

	pub fn chain(&self) -> &ChainModel {
		&self.chain
	}

	pub fn rng_state(&self) -> RngState {
		self.rng.state()
	}

	/// Draws the symbol following `premise`, refusing `END` unless `can_end`.
	fn imitate_after(&mut self, premise: Symbol, can_end: bool) -> Option<Symbol> {
		let excluded: &[Symbol] = if can_end { &[] } else { &[Symbol::End] };
		self.chain.transitions(premise)?.predict(&mut self.rng, excluded)
	}

	/// Walks the chain from `START` and reports how the walk ended.
	///
	/// Ending is allowed once more than `min_len` steps were taken; at most
	/// `max_len` characters are generated.
	///
	/// # Errors
	/// Returns an error unless `min_len <= max_len` and `max_len >= 1`.
	pub fn imitate_detailed(&mut self, min_len: usize, max_len: usize) -> Result<Imitation, ImitateError> {
		if min_len > max_len || max_len == 0 {
			return Err(ImitateError::InvalidBounds { min: min_len, max: max_len });
		}

		let mut text = String::new();
		let mut current = Symbol::Start;
		let mut state = WalkState::Walking;

		for step in 0..max_len {
			let can_end = step > min_len;
			if self.chain.transitions(current).is_none() {
				state = if can_end { WalkState::EndedForced } else { WalkState::EndedPremature };
				break;
			}
			match self.imitate_after(current, can_end) {
				None => {
					state = WalkState::EndedNoPath;
					break;
				}
				Some(Symbol::End) => {
					state = WalkState::EndedClean;
					break;
				}
				Some(next) => {
					if let Symbol::Char(c) = next {
						text.push(c);
					}
					current = next;
				}
			}
		}

		if state == WalkState::Walking {
			state = WalkState::EndedForced;
		}
		Ok(Imitation { text, ending: state })
	}

	/// Generates one string, termination marker included.
	pub fn imitate(&mut self, min_len: usize, max_len: usize) -> Result<String, ImitateError> {
		Ok(self.imitate_detailed(min_len, max_len)?.to_string())
	}

	/// Generates `count` strings in a row.
	pub fn imitate_many(&mut self, count: usize, min_len: usize, max_len: usize) -> Result<Vec<String>, ImitateError> {
		(0..count).map(|_| self.imitate(min_len, max_len)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_chain_ends_prematurely() {
		let mut imitator = Imitator::new(ChainModel::new(), 0);
		let imitation = imitator.imitate_detailed(2, 5).unwrap();
		assert_eq!(imitation.ending, WalkState::EndedPremature);
		assert_eq!(imitation.to_string(), "!");
	}

	#[test]
	fn single_word_chain_replays_the_word() {
		let chain = ChainModel::build_from_text("abc");
		let mut imitator = Imitator::new(chain, 42);
		assert_eq!(imitator.imitate(0, 10).unwrap(), "abc.");
	}

	#[test]
	fn end_is_excluded_before_min_len() {
		// "ab" only ever ends after 'b', so a minimum above 2 leaves no candidate.
		let chain = ChainModel::build_from_text("ab");
		let mut imitator = Imitator::new(chain, 1);
		let imitation = imitator.imitate_detailed(5, 10).unwrap();
		assert_eq!(imitation.text, "ab");
		assert_eq!(imitation.ending, WalkState::EndedNoPath);
		assert_eq!(imitation.to_string(), "ab!!");
	}

	#[test]
	fn max_len_cuts_without_marker() {
		let chain = ChainModel::build_from_text("abcdef");
		let mut imitator = Imitator::new(chain, 9);
		let imitation = imitator.imitate_detailed(0, 3).unwrap();
		assert_eq!(imitation.text, "abc");
		assert_eq!(imitation.ending, WalkState::EndedForced);
		assert_eq!(imitation.to_string(), "abc");
	}

	#[test]
	fn invalid_bounds_are_rejected() {
		let mut imitator = Imitator::new(ChainModel::build_from_text("a"), 0);
		assert_eq!(imitator.imitate(3, 2), Err(ImitateError::InvalidBounds { min: 3, max: 2 }));
		assert_eq!(imitator.imitate(0, 0), Err(ImitateError::InvalidBounds { min: 0, max: 0 }));
	}

	#[test]
	fn same_seed_same_words() {
		let text = "Cogip\nFloteo\nSoprotec\nSogefrap\nBotea\nMireo\nCofrap\nSogiflup";
		let mut first = Imitator::new(ChainModel::build_from_text(text), 7);
		let mut second = Imitator::new(ChainModel::build_from_text(text), 7);
		assert_eq!(first.imitate_many(20, 4, 15).unwrap(), second.imitate_many(20, 4, 15).unwrap());
	}
}
