use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::symbol::{END_CHAR, Match, START_CHAR, Symbol};
use super::transitions::Transitions;

/// Reasons a serialized chain cannot be turned back into a [`ChainModel`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
	#[error("chain key {0:?} is not a single character")]
	InvalidKey(String),

	#[error("START cannot follow another symbol")]
	StartAsNext,

	#[error("END cannot be a premise")]
	EndAsPremise,

	#[error("transition toward {0:?} has a zero weight")]
	ZeroWeight(String),

	#[error("premise {0:?} has no transitions")]
	EmptyPremise(String),
}

/// Serialized form of a [`ChainModel`]: premise key to its transitions.
type RawChain = BTreeMap<String, Transitions>;

/// Character-level Markov chain built from example strings.
///
/// Maps each premise symbol to the weighted transitions observed after it.
///
/// # Responsibilities
/// - Turn examples into matches and fold them into transition counts
/// - Expose the next-symbol distribution of a premise
/// - Merge with another chain (used to combine chunk-level partial chains)
///
/// # Invariants
/// - A premise is present iff it has at least one transition
/// - All weights are >= 1 and never decrease
/// - Updating a chain never changes a clone taken before the update: inner
///   mappings are shared and copied on write, so only the touched premise
///   is reallocated
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "RawChain", into = "RawChain")]
pub struct ChainModel {
	premises: BTreeMap<Symbol, Arc<Transitions>>,
}

/// Splits example text into trimmed, non-blank lines.
///
/// Accepts `\n`, `\r\n` and `\r` line endings.
pub fn split_lines(text: &str) -> Vec<&str> {
	text.trim()
		.split(['\r', '\n'])
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect()
}

/// Breaks one example into the matches it contains.
///
/// The line is padded with `START` and `END`, then every adjacent pair becomes
/// a [`Match`]. A single character `c` gives `(START, c)` and `(c, END)`.
/// The sentinel characters themselves are dropped from user text.
pub fn tokenize_example(line: &str) -> Vec<Match> {
	let symbols: Vec<Symbol> = std::iter::once(Symbol::Start)
		.chain(
			line.chars()
				.filter(|c| *c != START_CHAR && *c != END_CHAR)
				.map(Symbol::Char),
		)
		.chain(std::iter::once(Symbol::End))
		.collect();

	symbols
		.windows(2)
		.map(|pair| Match::new(pair[0], pair[1]))
		.collect()
}

impl ChainModel {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a chain from line-separated examples.
	///
	/// Blank lines are skipped. Matches are folded in input order, although the
	/// final weights do not depend on that order.
	pub fn build_from_text(text: &str) -> Self {
		split_lines(text)
			.into_iter()
			.flat_map(tokenize_example)
			.fold(Self::new(), Self::fold)
	}

	/// Returns the chain with one more occurrence of `m`.
	///
	/// Clones of `self` taken earlier keep their previous weights.
	pub fn fold(mut self, m: Match) -> Self {
		self.add_match(m);
		self
	}

	/// Records one occurrence of `m` in place.
	pub fn add_match(&mut self, m: Match) {
		let transitions = self.premises.entry(m.premise).or_default();
		Arc::make_mut(transitions).add_transition(m.next);
	}

	/// Next-symbol distribution of `premise`, if it was ever observed.
	pub fn transitions(&self, premise: Symbol) -> Option<&Transitions> {
		self.premises.get(&premise).map(Arc::as_ref)
	}

	/// Weight of `premise -> next`, 0 when it was never observed.
	pub fn weight(&self, premise: Symbol, next: Symbol) -> u64 {
		self.transitions(premise).map_or(0, |t| t.weight(next))
	}

	/// Sum of the outgoing weights of `premise`.
	pub fn total_weight(&self, premise: Symbol) -> u64 {
		self.transitions(premise).map_or(0, Transitions::total)
	}

	pub fn premise_count(&self) -> usize {
		self.premises.len()
	}

	pub fn is_empty(&self) -> bool {
		self.premises.is_empty()
	}

	/// Iterates over premises and their transitions in symbol order.
	pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Transitions)> + '_ {
		self.premises.iter().map(|(premise, t)| (*premise, t.as_ref()))
	}

	/// Merges another chain into this one, summing weights.
	///
	/// Merging is commutative and associative, so partial chains built from
	/// consecutive chunks can be combined in any grouping.
	pub fn merge(&mut self, other: &Self) {
		for (premise, transitions) in &other.premises {
			match self.premises.entry(*premise) {
				Entry::Occupied(mut existing) => Arc::make_mut(existing.get_mut()).merge(transitions),
				Entry::Vacant(slot) => {
					slot.insert(Arc::clone(transitions));
				}
			}
		}
	}
}

impl TryFrom<RawChain> for ChainModel {
	type Error = ChainError;

	fn try_from(raw: RawChain) -> Result<Self, Self::Error> {
		let mut premises = BTreeMap::new();
		for (key, transitions) in raw {
			let premise = Symbol::from_key(&key).ok_or_else(|| ChainError::InvalidKey(key.clone()))?;
			if premise == Symbol::End {
				return Err(ChainError::EndAsPremise);
			}
			if transitions.is_empty() {
				return Err(ChainError::EmptyPremise(key));
			}
			premises.insert(premise, Arc::new(transitions));
		}
		Ok(Self { premises })
	}
}

impl From<ChainModel> for RawChain {
	fn from(chain: ChainModel) -> Self {
		chain
			.premises
			.into_iter()
			.map(|(premise, transitions)| {
				let transitions = Arc::try_unwrap(transitions).unwrap_or_else(|shared| (*shared).clone());
				(premise.as_key().to_string(), transitions)
			})
			.collect()
	}
}
