use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chain::ChainError;
use super::symbol::Symbol;
use crate::random::DeterministicRng;

/// Observation count of one transition, serialized as `{ "weight": n }`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weight {
	pub weight: u64,
}

/// Serialized form of a [`Transitions`] mapping: next-symbol key to weight.
type RawTransitions = BTreeMap<String, Weight>;

/// Outgoing transitions of a single premise.
///
/// This is a node of the Markov chain: each edge points to the next symbol
/// and carries how many times it was observed.
///
/// ## Invariants
/// - Each weight is strictly positive
/// - Iteration follows the [`Symbol`] order, so sampling is reproducible
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "RawTransitions", into = "RawTransitions")]
pub struct Transitions {
	/// Example: { 'e' => 42, 'a' => 3, END => 7 }
	edges: BTreeMap<Symbol, u64>,
}

impl Transitions {
	/// Creates an empty set of transitions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more occurrence of a transition toward `next`.
	///
	/// A missing transition counts as 0, so a new edge starts at 1.
	/// Weights saturate at `u64::MAX`.
	pub fn add_transition(&mut self, next: Symbol) {
		let weight = self.edges.entry(next).or_insert(0);
		*weight = weight.saturating_add(1);
	}

	/// Returns the weight of the edge toward `next`, 0 when it was never observed.
	pub fn weight(&self, next: Symbol) -> u64 {
		self.edges.get(&next).copied().unwrap_or(0)
	}

	/// Sum of all outgoing weights, saturating at `u64::MAX`.
	pub fn total(&self) -> u64 {
		self.edges.values().fold(0, |total, weight| total.saturating_add(*weight))
	}

	pub fn len(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}

	/// Iterates over `(next, weight)` pairs in symbol order.
	pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
		self.edges.iter().map(|(next, weight)| (*next, *weight))
	}

	/// Picks the next symbol by weighted sampling, skipping `excluded` symbols.
	///
	/// Consumes one draw per eligible edge. Returns `None` if every edge is excluded.
	pub fn predict(&self, rng: &mut DeterministicRng, excluded: &[Symbol]) -> Option<Symbol> {
		rng.select_weighted(self.iter(), excluded)
	}

	/// Adds the weights of `other` into this set, saturating at `u64::MAX`.
	pub fn merge(&mut self, other: &Self) {
		for (next, weight) in &other.edges {
			let existing = self.edges.entry(*next).or_insert(0);
			*existing = existing.saturating_add(*weight);
		}
	}
}

impl TryFrom<RawTransitions> for Transitions {
	type Error = ChainError;

	fn try_from(raw: RawTransitions) -> Result<Self, Self::Error> {
		let mut edges = BTreeMap::new();
		for (key, Weight { weight }) in raw {
			let next = Symbol::from_key(&key).ok_or_else(|| ChainError::InvalidKey(key.clone()))?;
			if next == Symbol::Start {
				return Err(ChainError::StartAsNext);
			}
			if weight == 0 {
				return Err(ChainError::ZeroWeight(key));
			}
			edges.insert(next, weight);
		}
		Ok(Self { edges })
	}
}

impl From<Transitions> for RawTransitions {
	fn from(transitions: Transitions) -> Self {
		transitions
			.edges
			.into_iter()
			.map(|(next, weight)| (next.as_key().to_string(), Weight { weight }))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_transition_counts_occurrences() {
		let mut transitions = Transitions::new();
		transitions.add_transition(Symbol::Char('a'));
		transitions.add_transition(Symbol::Char('a'));
		transitions.add_transition(Symbol::End);

		assert_eq!(transitions.weight(Symbol::Char('a')), 2);
		assert_eq!(transitions.weight(Symbol::End), 1);
		assert_eq!(transitions.weight(Symbol::Char('z')), 0);
		assert_eq!(transitions.total(), 3);
	}

	#[test]
	fn merge_sums_weights() {
		let mut left = Transitions::new();
		left.add_transition(Symbol::Char('a'));
		let mut right = Transitions::new();
		right.add_transition(Symbol::Char('a'));
		right.add_transition(Symbol::Char('b'));

		left.merge(&right);
		assert_eq!(left.weight(Symbol::Char('a')), 2);
		assert_eq!(left.weight(Symbol::Char('b')), 1);
	}

	#[test]
	fn predict_with_everything_excluded_is_none() {
		let mut transitions = Transitions::new();
		transitions.add_transition(Symbol::End);
		let mut rng = DeterministicRng::new(0);

		assert_eq!(transitions.predict(&mut rng, &[Symbol::End]), None);
		assert_eq!(rng.state().position, 0);
	}

	#[test]
	fn huge_weights_saturate() {
		let mut raw = RawTransitions::new();
		raw.insert("a".to_owned(), Weight { weight: u64::MAX });
		raw.insert("b".to_owned(), Weight { weight: u64::MAX - 1 });
		let mut transitions = Transitions::try_from(raw).unwrap();
		assert_eq!(transitions.total(), u64::MAX);

		let copy = transitions.clone();
		transitions.merge(&copy);
		transitions.add_transition(Symbol::Char('a'));
		assert_eq!(transitions.weight(Symbol::Char('a')), u64::MAX);
		assert_eq!(transitions.weight(Symbol::Char('b')), u64::MAX);
	}

	#[test]
	fn zero_weight_is_rejected() {
		let mut raw = RawTransitions::new();
		raw.insert("a".to_owned(), Weight { weight: 0 });
		assert!(matches!(Transitions::try_from(raw), Err(ChainError::ZeroWeight(_))));
	}
}
