//! Character-level Markov chain and the walk that imitates it.
//!
//! This module provides:
//! - Symbols and matches extracted from examples (`Symbol`, `Match`)
//! - The weighted transition table (`ChainModel`, `Transitions`)
//! - Generation over a learned chain (`Imitator`)
//! - Generation parameters (`ImitationInput`)

/// Chain construction, lookup and merging.
///
/// Tokenizes examples into matches and folds them into per-premise weights.
pub mod chain;

/// Weighted random walk over a completed chain, with termination markers.
pub mod imitator;

/// Validated parameters for a batch of imitations.
pub mod imitation_input;

/// Alphabet of the chain: characters plus the START and END sentinels.
pub mod symbol;

/// Outgoing weighted edges of one premise.
pub mod transitions;
