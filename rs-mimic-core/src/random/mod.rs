//! Reproducible randomness for weighted sampling.

/// Position-hash noise function backing the generator.
pub mod squirrel;

mod rng;

pub use rng::{DeterministicRng, RngState, Weighted, undeterministic_seed};
