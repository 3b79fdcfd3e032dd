//! Markov-chain string imitation library.
//!
//! This crate learns a character-level transition model from example lines
//! and generates new strings that resemble them:
//! - A reproducible position-based RNG for weighted sampling
//! - A copy-on-write chain model built from examples
//! - A cooperative scheduler that builds the chain in time-bounded ticks
//! - An imitator walking the chain with length bounds
//!
//! The crate keeps no global state. Hosts own the learned chain and the
//! imitator, and provide the idle ticks the scheduler runs in.

/// Learning and generation configuration.
pub mod config;

/// Two-pass background learning built on the scheduler.
pub mod learning;

/// Chain model and imitation.
pub mod model;

/// Deterministic randomness.
pub mod random;

/// Cooperative incremental executor.
pub mod scheduler;

/// I/O utilities (example files, dataset listing).
pub mod io;
