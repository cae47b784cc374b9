//! Per-family parameter search.
//!
//! The [`Optimizer`] discretizes a [`FamilySpace`](crate::strategy::FamilySpace)
//! into a [`SearchGrid`], then either enumerates the grid exhaustively or
//! draws a bounded number of seeded random samples, simulating each candidate
//! and keeping the best rendement.

pub mod grid;
pub mod rng;
pub mod search;

pub use grid::{CandidateIter, GridAxis, SearchGrid, adaptive_step};
pub use rng::XorShift64;
pub use search::{DEFAULT_EARLY_STOP_THRESHOLD, OptimizedParams, Optimizer, OptimizerConfig};
