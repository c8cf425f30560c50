//! Variable-order hierarchical Pitman-Yor language model.
//!
//! - [`Vpylm`] — the model: stochastic context walks over a pruned tree
//! - [`Beta`] — prior on stopping the walk at a restaurant
//! - [`Orders`] — sampled context lengths of one training sequence

mod beta;
mod vpylm;

pub use beta::*;
pub use vpylm::*;
