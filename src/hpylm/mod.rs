//! Fixed-order hierarchical Pitman-Yor language model.

mod hpylm;

pub use hpylm::*;
