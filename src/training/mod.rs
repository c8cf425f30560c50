//! Epoch-based training and its observability.

mod progress;
mod trainer;

pub use progress::*;
pub use trainer::*;
