//! The interface both models present to the trainer and to scoring.

mod language;
mod score;

pub use language::*;
pub use score::*;
