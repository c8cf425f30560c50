//! The Chinese restaurant hierarchy shared by both language models.
//!
//! - [`Table`] — a group of customers eating one dish
//! - [`Restaurant`] — one context: tables per dish, cached counts
//! - [`Tree`] — the arena of contexts and the seating engine over it
//! - [`Pitman`] — discount, strength, and the root base measure
//! - [`Choice`] — outcome of a seating draw

mod choice;
mod pitman;
mod restaurant;
mod table;
mod tree;

pub use choice::*;
pub use pitman::*;
pub use restaurant::*;
pub use table::*;
pub use tree::*;
