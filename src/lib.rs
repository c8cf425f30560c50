//! Hierarchical Pitman-Yor language models.
//!
//! Smoothed distributions over symbol sequences, realized as a tree of
//! Chinese restaurants. Each node is a context; customers are observations;
//! tables are clusters whose creation propagates a proxy customer into the
//! parent (one symbol shorter) context.
//!
//! # Module Structure
//!
//! - `restaurant` — Tables, nodes, the arena tree and its seating engine
//! - `language` — The `Language` trait shared by both models, and `Score`
//! - `hpylm` — Fixed-order model (context length bounded by a degree)
//! - `vpylm` — Variable-order model (context length sampled per occurrence)
//! - `training` — Epoch driver and progress reporting
//! - `corpus` — Reading symbol sequences from text
//! - `config` — Runtime settings
#![allow(dead_code)]

pub mod config;
pub mod corpus;
pub mod hpylm;
pub mod language;
pub mod restaurant;
pub mod training;
pub mod vpylm;

pub use config::*;
pub use corpus::*;
pub use hpylm::*;
pub use language::*;
pub use restaurant::*;
pub use training::*;
pub use vpylm::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Predictive probabilities, seating weights, stop/through probabilities.
pub type Probability = f64;
/// Training epoch counter.
pub type Epoch = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// An opaque unit of the alphabet: a character, a token id, an encoded move.
///
/// Ordering is required so that tree traversal (and therefore the dump and
/// every seeded run) is deterministic.
pub trait Symbol: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug + Send + Sync {}

impl<T> Symbol for T where T: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug + Send + Sync {}

// ============================================================================
// PITMAN-YOR HYPERPARAMETERS
// Fixed for the whole tree; no re-estimation.
// ============================================================================
/// Discount (d) for the fixed-order model.
pub const HPYLM_DISCOUNT: Probability = 0.2;
/// Strength (θ) for the fixed-order model.
pub const HPYLM_STRENGTH: Probability = 2.0;
/// Discount (d) for the variable-order model.
pub const VPYLM_DISCOUNT: Probability = 0.1;
/// Strength (θ) for the variable-order model.
pub const VPYLM_STRENGTH: Probability = 2.0;
/// Maximum context length of the fixed-order model (2 = trigram).
pub const DEGREE: usize = 2;
/// Size of the alphabet behind the uniform base measure at the root.
/// Covers the Basic Multilingual Plane.
pub const ALPHABET: usize = 1 << 16;

// ============================================================================
// STOP / THROUGH PRIOR
// Beta(α, β) prior on whether the context walk stops at a node.
// ============================================================================
/// Prior pseudo-count of stops (α).
pub const STOP_ALPHA: Probability = 1.0;
/// Prior pseudo-count of pass-throughs (β). Larger β favours longer contexts.
pub const STOP_BETA: Probability = 3.0;

// ============================================================================
// TRAINING & SCORING
// ============================================================================
/// Remove-then-reseat sweeps over the corpus.
pub const EPOCHS: Epoch = 1000;
/// Monte Carlo samples per position when integrating out the context order.
pub const SAMPLES: usize = 100;
/// Interval between progress log messages during training.
pub const TRAINING_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to stderr,
/// leaving stdout to the scores.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    use anyhow::Context;
    std::fs::create_dir_all("logs").context("create logs directory")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("time moves slow")?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).context("create log file")?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")
}
