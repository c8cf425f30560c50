use crate::*;
use rand::Rng;

/// A hierarchical Pitman-Yor language model over symbols `S`.
///
/// Both models seat one customer per sequence position in the context
/// their resolver picks, and undo exactly that seating later. Whatever a
/// model must remember between the two (the sampled context orders, for
/// the variable-order model) lives in the per-sequence `Memo` owned by the
/// caller.
///
/// # Required Methods
///
/// - `tree()` — The underlying restaurant hierarchy
/// - `seat()` — Add a customer for every position, left to right
/// - `unseat()` — Remove exactly the customers `seat()` added
/// - `score()` — Predictive probability of every position, read-only
///
/// # Provided Methods
///
/// - `maintain()` — Post-epoch cleanup (no-op unless overridden)
/// - `score_batch()` — Score independent queries, in parallel with `server`
pub trait Language<S: Symbol> {
    /// Per-sequence record needed to invert a seating.
    type Memo: Default + Clone + Send + std::fmt::Debug;

    fn tree(&self) -> &Tree<S>;

    fn seat<R>(&mut self, sequence: &[S], memo: &mut Self::Memo, rng: &mut R)
    where
        R: Rng;

    fn unseat<R>(&mut self, sequence: &[S], memo: &Self::Memo, rng: &mut R)
    where
        R: Rng;

    fn score<R>(&self, sequence: &[S], rng: &mut R) -> Score
    where
        R: Rng;

    /// Runs once after every epoch. Returns how many nodes were pruned.
    fn maintain(&mut self) -> usize {
        0
    }

    /// Score independent queries, each with its own generator seeded
    /// from `seed + index`, so results do not depend on scheduling.
    #[cfg(feature = "server")]
    fn score_batch(&self, queries: &[Vec<S>], seed: u64) -> Vec<Score>
    where
        Self: Sync,
    {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        use rayon::iter::IndexedParallelIterator;
        use rayon::iter::IntoParallelRefIterator;
        use rayon::iter::ParallelIterator;
        queries
            .par_iter()
            .enumerate()
            .map(|(i, query)| {
                let ref mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.score(query, rng)
            })
            .collect()
    }
    #[cfg(not(feature = "server"))]
    fn score_batch(&self, queries: &[Vec<S>], seed: u64) -> Vec<Score> {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        queries
            .iter()
            .enumerate()
            .map(|(i, query)| {
                let ref mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.score(query, rng)
            })
            .collect()
    }
}
