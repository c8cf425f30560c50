use super::*;
use crate::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Instant;

/// Epoch driver: repeatedly unseats and reseats every training sequence.
///
/// Each sequence travels with its model-specific memo (the sampled
/// context orders, for the variable-order model) so shuffling the corpus
/// never separates a sequence from the record needed to unseat it.
///
/// This is a per-sequence block update rather than token-level Gibbs
/// sampling: a whole sequence is removed and resampled at once, which
/// mixes more coarsely but keeps each update an exact inverse pair.
/// Hyperparameters stay fixed for the run.
pub struct Trainer<S, L>
where
    S: Symbol,
    L: Language<S>,
{
    model: L,
    corpus: Vec<(Vec<S>, L::Memo)>,
    epoch: Epoch,
    start: Instant,
    prior: Instant,
}

impl<S, L> Trainer<S, L>
where
    S: Symbol,
    L: Language<S>,
{
    pub fn new(model: L, corpus: Corpus<S>) -> Self {
        let now = Instant::now();
        Self {
            model,
            corpus: corpus
                .into_iter()
                .map(|sequence| (sequence, L::Memo::default()))
                .collect(),
            epoch: 0,
            start: now,
            prior: now,
        }
    }
    pub fn model(&self) -> &L {
        &self.model
    }
    pub fn into_model(self) -> L {
        self.model
    }
    /// Sequences with their current memos, in the latest shuffled order.
    pub fn corpus(&self) -> &[(Vec<S>, L::Memo)] {
        &self.corpus
    }

    /// One sweep: shuffle, then for every sequence remove its previous
    /// seating (after the first epoch) and seat it afresh. Ends with the
    /// model's maintenance pass.
    pub fn epoch<R>(&mut self, rng: &mut R)
    where
        R: Rng,
    {
        self.corpus.shuffle(rng);
        let seated = self.epoch > 0;
        for (sequence, memo) in self.corpus.iter_mut() {
            if seated {
                self.model.unseat(sequence, memo, rng);
            }
            self.model.seat(sequence, memo, rng);
        }
        let pruned = self.model.maintain();
        self.epoch += 1;
        log::debug!("epoch {} pruned {}", self.epoch, pruned);
        if let Some(stats) = self.checkpoint() {
            log::info!("{}", stats);
        }
    }

    /// Run `epochs` sweeps.
    pub fn train<R>(mut self, epochs: Epoch, rng: &mut R) -> Self
    where
        R: Rng,
    {
        log::info!("training {} sequences for {} epochs", self.corpus.len(), epochs);
        for _ in 0..epochs {
            self.epoch(rng);
        }
        log::info!("{}", self.summary());
        self
    }

    /// Unseat every sequence and prune, returning the tree to its
    /// untrained state. The epoch counter restarts.
    pub fn forget<R>(&mut self, rng: &mut R)
    where
        R: Rng,
    {
        if self.epoch > 0 {
            for (sequence, memo) in self.corpus.iter_mut() {
                self.model.unseat(sequence, memo, rng);
                *memo = L::Memo::default();
            }
        }
        let pruned = self.model.maintain();
        log::debug!("forgot {} sequences, pruned {}", self.corpus.len(), pruned);
        self.epoch = 0;
    }

    /// Stats line if the log interval has elapsed since the last one.
    fn checkpoint(&mut self) -> Option<String> {
        if self.prior.elapsed() >= TRAINING_LOG_INTERVAL {
            self.prior = Instant::now();
            Some(self.format())
        } else {
            None
        }
    }
}

impl<S, L> Progress for Trainer<S, L>
where
    S: Symbol,
    L: Language<S>,
{
    fn epochs(&self) -> usize {
        self.epoch
    }
    fn nodes(&self) -> usize {
        self.model.tree().n()
    }
    fn customers(&self) -> usize {
        self.model.tree().customers()
    }
    fn tables(&self) -> usize {
        self.model.tree().tables()
    }
    fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeSet;

    fn corpus() -> Corpus<char> {
        Corpus::from(vec![
            "吾輩は猫である。",
            "名前はまだ無い。",
            "どこで生れたかとんと見当がつかぬ。",
            "吾輩はここで始めて人間というものを見た。",
        ])
    }

    fn alphabet(corpus: &Corpus<char>) -> BTreeSet<char> {
        corpus.iter().flatten().copied().collect()
    }

    fn pitman() -> Pitman {
        Pitman::new(0.1, 2.0, 1 << 16).unwrap()
    }

    #[test]
    fn seated_counts_stable_across_epochs() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let corpus = corpus();
        let symbols = alphabet(&corpus);
        let expected = symbols
            .iter()
            .map(|s| corpus.iter().flatten().filter(|c| *c == s).count())
            .collect::<Vec<_>>();
        let mut trainer = Trainer::new(Vpylm::new(Beta::default(), pitman()), corpus);
        for _ in 0..5 {
            trainer.epoch(rng);
            let tree = trainer.model().tree();
            let seated = symbols.iter().map(|s| tree.seated(s)).collect::<Vec<_>>();
            assert!(seated == expected);
            assert!(tree.is_consistent());
        }
    }

    #[test]
    fn hpylm_counts_stable_across_epochs() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let corpus = corpus();
        let length = corpus.iter().map(Vec::len).sum::<usize>();
        let mut trainer = Trainer::new(Hpylm::new(2, pitman()), corpus);
        trainer.epoch(rng);
        let nodes = trainer.nodes();
        trainer.epoch(rng);
        trainer.epoch(rng);
        let tree = trainer.model().tree();
        assert!(tree.nodes().map(|x| tree.at(x).customers()).sum::<usize>() >= length);
        assert!(tree.seated(&'吾') == 2);
        assert!(trainer.nodes() == nodes);
        assert!(trainer.epochs() == 3);
    }

    #[test]
    fn forget_restores_bare_root() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let mut trainer = Trainer::new(Vpylm::new(Beta::default(), pitman()), corpus());
        trainer.epoch(rng);
        trainer.epoch(rng);
        trainer.forget(rng);
        let tree = trainer.model().tree();
        assert!(tree.n() == 1);
        assert!(tree.at(tree.root()).is_empty());
        assert!(trainer.epochs() == 0);
    }

    #[test]
    fn same_seed_same_model() {
        let train = |seed| {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            Trainer::new(Vpylm::new(Beta::default(), pitman()), corpus())
                .train(4, rng)
                .model()
                .tree()
                .to_string()
        };
        assert!(train(8) == train(8));
    }
}
