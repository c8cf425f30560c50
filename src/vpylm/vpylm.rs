use crate::*;
use petgraph::graph::NodeIndex;
use rand::Rng;

/// Context order sampled for each position of one training sequence.
pub type Orders = Vec<usize>;

/// Variable-order hierarchical Pitman-Yor language model.
///
/// Every occurrence draws its own context length. Starting at the root,
/// the walk stops at each restaurant with that restaurant's stop
/// probability, otherwise it steps one symbol further back, so context
/// depth is bounded only by the position in the sequence.
///
/// # Training walks
///
/// A single uniform draw decides the whole walk: after passing a node
/// with stop probability `p`, the draw is rescaled to `(ξ − p) / (1 − p)`
/// (stick breaking). The chosen order is recorded in the caller's
/// [`Orders`] and replayed verbatim on removal, since resampling would
/// unseat customers from the wrong restaurant.
///
/// # Scoring
///
/// The same walk, read-only, repeated `samples` times per position; the
/// order is integrated out by averaging the predictions.
#[derive(Debug, Clone)]
pub struct Vpylm<S: Symbol> {
    tree: Tree<S>,
    beta: Beta,
    samples: usize,
}

impl<S: Symbol> Vpylm<S> {
    pub fn new(beta: Beta, pitman: Pitman) -> Self {
        Self {
            tree: Tree::new(pitman),
            beta,
            samples: SAMPLES,
        }
    }
    /// Monte Carlo samples per position when scoring.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples.max(1);
        self
    }
    pub fn beta(&self) -> &Beta {
        &self.beta
    }
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Training walk for position `i`: sample an order, growing the tree
    /// along the way. Returns the context node and its order.
    fn descend<R>(&mut self, sequence: &[S], i: usize, rng: &mut R) -> (NodeIndex, usize)
    where
        R: Rng,
    {
        let mut xi = rng.random::<Probability>();
        let mut node = self.tree.root();
        for k in 1..=i {
            let p = self.tree.at(node).stop_probability(&self.beta);
            if xi < p {
                return (node, k - 1);
            }
            xi = (xi - p) / (1.0 - p);
            node = self.tree.child(node, sequence[i - k]);
        }
        (node, i)
    }
    /// The context of position `i` at a recorded order. Recorded contexts
    /// hold a stop, so pruning cannot have removed them.
    fn replay(&self, sequence: &[S], i: usize, order: usize) -> NodeIndex {
        (1..=order).fold(self.tree.root(), |node, k| {
            self.tree
                .find(node, &sequence[i - k])
                .expect("recorded context survives until unseated")
        })
    }
    /// Read-only walk for position `i`, used for scoring. A missing child
    /// has no customers and would predict exactly what its deepest
    /// existing ancestor predicts, so the walk ends there instead of
    /// growing the tree.
    pub fn sample<R>(&self, sequence: &[S], i: usize, rng: &mut R) -> NodeIndex
    where
        R: Rng,
    {
        let mut xi = rng.random::<Probability>();
        let mut node = self.tree.root();
        for k in 1..=i {
            let p = self.tree.at(node).stop_probability(&self.beta);
            if xi < p {
                return node;
            }
            xi = (xi - p) / (1.0 - p);
            match self.tree.find(node, &sequence[i - k]) {
                Some(child) => node = child,
                None => return node,
            }
        }
        node
    }
    /// Predictive probability of every position, averaged over `samples`
    /// sampled context orders.
    pub fn probability<R>(&self, sequence: &[S], rng: &mut R) -> Vec<Probability>
    where
        R: Rng,
    {
        let mut p = vec![0.0; sequence.len()];
        for _ in 0..self.samples {
            for (i, symbol) in sequence.iter().enumerate() {
                p[i] += self.tree.probability(self.sample(sequence, i, rng), symbol);
            }
        }
        p.iter_mut().for_each(|p| *p /= self.samples as Probability);
        p
    }
}

impl<S: Symbol> Default for Vpylm<S> {
    fn default() -> Self {
        let pitman = Pitman::new(VPYLM_DISCOUNT, VPYLM_STRENGTH, ALPHABET)
            .expect("default hyperparameters are valid");
        Self::new(Beta::default(), pitman)
    }
}

impl<S: Symbol> Language<S> for Vpylm<S> {
    type Memo = Orders;

    fn tree(&self) -> &Tree<S> {
        &self.tree
    }

    fn seat<R>(&mut self, sequence: &[S], orders: &mut Self::Memo, rng: &mut R)
    where
        R: Rng,
    {
        orders.clear();
        for (i, &symbol) in sequence.iter().enumerate() {
            let (node, order) = self.descend(sequence, i, rng);
            orders.push(order);
            self.tree.stop(node);
            self.tree.add_customer(node, symbol, rng);
        }
    }

    fn unseat<R>(&mut self, sequence: &[S], orders: &Self::Memo, rng: &mut R)
    where
        R: Rng,
    {
        assert!(
            orders.len() == sequence.len(),
            "recorded {} orders for a sequence of {}",
            orders.len(),
            sequence.len()
        );
        for (i, (symbol, &order)) in sequence.iter().zip(orders.iter()).enumerate() {
            let node = self.replay(sequence, i, order);
            self.tree.remove_customer(node, symbol, rng);
            self.tree.unstop(node);
        }
    }

    fn score<R>(&self, sequence: &[S], rng: &mut R) -> Score
    where
        R: Rng,
    {
        Score::from(self.probability(sequence, rng))
    }

    fn maintain(&mut self) -> usize {
        self.tree.prune()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn model() -> Vpylm<char> {
        Vpylm::new(
            Beta::new(1.0, 3.0).unwrap(),
            Pitman::new(0.1, 2.0, 1 << 16).unwrap(),
        )
        .with_samples(20)
    }

    #[test]
    fn orders_bounded_by_position() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut vpylm = model();
        let sequence = chars("どうも咽せぽくて実に弱った。");
        let mut orders = Orders::default();
        vpylm.seat(&sequence, &mut orders, rng);
        assert!(orders.len() == sequence.len());
        assert!(orders.iter().enumerate().all(|(i, &o)| o <= i));
        assert!(orders[0] == 0);
    }

    #[test]
    fn stops_match_positions() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut vpylm = model();
        let sequence = chars("abracadabra");
        let mut orders = Orders::default();
        vpylm.seat(&sequence, &mut orders, rng);
        let tree = vpylm.tree();
        let stops = tree.nodes().map(|x| tree.at(x).stops()).sum::<usize>();
        let throughs = tree.nodes().map(|x| tree.at(x).throughs()).sum::<usize>();
        assert!(stops == sequence.len());
        assert!(throughs == orders.iter().sum::<usize>());
        assert!(tree.seated(&'a') == 5);
        assert!(tree.is_consistent());
    }

    #[test]
    fn unseat_then_maintain_leaves_bare_root() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let mut vpylm = model();
        let sequence = chars("吾輩はここで始めて人間というものを見た。");
        let mut orders = Orders::default();
        vpylm.seat(&sequence, &mut orders, rng);
        vpylm.unseat(&sequence, &orders, rng);
        vpylm.maintain();
        let tree = vpylm.tree();
        assert!(tree.n() == 1);
        assert!(tree.at(tree.root()).is_empty());
        assert!(tree.to_string().matches("Count: 0").count() == 2);
    }

    #[test]
    fn interleaved_unseat_keeps_other_sequences() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let mut vpylm = model();
        let a = chars("しかもあとで聞くとそれは書生という人間中で一番獰悪な種族であったそうだ。");
        let b = chars("この書生というのは時々我々を捕えて煮て食うという話である。");
        let (mut oa, mut ob) = (Orders::default(), Orders::default());
        vpylm.seat(&a, &mut oa, rng);
        vpylm.seat(&b, &mut ob, rng);
        vpylm.unseat(&a, &oa, rng);
        vpylm.maintain();
        let tree = vpylm.tree();
        assert!(tree.is_consistent());
        let stops = tree.nodes().map(|x| tree.at(x).stops()).sum::<usize>();
        assert!(stops == b.len());
        assert!(tree.seated(&'書') == 1);
        vpylm.unseat(&b, &ob, rng);
        vpylm.maintain();
        assert!(vpylm.tree().n() == 1);
    }

    #[test]
    fn scoring_never_grows_tree() {
        let ref mut rng = SmallRng::seed_from_u64(4);
        let mut vpylm = model();
        let mut orders = Orders::default();
        vpylm.seat(&chars("abcabcabc"), &mut orders, rng);
        let before = vpylm.tree().to_string();
        let score = vpylm.score(&chars("abcxyz"), rng);
        assert!(score.len() == 6);
        assert!(score.perplexity() > 1.0);
        assert!(before == vpylm.tree().to_string());
    }

    #[test]
    fn same_seed_same_orders() {
        let train = |seed| {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            let mut vpylm = model();
            let mut orders = Orders::default();
            vpylm.seat(&chars("そうしてその穴の中から時々ぷうぷうと煙を吹く。"), &mut orders, rng);
            (orders, vpylm.tree().to_string())
        };
        assert!(train(6) == train(6));
    }

    #[test]
    fn trained_text_is_less_perplexing() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let mut vpylm = model();
        let text = chars("のみならず顔の真中があまりに突起している。");
        let mut orders = Orders::default();
        for _ in 0..3 {
            vpylm.seat(&text, &mut orders, rng);
        }
        let seen = vpylm.score(&text, rng).perplexity();
        let unseen = vpylm.score(&chars("第一毛をもって装飾されべきはずの顔"), rng).perplexity();
        assert!(seen < unseen);
    }
}
