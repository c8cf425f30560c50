use crate::*;
use petgraph::graph::NodeIndex;
use rand::Rng;

/// Fixed-order hierarchical Pitman-Yor language model.
///
/// The context of position `i` is the `min(i, degree)` preceding symbols,
/// most recent first, so the tree never grows deeper than `degree` and
/// never needs pruning.
#[derive(Debug, Clone)]
pub struct Hpylm<S: Symbol> {
    tree: Tree<S>,
    degree: usize,
}

impl<S: Symbol> Hpylm<S> {
    pub fn new(degree: usize, pitman: Pitman) -> Self {
        Self {
            tree: Tree::new(pitman),
            degree,
        }
    }
    pub fn degree(&self) -> usize {
        self.degree
    }
    /// Context length used at position `i`.
    fn order(&self, i: usize) -> usize {
        i.min(self.degree)
    }
    /// Walk (and grow) the tree to the context of position `i`.
    fn context(&mut self, sequence: &[S], i: usize) -> NodeIndex {
        (1..=self.order(i)).fold(self.tree.root(), |node, k| {
            self.tree.child(node, sequence[i - k])
        })
    }
    /// Deepest existing context of position `i`, without growing the
    /// tree. Missing contexts hold no customers and would defer to this
    /// node anyway, so the prediction is unchanged.
    pub fn lookup(&self, sequence: &[S], i: usize) -> NodeIndex {
        let mut node = self.tree.root();
        for k in 1..=self.order(i) {
            match self.tree.find(node, &sequence[i - k]) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }
    /// Predictive probability of every position of `sequence`.
    pub fn probability(&self, sequence: &[S]) -> Vec<Probability> {
        (0..sequence.len())
            .map(|i| self.tree.probability(self.lookup(sequence, i), &sequence[i]))
            .collect()
    }
}

impl<S: Symbol> Default for Hpylm<S> {
    fn default() -> Self {
        Self::new(DEGREE, Pitman::default())
    }
}

impl<S: Symbol> Language<S> for Hpylm<S> {
    type Memo = ();

    fn tree(&self) -> &Tree<S> {
        &self.tree
    }

    fn seat<R>(&mut self, sequence: &[S], _: &mut Self::Memo, rng: &mut R)
    where
        R: Rng,
    {
        for i in 0..sequence.len() {
            let node = self.context(sequence, i);
            self.tree.add_customer(node, sequence[i], rng);
        }
    }

    fn unseat<R>(&mut self, sequence: &[S], _: &Self::Memo, rng: &mut R)
    where
        R: Rng,
    {
        for i in 0..sequence.len() {
            let node = self.context(sequence, i);
            self.tree.remove_customer(node, &sequence[i], rng);
        }
    }

    fn score<R>(&self, sequence: &[S], _: &mut R) -> Score
    where
        R: Rng,
    {
        Score::from(self.probability(sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const TOLERANCE: Probability = 1e-12;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn model(degree: usize) -> Hpylm<char> {
        Hpylm::new(degree, Pitman::new(0.2, 2.0, 1 << 16).unwrap())
    }

    #[test]
    fn bigram_closed_form() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut hpylm = model(1);
        hpylm.seat(&['x', 'y'], &mut (), rng);
        let tree = hpylm.tree();
        let x = tree.find(tree.root(), &'x').expect("context x exists");
        assert!(tree.at(x).customers_of(&'y') == 1);
        assert!(tree.at(x).tables_of(&'y') == 1);
        assert!(tree.at(x).customers() == 1);
        assert!(tree.at(x).tables() == 1);
        // root holds x (first position) and the proxy for the y table
        let (d, theta, base) = (0.2, 2.0, 1.0 / 65536.0);
        let root = (1.0 - d * 1.0 + (theta + d * 2.0) * base) / (theta + 2.0);
        let expected = (1.0 - d * 1.0 + (theta + d * 1.0) * root) / (theta + 1.0);
        assert!((tree.probability(x, &'y') - expected).abs() < TOLERANCE);
        assert!((hpylm.probability(&['x', 'y'])[1] - expected).abs() < TOLERANCE);
    }

    #[test]
    fn depth_bounded_by_degree() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut hpylm = model(2);
        hpylm.seat(&chars("abcdefgh"), &mut (), rng);
        let tree = hpylm.tree();
        assert!(tree.nodes().all(|x| tree.depth(x) <= 2));
        // root + 7 unigram contexts + 6 bigram contexts; 'h' never precedes anything
        assert!(tree.n() == 1 + 7 + 6);
    }

    #[test]
    fn unseat_restores_counts() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let mut hpylm = model(2);
        let corpus = [chars("吾輩は猫である。"), chars("名前はまだ無い。")];
        hpylm.seat(&corpus[0], &mut (), rng);
        hpylm.seat(&corpus[1], &mut (), rng);
        assert!(hpylm.tree().is_consistent());
        hpylm.unseat(&corpus[1], &(), rng);
        assert!(hpylm.tree().is_consistent());
        hpylm.unseat(&corpus[0], &(), rng);
        let tree = hpylm.tree();
        assert!(tree.customers() == 0);
        assert!(tree.tables() == 0);
        assert!(tree.is_consistent());
        assert!(tree.nodes().all(|x| tree.at(x).is_empty()));
        assert!(hpylm.tree.prune() == 7 + 6 + 6 + 6);
        assert!(hpylm.tree.n() == 1);
    }

    #[test]
    fn scoring_never_grows_tree() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let mut hpylm = model(2);
        hpylm.seat(&chars("abab"), &mut (), rng);
        let n = hpylm.tree().n();
        let score = hpylm.score(&chars("zyxw"), rng);
        assert!(score.len() == 4);
        assert!(score.probabilities().iter().all(|p| *p > 0.0 && *p < 1.0));
        assert!(hpylm.tree().n() == n);
    }

    #[test]
    fn unseen_context_matches_shorter_context() {
        let ref mut rng = SmallRng::seed_from_u64(4);
        let mut hpylm = model(2);
        hpylm.seat(&chars("abcabc"), &mut (), rng);
        // "zb" was never seen, so "c after zb" falls back to "c after b"
        let unseen = hpylm.probability(&chars("zbc"))[2];
        let tree = hpylm.tree();
        let b = tree.find(tree.root(), &'b').unwrap();
        assert!((unseen - tree.probability(b, &'c')).abs() < TOLERANCE);
    }

    #[test]
    fn training_favours_seen_continuations() {
        let ref mut rng = SmallRng::seed_from_u64(5);
        let mut hpylm = model(2);
        for _ in 0..5 {
            hpylm.seat(&chars("abcabc"), &mut (), rng);
        }
        let seen = hpylm.probability(&chars("abc"));
        let unseen = hpylm.probability(&chars("abd"));
        assert!(seen[2] > unseen[2]);
    }
}
