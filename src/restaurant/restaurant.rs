use super::*;
use crate::*;
use petgraph::graph::NodeIndex;
use rand::Rng;
use std::collections::BTreeMap;

/// One context in the hierarchy: a Chinese restaurant serving every symbol.
///
/// Owns its tables (grouped per dish) and the symbol-keyed links to its
/// children. Children themselves live in the [`Tree`] arena; the link
/// back to the parent is the arena's incoming edge, never stored here.
///
/// # Cached aggregates
///
/// `customers` and `tables` are maintained incrementally on every seating
/// change rather than recomputed; [`Restaurant::is_consistent`] recounts
/// them from scratch for tests and the diagnostic dump.
///
/// # Stop / through counts
///
/// Only the variable-order model touches `stops` and `throughs`. They
/// count how many training walks terminated at, or passed through, this
/// context.
#[derive(Debug, Clone)]
pub struct Restaurant<S: Symbol> {
    children: BTreeMap<S, NodeIndex>,
    dishes: BTreeMap<S, Vec<Table>>,
    tables: usize,
    customers: usize,
    stops: usize,
    throughs: usize,
}

impl<S: Symbol> Default for Restaurant<S> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            dishes: BTreeMap::new(),
            tables: 0,
            customers: 0,
            stops: 0,
            throughs: 0,
        }
    }
}

impl<S: Symbol> Restaurant<S> {
    /// t_h: tables across all dishes.
    pub fn tables(&self) -> usize {
        self.tables
    }
    /// c_h: customers across all dishes.
    pub fn customers(&self) -> usize {
        self.customers
    }
    pub fn stops(&self) -> usize {
        self.stops
    }
    pub fn throughs(&self) -> usize {
        self.throughs
    }
    /// Tables currently serving `symbol`, in opening order.
    pub fn serving(&self, symbol: &S) -> &[Table] {
        self.dishes.get(symbol).map(Vec::as_slice).unwrap_or_default()
    }
    /// t_hw: tables serving `symbol`.
    pub fn tables_of(&self, symbol: &S) -> usize {
        self.serving(symbol).len()
    }
    /// c_hw: customers eating `symbol`.
    pub fn customers_of(&self, symbol: &S) -> usize {
        self.serving(symbol).iter().map(Table::seats).sum()
    }
    /// Every dish with at least one table.
    pub fn dishes(&self) -> impl Iterator<Item = (&S, &[Table])> {
        self.dishes.iter().map(|(s, t)| (s, t.as_slice()))
    }
    pub fn child(&self, symbol: &S) -> Option<NodeIndex> {
        self.children.get(symbol).copied()
    }
    pub fn children(&self) -> impl Iterator<Item = (&S, &NodeIndex)> {
        self.children.iter()
    }
    pub(super) fn adopt(&mut self, symbol: S, index: NodeIndex) {
        self.children.insert(symbol, index);
    }
    pub(super) fn disown(&mut self, symbol: &S) {
        self.children.remove(symbol);
    }

    /// Predictive probability of `symbol` in this context given the
    /// parent's prediction `prior`:
    ///
    /// P(w|h) = (c_hw − d·t_hw + (θ + d·t_h)·π(w)) / (θ + c_h)
    ///
    /// An unvisited context defers entirely to its parent.
    pub fn predict(&self, symbol: &S, prior: Probability, pitman: &Pitman) -> Probability {
        if self.customers == 0 {
            return prior;
        }
        let d = pitman.discount();
        let theta = pitman.strength();
        let c_hw = self.customers_of(symbol) as Probability;
        let t_hw = self.tables_of(symbol) as Probability;
        let c_h = self.customers as Probability;
        let t_h = self.tables as Probability;
        (c_hw - d * t_hw + (theta + d * t_h) * prior) / (theta + c_h)
    }

    /// Draw a seat for a new `symbol` customer.
    ///
    /// Existing tables weigh `max(0, seats − d)`; opening a table weighs
    /// `(θ + d·t_h)·π(w)`. The first bucket whose cumulative weight exceeds
    /// a uniform draw in `[0, total)` wins. A dish with no tables always
    /// opens one.
    pub fn choose<R>(&self, symbol: &S, prior: Probability, pitman: &Pitman, rng: &mut R) -> Choice
    where
        R: Rng,
    {
        let tables = self.serving(symbol);
        if tables.is_empty() {
            return Choice::Open;
        }
        let d = pitman.discount();
        let weights = tables
            .iter()
            .map(|t| (t.seats() as Probability - d).max(0.0))
            .chain(std::iter::once(
                (pitman.strength() + d * self.tables as Probability) * prior,
            ))
            .collect::<Vec<Probability>>();
        let total = weights.iter().sum::<Probability>();
        let xi = rng.random::<Probability>() * total;
        weights
            .iter()
            .scan(0.0, |cdf, w| {
                *cdf += w;
                Some(*cdf)
            })
            .position(|cdf| xi < cdf)
            .filter(|&i| i < tables.len())
            .map(Choice::Join)
            .unwrap_or(Choice::Open)
    }

    /// Seat a `symbol` customer per a previously drawn [`Choice`].
    pub fn seat(&mut self, symbol: S, choice: Choice) {
        let tables = self.dishes.entry(symbol).or_default();
        match choice {
            Choice::Open => {
                tables.push(Table::new());
                self.tables += 1;
            }
            Choice::Join(i) => tables
                .get_mut(i)
                .expect("joined table exists")
                .inc(),
        }
        self.customers += 1;
    }

    /// Remove one `symbol` customer, picking its table with probability
    /// proportional to raw seat counts. Returns true when the customer
    /// was the last at its table, which closes the table.
    ///
    /// Panics if no `symbol` customer is seated here: removals must pair
    /// with earlier additions.
    pub fn unseat<R>(&mut self, symbol: &S, rng: &mut R) -> bool
    where
        R: Rng,
    {
        let tables = self
            .dishes
            .get_mut(symbol)
            .unwrap_or_else(|| panic!("no {:?} customer seated for removal", symbol));
        let total = tables.iter().map(Table::seats).sum::<usize>();
        let xi = rng.random_range(0..total);
        let i = tables
            .iter()
            .scan(0, |cdf, t| {
                *cdf += t.seats();
                Some(*cdf)
            })
            .position(|cdf| xi < cdf)
            .expect("draw within total seats");
        tables[i].dec();
        self.customers -= 1;
        if tables[i].is_empty() {
            tables.remove(i);
            self.tables -= 1;
            if tables.is_empty() {
                self.dishes.remove(symbol);
            }
            true
        } else {
            false
        }
    }

    /// Record a training walk terminating here.
    pub fn stop(&mut self) {
        self.stops += 1;
    }
    pub fn unstop(&mut self) {
        self.stops = self.stops.checked_sub(1).expect("stop recorded before removal");
    }
    /// Record a training walk passing through toward a deeper context.
    pub fn pass(&mut self) {
        self.throughs += 1;
    }
    pub fn unpass(&mut self) {
        self.throughs = self
            .throughs
            .checked_sub(1)
            .expect("pass recorded before removal");
    }
    /// (α + stops) / (α + β + throughs + stops)
    pub fn stop_probability(&self, beta: &Beta) -> Probability {
        (beta.alpha() + self.stops as Probability)
            / (beta.alpha() + beta.beta() + (self.throughs + self.stops) as Probability)
    }
    pub fn through_probability(&self, beta: &Beta) -> Probability {
        1.0 - self.stop_probability(beta)
    }

    /// No customers, no tables, and no walk has ever touched it.
    pub fn is_empty(&self) -> bool {
        self.customers == 0 && self.tables == 0 && self.stops == 0 && self.throughs == 0
    }
    /// Drop dishes whose table lists ran dry.
    pub fn tidy(&mut self) {
        self.dishes.retain(|_, tables| !tables.is_empty());
    }
    /// Recount both cached aggregates and check every table is occupied.
    pub fn is_consistent(&self) -> bool {
        self.valid_tables() && self.valid_customers() && self.occupied()
    }
    pub fn valid_tables(&self) -> bool {
        self.tables == self.dishes.values().map(Vec::len).sum::<usize>()
    }
    pub fn valid_customers(&self) -> bool {
        self.customers
            == self
                .dishes
                .values()
                .flatten()
                .map(Table::seats)
                .sum::<usize>()
    }
    fn occupied(&self) -> bool {
        self.dishes.values().flatten().all(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const TOLERANCE: Probability = 1e-12;

    fn pitman() -> Pitman {
        Pitman::new(0.5, 1.0, 4).unwrap()
    }

    #[test]
    fn empty_context_defers_to_prior() {
        let restaurant = Restaurant::<char>::default();
        assert!(restaurant.predict(&'a', 0.3, &pitman()) == 0.3);
    }

    #[test]
    fn first_customer_opens_table() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut restaurant = Restaurant::<char>::default();
        let choice = restaurant.choose(&'a', 0.25, &pitman(), rng);
        assert!(choice == Choice::Open);
        restaurant.seat('a', choice);
        assert!(restaurant.tables() == 1);
        assert!(restaurant.customers() == 1);
        assert!(restaurant.is_consistent());
    }

    #[test]
    fn discount_scales_with_tables() {
        let mut restaurant = Restaurant::<char>::default();
        restaurant.seat('a', Choice::Open);
        restaurant.seat('a', Choice::Join(0));
        restaurant.seat('a', Choice::Open);
        restaurant.seat('b', Choice::Open);
        // c_hw = 3, t_hw = 2, c_h = 4, t_h = 3
        let expected = (3.0 - 0.5 * 2.0 + (1.0 + 0.5 * 3.0) * 0.25) / (1.0 + 4.0);
        let observed = restaurant.predict(&'a', 0.25, &pitman());
        assert!((observed - expected).abs() < TOLERANCE);
    }

    #[test]
    fn unseat_reports_closed_table() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let mut restaurant = Restaurant::<char>::default();
        restaurant.seat('a', Choice::Open);
        restaurant.seat('a', Choice::Join(0));
        assert!(!restaurant.unseat(&'a', rng));
        assert!(restaurant.unseat(&'a', rng));
        assert!(restaurant.tables() == 0);
        assert!(restaurant.customers() == 0);
        assert!(restaurant.serving(&'a').is_empty());
        assert!(restaurant.is_consistent());
    }

    #[test]
    #[should_panic(expected = "no 'z' customer seated")]
    fn unseat_unknown_symbol_panics() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let mut restaurant = Restaurant::<char>::default();
        restaurant.seat('a', Choice::Open);
        restaurant.unseat(&'z', rng);
    }

    #[test]
    fn stop_probability_follows_counts() {
        let beta = Beta::new(1.0, 3.0).unwrap();
        let mut restaurant = Restaurant::<char>::default();
        assert!((restaurant.stop_probability(&beta) - 0.25).abs() < TOLERANCE);
        restaurant.stop();
        restaurant.pass();
        restaurant.pass();
        // (1 + 1) / (1 + 3 + 2 + 1)
        assert!((restaurant.stop_probability(&beta) - 2.0 / 7.0).abs() < TOLERANCE);
        assert!((restaurant.through_probability(&beta) - 5.0 / 7.0).abs() < TOLERANCE);
        assert!(!restaurant.is_empty());
        restaurant.unstop();
        restaurant.unpass();
        restaurant.unpass();
        assert!(restaurant.is_empty());
    }

    #[test]
    fn same_seed_same_choice() {
        let mut restaurant = Restaurant::<char>::default();
        restaurant.seat('a', Choice::Open);
        restaurant.seat('a', Choice::Join(0));
        restaurant.seat('a', Choice::Open);
        let draws = |seed| {
            let ref mut rng = SmallRng::seed_from_u64(seed);
            (0..32)
                .map(|_| restaurant.choose(&'a', 0.25, &pitman(), rng))
                .collect::<Vec<_>>()
        };
        assert!(draws(7) == draws(7));
    }
}
