use super::*;
use crate::*;
use petgraph::Direction::Incoming;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use rand::Rng;

/// The hierarchy of restaurants behind a Pitman-Yor language model.
///
/// Each vertex is a [`Restaurant`] for one context; each edge points from
/// a context to the context one symbol longer and is labeled with that
/// (older) symbol. The root is the empty context.
///
/// # Ownership
///
/// Nodes live in a `StableDiGraph` arena, so indices held by callers stay
/// valid while other nodes are pruned. A node's parent is its single
/// incoming edge: a lookup handle for upward recursion only.
///
/// # Seating engine
///
/// - `add_customer()` — seat a customer, opening tables upward as drawn
/// - `remove_customer()` — unseat a customer, closing tables upward as emptied
/// - `probability()` — hierarchical predictive probability (read-only)
///
/// # Variable-order bookkeeping
///
/// - `stop()` / `unstop()` — record a training walk ending at a node
/// - `prune()` — drop exhausted nodes bottom-up
#[derive(Debug, Clone)]
pub struct Tree<S: Symbol> {
    graph: StableDiGraph<Restaurant<S>, S>,
    root: NodeIndex,
    pitman: Pitman,
}

impl<S: Symbol> Tree<S> {
    pub fn new(pitman: Pitman) -> Self {
        let mut graph = StableDiGraph::default();
        let root = graph.add_node(Restaurant::default());
        Self {
            graph,
            root,
            pitman,
        }
    }
    pub fn pitman(&self) -> &Pitman {
        &self.pitman
    }
    pub fn root(&self) -> NodeIndex {
        self.root
    }
    /// Number of restaurants in the tree.
    pub fn n(&self) -> usize {
        self.graph.node_count()
    }
    /// All live node indices.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }
    pub fn at(&self, index: NodeIndex) -> &Restaurant<S> {
        self.graph
            .node_weight(index)
            .expect("node index belongs to tree")
    }
    fn at_mut(&mut self, index: NodeIndex) -> &mut Restaurant<S> {
        self.graph
            .node_weight_mut(index)
            .expect("node index belongs to tree")
    }
    /// The context one symbol shorter (None at the root).
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(index, Incoming).next()
    }
    /// The symbol that extends the parent's context into this one.
    pub fn incoming(&self, index: NodeIndex) -> Option<&S> {
        self.graph
            .edges_directed(index, Incoming)
            .next()
            .map(|edge| edge.weight())
    }
    /// This node followed by each ancestor up to the root.
    pub fn lineage(&self, index: NodeIndex) -> Vec<NodeIndex> {
        std::iter::successors(Some(index), |&x| self.parent(x)).collect()
    }
    /// Context length of a node.
    pub fn depth(&self, index: NodeIndex) -> usize {
        self.lineage(index).len() - 1
    }
    /// Existing child for `symbol`, without creating it.
    pub fn find(&self, index: NodeIndex, symbol: &S) -> Option<NodeIndex> {
        self.at(index).child(symbol)
    }
    /// Child for `symbol`, created empty if this is the first visit.
    pub fn child(&mut self, index: NodeIndex, symbol: S) -> NodeIndex {
        match self.find(index, &symbol) {
            Some(child) => child,
            None => {
                let child = self.graph.add_node(Restaurant::default());
                self.graph.add_edge(index, child, symbol);
                self.at_mut(index).adopt(symbol, child);
                child
            }
        }
    }

    /// Predictive probability of `symbol` in the context at `index`.
    /// Folds from the root's base measure down through every ancestor.
    pub fn probability(&self, index: NodeIndex, symbol: &S) -> Probability {
        self.lineage(index)
            .into_iter()
            .rev()
            .fold(self.pitman.base(), |prior, x| {
                self.at(x).predict(symbol, prior, &self.pitman)
            })
    }
    /// π(w) for each node of a lineage: its parent's prediction, or the
    /// base measure for the root.
    fn priors(&self, lineage: &[NodeIndex], symbol: &S) -> Vec<Probability> {
        let mut priors = vec![0.0; lineage.len()];
        let mut prior = self.pitman.base();
        for (i, &x) in lineage.iter().enumerate().rev() {
            priors[i] = prior;
            prior = self.at(x).predict(symbol, prior, &self.pitman);
        }
        priors
    }

    /// Seat one `symbol` customer in the context at `index`.
    ///
    /// Opening a new table makes that table a customer of the parent, so
    /// the seating continues upward until a customer joins an existing
    /// table or the root is reached. Seating a node never changes its
    /// ancestors' predictions, so the priors are computed once up front.
    pub fn add_customer<R>(&mut self, index: NodeIndex, symbol: S, rng: &mut R)
    where
        R: Rng,
    {
        let lineage = self.lineage(index);
        let priors = self.priors(&lineage, &symbol);
        for (x, prior) in lineage.into_iter().zip(priors) {
            let choice = self.at(x).choose(&symbol, prior, &self.pitman, rng);
            log::trace!("seat {:?} @ {:?} -> {:?}", symbol, x, choice);
            self.at_mut(x).seat(symbol, choice);
            if !choice.is_open() {
                break;
            }
        }
    }
    /// Unseat one `symbol` customer from the context at `index`.
    ///
    /// Closing a table removes its proxy customer from the parent, so the
    /// removal continues upward while tables keep closing.
    ///
    /// Panics if no such customer is seated: every removal must mirror an
    /// earlier addition at the same context.
    pub fn remove_customer<R>(&mut self, index: NodeIndex, symbol: &S, rng: &mut R)
    where
        R: Rng,
    {
        let mut cursor = Some(index);
        while let Some(x) = cursor {
            let closed = self.at_mut(x).unseat(symbol, rng);
            log::trace!("unseat {:?} @ {:?} closed={}", symbol, x, closed);
            cursor = if closed { self.parent(x) } else { None };
        }
    }

    /// Record a training walk that stopped at `index`: a stop here and a
    /// pass-through at every proper ancestor.
    pub fn stop(&mut self, index: NodeIndex) {
        let lineage = self.lineage(index);
        self.at_mut(index).stop();
        for &x in lineage.iter().skip(1) {
            self.at_mut(x).pass();
        }
    }
    /// Exact inverse of [`Tree::stop`].
    pub fn unstop(&mut self, index: NodeIndex) {
        let lineage = self.lineage(index);
        self.at_mut(index).unstop();
        for &x in lineage.iter().skip(1) {
            self.at_mut(x).unpass();
        }
    }

    /// Drop exhausted restaurants, children before parents, so an empty
    /// node is only removed once nothing survives beneath it. The root is
    /// never removed. Returns how many nodes were dropped.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0;
        for x in self.postorder() {
            self.at_mut(x).tidy();
            if x == self.root {
                continue;
            }
            let node = self.at(x);
            if node.is_empty() && node.children().next().is_none() {
                let symbol = *self.incoming(x).expect("non-root has a parent edge");
                let parent = self.parent(x).expect("non-root has a parent");
                self.at_mut(parent).disown(&symbol);
                self.graph.remove_node(x);
                pruned += 1;
            }
        }
        pruned
    }
    /// Nodes in postorder (children first) from the root.
    pub fn postorder(&self) -> Vec<NodeIndex> {
        let mut result = Vec::with_capacity(self.n());
        let mut stack = vec![(self.root, false)];
        while let Some((x, expanded)) = stack.pop() {
            if expanded {
                result.push(x);
            } else {
                stack.push((x, true));
                for (_, &child) in self.at(x).children() {
                    stack.push((child, false));
                }
            }
        }
        result
    }

    /// Every restaurant's cached aggregates agree with its tables.
    pub fn is_consistent(&self) -> bool {
        self.nodes().all(|x| self.at(x).is_consistent())
    }
    /// Customers across every restaurant, proxies included.
    pub fn customers(&self) -> usize {
        self.nodes().map(|x| self.at(x).customers()).sum()
    }
    /// Tables across every restaurant.
    pub fn tables(&self) -> usize {
        self.nodes().map(|x| self.at(x).tables()).sum()
    }
    /// Customers of `symbol` seated by training rather than as proxies
    /// for child tables: Σ c_hw over all nodes minus Σ t_hw over all
    /// non-root nodes. Equals the number of seated occurrences of `symbol`.
    pub fn seated(&self, symbol: &S) -> usize {
        let customers = self
            .nodes()
            .map(|x| self.at(x).customers_of(symbol))
            .sum::<usize>();
        let proxies = self
            .nodes()
            .filter(|&x| x != self.root)
            .map(|x| self.at(x).tables_of(symbol))
            .sum::<usize>();
        customers - proxies
    }

    /// display the Tree in a human-readable format
    /// be careful because it's really big and recursive
    fn show(&self, f: &mut std::fmt::Formatter, x: NodeIndex, prefix: &str) -> std::fmt::Result {
        let node = self.at(x);
        for (symbol, tables) in node.dishes() {
            let seats = tables
                .iter()
                .map(Table::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}{:?}: [{}]", prefix, symbol, seats)?;
        }
        writeln!(f, "{}numTables: {}", prefix, node.tables())?;
        writeln!(f, "{}numCustomers: {}", prefix, node.customers())?;
        writeln!(f, "{}throughCount: {}", prefix, node.throughs())?;
        writeln!(f, "{}stopCount: {}", prefix, node.stops())?;
        writeln!(f, "{}validTableCount: {}", prefix, node.valid_tables())?;
        writeln!(f, "{}validCustomerCount: {}", prefix, node.valid_customers())?;
        let children = node.children().collect::<Vec<_>>();
        let n = children.len();
        for (i, (symbol, &child)) in children.into_iter().enumerate() {
            let last = i == n - 1;
            let gaps = if last { "    " } else { "│   " };
            let stem = if last { "└" } else { "├" };
            writeln!(f, "{}{}──{:?}", prefix, stem, symbol)?;
            self.show(f, child, &format!("{}{}", prefix, gaps))?;
        }
        Ok(())
    }
}

impl<S: Symbol> Default for Tree<S> {
    fn default() -> Self {
        Self::new(Pitman::default())
    }
}

impl<S: Symbol> std::fmt::Display for Tree<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ROOT")?;
        self.show(f, self.root, "")
    }
}
