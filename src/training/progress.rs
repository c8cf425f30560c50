use std::time::Duration;

/// Training progress of a restaurant hierarchy.
///
/// # Required Methods
///
/// - `epochs()` — Sweeps over the corpus completed
/// - `nodes()` — Restaurants currently in the tree
/// - `customers()` — Customers seated across the tree, proxies included
/// - `tables()` — Tables across the tree
/// - `elapsed()` — Wall-clock training duration
///
/// # Provided Methods
///
/// - `format()` — Tabular stats with epochs/sec throughput
/// - `summary()` — Final output with "training finished" prefix
pub trait Progress {
    fn epochs(&self) -> usize;
    fn nodes(&self) -> usize;
    fn customers(&self) -> usize;
    fn tables(&self) -> usize;
    fn elapsed(&self) -> Duration;
    fn format(&self) -> String {
        let rate = self.epochs() as f64 / self.elapsed().as_secs_f64().max(1e-3);
        format!(
            "{:<16}{:<16}{:<20}{:<16}{:<16}",
            format!("epoch {}", self.epochs()),
            format!("nodes {}", self.nodes()),
            format!("customers {}", self.customers()),
            format!("tables {}", self.tables()),
            format!("E/sec {:.1}", rate),
        )
    }
    fn summary(&self) -> String {
        format!("training finished\n{}", self.format())
    }
}
