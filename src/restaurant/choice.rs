/// Outcome of drawing a seat for an arriving customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Join the existing table at this position in the dish's table list.
    Join(usize),
    /// Open a new table, which sends a proxy customer to the parent.
    Open,
}

impl Choice {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}
