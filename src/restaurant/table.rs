/// A group of customers sharing one dish at one restaurant.
///
/// Opened with its first customer already seated, so a live table
/// never holds zero customers. The restaurant drops a table the
/// moment its last customer leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table(usize);

impl Table {
    /// A freshly opened table with one customer.
    pub fn new() -> Self {
        Self(1)
    }
    pub fn seats(&self) -> usize {
        self.0
    }
    pub fn inc(&mut self) {
        self.0 += 1;
    }
    /// Callers never decrement an empty table.
    pub fn dec(&mut self) {
        debug_assert!(self.0 > 0, "decrement of an empty table");
        self.0 -= 1;
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
