use crate::*;

/// Per-position predictive probabilities of one scored sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score(Vec<Probability>);

impl Score {
    pub fn probabilities(&self) -> &[Probability] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Mean natural-log probability per position.
    pub fn log_likelihood(&self) -> Probability {
        match self.0.len() {
            0 => 0.0,
            n => self.0.iter().map(|p| p.ln()).sum::<Probability>() / n as Probability,
        }
    }
    /// exp(−mean log p): the average branching factor the model faces.
    /// An empty sequence carries no uncertainty and scores 1.
    pub fn perplexity(&self) -> Probability {
        (-self.log_likelihood()).exp()
    }
}

impl From<Vec<Probability>> for Score {
    fn from(probabilities: Vec<Probability>) -> Self {
        Self(probabilities)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for p in self.0.iter() {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}
