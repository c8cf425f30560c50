use crate::*;

/// Beta(α, β) prior on stopping the context walk at a restaurant.
///
/// α counts prior stops and β prior pass-throughs; both must be positive
/// so a node's stop probability stays strictly inside (0, 1) and the
/// stick-breaking rescale of the walk never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta {
    alpha: Probability,
    beta: Probability,
}

impl Beta {
    pub fn new(alpha: Probability, beta: Probability) -> anyhow::Result<Self> {
        anyhow::ensure!(alpha > 0.0, "stop prior alpha must be positive, got {}", alpha);
        anyhow::ensure!(beta > 0.0, "stop prior beta must be positive, got {}", beta);
        Ok(Self { alpha, beta })
    }
    pub fn alpha(&self) -> Probability {
        self.alpha
    }
    pub fn beta(&self) -> Probability {
        self.beta
    }
    /// Mean prior stop probability α / (α + β).
    pub fn mean(&self) -> Probability {
        self.alpha / (self.alpha + self.beta)
    }
}

impl Default for Beta {
    fn default() -> Self {
        Self {
            alpha: STOP_ALPHA,
            beta: STOP_BETA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive() {
        assert!(Beta::new(0.0, 1.0).is_err());
        assert!(Beta::new(1.0, -1.0).is_err());
    }

    #[test]
    fn default_mean() {
        assert!(Beta::default().mean() == 0.25);
    }
}
