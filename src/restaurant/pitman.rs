use crate::*;

/// Pitman-Yor hyperparameters shared by every restaurant in a tree,
/// together with the uniform base measure the root backs off to.
///
/// - `discount` (d) shaves mass from every occupied table toward new tables
/// - `strength` (θ) sets the overall propensity to open new tables
/// - `alphabet` (A) fixes the root base measure at `1 / A`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitman {
    discount: Probability,
    strength: Probability,
    alphabet: usize,
}

impl Pitman {
    /// Validated constructor. Requires `0 <= d < 1`, `θ > -d` and a
    /// non-empty alphabet.
    pub fn new(discount: Probability, strength: Probability, alphabet: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (0.0..1.0).contains(&discount),
            "discount must lie in [0, 1), got {}",
            discount
        );
        anyhow::ensure!(
            strength > -discount,
            "strength must exceed -discount ({}), got {}",
            -discount,
            strength
        );
        anyhow::ensure!(alphabet > 0, "alphabet must be non-empty");
        Ok(Self {
            discount,
            strength,
            alphabet,
        })
    }
    pub fn discount(&self) -> Probability {
        self.discount
    }
    pub fn strength(&self) -> Probability {
        self.strength
    }
    pub fn alphabet(&self) -> usize {
        self.alphabet
    }
    /// Probability of any symbol under the root's base measure.
    pub fn base(&self) -> Probability {
        1.0 / self.alphabet as Probability
    }
}

impl Default for Pitman {
    fn default() -> Self {
        Self {
            discount: HPYLM_DISCOUNT,
            strength: HPYLM_STRENGTH,
            alphabet: ALPHABET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_discount_of_one() {
        assert!(Pitman::new(1.0, 2.0, 10).is_err());
    }

    #[test]
    fn rejects_strength_below_negative_discount() {
        assert!(Pitman::new(0.5, -0.5, 10).is_err());
        assert!(Pitman::new(0.5, -0.4, 10).is_ok());
    }

    #[test]
    fn rejects_empty_alphabet() {
        assert!(Pitman::new(0.1, 1.0, 0).is_err());
    }

    #[test]
    fn uniform_base() {
        let pitman = Pitman::new(0.1, 1.0, 4).unwrap();
        assert!(pitman.base() == 0.25);
    }
}
