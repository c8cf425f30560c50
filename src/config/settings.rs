use super::*;
use crate::*;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

/// Runtime settings for a training and scoring run.
///
/// Loaded from a JSON file; any field left out takes its default from the
/// crate constants, which differ by model variant for the discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: Variant,
    pub degree: usize,
    pub discount: Option<Probability>,
    pub strength: Probability,
    pub alpha: Probability,
    pub beta: Probability,
    pub alphabet: usize,
    pub epochs: Epoch,
    pub samples: usize,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings = serde_json::from_str::<Self>(&text)
            .with_context(|| format!("parse settings {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }
    /// Reject hyperparameters outside their valid ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pitman()?;
        if self.model == Variant::Variable {
            self.beta()?;
        }
        anyhow::ensure!(self.samples >= 1, "samples must be at least 1");
        Ok(())
    }
    /// Discount for the selected model, falling back to its default.
    pub fn discount(&self) -> Probability {
        self.discount.unwrap_or(match self.model {
            Variant::Fixed => HPYLM_DISCOUNT,
            Variant::Variable => VPYLM_DISCOUNT,
        })
    }
    pub fn pitman(&self) -> anyhow::Result<Pitman> {
        Pitman::new(self.discount(), self.strength, self.alphabet)
    }
    pub fn beta(&self) -> anyhow::Result<Beta> {
        Beta::new(self.alpha, self.beta)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: Variant::default(),
            degree: DEGREE,
            discount: None,
            strength: HPYLM_STRENGTH,
            alpha: STOP_ALPHA,
            beta: STOP_BETA,
            alphabet: ALPHABET,
            epochs: EPOCHS,
            samples: SAMPLES,
            seed: None,
        }
    }
}
