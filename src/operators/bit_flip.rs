//! Bit-flip mutation for feature masks
//!
//! [`RandomBitFlip`] flips every slot with the same probability.
//! [`AsymmetricBitFlip`] uses separate probabilities for switching a feature
//! on and off, optionally scaled per slot by a [`FlipWeighting`]. Both carry
//! an [`AdaptationState`] that rescales their rates from the driver's
//! success rate.

use rand::Rng;

use crate::config::{AsymmetricBitFlipConfig, OperatorParameter, RandomBitFlipConfig};
use crate::context::SearchContext;
use crate::correlation::io::load_labeled_dataset;
use crate::error::{EvoResult, GenomeError};
use crate::genome::prelude::*;
use crate::hyperparameter::adaptive::AdaptationState;
use crate::operators::traits::{ConfigurableOperator, MutationOperator};

/// Independent bit-flip mutation with a self-adaptive rate
///
/// Each of the `n` slots flips with probability `factor · gamma / n`.
#[derive(Clone, Debug)]
pub struct RandomBitFlip {
    gamma: f64,
    adaptation: AdaptationState,
}

impl RandomBitFlip {
    /// Create a random bit flip from its configuration
    pub fn new(config: RandomBitFlipConfig) -> Self {
        Self {
            gamma: config.gamma,
            adaptation: AdaptationState::new(config.self_adaptation),
        }
    }

    /// Current self-adaptation factor
    pub fn factor(&self) -> f64 {
        self.adaptation.factor()
    }

    /// Per-slot flip probability for a mask of length `n`
    pub fn flip_probability(&self, n: usize) -> f64 {
        self.adaptation.factor() * self.gamma / n as f64
    }
}

impl Default for RandomBitFlip {
    fn default() -> Self {
        Self::new(RandomBitFlipConfig::default())
    }
}

impl ConfigurableOperator for RandomBitFlip {
    fn configure(params: &[OperatorParameter], _context: &SearchContext) -> EvoResult<Self> {
        Ok(Self::new(RandomBitFlipConfig::from_parameters(params)?))
    }
}

impl MutationOperator for RandomBitFlip {
    fn name(&self) -> &'static str {
        "RandomBitFlip"
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        context: &mut SearchContext,
        rng: &mut R,
    ) -> EvoResult<()> {
        let mask = FeatureMask::extract(representation)?;
        log::debug!("Random bit flip mutation started, current value: {}", mask);

        // The rate for this pass is fixed before the factor is recalibrated
        let probability = self.flip_probability(mask.len());
        self.adaptation.update(context);

        for i in 0..mask.len() {
            if rng.gen::<f64>() < probability {
                mask.flip(i);
            }
        }
        mask.repair(rng);

        log::debug!("Random bit flip mutation finished, mutated value: {}", mask);
        Ok(())
    }
}

/// Per-slot scaling of asymmetric flip probabilities
pub trait FlipWeighting: Send + Sync {
    /// Name of the operator using this weighting
    const OPERATOR_NAME: &'static str;

    /// Check that the weighting covers a mask of this length
    fn check_len(&self, _len: usize) -> Result<(), GenomeError> {
        Ok(())
    }

    /// Multiplier of the 0 → 1 probability of a slot
    fn add_weight(&self, index: usize) -> f64;

    /// Multiplier of the 1 → 0 probability of a slot
    fn remove_weight(&self, index: usize) -> f64;
}

/// Every slot weighted 1
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformWeighting;

impl FlipWeighting for UniformWeighting {
    const OPERATOR_NAME: &'static str = "AsymmetricBitFlip";

    fn add_weight(&self, _index: usize) -> f64 {
        1.0
    }

    fn remove_weight(&self, _index: usize) -> f64 {
        1.0
    }
}

/// Weights slots by their correlation with the classification label
///
/// Features correlated with the label are easier to add (`|r|`) and harder
/// to remove (`1 − |r|`).
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationWeighting {
    /// Absolute label correlation per slot
    strengths: Vec<f64>,
}

impl CorrelationWeighting {
    /// Create a weighting from signed correlation coefficients
    pub fn new(label_correlations: &[f64]) -> Self {
        Self {
            strengths: label_correlations
                .iter()
                .map(|r| r.abs().min(1.0))
                .collect(),
        }
    }

    /// Absolute label correlation per slot
    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }
}

impl FlipWeighting for CorrelationWeighting {
    const OPERATOR_NAME: &'static str = "AsymmetricBitFlipWithCorrelationToTarget";

    fn check_len(&self, len: usize) -> Result<(), GenomeError> {
        if len == self.strengths.len() {
            Ok(())
        } else {
            Err(GenomeError::DimensionMismatch {
                expected: self.strengths.len(),
                actual: len,
            })
        }
    }

    fn add_weight(&self, index: usize) -> f64 {
        self.strengths[index]
    }

    fn remove_weight(&self, index: usize) -> f64 {
        1.0 - self.strengths[index]
    }
}

/// Bit flip with separate on and off probabilities
///
/// For a mask of length `n` a clear slot is set with probability
/// `p01 · gamma · factor / n` and a set slot cleared with probability
/// `p10 · gamma · factor / n`, each scaled by the weighting. If more than
/// `⌊n · maxRate⌋` slots end up set, the excess is cleared again, first
/// among the slots set in this pass.
#[derive(Clone, Debug)]
pub struct AsymmetricBitFlip<W: FlipWeighting = UniformWeighting> {
    p01: f64,
    p10: f64,
    gamma: f64,
    max_rate_of_selected_features: f64,
    adaptation: AdaptationState,
    weighting: W,
}

/// Asymmetric bit flip guided by label correlation
pub type AsymmetricBitFlipWithCorrelationToTarget = AsymmetricBitFlip<CorrelationWeighting>;

impl AsymmetricBitFlip<UniformWeighting> {
    /// Create an unweighted asymmetric bit flip
    pub fn new(config: AsymmetricBitFlipConfig) -> Self {
        Self::with_weighting(config, UniformWeighting)
    }
}

impl AsymmetricBitFlipWithCorrelationToTarget {
    /// Create from precomputed label correlation coefficients
    pub fn with_label_correlations(config: AsymmetricBitFlipConfig, label_correlations: &[f64]) -> Self {
        Self::with_weighting(config, CorrelationWeighting::new(label_correlations))
    }
}

impl<W: FlipWeighting> AsymmetricBitFlip<W> {
    /// Create an asymmetric bit flip with the given weighting
    pub fn with_weighting(config: AsymmetricBitFlipConfig, weighting: W) -> Self {
        Self {
            p01: config.p01,
            p10: config.p10,
            gamma: config.gamma,
            max_rate_of_selected_features: config.max_rate_of_selected_features,
            adaptation: AdaptationState::new(config.self_adaptation),
            weighting,
        }
    }

    pub fn weighting(&self) -> &W {
        &self.weighting
    }

    /// Current self-adaptation factor
    pub fn factor(&self) -> f64 {
        self.adaptation.factor()
    }

    /// Largest number of set slots allowed in a mask of length `n`
    pub fn max_selected(&self, n: usize) -> usize {
        (n as f64 * self.max_rate_of_selected_features) as usize
    }

    /// Clear set slots until at most `limit` remain
    ///
    /// Slots in `added` are cleared first, then any other set slot, each
    /// chosen uniformly.
    fn enforce_limit<R: Rng>(mask: &mut FeatureMask, mut added: Vec<usize>, limit: usize, rng: &mut R) {
        let mut selected = mask.count_ones();
        while selected > limit && !added.is_empty() {
            let index = added.swap_remove(rng.gen_range(0..added.len()));
            mask.set(index, false);
            selected -= 1;
        }
        if selected > limit {
            let mut remaining = mask.selected_indices();
            while remaining.len() > limit {
                let index = remaining.swap_remove(rng.gen_range(0..remaining.len()));
                mask.set(index, false);
            }
        }
    }
}

impl ConfigurableOperator for AsymmetricBitFlip<UniformWeighting> {
    fn configure(params: &[OperatorParameter], _context: &SearchContext) -> EvoResult<Self> {
        Ok(Self::new(AsymmetricBitFlipConfig::from_parameters(params)?))
    }
}

impl ConfigurableOperator for AsymmetricBitFlipWithCorrelationToTarget {
    fn configure(params: &[OperatorParameter], context: &SearchContext) -> EvoResult<Self> {
        let config = AsymmetricBitFlipConfig::from_parameters(params)?;
        log::info!("Calculation of the correlation between features and label started");
        let dataset = load_labeled_dataset(context)?;
        let correlations = dataset.label_correlations();
        log::info!(
            "Correlation to label calculated for {} feature dimension(s)",
            correlations.len()
        );
        Ok(Self::with_label_correlations(config, &correlations))
    }
}

impl<W: FlipWeighting> MutationOperator for AsymmetricBitFlip<W> {
    fn name(&self) -> &'static str {
        W::OPERATOR_NAME
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        context: &mut SearchContext,
        rng: &mut R,
    ) -> EvoResult<()> {
        let mask = FeatureMask::extract(representation)?;
        self.weighting.check_len(mask.len())?;
        log::debug!("{} started, current value: {}", W::OPERATOR_NAME, mask);

        self.adaptation.update(context);
        let n = mask.len();
        let scale = self.gamma * self.adaptation.factor() / n as f64;
        let add_probability = self.p01 * scale;
        let remove_probability = self.p10 * scale;

        let mut added = Vec::new();
        for i in 0..n {
            if mask[i] {
                if rng.gen::<f64>() < remove_probability * self.weighting.remove_weight(i) {
                    mask.set(i, false);
                }
            } else if rng.gen::<f64>() < add_probability * self.weighting.add_weight(i) {
                mask.set(i, true);
                added.push(i);
            }
        }

        Self::enforce_limit(mask, added, self.max_selected(n), rng);
        mask.repair(rng);

        log::debug!("{} finished, mutated value: {}", W::OPERATOR_NAME, mask);
        Ok(())
    }
}
