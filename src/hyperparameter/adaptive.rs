//! Adaptive control mechanisms
//!
//! These mechanisms adapt parameters based on feedback from the search process.

use serde::{Deserialize, Serialize};

use crate::context::SearchContext;

/// Outcome of comparing a success rate against the target boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rescale {
    /// Multiply by alpha
    Increase,
    /// Divide by alpha
    Decrease,
    /// Rate equals the boundary
    Keep,
}

/// Success-rate rule for rescaling a mutation strength
///
/// Generalizes Rechenberg's 1/5 success rule with a configurable target
/// rate, interval and direction. Every `interval` generations the success
/// rate `successes / (interval * offspring)` is compared to `boundary`:
/// with `increase_for_higher_success_rate` a higher rate multiplies the
/// adapted value by `alpha` and a lower rate divides it; without it the
/// directions are swapped.
///
/// Reference: Rechenberg, I. (1973). Evolutionsstrategie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfAdaptation {
    /// Rescale factor
    pub alpha: f64,
    /// Target success rate
    pub boundary: f64,
    /// Generations between recalibrations
    pub interval: usize,
    /// Whether a success rate above the boundary increases the value
    pub increase_for_higher_success_rate: bool,
}

impl SelfAdaptation {
    /// Create a rule with the given factor, recalibrating every generation
    /// against a 1/5 target
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            boundary: 0.2,
            interval: 1,
            increase_for_higher_success_rate: true,
        }
    }

    /// Classic 1/5 rule evaluated every fifth generation
    pub fn one_fifth(alpha: f64) -> Self {
        Self::new(alpha).with_interval(5)
    }

    /// Set the target success rate
    pub fn with_boundary(mut self, boundary: f64) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the recalibration interval in generations
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval;
        self
    }

    /// Set the rescale direction for high success rates
    pub fn with_increase_for_higher_success_rate(mut self, increase: bool) -> Self {
        self.increase_for_higher_success_rate = increase;
        self
    }

    /// Whether the given generation closes an interval
    pub fn is_due(&self, generation: usize) -> bool {
        self.interval > 0 && (generation + 1) % self.interval == 0
    }

    /// Success rate over one interval
    pub fn success_rate(&self, successes: usize, offspring_pop_size: usize) -> f64 {
        let trials = self.interval * offspring_pop_size;
        if trials == 0 {
            return 0.0;
        }
        successes as f64 / trials as f64
    }

    /// Direction in which a given success rate moves the adapted value
    pub fn direction(&self, success_rate: f64) -> Rescale {
        let above = if success_rate > self.boundary {
            true
        } else if success_rate < self.boundary {
            false
        } else {
            return Rescale::Keep;
        };
        if above == self.increase_for_higher_success_rate {
            Rescale::Increase
        } else {
            Rescale::Decrease
        }
    }

    /// Rescale a value for a given success rate
    pub fn rescale(&self, value: f64, success_rate: f64) -> f64 {
        match self.direction(success_rate) {
            Rescale::Increase => value * self.alpha,
            Rescale::Decrease => value / self.alpha,
            Rescale::Keep => value,
        }
    }

    /// Recalibrate `value` if the current generation closes an interval
    ///
    /// Consumes and resets the context's success counter when it fires.
    /// Returns the success rate that was applied.
    pub fn adapt(&self, value: &mut f64, context: &mut SearchContext) -> Option<f64> {
        if !self.is_due(context.current_generation()) {
            return None;
        }
        let successes = context.take_success_counter();
        let rate = self.success_rate(successes, context.offspring_pop_size());
        let previous = *value;
        *value = self.rescale(previous, rate);
        log::debug!(
            "Self-adaptation at generation {}: success rate {:.4} (boundary {}), {} -> {}",
            context.current_generation(),
            rate,
            self.boundary,
            previous,
            *value
        );
        Some(rate)
    }
}

/// Mutation-strength multiplier driven by an optional [`SelfAdaptation`] rule
///
/// Without a rule the factor stays at its initial value of 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptationState {
    factor: f64,
    rule: Option<SelfAdaptation>,
}

impl AdaptationState {
    /// State with factor 1.0 and the given rule
    pub fn new(rule: Option<SelfAdaptation>) -> Self {
        Self { factor: 1.0, rule }
    }

    /// State that never adapts
    pub fn fixed() -> Self {
        Self::new(None)
    }

    /// Current multiplier
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Configured rule, if any
    pub fn rule(&self) -> Option<&SelfAdaptation> {
        self.rule.as_ref()
    }

    /// Apply the rule for the context's current generation
    pub fn update(&mut self, context: &mut SearchContext) -> Option<f64> {
        let rule = self.rule.as_ref()?;
        rule.adapt(&mut self.factor, context)
    }
}

impl Default for AdaptationState {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context_at(generation: usize, offspring: usize, successes: usize) -> SearchContext {
        let mut ctx = SearchContext::new(100, offspring).starting_at(generation);
        ctx.record_successes(successes);
        ctx
    }

    #[test]
    fn test_is_due() {
        let rule = SelfAdaptation::new(2.0).with_interval(5);
        assert!(!rule.is_due(0));
        assert!(rule.is_due(4));
        assert!(!rule.is_due(5));
        assert!(rule.is_due(9));
    }

    #[test]
    fn test_success_rate() {
        let rule = SelfAdaptation::new(2.0).with_interval(5);
        assert_relative_eq!(rule.success_rate(5, 10), 0.1);
        assert_eq!(rule.success_rate(5, 0), 0.0);
    }

    #[test]
    fn test_direction_increase_for_higher() {
        let rule = SelfAdaptation::new(2.0).with_boundary(0.2);
        assert_eq!(rule.direction(0.5), Rescale::Increase);
        assert_eq!(rule.direction(0.1), Rescale::Decrease);
        assert_eq!(rule.direction(0.2), Rescale::Keep);
    }

    #[test]
    fn test_direction_swapped() {
        let rule = SelfAdaptation::new(2.0)
            .with_boundary(0.2)
            .with_increase_for_higher_success_rate(false);
        assert_eq!(rule.direction(0.5), Rescale::Decrease);
        assert_eq!(rule.direction(0.1), Rescale::Increase);
        assert_eq!(rule.direction(0.2), Rescale::Keep);
    }

    #[test]
    fn test_adapt_resets_counter_when_due() {
        let rule = SelfAdaptation::new(2.0).with_interval(2);
        let mut ctx = context_at(1, 10, 15);
        let mut value = 1.0;

        let rate = rule.adapt(&mut value, &mut ctx).unwrap();
        assert_relative_eq!(rate, 0.75);
        assert_eq!(value, 2.0);
        assert_eq!(ctx.success_counter(), 0);
    }

    #[test]
    fn test_adapt_skips_between_intervals() {
        let rule = SelfAdaptation::new(2.0).with_interval(2);
        let mut ctx = context_at(2, 10, 15);
        let mut value = 1.0;

        assert!(rule.adapt(&mut value, &mut ctx).is_none());
        assert_eq!(value, 1.0);
        assert_eq!(ctx.success_counter(), 15);
    }

    #[test]
    fn test_adapt_at_boundary_keeps_value_but_resets() {
        let rule = SelfAdaptation::new(2.0).with_boundary(0.5);
        let mut ctx = context_at(0, 4, 2);
        let mut value = 3.0;

        rule.adapt(&mut value, &mut ctx);
        assert_eq!(value, 3.0);
        assert_eq!(ctx.success_counter(), 0);
    }

    #[test]
    fn test_state_without_rule_is_fixed() {
        let mut state = AdaptationState::fixed();
        let mut ctx = context_at(0, 1, 1);
        assert!(state.update(&mut ctx).is_none());
        assert_eq!(state.factor(), 1.0);
        assert_eq!(ctx.success_counter(), 1);
    }

    #[test]
    fn test_state_factor_decreases_on_low_success() {
        let mut state = AdaptationState::new(Some(SelfAdaptation::new(2.0).with_boundary(0.5)));
        let mut ctx = context_at(0, 10, 1);
        state.update(&mut ctx);
        assert_eq!(state.factor(), 0.5);
    }
}
