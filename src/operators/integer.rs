//! Integer mutation with a self-adaptive expected step size
//!
//! Steps are drawn as the difference of two geometric variables, after
//! Rudolph, G. (1994). An evolutionary algorithm for integer programming.

use rand::Rng;

use crate::config::{IntegerMutationConfig, OperatorParameter, StepSizeAdaptation};
use crate::context::SearchContext;
use crate::error::{EvoResult, OperatorError};
use crate::genome::prelude::*;
use crate::hyperparameter::adaptive::SelfAdaptation;
use crate::hyperparameter::schedules::ParameterSchedule;
use crate::operators::traits::{ConfigurableOperator, MutationOperator};

/// Success probability of the geometric variables for an expected step size
pub fn geometric_parameter(expected_step_size: f64) -> f64 {
    let s = expected_step_size;
    1.0 - s / ((1.0 + s * s).sqrt() + 1.0)
}

/// Draw a non-zero number of steps
///
/// `g = g1 − g2` for two geometric draws; a zero becomes ±1 with equal
/// probability, anything else is pushed one further away from zero.
pub fn sample_steps<R: Rng>(expected_step_size: f64, rng: &mut R) -> i64 {
    // p can round to 0 for huge step sizes; keep the log strictly negative
    let log_q = (1.0 - geometric_parameter(expected_step_size))
        .ln()
        .min(-f64::MIN_POSITIVE);
    let mut geometric = || ((1.0 - rng.gen::<f64>()).ln() / log_q).floor() as i64;
    let g = geometric().saturating_sub(geometric());
    if g == 0 {
        if rng.gen_bool(0.5) {
            1
        } else {
            -1
        }
    } else {
        g.saturating_add(g.signum())
    }
}

/// Move a bounded integer by `steps` units of `step_size`, clamping at its bounds
pub fn apply_steps(value: &mut BoundedInteger, steps: i64, step_size: f64) {
    value.shift(steps as f64 * step_size);
}

/// Rescale an expected step size from the success rate of one interval
///
/// A rate above the rule's boundary multiplies by alpha, a rate equal to it
/// divides by alpha, and a lower rate leaves the step size alone. The result
/// is truncated to a whole number of steps.
pub fn rescale_step_size(rule: &SelfAdaptation, step_size: f64, success_rate: f64) -> f64 {
    let rescaled = if success_rate > rule.boundary {
        step_size * rule.alpha
    } else if success_rate == rule.boundary {
        step_size / rule.alpha
    } else {
        step_size
    };
    rescaled.trunc()
}

/// Rudolph-style mutation of a [`BoundedInteger`]
#[derive(Clone, Debug)]
pub struct IntegerMutation {
    config: IntegerMutationConfig,
    expected_step_size: Option<f64>,
}

impl IntegerMutation {
    pub fn new(config: IntegerMutationConfig) -> Self {
        Self {
            config,
            expected_step_size: None,
        }
    }

    pub fn config(&self) -> &IntegerMutationConfig {
        &self.config
    }

    /// Expected step size, once the first call has initialized it
    ///
    /// Always a whole number.
    pub fn expected_step_size(&self) -> Option<f64> {
        self.expected_step_size
    }

    fn initial_step_size(&self, value: &BoundedInteger, context: &SearchContext) -> Result<f64, OperatorError> {
        if let Some(s) = self.expected_step_size {
            return Ok(s);
        }
        if context.current_generation() != 0 {
            return Err(OperatorError::UnsupportedContinuation {
                operator: "IntegerMutation",
                generation: context.current_generation(),
            });
        }
        Ok((value.range() / 2) as f64)
    }

    fn adapt(&self, step_size: f64, context: &mut SearchContext) -> f64 {
        match &self.config.adaptation {
            StepSizeAdaptation::Decay(decay) => decay
                .value_at(context.current_generation(), context.generation_limit())
                .trunc(),
            StepSizeAdaptation::SuccessRate(rule) => {
                if !rule.is_due(context.current_generation()) {
                    return step_size;
                }
                let successes = context.take_success_counter();
                let rate = rule.success_rate(successes, context.offspring_pop_size());
                let adapted = rescale_step_size(rule, step_size, rate);
                log::debug!(
                    "Expected step size at generation {}: success rate {:.4}, {} -> {}",
                    context.current_generation(),
                    rate,
                    step_size,
                    adapted
                );
                adapted
            }
        }
    }
}

impl ConfigurableOperator for IntegerMutation {
    fn configure(params: &[OperatorParameter], _context: &SearchContext) -> EvoResult<Self> {
        Ok(Self::new(IntegerMutationConfig::from_parameters(params)?))
    }
}

impl MutationOperator for IntegerMutation {
    fn name(&self) -> &'static str {
        "IntegerMutation"
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        context: &mut SearchContext,
        rng: &mut R,
    ) -> EvoResult<()> {
        let value = BoundedInteger::extract(representation)?;
        let mut step_size = self.initial_step_size(value, context)?;
        self.expected_step_size = Some(step_size);

        if rng.gen::<f64>() >= self.config.probability {
            log::debug!("Integer mutation skipped for {}", value);
            return Ok(());
        }

        step_size = self.adapt(step_size, context);
        self.expected_step_size = Some(step_size);
        let steps = sample_steps(step_size, rng);
        log::debug!(
            "Integer mutation started, current value: {}, expected step size: {}, steps: {}",
            value,
            step_size,
            steps
        );
        apply_steps(value, steps, self.config.step_size);
        log::debug!("Integer mutation finished, mutated value: {}", value);
        Ok(())
    }
}
