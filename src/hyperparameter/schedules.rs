//! Parameter schedules for deterministic control
//!
//! Schedules provide predetermined parameter values based on generation number.

use serde::{Deserialize, Serialize};

/// Parameter schedule trait
///
/// Defines how a parameter changes over the course of evolution.
pub trait ParameterSchedule: Send + Sync {
    /// Get the parameter value at a given generation
    fn value_at(&self, generation: usize, max_generations: usize) -> f64;
}

/// Decay of the expected integer step size toward 1
///
/// s(t) = S·aᵗ + t·(1 − S·aᵗ)/(T − 1)
///
/// The geometric term shrinks with base `a < 1` while the linear term pulls
/// the curve to exactly 1 at the last generation `T − 1`. Values are floored
/// at 1, which keeps the curve non-increasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepSizeDecay {
    /// Initial scale S
    pub scale: f64,
    /// Geometric base a
    pub base: f64,
}

impl StepSizeDecay {
    /// Default initial scale
    pub const DEFAULT_SCALE: f64 = 15000.0;

    /// Smallest expected step size the curve reaches
    pub const FLOOR: f64 = 1.0;

    /// Create a decay with the default scale
    pub fn new(base: f64) -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            base,
        }
    }

    /// Set the initial scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl ParameterSchedule for StepSizeDecay {
    fn value_at(&self, generation: usize, max_generations: usize) -> f64 {
        let t = generation as f64;
        let geometric = self.scale * self.base.powf(t);
        if max_generations <= 1 {
            return geometric.max(Self::FLOOR);
        }
        (geometric + t * (1.0 - geometric) / (max_generations - 1) as f64).max(Self::FLOOR)
    }
}
