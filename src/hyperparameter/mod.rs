//! Hyperparameter adaptation mechanisms
//!
//! Mutation strengths are controlled in two ways, following Eiben et al.'s
//! classification:
//!
//! 1. **Deterministic Control (Schedules)**: the expected integer step size
//!    follows a predetermined decay curve
//! 2. **Adaptive Control**: multipliers are rescaled from the success rate
//!    reported by the search driver

pub mod adaptive;
pub mod schedules;

pub mod prelude {
    pub use super::adaptive::*;
    pub use super::schedules::*;
}
