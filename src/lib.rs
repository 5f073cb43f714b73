//! # evo-featsel
//!
//! Evolutionary mutation operators for wrapper feature selection.
//!
//! An external generational loop evaluates feature subsets with a classifier
//! and calls these operators once per offspring. The operators mutate a
//! feature mask or a bounded integer, rescale their own strength from the
//! driver's success rate, and can use precomputed feature correlations to
//! make informed moves.
//!
//! ## Core Concepts
//!
//! - **Feasibility**: a feature mask always selects at least one feature
//! - **Self-adaptation**: mutation strength follows the observed success rate
//! - **Correlation guidance**: add weakly correlated features, drop redundant ones
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evo_featsel::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let mut context = SearchContext::new(100, 20);
//!
//! let params = vec![
//!     OperatorParameter::double("p_01", 0.5),
//!     OperatorParameter::double("p_10", 2.0),
//!     OperatorParameter::double("alpha", 1.2),
//! ];
//! let mut mutation = Mutation::configure("AsymmetricBitFlip".parse()?, &params, &context)?;
//!
//! let mut individual = Representation::from(FeatureMask::all_selected(64)?);
//! mutation.mutate(&mut individual, &mut context, &mut rng)?;
//! ```

pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod genome;
pub mod hyperparameter;
pub mod operators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::correlation::prelude::*;
    pub use crate::error::*;
    pub use crate::genome::prelude::*;
    pub use crate::hyperparameter::prelude::*;
    pub use crate::operators::prelude::*;
}
