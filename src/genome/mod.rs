//! Genome abstractions and implementations
//!
//! This module provides the `EvolutionaryGenome` trait and the two
//! representations the optimizer mutates: feature masks and bounded integers.

pub mod bounded_integer;
pub mod feature_mask;
pub mod representation;
pub mod traits;

pub mod prelude {
    pub use super::bounded_integer::*;
    pub use super::feature_mask::*;
    pub use super::representation::*;
    pub use super::traits::*;
}
