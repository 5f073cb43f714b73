//! Mutation operators
//!
//! This module provides the bit-flip, correlation-guided and integer
//! mutation operators, and the traits they share.

pub mod bit_flip;
pub mod correlated;
pub mod integer;
pub mod mutation;
pub mod traits;

pub mod prelude {
    pub use super::bit_flip::*;
    pub use super::correlated::*;
    pub use super::integer::*;
    pub use super::mutation::*;
    pub use super::traits::*;
}
