//! Operator traits
//!
//! This module defines the core operator traits for the mutation suite.

use rand::Rng;

use crate::config::OperatorParameter;
use crate::context::SearchContext;
use crate::error::EvoResult;
use crate::genome::representation::Representation;

/// Mutation operator trait
///
/// Applies changes to a representation in place. Operators keep their own
/// adaptive state between calls, hence `&mut self`. A representation of the
/// wrong shape is rejected before anything is changed.
pub trait MutationOperator: Send + Sync {
    /// Operator name used in logs and errors
    fn name(&self) -> &'static str;

    /// Apply mutation to a representation in place
    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        context: &mut SearchContext,
        rng: &mut R,
    ) -> EvoResult<()>;
}

/// Operators that can be built from a named-parameter list
///
/// Auxiliary tables are loaded here, once, never during mutation.
pub trait ConfigurableOperator: Sized {
    fn configure(params: &[OperatorParameter], context: &SearchContext) -> EvoResult<Self>;
}
