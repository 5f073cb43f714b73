//! Mutation operator selection
//!
//! The driver names its operators in configuration; [`MutationKind`] parses
//! those names and [`Mutation`] holds any configured operator behind one
//! type.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::OperatorParameter;
use crate::context::SearchContext;
use crate::error::{EvoResult, OperatorError};
use crate::genome::representation::Representation;
use crate::operators::bit_flip::{AsymmetricBitFlip, AsymmetricBitFlipWithCorrelationToTarget, RandomBitFlip};
use crate::operators::correlated::{AddLeastCorrelatedFeature, RemoveMostCorrelatedFeature};
use crate::operators::integer::IntegerMutation;
use crate::operators::traits::{ConfigurableOperator, MutationOperator};

/// Names of the available mutation operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    RandomBitFlip,
    AsymmetricBitFlip,
    AsymmetricBitFlipWithCorrelationToTarget,
    AddLeastCorrelatedFeature,
    RemoveMostCorrelatedFeature,
    IntegerMutation,
}

impl MutationKind {
    pub const ALL: [MutationKind; 6] = [
        MutationKind::RandomBitFlip,
        MutationKind::AsymmetricBitFlip,
        MutationKind::AsymmetricBitFlipWithCorrelationToTarget,
        MutationKind::AddLeastCorrelatedFeature,
        MutationKind::RemoveMostCorrelatedFeature,
        MutationKind::IntegerMutation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::RandomBitFlip => "RandomBitFlip",
            MutationKind::AsymmetricBitFlip => "AsymmetricBitFlip",
            MutationKind::AsymmetricBitFlipWithCorrelationToTarget => {
                "AsymmetricBitFlipWithCorrelationToTarget"
            }
            MutationKind::AddLeastCorrelatedFeature => "AddLeastCorrelatedFeature",
            MutationKind::RemoveMostCorrelatedFeature => "RemoveMostCorrelatedFeature",
            MutationKind::IntegerMutation => "IntegerMutation",
        }
    }

    /// Whether the operator mutates feature masks
    pub fn is_binary(&self) -> bool {
        !matches!(self, MutationKind::IntegerMutation)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| OperatorError::UnknownOperator(name.to_string()))
    }
}

/// Any configured mutation operator
#[derive(Clone, Debug)]
pub enum Mutation {
    RandomBitFlip(RandomBitFlip),
    AsymmetricBitFlip(AsymmetricBitFlip),
    AsymmetricBitFlipWithCorrelationToTarget(AsymmetricBitFlipWithCorrelationToTarget),
    AddLeastCorrelatedFeature(AddLeastCorrelatedFeature),
    RemoveMostCorrelatedFeature(RemoveMostCorrelatedFeature),
    IntegerMutation(IntegerMutation),
}

impl Mutation {
    /// Build the named operator from its parameter list
    pub fn configure(
        kind: MutationKind,
        params: &[OperatorParameter],
        context: &SearchContext,
    ) -> EvoResult<Self> {
        log::debug!("Configuring {} with {} parameter(s)", kind, params.len());
        Ok(match kind {
            MutationKind::RandomBitFlip => Mutation::RandomBitFlip(RandomBitFlip::configure(params, context)?),
            MutationKind::AsymmetricBitFlip => {
                Mutation::AsymmetricBitFlip(AsymmetricBitFlip::configure(params, context)?)
            }
            MutationKind::AsymmetricBitFlipWithCorrelationToTarget => {
                Mutation::AsymmetricBitFlipWithCorrelationToTarget(
                    AsymmetricBitFlipWithCorrelationToTarget::configure(params, context)?,
                )
            }
            MutationKind::AddLeastCorrelatedFeature => {
                Mutation::AddLeastCorrelatedFeature(AddLeastCorrelatedFeature::configure(params, context)?)
            }
            MutationKind::RemoveMostCorrelatedFeature => {
                Mutation::RemoveMostCorrelatedFeature(RemoveMostCorrelatedFeature::configure(params, context)?)
            }
            MutationKind::IntegerMutation => Mutation::IntegerMutation(IntegerMutation::configure(params, context)?),
        })
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::RandomBitFlip(_) => MutationKind::RandomBitFlip,
            Mutation::AsymmetricBitFlip(_) => MutationKind::AsymmetricBitFlip,
            Mutation::AsymmetricBitFlipWithCorrelationToTarget(_) => {
                MutationKind::AsymmetricBitFlipWithCorrelationToTarget
            }
            Mutation::AddLeastCorrelatedFeature(_) => MutationKind::AddLeastCorrelatedFeature,
            Mutation::RemoveMostCorrelatedFeature(_) => MutationKind::RemoveMostCorrelatedFeature,
            Mutation::IntegerMutation(_) => MutationKind::IntegerMutation,
        }
    }
}

impl MutationOperator for Mutation {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn mutate<R: Rng>(
        &mut self,
        representation: &mut Representation,
        context: &mut SearchContext,
        rng: &mut R,
    ) -> EvoResult<()> {
        match self {
            Mutation::RandomBitFlip(op) => op.mutate(representation, context, rng),
            Mutation::AsymmetricBitFlip(op) => op.mutate(representation, context, rng),
            Mutation::AsymmetricBitFlipWithCorrelationToTarget(op) => {
                op.mutate(representation, context, rng)
            }
            Mutation::AddLeastCorrelatedFeature(op) => op.mutate(representation, context, rng),
            Mutation::RemoveMostCorrelatedFeature(op) => op.mutate(representation, context, rng),
            Mutation::IntegerMutation(op) => op.mutate(representation, context, rng),
        }
    }
}

impl From<RandomBitFlip> for Mutation {
    fn from(op: RandomBitFlip) -> Self {
        Mutation::RandomBitFlip(op)
    }
}

impl From<AsymmetricBitFlip> for Mutation {
    fn from(op: AsymmetricBitFlip) -> Self {
        Mutation::AsymmetricBitFlip(op)
    }
}

impl From<AsymmetricBitFlipWithCorrelationToTarget> for Mutation {
    fn from(op: AsymmetricBitFlipWithCorrelationToTarget) -> Self {
        Mutation::AsymmetricBitFlipWithCorrelationToTarget(op)
    }
}

impl From<AddLeastCorrelatedFeature> for Mutation {
    fn from(op: AddLeastCorrelatedFeature) -> Self {
        Mutation::AddLeastCorrelatedFeature(op)
    }
}

impl From<RemoveMostCorrelatedFeature> for Mutation {
    fn from(op: RemoveMostCorrelatedFeature) -> Self {
        Mutation::RemoveMostCorrelatedFeature(op)
    }
}

impl From<IntegerMutation> for Mutation {
    fn from(op: IntegerMutation) -> Self {
        Mutation::IntegerMutation(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvolutionError;
    use crate::genome::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_kind_names_parse() {
        for kind in MutationKind::ALL {
            assert_eq!(kind.to_string().parse::<MutationKind>().unwrap(), kind);
        }
        assert_eq!(
            "GaussianMutation".parse::<MutationKind>(),
            Err(OperatorError::UnknownOperator("GaussianMutation".to_string()))
        );
    }

    #[test]
    fn test_kind_serde_name() {
        let json = serde_json::to_string(&MutationKind::IntegerMutation).unwrap();
        assert_eq!(json, "\"IntegerMutation\"");
    }

    #[test]
    fn test_configure_and_dispatch() {
        let ctx = SearchContext::new(10, 1);
        let params = vec![OperatorParameter::double("gamma", 3.0)];
        let mut op = Mutation::configure(MutationKind::RandomBitFlip, &params, &ctx).unwrap();
        assert_eq!(op.kind(), MutationKind::RandomBitFlip);
        assert_eq!(op.name(), "RandomBitFlip");

        let mut rng = StdRng::seed_from_u64(8);
        let mut ctx = ctx;
        let mut repr = Representation::from(FeatureMask::new(vec![false, true, false]).unwrap());
        op.mutate(&mut repr, &mut ctx, &mut rng).unwrap();
        assert_eq!(repr.as_mask().unwrap().bits(), &[true, false, true]);
    }

    #[test]
    fn test_configure_reports_missing_parameters() {
        let ctx = SearchContext::new(10, 1);
        let err = Mutation::configure(MutationKind::AsymmetricBitFlip, &[], &ctx).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Operator(OperatorError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_configure_integer_mutation() {
        let ctx = SearchContext::new(10, 1);
        let params = vec![
            OperatorParameter::double("Probability", 1.0),
            OperatorParameter::double("Step size", 2.0),
            OperatorParameter::double("alpha", 1.5),
        ];
        let op = Mutation::configure(MutationKind::IntegerMutation, &params, &ctx).unwrap();
        assert!(!op.kind().is_binary());
    }
}
