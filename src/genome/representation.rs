//! Tagged representation handed to mutation operators

use serde::{Deserialize, Serialize};

use crate::genome::bounded_integer::BoundedInteger;
use crate::genome::feature_mask::FeatureMask;
use crate::genome::traits::EvolutionaryGenome;

/// The genotype an operator transforms
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Feature-selection mask
    Mask(FeatureMask),
    /// Bounded integer hyperparameter
    Integer(BoundedInteger),
}

impl Representation {
    /// Shape name of the payload
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mask(_) => FeatureMask::KIND,
            Self::Integer(_) => BoundedInteger::KIND,
        }
    }

    /// Borrow the mask payload, if this is a mask
    pub fn as_mask(&self) -> Option<&FeatureMask> {
        match self {
            Self::Mask(mask) => Some(mask),
            Self::Integer(_) => None,
        }
    }

    /// Borrow the integer payload, if this is an integer
    pub fn as_integer(&self) -> Option<&BoundedInteger> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Mask(_) => None,
        }
    }
}

impl From<FeatureMask> for Representation {
    fn from(mask: FeatureMask) -> Self {
        Self::Mask(mask)
    }
}

impl From<BoundedInteger> for Representation {
    fn from(value: BoundedInteger) -> Self {
        Self::Integer(value)
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mask(mask) => mask.fmt(f),
            Self::Integer(value) => value.fmt(f),
        }
    }
}
