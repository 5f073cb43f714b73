//! Core genome traits
//!
//! This module defines the `EvolutionaryGenome` trait shared by the concrete
//! representations, and `BinaryGenome` for feature-selection masks.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::GenomeError;
use crate::genome::representation::Representation;

/// Core genome abstraction for mutation operators.
///
/// A genome is one concrete shape of [`Representation`]. Operators ask the
/// tagged representation for the shape they work on through [`extract`],
/// which fails with a type mismatch instead of mutating the wrong shape.
///
/// [`extract`]: EvolutionaryGenome::extract
pub trait EvolutionaryGenome: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Shape name reported in type-mismatch errors
    const KIND: &'static str;

    /// Number of slots (mask length, or 1 for scalar genomes)
    fn dimension(&self) -> usize;

    /// Borrow this shape mutably out of a tagged representation
    fn extract(representation: &mut Representation) -> Result<&mut Self, GenomeError>;
}

/// Trait for genomes that can be represented as bit strings
pub trait BinaryGenome: EvolutionaryGenome {
    /// Get the bits as a slice
    fn bits(&self) -> &[bool];

    /// Count the number of true bits (ones)
    fn count_ones(&self) -> usize {
        self.bits().iter().filter(|&&b| b).count()
    }

    /// Count the number of false bits (zeros)
    fn count_zeros(&self) -> usize {
        self.bits().iter().filter(|&&b| !b).count()
    }

    /// Indices of all set bits, ascending
    fn selected_indices(&self) -> Vec<usize> {
        self.bits()
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    /// Indices of all unset bits, ascending
    fn unselected_indices(&self) -> Vec<usize> {
        self.bits()
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (!b).then_some(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bounded_integer::BoundedInteger;
    use crate::genome::feature_mask::FeatureMask;

    #[test]
    fn test_extract_matching_shape() {
        let mut repr = Representation::from(FeatureMask::new(vec![true, false]).unwrap());
        let mask = FeatureMask::extract(&mut repr).unwrap();
        assert_eq!(mask.dimension(), 2);
    }

    #[test]
    fn test_extract_wrong_shape() {
        let mut repr = Representation::from(BoundedInteger::new(5, 0, 10).unwrap());
        let err = FeatureMask::extract(&mut repr).unwrap_err();
        assert_eq!(
            err,
            GenomeError::TypeMismatch {
                expected: FeatureMask::KIND,
                actual: BoundedInteger::KIND,
            }
        );
    }

    #[test]
    fn test_selected_and_unselected_indices() {
        let mask = FeatureMask::new(vec![true, false, true, false]).unwrap();
        assert_eq!(mask.selected_indices(), vec![0, 2]);
        assert_eq!(mask.unselected_indices(), vec![1, 3]);
        assert_eq!(mask.count_ones() + mask.count_zeros(), 4);
    }
}
