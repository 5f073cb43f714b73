//! Feature mask genome
//!
//! A fixed-length bit string selecting feature dimensions. A mask always
//! selects at least one feature; operators restore this with
//! [`FeatureMask::repair`] after any pass that may clear every bit.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::genome::representation::Representation;
use crate::genome::traits::{BinaryGenome, EvolutionaryGenome};

/// Fixed-length feature-selection mask
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<bool>", into = "Vec<bool>")]
pub struct FeatureMask {
    /// One entry per candidate feature-dimension slot
    bits: Vec<bool>,
}

impl FeatureMask {
    /// Create a mask from its bits
    ///
    /// Fails if the mask is empty or selects no feature.
    pub fn new(bits: Vec<bool>) -> Result<Self, GenomeError> {
        if bits.is_empty() {
            return Err(GenomeError::InvalidStructure(
                "feature mask must have at least one slot".to_string(),
            ));
        }
        if !bits.iter().any(|&b| b) {
            return Err(GenomeError::ConstraintViolation(
                "feature mask must select at least one feature".to_string(),
            ));
        }
        Ok(Self { bits })
    }

    /// Create a mask selecting every feature
    pub fn all_selected(length: usize) -> Result<Self, GenomeError> {
        Self::new(vec![true; length])
    }

    /// Create a random mask; each slot is set with probability `density`
    pub fn random<R: Rng>(length: usize, density: f64, rng: &mut R) -> Result<Self, GenomeError> {
        if length == 0 {
            return Err(GenomeError::InvalidStructure(
                "feature mask must have at least one slot".to_string(),
            ));
        }
        let density = density.clamp(0.0, 1.0);
        let mut mask = Self {
            bits: (0..length).map(|_| rng.gen_bool(density)).collect(),
        };
        mask.repair(rng);
        Ok(mask)
    }

    /// Get the length of the mask
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false for a constructed mask
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Check whether at least one feature is selected
    pub fn is_feasible(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub(crate) fn set(&mut self, index: usize, value: bool) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = value;
        }
    }

    pub(crate) fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Restore feasibility after a mutation pass
    ///
    /// If no slot is set, one uniformly chosen slot is switched on and its
    /// index returned. A feasible mask is left untouched.
    pub fn repair<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        if self.is_feasible() || self.bits.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.bits.len());
        self.bits[index] = true;
        log::debug!("Empty feature mask repaired by selecting feature {}", index);
        Some(index)
    }

    /// Hamming distance to another mask
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl EvolutionaryGenome for FeatureMask {
    const KIND: &'static str = "feature mask";

    fn dimension(&self) -> usize {
        self.bits.len()
    }

    fn extract(representation: &mut Representation) -> Result<&mut Self, GenomeError> {
        match representation {
            Representation::Mask(mask) => Ok(mask),
            other => Err(GenomeError::TypeMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

impl BinaryGenome for FeatureMask {
    fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl std::ops::Index<usize> for FeatureMask {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl TryFrom<Vec<bool>> for FeatureMask {
    type Error = GenomeError;

    fn try_from(bits: Vec<bool>) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<FeatureMask> for Vec<bool> {
    fn from(mask: FeatureMask) -> Self {
        mask.bits
    }
}

impl<'a> IntoIterator for &'a FeatureMask {
    type Item = &'a bool;
    type IntoIter = std::slice::Iter<'a, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter()
    }
}

impl std::fmt::Display for FeatureMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", if *bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}
