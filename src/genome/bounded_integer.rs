//! Bounded integer genome
//!
//! An integer hyperparameter with fixed inclusive bounds.

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::genome::representation::Representation;
use crate::genome::traits::EvolutionaryGenome;

/// Integer value constrained to `[min, max]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoundedInteger")]
pub struct BoundedInteger {
    value: i64,
    min: i64,
    max: i64,
}

#[derive(Deserialize)]
struct RawBoundedInteger {
    value: i64,
    min: i64,
    max: i64,
}

impl TryFrom<RawBoundedInteger> for BoundedInteger {
    type Error = GenomeError;

    fn try_from(raw: RawBoundedInteger) -> Result<Self, Self::Error> {
        Self::new(raw.value, raw.min, raw.max)
    }
}

impl BoundedInteger {
    /// Create a new bounded integer
    ///
    /// Fails if `min > max` or the value lies outside the bounds.
    pub fn new(value: i64, min: i64, max: i64) -> Result<Self, GenomeError> {
        if min > max {
            return Err(GenomeError::InvalidStructure(format!(
                "invalid bounds: min ({}) must be <= max ({})",
                min, max
            )));
        }
        if !(min..=max).contains(&value) {
            return Err(GenomeError::ConstraintViolation(format!(
                "value {} outside [{}, {}]",
                value, min, max
            )));
        }
        Ok(Self { value, min, max })
    }

    /// Current value
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Lower bound (inclusive)
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive)
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Width of the admissible range (`max - min`)
    pub fn range(&self) -> u64 {
        (i128::from(self.max) - i128::from(self.min)) as u64
    }

    /// Set the value, clamping it into the bounds
    pub fn set_value(&mut self, value: i64) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Move the value by a real-valued offset
    ///
    /// Results beyond a bound land on that bound; in-range results are
    /// truncated toward zero.
    pub fn shift(&mut self, offset: f64) {
        let target = self.value as f64 + offset;
        // float rounding near the i64 limits can overshoot a bound
        self.value = (target.trunc() as i64).clamp(self.min, self.max);
    }
}

impl EvolutionaryGenome for BoundedInteger {
    const KIND: &'static str = "bounded integer";

    fn dimension(&self) -> usize {
        1
    }

    fn extract(representation: &mut Representation) -> Result<&mut Self, GenomeError> {
        match representation {
            Representation::Integer(value) => Ok(value),
            other => Err(GenomeError::TypeMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

impl std::fmt::Display for BoundedInteger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_integer_new() {
        let b = BoundedInteger::new(50, 0, 100).unwrap();
        assert_eq!(b.value(), 50);
        assert_eq!(b.min(), 0);
        assert_eq!(b.max(), 100);
        assert_eq!(b.range(), 100);
    }

    #[test]
    fn test_range_spans_all_of_i64() {
        let b = BoundedInteger::new(0, i64::MIN, i64::MAX).unwrap();
        assert_eq!(b.range(), u64::MAX);
        assert_eq!(BoundedInteger::new(-5, -5, -5).unwrap().range(), 0);
    }

    #[test]
    fn test_bounded_integer_invalid() {
        assert!(matches!(
            BoundedInteger::new(0, 5, -5),
            Err(GenomeError::InvalidStructure(_))
        ));
        assert!(matches!(
            BoundedInteger::new(101, 0, 100),
            Err(GenomeError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_set_value_clamps() {
        let mut b = BoundedInteger::new(5, 0, 10).unwrap();
        b.set_value(-3);
        assert_eq!(b.value(), 0);
        b.set_value(42);
        assert_eq!(b.value(), 10);
    }

    #[test]
    fn test_shift() {
        let mut b = BoundedInteger::new(50, 0, 100).unwrap();
        b.shift(20.0);
        assert_eq!(b.value(), 70);
        b.shift(-100.0);
        assert_eq!(b.value(), 0);
        b.shift(2.7);
        assert_eq!(b.value(), 2);
        b.shift(1e12);
        assert_eq!(b.value(), 100);
    }

    #[test]
    fn test_shift_near_i64_limits() {
        let max = (1i64 << 62) + 513;
        let mut b = BoundedInteger::new(max - 1, 0, max).unwrap();
        b.shift(1000.0);
        assert_eq!(b.value(), max);

        let mut b = BoundedInteger::new(0, i64::MIN, i64::MAX).unwrap();
        b.shift(f64::MAX);
        assert_eq!(b.value(), i64::MAX);
        b.shift(f64::MIN);
        assert_eq!(b.value(), i64::MIN);
    }

    #[test]
    fn test_serialization_validates() {
        let b = BoundedInteger::new(3, 1, 9).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        let back: BoundedInteger = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);

        let bad = r#"{"value":12,"min":1,"max":9}"#;
        assert!(serde_json::from_str::<BoundedInteger>(bad).is_err());
    }
}
