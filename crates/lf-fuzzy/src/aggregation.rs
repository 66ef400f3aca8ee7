//! Aggregation operators over a list of degrees.

use lf_core::{Real, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::FuzzyResult;

/// Any value below this makes the harmonic mean collapse to zero.
pub const HARMONIC_EPSILON: Real = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    /// Equal weights when `weights` is absent.
    WeightedAverage {
        #[serde(default)]
        weights: Option<Vec<Real>>,
    },
    /// Ordered weighted average: weights apply to values sorted descending.
    Owa {
        #[serde(default)]
        weights: Option<Vec<Real>>,
    },
    GeometricMean,
    HarmonicMean,
}

impl Aggregation {
    pub fn apply(&self, values: &[Real]) -> FuzzyResult<Real> {
        match self {
            Self::WeightedAverage { weights } => weighted_average(values, weights.as_deref()),
            Self::Owa { weights } => owa(values, weights.as_deref()),
            Self::GeometricMean => Ok(geometric_mean(values)),
            Self::HarmonicMean => Ok(harmonic_mean(values)),
        }
    }
}

fn check_weights(values: &[Real], weights: &[Real]) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();
    err.check(weights.len() == values.len(), || {
        format!(
            "{} weight(s) supplied for {} value(s)",
            weights.len(),
            values.len()
        )
    });
    err.check(weights.iter().all(|w| w.is_finite() && *w >= 0.0), || {
        "weights must be finite and non-negative".into()
    });
    err.into_result()
}

/// `Σ wᵢvᵢ / Σ wᵢ`; zero when there are no values or the weights sum to zero.
pub fn weighted_average(values: &[Real], weights: Option<&[Real]>) -> FuzzyResult<Real> {
    if values.is_empty() {
        return Ok(0.0);
    }
    let Some(weights) = weights else {
        return Ok(values.iter().sum::<Real>() / values.len() as Real);
    };
    check_weights(values, weights)?;
    let total: Real = weights.iter().sum();
    if total == 0.0 {
        return Ok(0.0);
    }
    let weighted: Real = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Ok(weighted / total)
}

pub fn owa(values: &[Real], weights: Option<&[Real]>) -> FuzzyResult<Real> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    weighted_average(&sorted, weights)
}

pub fn geometric_mean(values: &[Real]) -> Real {
    if values.is_empty() {
        return 0.0;
    }
    let product: Real = values.iter().product();
    product.max(0.0).powf(1.0 / values.len() as Real)
}

pub fn harmonic_mean(values: &[Real]) -> Real {
    if values.is_empty() || values.iter().any(|v| *v < HARMONIC_EPSILON) {
        return 0.0;
    }
    values.len() as Real / values.iter().map(|v| 1.0 / v).sum::<Real>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FuzzyError;

    #[test]
    fn weighted_average_defaults_to_equal_weights() {
        assert_eq!(weighted_average(&[0.2, 0.4, 0.6], None).unwrap(), 0.4);
        assert_eq!(
            weighted_average(&[0.0, 1.0], Some(&[1.0, 3.0])).unwrap(),
            0.75
        );
        assert_eq!(weighted_average(&[], None).unwrap(), 0.0);
        assert_eq!(weighted_average(&[0.5], Some(&[0.0])).unwrap(), 0.0);
    }

    #[test]
    fn weight_length_mismatch_is_an_error() {
        let err = weighted_average(&[0.1, 0.2], Some(&[1.0])).unwrap_err();
        assert!(matches!(err, FuzzyError::Validation(_)));
    }

    #[test]
    fn owa_weights_sorted_values() {
        // Weight everything on the largest value: behaves like max.
        let agg = Aggregation::Owa {
            weights: Some(vec![1.0, 0.0, 0.0]),
        };
        assert_eq!(agg.apply(&[0.2, 0.9, 0.5]).unwrap(), 0.9);
    }

    #[test]
    fn means() {
        assert!((geometric_mean(&[0.25, 1.0]) - 0.5).abs() < 1e-12);
        assert!((harmonic_mean(&[0.5, 0.5]) - 0.5).abs() < 1e-12);
        assert_eq!(harmonic_mean(&[0.5, 0.0]), 0.0);
        assert_eq!(harmonic_mean(&[0.5, 1e-11]), 0.0);
        assert_eq!(geometric_mean(&[]), 0.0);
    }
}
