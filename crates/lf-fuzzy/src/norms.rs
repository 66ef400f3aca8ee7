//! Triangular norms and conorms.
//!
//! Binary forms follow the textbook definitions; [`TNorm::fold`] and
//! [`SNorm::fold`] extend them to any number of arguments through their
//! identities (1 for T-norms, 0 for S-norms).

use lf_core::{Real, ValidationError};
use serde::{Deserialize, Serialize};

/// Fuzzy conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TNorm {
    #[default]
    Min,
    Product,
    Lukasiewicz,
    Drastic,
    /// Hamacher family `ab / (gamma + (1 - gamma)(a + b - ab))`; `gamma == 1`
    /// is the algebraic product. `gamma == 0` also yields the algebraic
    /// product rather than the Hamacher product `ab / (a + b - ab)`.
    Hamacher { gamma: Real },
    Einstein,
    Nilpotent,
}

/// Fuzzy disjunction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SNorm {
    #[default]
    Max,
    Probabilistic,
    Lukasiewicz,
    Drastic,
    Hamacher { gamma: Real },
    Einstein,
    Nilpotent,
}

fn check_gamma(gamma: Real) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();
    err.check(gamma.is_finite() && gamma >= 0.0, || {
        format!("Hamacher gamma must be finite and non-negative, got {gamma}")
    });
    err.into_result()
}

impl TNorm {
    pub fn apply(self, a: Real, b: Real) -> Real {
        match self {
            Self::Min => a.min(b),
            Self::Product => a * b,
            Self::Lukasiewicz => (a + b - 1.0).max(0.0),
            Self::Drastic => {
                if a == 1.0 {
                    b
                } else if b == 1.0 {
                    a
                } else {
                    0.0
                }
            }
            Self::Hamacher { gamma } => {
                if gamma == 0.0 {
                    return a * b;
                }
                let denom = gamma + (1.0 - gamma) * (a + b - a * b);
                if denom == 0.0 { 0.0 } else { a * b / denom }
            }
            Self::Einstein => a * b / (2.0 - (a + b - a * b)),
            Self::Nilpotent => {
                if a + b > 1.0 {
                    a.min(b)
                } else {
                    0.0
                }
            }
        }
    }

    /// N-ary conjunction; an empty input yields the identity 1.
    pub fn fold(self, values: impl IntoIterator<Item = Real>) -> Real {
        values.into_iter().fold(1.0, |acc, v| self.apply(acc, v))
    }

    /// The De Morgan dual under the standard complement.
    pub fn dual(self) -> SNorm {
        match self {
            Self::Min => SNorm::Max,
            Self::Product => SNorm::Probabilistic,
            Self::Lukasiewicz => SNorm::Lukasiewicz,
            Self::Drastic => SNorm::Drastic,
            Self::Hamacher { gamma } => SNorm::Hamacher { gamma },
            Self::Einstein => SNorm::Einstein,
            Self::Nilpotent => SNorm::Nilpotent,
        }
    }

    pub fn validate(self) -> Result<(), ValidationError> {
        match self {
            Self::Hamacher { gamma } => check_gamma(gamma),
            _ => Ok(()),
        }
    }
}

impl SNorm {
    pub fn apply(self, a: Real, b: Real) -> Real {
        match self {
            Self::Max => a.max(b),
            Self::Probabilistic => a + b - a * b,
            Self::Lukasiewicz => (a + b).min(1.0),
            Self::Drastic => {
                if a == 0.0 {
                    b
                } else if b == 0.0 {
                    a
                } else {
                    1.0
                }
            }
            Self::Hamacher { gamma } => {
                if gamma == 0.0 {
                    return a + b - a * b;
                }
                let denom = 1.0 + (gamma - 1.0) * a * b;
                if denom == 0.0 {
                    1.0
                } else {
                    (a + b + (gamma - 2.0) * a * b) / denom
                }
            }
            Self::Einstein => (a + b) / (1.0 + a * b),
            Self::Nilpotent => {
                if a + b < 1.0 {
                    a.max(b)
                } else {
                    1.0
                }
            }
        }
    }

    /// N-ary disjunction; an empty input yields the identity 0.
    pub fn fold(self, values: impl IntoIterator<Item = Real>) -> Real {
        values.into_iter().fold(0.0, |acc, v| self.apply(acc, v))
    }

    pub fn dual(self) -> TNorm {
        match self {
            Self::Max => TNorm::Min,
            Self::Probabilistic => TNorm::Product,
            Self::Lukasiewicz => TNorm::Lukasiewicz,
            Self::Drastic => TNorm::Drastic,
            Self::Hamacher { gamma } => TNorm::Hamacher { gamma },
            Self::Einstein => TNorm::Einstein,
            Self::Nilpotent => TNorm::Nilpotent,
        }
    }

    pub fn validate(self) -> Result<(), ValidationError> {
        match self {
            Self::Hamacher { gamma } => check_gamma(gamma),
            _ => Ok(()),
        }
    }
}
