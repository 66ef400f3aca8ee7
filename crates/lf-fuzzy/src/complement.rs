//! Fuzzy complements.

use lf_core::{Real, ValidationError, clamp_unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Complement {
    /// `1 - a`
    #[default]
    Standard,
    /// `(1 - a) / (1 + lambda a)`, `lambda > -1`
    Sugeno { lambda: Real },
    /// `(1 - a^w)^(1/w)`, `w > 0`
    Yager { w: Real },
}

impl Complement {
    pub fn apply(self, a: Real) -> Real {
        let v = match self {
            Self::Standard => 1.0 - a,
            Self::Sugeno { lambda } => (1.0 - a) / (1.0 + lambda * a),
            Self::Yager { w } => (1.0 - a.powf(w)).powf(1.0 / w),
        };
        clamp_unit(v)
    }

    pub fn validate(self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        match self {
            Self::Standard => {}
            Self::Sugeno { lambda } => err.check(lambda.is_finite() && lambda > -1.0, || {
                format!("Sugeno lambda must be greater than -1, got {lambda}")
            }),
            Self::Yager { w } => err.check(w.is_finite() && w > 0.0, || {
                format!("Yager w must be positive, got {w}")
            }),
        }
        err.into_result()
    }
}
