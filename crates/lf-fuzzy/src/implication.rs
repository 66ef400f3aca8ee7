//! Fuzzy implication operators `I(a, b)`.

use lf_core::{Real, clamp_unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implication {
    /// `max(1 - a, b)`
    KleeneDienes,
    /// `min(1, 1 - a + b)`
    Lukasiewicz,
    /// `1` if `a <= b`, else `b`
    Godel,
    /// `1` if `a <= b`, else `b / a`
    Goguen,
    /// `min(a, b)`; clipping, used for rule consequents
    #[default]
    Mamdani,
    /// `a * b`; scaling
    Larsen,
}

impl Implication {
    pub fn apply(self, a: Real, b: Real) -> Real {
        let v = match self {
            Self::KleeneDienes => (1.0 - a).max(b),
            Self::Lukasiewicz => (1.0 - a + b).min(1.0),
            Self::Godel => {
                if a <= b {
                    1.0
                } else {
                    b
                }
            }
            Self::Goguen => {
                if a <= b {
                    1.0
                } else {
                    b / a
                }
            }
            Self::Mamdani => a.min(b),
            Self::Larsen => a * b,
        };
        clamp_unit(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_table() {
        let (a, b) = (0.8, 0.4);
        assert!((Implication::KleeneDienes.apply(a, b) - 0.4).abs() < 1e-12);
        assert!((Implication::Lukasiewicz.apply(a, b) - 0.6).abs() < 1e-12);
        assert_eq!(Implication::Godel.apply(a, b), 0.4);
        assert!((Implication::Goguen.apply(a, b) - 0.5).abs() < 1e-12);
        assert_eq!(Implication::Mamdani.apply(a, b), 0.4);
        assert!((Implication::Larsen.apply(a, b) - 0.32).abs() < 1e-12);
    }

    #[test]
    fn residual_implications_hold_when_antecedent_below() {
        for imp in [Implication::Lukasiewicz, Implication::Godel, Implication::Goguen] {
            assert_eq!(imp.apply(0.2, 0.5), 1.0);
        }
    }
}
