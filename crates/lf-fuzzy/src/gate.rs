//! String-identified fuzzy gates for graph nodes.
//!
//! Unlike the crisp catalog this evaluator never fails: an unknown identifier
//! or unusable parameters fall back to the first input, or 0 with no inputs.

use std::fmt;
use std::str::FromStr;

use lf_core::{Real, clamp_unit};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::Aggregation;
use crate::complement::Complement;
use crate::error::FuzzyError;
use crate::implication::Implication;
use crate::norms::{SNorm, TNorm};

/// Optional operator parameters carried on a fuzzy node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyGateParams {
    /// Hamacher parameter, default 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<Real>,
    /// Sugeno complement parameter, default 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<Real>,
    /// Yager complement parameter, default 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<Real>,
    /// Weights for weighted-average and OWA aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<Real>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzyGateOp {
    MinAnd,
    ProductAnd,
    LukasiewiczAnd,
    DrasticAnd,
    HamacherAnd,
    EinsteinAnd,
    NilpotentAnd,
    MaxOr,
    ProbabilisticOr,
    LukasiewiczOr,
    DrasticOr,
    HamacherOr,
    EinsteinOr,
    NilpotentOr,
    Not,
    SugenoNot,
    YagerNot,
    KleeneDienesImply,
    LukasiewiczImply,
    GodelImply,
    GoguenImply,
    MamdaniImply,
    LarsenImply,
    WeightedAverage,
    Owa,
    GeometricMean,
    HarmonicMean,
}

enum Shape {
    Conjunction(TNorm),
    Disjunction(SNorm),
    Negation(Complement),
    Implication(Implication),
    Aggregate(Aggregation),
}

impl FuzzyGateOp {
    pub const ALL: [FuzzyGateOp; 27] = [
        Self::MinAnd,
        Self::ProductAnd,
        Self::LukasiewiczAnd,
        Self::DrasticAnd,
        Self::HamacherAnd,
        Self::EinsteinAnd,
        Self::NilpotentAnd,
        Self::MaxOr,
        Self::ProbabilisticOr,
        Self::LukasiewiczOr,
        Self::DrasticOr,
        Self::HamacherOr,
        Self::EinsteinOr,
        Self::NilpotentOr,
        Self::Not,
        Self::SugenoNot,
        Self::YagerNot,
        Self::KleeneDienesImply,
        Self::LukasiewiczImply,
        Self::GodelImply,
        Self::GoguenImply,
        Self::MamdaniImply,
        Self::LarsenImply,
        Self::WeightedAverage,
        Self::Owa,
        Self::GeometricMean,
        Self::HarmonicMean,
    ];

    /// Canonical identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::MinAnd => "fuzzy_and",
            Self::ProductAnd => "fuzzy_product",
            Self::LukasiewiczAnd => "fuzzy_lukasiewicz_and",
            Self::DrasticAnd => "fuzzy_drastic_and",
            Self::HamacherAnd => "fuzzy_hamacher_and",
            Self::EinsteinAnd => "fuzzy_einstein_and",
            Self::NilpotentAnd => "fuzzy_nilpotent_and",
            Self::MaxOr => "fuzzy_or",
            Self::ProbabilisticOr => "fuzzy_probabilistic_or",
            Self::LukasiewiczOr => "fuzzy_lukasiewicz_or",
            Self::DrasticOr => "fuzzy_drastic_or",
            Self::HamacherOr => "fuzzy_hamacher_or",
            Self::EinsteinOr => "fuzzy_einstein_or",
            Self::NilpotentOr => "fuzzy_nilpotent_or",
            Self::Not => "fuzzy_not",
            Self::SugenoNot => "fuzzy_sugeno_not",
            Self::YagerNot => "fuzzy_yager_not",
            Self::KleeneDienesImply => "fuzzy_kleene_dienes_imply",
            Self::LukasiewiczImply => "fuzzy_lukasiewicz_imply",
            Self::GodelImply => "fuzzy_godel_imply",
            Self::GoguenImply => "fuzzy_goguen_imply",
            Self::MamdaniImply => "fuzzy_mamdani_imply",
            Self::LarsenImply => "fuzzy_larsen_imply",
            Self::WeightedAverage => "fuzzy_weighted_average",
            Self::Owa => "fuzzy_owa",
            Self::GeometricMean => "fuzzy_geometric_mean",
            Self::HarmonicMean => "fuzzy_harmonic_mean",
        }
    }

    /// Case-insensitive lookup that also accepts the common aliases
    /// (`fuzzy_min`, `fuzzy_max`, `fuzzy_probor`, `fuzzy_complement`).
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match key.as_str() {
            "fuzzy_min" => Some(Self::MinAnd),
            "fuzzy_max" => Some(Self::MaxOr),
            "fuzzy_probor" | "fuzzy_algebraic_sum" => Some(Self::ProbabilisticOr),
            "fuzzy_complement" => Some(Self::Not),
            _ => None,
        };
        alias.or_else(|| Self::ALL.into_iter().find(|op| op.name() == key))
    }

    fn shape(self, params: &FuzzyGateParams) -> Shape {
        let gamma = params.gamma.unwrap_or(0.0);
        match self {
            Self::MinAnd => Shape::Conjunction(TNorm::Min),
            Self::ProductAnd => Shape::Conjunction(TNorm::Product),
            Self::LukasiewiczAnd => Shape::Conjunction(TNorm::Lukasiewicz),
            Self::DrasticAnd => Shape::Conjunction(TNorm::Drastic),
            Self::HamacherAnd => Shape::Conjunction(TNorm::Hamacher { gamma }),
            Self::EinsteinAnd => Shape::Conjunction(TNorm::Einstein),
            Self::NilpotentAnd => Shape::Conjunction(TNorm::Nilpotent),
            Self::MaxOr => Shape::Disjunction(SNorm::Max),
            Self::ProbabilisticOr => Shape::Disjunction(SNorm::Probabilistic),
            Self::LukasiewiczOr => Shape::Disjunction(SNorm::Lukasiewicz),
            Self::DrasticOr => Shape::Disjunction(SNorm::Drastic),
            Self::HamacherOr => Shape::Disjunction(SNorm::Hamacher { gamma }),
            Self::EinsteinOr => Shape::Disjunction(SNorm::Einstein),
            Self::NilpotentOr => Shape::Disjunction(SNorm::Nilpotent),
            Self::Not => Shape::Negation(Complement::Standard),
            Self::SugenoNot => Shape::Negation(Complement::Sugeno {
                lambda: params.lambda.unwrap_or(0.0),
            }),
            Self::YagerNot => Shape::Negation(Complement::Yager {
                w: params.w.unwrap_or(1.0),
            }),
            Self::KleeneDienesImply => Shape::Implication(Implication::KleeneDienes),
            Self::LukasiewiczImply => Shape::Implication(Implication::Lukasiewicz),
            Self::GodelImply => Shape::Implication(Implication::Godel),
            Self::GoguenImply => Shape::Implication(Implication::Goguen),
            Self::MamdaniImply => Shape::Implication(Implication::Mamdani),
            Self::LarsenImply => Shape::Implication(Implication::Larsen),
            Self::WeightedAverage => Shape::Aggregate(Aggregation::WeightedAverage {
                weights: params.weights.clone(),
            }),
            Self::Owa => Shape::Aggregate(Aggregation::Owa {
                weights: params.weights.clone(),
            }),
            Self::GeometricMean => Shape::Aggregate(Aggregation::GeometricMean),
            Self::HarmonicMean => Shape::Aggregate(Aggregation::HarmonicMean),
        }
    }
}

impl fmt::Display for FuzzyGateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FuzzyGateOp {
    type Err = FuzzyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FuzzyError::UnknownGate { name: s.to_string() })
    }
}

/// Permissive evaluator used by fuzzy graph nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyGateEvaluator;

impl FuzzyGateEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_known(&self, gate_type: &str) -> bool {
        FuzzyGateOp::parse(gate_type).is_some()
    }

    /// Evaluate `gate_type` over `inputs` (each clamped into `[0, 1]`).
    pub fn evaluate(&self, gate_type: &str, inputs: &[Real], params: &FuzzyGateParams) -> Real {
        let degrees: Vec<Real> = inputs.iter().copied().map(clamp_unit).collect();
        let fallback = degrees.first().copied().unwrap_or(0.0);
        let Some(op) = FuzzyGateOp::parse(gate_type) else {
            debug!(gate_type, "unknown fuzzy gate, passing first input through");
            return fallback;
        };

        let value = match op.shape(params) {
            Shape::Conjunction(t) => {
                if let Err(e) = t.validate() {
                    debug!(gate = %op, error = %e, "invalid conjunction parameters");
                    return fallback;
                }
                t.fold(degrees.iter().copied())
            }
            Shape::Disjunction(s) => {
                if let Err(e) = s.validate() {
                    debug!(gate = %op, error = %e, "invalid disjunction parameters");
                    return fallback;
                }
                s.fold(degrees.iter().copied())
            }
            Shape::Negation(c) => {
                if let Err(e) = c.validate() {
                    debug!(gate = %op, error = %e, "invalid complement parameters");
                    return fallback;
                }
                c.apply(fallback)
            }
            Shape::Implication(i) => match degrees.as_slice() {
                [a, b, ..] => i.apply(*a, *b),
                _ => fallback,
            },
            Shape::Aggregate(agg) => match agg.apply(&degrees) {
                Ok(v) => v,
                Err(e) => {
                    debug!(gate = %op, error = %e, "aggregation rejected its inputs");
                    fallback
                }
            },
        };
        clamp_unit(value)
    }
}
