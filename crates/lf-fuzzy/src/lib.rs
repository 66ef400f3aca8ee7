//! Fuzzy logic engine for logicflow.
//!
//! # Architecture
//!
//! - **Membership functions**: triangular, trapezoidal, gaussian, bell,
//!   sigmoid, S/Z curves, pi-shaped and piecewise-linear
//! - **Operators**: T-norms, S-norms, complements, implications and
//!   aggregation operators over degrees in `[0, 1]`
//! - **Fuzzy sets**: finite element → degree maps with optional continuous
//!   fallback, union/intersection/complement and alpha-cuts
//! - **Inference**: Mamdani-style rule evaluation with five defuzzification
//!   methods
//! - **Gate dispatch**: [`FuzzyGateEvaluator`] maps string identifiers onto
//!   the operator catalog for graph nodes; unknown identifiers fall back to
//!   the first input instead of failing

pub mod aggregation;
pub mod complement;
pub mod defuzzify;
pub mod error;
pub mod gate;
pub mod implication;
pub mod inference;
pub mod membership;
pub mod norms;
pub mod set;

pub use aggregation::{Aggregation, HARMONIC_EPSILON};
pub use complement::Complement;
pub use defuzzify::{Defuzzification, defuzzify};
pub use error::{FuzzyError, FuzzyResult};
pub use gate::{FuzzyGateEvaluator, FuzzyGateOp, FuzzyGateParams};
pub use implication::Implication;
pub use inference::{
    FuzzyInferenceSystem, FuzzyRule, InferenceConfig, InferenceOutcome, LinguisticVariable,
};
pub use membership::{MembershipFunction, MembershipKind, evaluate_membership};
pub use norms::{SNorm, TNorm};
pub use set::FuzzySet;
