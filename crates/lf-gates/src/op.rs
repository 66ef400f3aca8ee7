//! Operator tags and the tag → kernel table.

use core::fmt;
use core::str::FromStr;

use lf_core::{Real, from_bool};

use crate::error::GateError;
use crate::evaluator::GateParams;
use crate::{boolean, multivalued, special, threshold};

/// Pure evaluation function behind an operator. Arity is checked before it runs.
pub(crate) type Kernel = fn(&[Real], &GateParams) -> Real;

/// Catalog section an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateFamily {
    Boolean,
    Threshold,
    MultiValued,
    Special,
}

/// Every operator in the strict gate catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateOp {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
    Imply,
    Nimply,

    Majority,
    Minority,
    Threshold,
    Exactly,
    AtMost,

    LukasiewiczAnd,
    LukasiewiczOr,
    LukasiewiczNot,
    LukasiewiczImply,
    PostNot,
    PostMin,
    PostMax,
    TernaryAnd,
    TernaryOr,
    TernaryNot,
    TernaryConsensus,
    QuaternaryAnd,
    QuaternaryOr,
    QuaternaryNot,
    QuaternaryAverage,

    Mux,
    Demux,
    Encoder,
    Decoder,
    Parity,
    Comparator,
}

impl GateOp {
    pub const ALL: [GateOp; 35] = [
        GateOp::And,
        GateOp::Or,
        GateOp::Not,
        GateOp::Nand,
        GateOp::Nor,
        GateOp::Xor,
        GateOp::Xnor,
        GateOp::Imply,
        GateOp::Nimply,
        GateOp::Majority,
        GateOp::Minority,
        GateOp::Threshold,
        GateOp::Exactly,
        GateOp::AtMost,
        GateOp::LukasiewiczAnd,
        GateOp::LukasiewiczOr,
        GateOp::LukasiewiczNot,
        GateOp::LukasiewiczImply,
        GateOp::PostNot,
        GateOp::PostMin,
        GateOp::PostMax,
        GateOp::TernaryAnd,
        GateOp::TernaryOr,
        GateOp::TernaryNot,
        GateOp::TernaryConsensus,
        GateOp::QuaternaryAnd,
        GateOp::QuaternaryOr,
        GateOp::QuaternaryNot,
        GateOp::QuaternaryAverage,
        GateOp::Mux,
        GateOp::Demux,
        GateOp::Encoder,
        GateOp::Decoder,
        GateOp::Parity,
        GateOp::Comparator,
    ];

    /// Canonical snake_case identifier used in graph documents.
    pub fn name(self) -> &'static str {
        match self {
            GateOp::And => "and",
            GateOp::Or => "or",
            GateOp::Not => "not",
            GateOp::Nand => "nand",
            GateOp::Nor => "nor",
            GateOp::Xor => "xor",
            GateOp::Xnor => "xnor",
            GateOp::Imply => "imply",
            GateOp::Nimply => "nimply",
            GateOp::Majority => "majority",
            GateOp::Minority => "minority",
            GateOp::Threshold => "threshold",
            GateOp::Exactly => "exactly",
            GateOp::AtMost => "at_most",
            GateOp::LukasiewiczAnd => "lukasiewicz_and",
            GateOp::LukasiewiczOr => "lukasiewicz_or",
            GateOp::LukasiewiczNot => "lukasiewicz_not",
            GateOp::LukasiewiczImply => "lukasiewicz_imply",
            GateOp::PostNot => "post_not",
            GateOp::PostMin => "post_min",
            GateOp::PostMax => "post_max",
            GateOp::TernaryAnd => "ternary_and",
            GateOp::TernaryOr => "ternary_or",
            GateOp::TernaryNot => "ternary_not",
            GateOp::TernaryConsensus => "ternary_consensus",
            GateOp::QuaternaryAnd => "quaternary_and",
            GateOp::QuaternaryOr => "quaternary_or",
            GateOp::QuaternaryNot => "quaternary_not",
            GateOp::QuaternaryAverage => "quaternary_average",
            GateOp::Mux => "mux",
            GateOp::Demux => "demux",
            GateOp::Encoder => "encoder",
            GateOp::Decoder => "decoder",
            GateOp::Parity => "parity",
            GateOp::Comparator => "comparator",
        }
    }

    pub fn family(self) -> GateFamily {
        use GateOp::*;
        match self {
            And | Or | Not | Nand | Nor | Xor | Xnor | Imply | Nimply => GateFamily::Boolean,
            Majority | Minority | Threshold | Exactly | AtMost => GateFamily::Threshold,
            Mux | Demux | Encoder | Decoder | Parity | Comparator => GateFamily::Special,
            _ => GateFamily::MultiValued,
        }
    }

    /// Fewest inputs the operator can be evaluated with.
    pub fn min_arity(self) -> usize {
        use GateOp::*;
        match self {
            Not | LukasiewiczNot | PostNot | TernaryNot | QuaternaryNot => 1,
            Imply | Nimply | LukasiewiczImply | TernaryConsensus | Mux | Demux | Comparator => 2,
            _ => 0,
        }
    }

    /// Highest truth value when the node does not configure `maxValue`.
    pub fn default_max_value(self) -> Real {
        use GateOp::*;
        match self {
            PostNot | PostMin | PostMax | TernaryAnd | TernaryOr | TernaryNot
            | TernaryConsensus => 2.0,
            QuaternaryAnd | QuaternaryOr | QuaternaryNot | QuaternaryAverage => 3.0,
            _ => 1.0,
        }
    }

    /// Number of distinct output levels, used as the branch count of the node.
    pub fn output_levels(self, params: &GateParams) -> usize {
        match self.family() {
            GateFamily::MultiValued => {
                params.bounded_max_value_or(self.default_max_value()) as usize + 1
            }
            GateFamily::Special if self == GateOp::Comparator => 3,
            _ => 2,
        }
    }

    pub(crate) fn kernel(self) -> Kernel {
        use GateOp::*;
        match self {
            And => |i, _| from_bool(boolean::and(i)),
            Or => |i, _| from_bool(boolean::or(i)),
            Not => |i, _| from_bool(boolean::not(i[0])),
            Nand => |i, _| from_bool(boolean::nand(i)),
            Nor => |i, _| from_bool(boolean::nor(i)),
            Xor => |i, _| from_bool(boolean::xor(i)),
            Xnor => |i, _| from_bool(boolean::xnor(i)),
            Imply => |i, _| from_bool(boolean::imply(i[0], i[1])),
            Nimply => |i, _| from_bool(boolean::nimply(i[0], i[1])),

            Majority => |i, _| from_bool(threshold::majority(i)),
            Minority => |i, _| from_bool(threshold::minority(i)),
            Threshold => |i, p| from_bool(threshold::at_least(i, p.k_or_default())),
            Exactly => |i, p| from_bool(threshold::exactly(i, p.k_or_default())),
            AtMost => |i, p| from_bool(threshold::at_most(i, p.k_or_default())),

            LukasiewiczAnd => |i, _| multivalued::lukasiewicz_and(i),
            LukasiewiczOr => |i, _| multivalued::lukasiewicz_or(i),
            LukasiewiczNot => |i, p| {
                multivalued::lukasiewicz_not(i[0], p.max_value_or(LukasiewiczNot.default_max_value()))
            },
            LukasiewiczImply => |i, p| {
                let max = p.max_value_or(LukasiewiczImply.default_max_value());
                multivalued::lukasiewicz_imply(i[0], i[1], max)
            },
            PostNot => |i, p| {
                let levels = p.bounded_max_value_or(PostNot.default_max_value()) as u32 + 1;
                multivalued::post_not(i[0], levels)
            },
            PostMin => |i, _| multivalued::post_min(i),
            PostMax => |i, _| multivalued::post_max(i),
            TernaryAnd => |i, _| multivalued::ternary_and(i),
            TernaryOr => |i, _| multivalued::ternary_or(i),
            TernaryNot => |i, _| multivalued::ternary_not(i[0]),
            TernaryConsensus => |i, _| multivalued::ternary_consensus(i),
            QuaternaryAnd => |i, _| multivalued::quaternary_and(i),
            QuaternaryOr => |i, _| multivalued::quaternary_or(i),
            QuaternaryNot => |i, _| multivalued::quaternary_not(i[0]),
            QuaternaryAverage => |i, _| multivalued::quaternary_average(i),

            Mux => |i, _| special::mux(i),
            Demux => |i, _| special::demux(i[0], i[1]),
            Encoder => |i, _| special::encoder(i),
            Decoder => |i, _| special::decoder(i),
            Parity => |i, _| special::parity(i),
            Comparator => |i, _| special::comparator(i[0], i[1]),
        }
    }

    /// Case-insensitive lookup; `-` and spaces are read as `_`.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.into_iter().find(|op| op.name() == key)
    }
}

impl FromStr for GateOp {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| GateError::UnknownGate {
            operator: s.to_string(),
        })
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
