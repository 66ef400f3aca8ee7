//! Gate catalog for logicflow.
//!
//! Strict, stateless evaluation of discrete gates:
//! - **Boolean**: AND, OR, NOT, NAND, NOR, XOR, XNOR, IMPLY, NIMPLY
//! - **Threshold**: MAJORITY, MINORITY, THRESHOLD(k), EXACTLY(k), AT_MOST(k)
//! - **Multi-valued**: Łukasiewicz, Post, ternary (Kleene) and quaternary algebras
//! - **Special**: MUX, DEMUX, ENCODER, DECODER, PARITY, COMPARATOR
//!
//! Operators are an enum; each tag maps to a pure kernel function, so adding
//! an operator is a compile-checked change. Truth tables and sandboxed
//! expressions cover user-defined gates.
//!
//! Unknown operators fail with [`GateError::UnknownGate`] and short input
//! lists with [`GateError::Arity`].

pub mod boolean;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod multivalued;
pub mod op;
pub mod special;
pub mod threshold;
pub mod truth_table;

pub use error::{GateError, GateResult};
pub use evaluator::{GateEvaluator, GateParams, MAX_TRUTH_VALUE};
pub use expr::CompiledExpr;
pub use op::{GateFamily, GateOp};
pub use truth_table::{CustomGate, TruthTable, TruthTableRow, create_custom_gate};
