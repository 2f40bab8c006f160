//! Core data model for function-pair comparison.
//!
//! Everything the graph stores is defined here: the two-sided addressing
//! scheme ([`Side`], [`SidePair`]), comparison outcomes ([`ResultKind`]),
//! wire/canonical function names ([`SymbolName`]), and the vertex/edge
//! types themselves. The graph machinery in [`crate::graph`] builds on
//! these without adding storage of its own.

mod result_kind;
mod side;
mod symbol;
mod vertex;

pub use result_kind::*;
pub use side::*;
pub use symbol::*;
pub use vertex::*;
