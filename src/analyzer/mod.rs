//! External analyzer integration.
//!
//! The heavy semantic comparison happens in a separate SMT-backed
//! process. This module owns the three steps between that process and
//! the graph: invoking it, reading its YAML report, and turning the
//! records into vertices and edges.

mod invoke;
mod parse;
mod wire;

pub use invoke::{CommandAnalyzer, CompareRequest, FunctionAnalyzer};
pub use parse::build_graph;
pub use wire::{
    parse_report, ComparisonRecord, DifferingObject, FunctionInfo, SourceRef, SyntaxDiffRecord,
    TypeDiffRecord,
};
