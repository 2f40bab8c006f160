//! **Incremental semantic comparison of kernel functions.**
//!
//! `kerndiff` stitches the per-function reports of an external,
//! SMT-backed function analyzer into one incremental comparison graph
//! per module pair. The graph remembers every verdict the analyzer has
//! produced so far, so comparing the next entry function skips
//! everything already settled, and confirmed equalities are persisted
//! to an on-disk cache the analyzer reads back on its next invocation.
//!
//! ## Key Features
//!
//! - **Incremental graphs**: Function-pair verdicts accumulate across
//!   analyzer invocations; deeper analyses of the same function replace
//!   shallower ones, and overturned equalities roll the affected cache
//!   batch back.
//! - **Call-path reporting**: Every reported difference carries the
//!   call path from the entry function that reached it, reconstructed
//!   per side from the breadth-first discovery order.
//! - **Assumption tracking**: Equalities that were merely assumed keep
//!   their header-file callers out of the equality cache until a real
//!   verdict arrives.
//! - **Plan execution**: Independent module pairs run in parallel, with
//!   summary, JSON, or YAML reports and CI-friendly exit codes.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The vocabulary types. [`Side`](model::Side) labels
//!   the two compared builds, [`ResultKind`](model::ResultKind) orders
//!   verdicts from proven-equal to analyzer failure, and
//!   [`Vertex`](model::Vertex) is one function pair in the graph.
//! - **[`graph`]**: The comparison graph itself. Partial graphs come
//!   out of [`GraphBuilder`](graph::GraphBuilder), are normalized, and
//!   are merged into the group's running
//!   [`ComparisonGraph`](graph::ComparisonGraph) by absorption.
//! - **[`analyzer`]**: The boundary to the external comparator. Wire
//!   records, report parsing, and the subprocess invocation.
//! - **[`cache`]**: The on-disk equality cache shared with the
//!   analyzer, with single-step rollback.
//! - **[`report`]**: Extraction of user-facing difference records with
//!   call paths.
//! - **[`pipeline`]**: Group and plan orchestration plus report
//!   rendering.
//!
//! ## Getting Started
//!
//! Parse an analyzer report and query the resulting graph:
//!
//! ```
//! use kerndiff::analyzer::{build_graph, parse_report};
//!
//! let records = parse_report(
//!     "- first:\n    function: main\n  second:\n    function: main\n  result: equal\n",
//! )?;
//! let graph = build_graph(&records).normalize()?;
//! assert!(graph.is_equal("main"));
//! # Ok::<(), kerndiff::error::KernDiffError>(())
//! ```
//!
//! Run a full comparison plan against an installed analyzer:
//!
//! ```no_run
//! use kerndiff::analyzer::CommandAnalyzer;
//! use kerndiff::config::Plan;
//! use kerndiff::pipeline::{run_plan, RunOptions};
//! use std::path::PathBuf;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = CommandAnalyzer::new("/usr/local/bin/semdiff");
//!     let plan = Plan::single(
//!         PathBuf::from("build/old/e1000.ll"),
//!         PathBuf::from("build/new/e1000.ll"),
//!         vec!["e1000_probe".to_string()],
//!     );
//!     let report = run_plan(&analyzer, &plan, &RunOptions::default())?;
//!     println!("verdict: {}", report.result);
//!     std::process::exit(report.exit_code());
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the `kerndiff` library crate. The
//! `kerndiff` binary wraps [`pipeline::run_plan`] with configuration
//! discovery, plan files, and report delivery; see the project README.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Doc completeness: # Errors sections are aspirational for the many
    // small Result-returning helpers
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Graph traversals read better as one function
    clippy::too_many_lines,
    // Variable names like `left`/`right` or `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export main types for convenience
pub use analyzer::{CommandAnalyzer, CompareRequest, FunctionAnalyzer};
pub use cache::{CacheStats, EqualityCache};
pub use config::{CompareConfig, ComparisonGroup, OutputConfig, OutputFormat, Plan};
pub use error::{ErrorContext, KernDiffError, OptionContext, Result};
pub use graph::{ComparisonGraph, GraphBuilder, GraphStats};
pub use model::{Callstack, ResultKind, Side, SidePair, SymbolName, Vertex};
pub use pipeline::{run_plan, AggregatedReport, GroupReport, GroupRunner, RunOptions};
pub use report::{DiffKind, DiffRecord};
