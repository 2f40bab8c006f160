//! Flat difference records extracted from a comparison graph.
//!
//! Extraction runs one reachability pass per side from the entry-point
//! pair, intersects the two reachable sets, and reports every vertex
//! that still differs, together with the macro, asm, and type
//! differences the analyzer attached to it. Records carry rendered call
//! paths so a reader can retrace how the entry function reaches each
//! difference.

use crate::error::{KernDiffError, ReportErrorKind, Result};
use crate::graph::{ComparisonGraph, Reachability};
use crate::model::{Callstack, NonFunDiff, ResultKind, Side, SidePair, VertexIdx};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What kind of symbol a [`DiffRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// A compared function pair.
    Function,
    /// A macro or inline-asm body difference.
    Syntactic,
    /// A composite type layout difference.
    Type,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiffKind::Function => "function",
            DiffKind::Syntactic => "syntactic",
            DiffKind::Type => "type",
        };
        f.write_str(label)
    }
}

/// One side of a reported difference.
#[derive(Debug, Clone, Serialize)]
pub struct DiffEndpoint {
    pub name: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    /// Rendered call path from the entry function, one `name at
    /// file:line` hop per line. Empty for the entry function itself.
    pub callstack: String,
}

/// One reportable difference found under an entry-point pair.
#[derive(Debug, Clone, Serialize)]
pub struct DiffRecord {
    pub kind: DiffKind,
    pub result: ResultKind,
    /// Record key, the left-side canonical name.
    pub name: String,
    pub left: DiffEndpoint,
    pub right: DiffEndpoint,
    /// True when a non-function difference explains this record, so
    /// consumers can suppress bare duplicates.
    pub covered: bool,
}

impl ComparisonGraph {
    /// Extracts the difference records visible from one entry-point
    /// pair.
    ///
    /// Vertices compared `Equal` or `AssumedEqual` produce no record.
    /// Everything else reachable from both entries yields one
    /// `function` record plus one record per attached non-function
    /// difference.
    ///
    /// # Errors
    ///
    /// Fails if either entry was never compared into the graph, or if a
    /// reachable vertex has lost its backtracking path, which indicates
    /// a traversal bug rather than bad input.
    pub fn to_fun_pair_list(
        &self,
        entry_left: &str,
        entry_right: &str,
    ) -> Result<Vec<DiffRecord>> {
        for entry in [entry_left, entry_right] {
            if self.get_named(entry).is_none() {
                return Err(KernDiffError::report(
                    "extraction",
                    ReportErrorKind::MissingEntry {
                        function: entry.to_string(),
                    },
                ));
            }
        }
        let left = self.reachable_from(Side::Left, entry_left)?;
        let right = self.reachable_from(Side::Right, entry_right)?;
        let entry_names = SidePair::new(entry_left.to_string(), entry_right.to_string());

        let mut records = Vec::new();
        for idx in left.iter().filter(|&idx| right.contains(idx)) {
            let vertex = self.vertex(idx);
            if matches!(
                vertex.result,
                ResultKind::Equal | ResultKind::AssumedEqual
            ) {
                continue;
            }
            let stacks = SidePair::new(
                resolve_stack(&left, idx)?,
                resolve_stack(&right, idx)?,
            );
            records.push(DiffRecord {
                kind: DiffKind::Function,
                result: vertex.result,
                name: vertex.names.left.canonical().to_string(),
                left: DiffEndpoint {
                    name: vertex.names.left.to_string(),
                    file: vertex.files.left.clone(),
                    line: vertex.lines.left,
                    callstack: stacks.left.to_string(),
                },
                right: DiffEndpoint {
                    name: vertex.names.right.to_string(),
                    file: vertex.files.right.clone(),
                    line: vertex.lines.right,
                    callstack: stacks.right.to_string(),
                },
                covered: !vertex.nonfun_diffs.is_empty(),
            });
            for diff in &vertex.nonfun_diffs {
                records.push(nonfun_record(diff, &stacks, &entry_names));
            }
        }
        Ok(records)
    }
}

fn resolve_stack(reach: &Reachability<'_>, idx: VertexIdx) -> Result<Callstack> {
    reach.callstack_to(idx).ok_or_else(|| {
        KernDiffError::report(
            "extraction",
            ReportErrorKind::CallstackUnavailable {
                function: reach.graph().vertex(idx).key().to_string(),
            },
        )
    })
}

fn nonfun_record(
    diff: &NonFunDiff,
    parent_stacks: &SidePair<Callstack>,
    entry_names: &SidePair<String>,
) -> DiffRecord {
    let stack_for = |side: Side| -> String {
        let own = diff.callstack(side);
        if diff.parent_fun() != entry_names[side].as_str() {
            parent_stacks[side].concat(own).to_string()
        } else {
            own.to_string()
        }
    };
    let (kind, files, lines) = match diff {
        NonFunDiff::Syntax(_) => (DiffKind::Syntactic, SidePair::default(), SidePair::default()),
        NonFunDiff::Type(type_diff) => (
            DiffKind::Type,
            type_diff.file.clone().map(Some),
            type_diff.line.map(Some),
        ),
    };
    DiffRecord {
        kind,
        result: ResultKind::NotEqual,
        name: diff.name().to_string(),
        left: DiffEndpoint {
            name: diff.name().to_string(),
            file: files.left,
            line: lines.left,
            callstack: stack_for(Side::Left),
        },
        right: DiffEndpoint {
            name: diff.name().to_string(),
            file: files.right,
            line: lines.right,
            callstack: stack_for(Side::Right),
        },
        covered: true,
    }
}
