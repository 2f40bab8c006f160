//! The incremental comparison graph.
//!
//! One graph accumulates every function-pair outcome of a comparison
//! group. Partial graphs come out of [`GraphBuilder`] (one per analyzer
//! invocation), are normalized into read-only [`ComparisonGraph`]s, and are
//! merged into the group's running graph by absorption. All querying
//! (reachability, call-stack reconstruction, report extraction) happens on
//! the normalized form only; the builder is the only type with mutation
//! queues, so "normalized before queried" holds by construction.
//!
//! Vertices live in an arena vector and are addressed by [`VertexIdx`];
//! the name index and all predecessor bookkeeping refer to arena slots, so
//! replacing a vertex during absorption keeps every reference valid.

mod absorb;
mod builder;
mod reachability;
mod uncachable;

pub use absorb::{AbsorbStats, DisplacedVertex};
pub use builder::GraphBuilder;
pub use reachability::Reachability;

use crate::model::{ResultKind, SymbolName, Vertex, VertexIdx};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// A normalized, queryable comparison graph.
///
/// Obtained from [`GraphBuilder::normalize`]; grows only through
/// [`ComparisonGraph::absorb`].
#[derive(Debug, Default, Clone)]
pub struct ComparisonGraph {
    /// Vertex arena. Slots orphaned by normalization or absorption stay
    /// allocated but unindexed; iteration goes through `index`.
    arena: Vec<Vertex>,
    /// Canonical name to arena slot, in insertion order.
    index: IndexMap<SymbolName, VertexIdx>,
    /// Names currently resolved EQUAL, for fast membership checks.
    equal_funs: HashSet<SymbolName>,
}

impl ComparisonGraph {
    /// An empty graph, ready to absorb partial results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        arena: Vec<Vertex>,
        index: IndexMap<SymbolName, VertexIdx>,
        equal_funs: HashSet<SymbolName>,
    ) -> Self {
        Self {
            arena,
            index,
            equal_funs,
        }
    }

    /// Number of live (indexed) vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Arena slot for `name`, if the function was compared.
    #[must_use]
    pub fn idx_of(&self, name: &SymbolName) -> Option<VertexIdx> {
        self.index.get(name).copied()
    }

    /// Look up a vertex by its graph key.
    #[must_use]
    pub fn get(&self, name: &SymbolName) -> Option<&Vertex> {
        self.idx_of(name).map(|idx| self.vertex(idx))
    }

    /// Look up a vertex by a wire-format name.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Vertex> {
        self.get(&SymbolName::parse(name))
    }

    /// The vertex in arena slot `idx`.
    ///
    /// Indices obtained from this graph are always valid; absorption reuses
    /// slots instead of freeing them.
    #[must_use]
    pub fn vertex(&self, idx: VertexIdx) -> &Vertex {
        &self.arena[idx.as_usize()]
    }

    pub(crate) fn vertex_mut(&mut self, idx: VertexIdx) -> &mut Vertex {
        &mut self.arena[idx.as_usize()]
    }

    /// Iterate live vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolName, &Vertex)> {
        self.index
            .iter()
            .map(|(name, &idx)| (name, &self.arena[idx.as_usize()]))
    }

    /// Arena slots of live vertices, in insertion order.
    pub(crate) fn indices(&self) -> Vec<VertexIdx> {
        self.index.values().copied().collect()
    }

    /// True if `name` is currently resolved EQUAL.
    #[must_use]
    pub fn is_equal(&self, name: &str) -> bool {
        self.equal_funs.contains(&SymbolName::parse(name))
    }

    /// Names currently resolved EQUAL.
    pub fn equal_funs(&self) -> impl Iterator<Item = &SymbolName> {
        self.equal_funs.iter()
    }

    /// The rolled-up verdict over every vertex in the graph.
    #[must_use]
    pub fn aggregate_result(&self) -> ResultKind {
        ResultKind::aggregate(self.iter().map(|(_, v)| v.result))
    }

    /// Vertex counts by result kind, for summaries and logs.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut by_result: IndexMap<ResultKind, usize> = IndexMap::new();
        for kind in ResultKind::ALL {
            by_result.insert(kind, 0);
        }
        for (_, vertex) in self.iter() {
            *by_result.entry(vertex.result).or_default() += 1;
        }
        by_result.retain(|_, count| *count > 0);
        GraphStats {
            vertices: self.len(),
            by_result,
        }
    }
}

/// Per-graph vertex counts, broken down by result kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub vertices: usize,
    pub by_result: IndexMap<ResultKind, usize>,
}

impl GraphStats {
    /// Count of vertices whose outcome stems from analyzer failure.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.by_result
            .iter()
            .filter(|(kind, _)| kind.is_failure())
            .map(|(_, count)| count)
            .sum()
    }
}
