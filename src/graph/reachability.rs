//! Bounded reachability and call-stack backtracking.
//!
//! Traversal is breadth-first over one side's successor edges, bounded to
//! the entry function's translation unit: a call site located in a
//! different `.c` file than the entry's is out of scope, while header
//! call sites and externally visible callees pass through. The first edge
//! that discovers a vertex is recorded, which under BFS order is a
//! shortest call path and is what reports render.

use crate::error::{KernDiffError, Result};
use crate::graph::ComparisonGraph;
use crate::model::{Callstack, CallstackEntry, EdgeKind, Side, SymbolName, VertexIdx};
use crate::utils::is_c_source;
use std::collections::{HashMap, HashSet, VecDeque};

/// First-discovery link from a vertex back toward the BFS start.
#[derive(Debug, Clone, Copy)]
struct ParentLink {
    parent: VertexIdx,
    edge_pos: usize,
}

/// Result of one [`ComparisonGraph::reachable_from`] traversal.
///
/// Holds the reachable set (weak-only discoveries excluded) and the
/// backtracking map needed to rebuild call paths toward the start.
pub struct Reachability<'a> {
    graph: &'a ComparisonGraph,
    side: Side,
    start: VertexIdx,
    members: Vec<VertexIdx>,
    member_set: HashSet<VertexIdx>,
    backtrack: HashMap<VertexIdx, ParentLink>,
}

impl ComparisonGraph {
    /// Breadth-first reachability from `start` over `side`'s call edges.
    ///
    /// The start vertex is always part of the result. Vertices first
    /// discovered through a Weak edge are traversed but excluded from the
    /// member set, so weak dependents never get independently reported
    /// while everything beyond them stays discoverable. Dangling edge
    /// targets are skipped; cross-module call graphs are inherently
    /// partial.
    ///
    /// # Errors
    ///
    /// Fails if `start` was never compared into this graph.
    pub fn reachable_from(&self, side: Side, start: &str) -> Result<Reachability<'_>> {
        let start_key = SymbolName::parse(start);
        let start_idx = self
            .idx_of(&start_key)
            .ok_or_else(|| KernDiffError::unknown_function(start))?;
        let start_file = self.vertex(start_idx).files[side].clone();

        let mut members = vec![start_idx];
        let mut member_set = HashSet::from([start_idx]);
        let mut visited = HashSet::from([start_idx]);
        let mut backtrack: HashMap<VertexIdx, ParentLink> = HashMap::new();
        let mut queue = VecDeque::from([start_idx]);

        while let Some(current) = queue.pop_front() {
            for (edge_pos, edge) in self.vertex(current).successors[side].iter().enumerate() {
                // Translation-unit bound: call sites in a foreign .c file
                // are outside this comparison's scope.
                let out_of_unit =
                    is_c_source(&edge.file) && start_file.as_deref() != Some(edge.file.as_path());
                if out_of_unit {
                    continue;
                }
                let Some(target) = self.idx_of(&edge.target) else {
                    continue;
                };
                if visited.insert(target) {
                    backtrack.insert(
                        target,
                        ParentLink {
                            parent: current,
                            edge_pos,
                        },
                    );
                    queue.push_back(target);
                    if edge.kind == EdgeKind::Strong {
                        members.push(target);
                        member_set.insert(target);
                    }
                }
            }
        }

        Ok(Reachability {
            graph: self,
            side,
            start: start_idx,
            members,
            member_set,
            backtrack,
        })
    }
}

impl<'a> Reachability<'a> {
    /// The graph this traversal ran over.
    #[must_use]
    pub fn graph(&self) -> &ComparisonGraph {
        self.graph
    }

    /// The side this traversal ran on.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Arena slot of the start vertex.
    #[must_use]
    pub fn start(&self) -> VertexIdx {
        self.start
    }

    /// Number of reachable vertices, the start included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if `idx` is in the reachable set.
    #[must_use]
    pub fn contains(&self, idx: VertexIdx) -> bool {
        self.member_set.contains(&idx)
    }

    /// Reachable vertices in discovery order, the start first.
    pub fn iter(&self) -> impl Iterator<Item = VertexIdx> + '_ {
        self.members.iter().copied()
    }

    /// Root-to-leaf call path from the start to `end`.
    ///
    /// Empty for the start itself; `None` if `end` was never visited,
    /// which callers must treat as a contract violation.
    #[must_use]
    pub fn callstack_to(&self, end: VertexIdx) -> Option<Callstack> {
        if end == self.start {
            return Some(Callstack::default());
        }
        let mut hops = Vec::new();
        let mut current = end;
        while current != self.start {
            let link = self.backtrack.get(&current)?;
            let edge = &self.graph.vertex(link.parent).successors[self.side][link.edge_pos];
            hops.push(CallstackEntry::from(edge));
            current = link.parent;
        }
        hops.reverse();
        Some(Callstack::new(hops))
    }
}
