//! Raw graph construction and normalization.
//!
//! The builder is the only phase in which edges may dangle and variant
//! stand-ins exist. Edges created before their target vertex are fine;
//! edges aimed at a variant name and the variant vertices themselves go
//! into queues that [`GraphBuilder::normalize`] drains exactly once,
//! producing a [`ComparisonGraph`] with no variants left.

use crate::error::{KernDiffError, Result};
use crate::graph::ComparisonGraph;
use crate::model::{Edge, EdgeKind, ResultKind, Side, SymbolName, Vertex, VertexIdx};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Position of an edge whose variant target needs resolving.
#[derive(Debug, Clone, Copy)]
struct PendingEdge {
    vertex: VertexIdx,
    side: Side,
    position: usize,
}

/// Accumulates one analyzer invocation's vertices and edges.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    arena: Vec<Vertex>,
    index: IndexMap<SymbolName, VertexIdx>,
    equal_funs: HashSet<SymbolName>,
    /// Edges whose target is a variant name, revisited by `normalize`.
    variant_edges: Vec<PendingEdge>,
    /// Keys of vertices that are themselves variants.
    variant_vertices: Vec<SymbolName>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a vertex by its key.
    #[must_use]
    pub fn get(&self, name: &SymbolName) -> Option<&Vertex> {
        self.index
            .get(name)
            .map(|&idx| &self.arena[idx.as_usize()])
    }

    /// Insert or overwrite the vertex under its own key.
    ///
    /// EQUAL vertices join `equal_funs`; variant keys are queued for
    /// normalization. Overwriting discards the previous vertex's edges, so
    /// any of them still queued are dropped with it.
    pub fn insert(&mut self, vertex: Vertex) -> VertexIdx {
        let key = vertex.key().clone();
        let is_equal = vertex.result == ResultKind::Equal;
        match self.index.get(&key).copied() {
            Some(idx) => {
                self.variant_edges.retain(|pending| pending.vertex != idx);
                if is_equal {
                    self.equal_funs.insert(key);
                } else {
                    self.equal_funs.remove(&key);
                }
                self.arena[idx.as_usize()] = vertex;
                idx
            }
            None => {
                let idx = VertexIdx::new(self.arena.len());
                if is_equal {
                    self.equal_funs.insert(key.clone());
                }
                if key.is_variant() {
                    self.variant_vertices.push(key.clone());
                }
                self.arena.push(vertex);
                self.index.insert(key, idx);
                idx
            }
        }
    }

    /// Attach a call edge to `vertex` on `side`.
    ///
    /// The target does not need to be present yet; variant targets are
    /// queued so their true destination can be fixed up during
    /// normalization.
    pub fn add_edge(&mut self, vertex: VertexIdx, side: Side, edge: Edge) {
        if edge.target.is_variant() {
            let position = self.arena[vertex.as_usize()].successors[side].len();
            self.variant_edges.push(PendingEdge {
                vertex,
                side,
                position,
            });
        }
        self.arena[vertex.as_usize()].successors[side].push(edge);
    }

    /// Resolve all variants and finalize edge classification.
    ///
    /// Queued variant edges are redirected to their canonical names; when
    /// the stand-in compared EQUAL, the edge (and any sibling edge already
    /// aimed at the canonical name) is downgraded to Weak, since the only
    /// difference behind it is a signature change. Variant vertices are
    /// then removed; one with no canonical counterpart is promoted into
    /// that slot, its EQUAL result softened to `AssumedEqual` because only
    /// a signature-altered stand-in was ever checked.
    ///
    /// # Errors
    ///
    /// A queued variant name with no vertex means the insertion contract
    /// was broken by the caller; this is fatal, not recoverable.
    pub fn normalize(mut self) -> Result<ComparisonGraph> {
        for pending in std::mem::take(&mut self.variant_edges) {
            let PendingEdge {
                vertex,
                side,
                position,
            } = pending;
            let target = self.arena[vertex.as_usize()].successors[side][position]
                .target
                .clone();
            let variant_idx = self
                .index
                .get(&target)
                .copied()
                .ok_or_else(|| KernDiffError::unresolved_variant(target.to_string()))?;
            let canonical = target.to_canonical();
            if self.arena[variant_idx.as_usize()].result == ResultKind::Equal {
                // The stand-in proved equal: neither the variant path nor a
                // direct edge to the canonical name may surface as a diff.
                for s in Side::BOTH {
                    for edge in &mut self.arena[vertex.as_usize()].successors[s] {
                        if edge.target == canonical {
                            edge.kind = EdgeKind::Weak;
                        }
                    }
                }
                self.arena[vertex.as_usize()].successors[side][position].kind = EdgeKind::Weak;
            }
            self.arena[vertex.as_usize()].successors[side][position].target = canonical;
        }

        for key in std::mem::take(&mut self.variant_vertices) {
            let Some(idx) = self.index.shift_remove(&key) else {
                return Err(KernDiffError::unresolved_variant(key.to_string()));
            };
            self.equal_funs.remove(&key);
            let canonical_key = key.to_canonical();
            // Canonical data always wins; the variant is only promoted into
            // an empty slot.
            if !self.index.contains_key(&canonical_key) {
                let vertex = &mut self.arena[idx.as_usize()];
                vertex.names = vertex.names.clone().map(|name| name.to_canonical());
                if vertex.result == ResultKind::Equal {
                    vertex.result = ResultKind::AssumedEqual;
                }
                self.index.insert(canonical_key, idx);
            }
        }

        Ok(ComparisonGraph::from_parts(
            self.arena,
            self.index,
            self.equal_funs,
        ))
    }
}
