//! Predecessor lists and uncachability propagation.
//!
//! A function compared as assumed-equal in one translation unit may
//! resolve differently once another unit supplies the missing
//! implementation. Callers living in header files are re-encountered by
//! those other units, so persisting their equality would suppress the
//! re-analysis that could overturn the assumption. The marking pass
//! walks the reverse call graph from every such assumption and keeps
//! header-file callers out of the equality cache.

use crate::graph::ComparisonGraph;
use crate::model::{ResultKind, Side, VertexIdx};
use crate::utils::is_header;
use std::collections::{HashSet, VecDeque};

impl ComparisonGraph {
    /// Rebuilds every vertex's predecessor lists from the successor
    /// edges.
    ///
    /// Runs as a separate pass because absorption rewires successors
    /// wholesale. Edges to names outside the graph are skipped, and a
    /// vertex appears at most once per predecessor list however many
    /// call sites it holds.
    pub fn populate_predecessors(&mut self) {
        let indices = self.indices();
        for &idx in &indices {
            for side in Side::BOTH {
                self.vertex_mut(idx).predecessors[side].clear();
            }
        }
        for &idx in &indices {
            for side in Side::BOTH {
                let targets: Vec<VertexIdx> = self.vertex(idx).successors[side]
                    .iter()
                    .filter_map(|edge| self.idx_of(&edge.target))
                    .collect();
                for target in targets {
                    let preds = &mut self.vertex_mut(target).predecessors[side];
                    if !preds.contains(&idx) {
                        preds.push(idx);
                    }
                }
            }
        }
    }

    /// Flags header-file callers of unresolved assumptions as
    /// uncachable.
    ///
    /// An origin is a vertex whose result is `AssumedEqual` and whose
    /// left-side file is not a header (a missing file also qualifies).
    /// From each origin, a reverse BFS over the left-side predecessor
    /// lists marks every header-file caller `cachable = false` and
    /// records it in the origin's `prevents_caching_of`, so the marks
    /// can be lifted if the origin's result is later superseded.
    ///
    /// Requires [`populate_predecessors`](Self::populate_predecessors)
    /// to have run on the current graph shape.
    pub fn mark_uncachable_from_assumed_equal(&mut self) {
        let origins: Vec<VertexIdx> = self
            .indices()
            .into_iter()
            .filter(|&idx| {
                let vertex = self.vertex(idx);
                vertex.result == ResultKind::AssumedEqual
                    && !vertex.files[Side::Left].as_deref().is_some_and(is_header)
            })
            .collect();

        for origin in origins {
            let mut visited = HashSet::from([origin]);
            let mut queue = VecDeque::from([origin]);
            while let Some(current) = queue.pop_front() {
                let preds = self.vertex(current).predecessors[Side::Left].clone();
                for pred in preds {
                    if !visited.insert(pred) {
                        continue;
                    }
                    let in_header = self.vertex(pred).files[Side::Left]
                        .as_deref()
                        .is_some_and(is_header);
                    if in_header {
                        tracing::debug!(
                            function = %self.vertex(pred).key(),
                            assumption = %self.vertex(origin).key(),
                            "header-file caller of an unresolved assumption stays uncached"
                        );
                        self.vertex_mut(pred).cachable = false;
                        let origin_vertex = self.vertex_mut(origin);
                        if !origin_vertex.prevents_caching_of.contains(&pred) {
                            origin_vertex.prevents_caching_of.push(pred);
                        }
                    }
                    queue.push_back(pred);
                }
            }
        }
    }
}
