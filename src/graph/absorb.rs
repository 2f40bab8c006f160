//! Merging freshly analyzed results into an accumulated graph.
//!
//! Absorption walks the incoming graph in key order and lands every
//! vertex in the accumulated arena: unknown names get a new slot,
//! already-known names are re-resolved through
//! [`Vertex::compare_vertex_priority`] and either replace the resident
//! vertex in place or are dropped. Replacing in place keeps every
//! existing [`VertexIdx`] valid, which is what allows
//! `prevents_caching_of` lists to survive across analyzer invocations.

use crate::graph::ComparisonGraph;
use crate::model::{ResultKind, SidePair, SymbolName, Vertex, VertexIdx};

/// Outcome counters for one [`ComparisonGraph::absorb`] call.
#[derive(Debug, Default)]
pub struct AbsorbStats {
    /// Vertices for names the accumulated graph had never seen.
    pub inserted: usize,
    /// Vertices that replaced a lower-priority resident.
    pub replaced: usize,
    /// Incoming vertices dropped in favor of the resident one.
    pub kept: usize,
    /// One entry per replacement, in absorption order.
    pub displaced: Vec<DisplacedVertex>,
}

/// Record of a resident vertex that lost to an incoming one.
///
/// Callers use these to decide whether previously persisted equality
/// facts have to be rolled back.
#[derive(Debug, Clone)]
pub struct DisplacedVertex {
    pub name: SymbolName,
    pub old_result: ResultKind,
    pub new_result: ResultKind,
}

impl DisplacedVertex {
    /// True if the replacement invalidated a persisted equality fact.
    #[must_use]
    pub fn invalidates_equality(&self) -> bool {
        self.old_result == ResultKind::Equal && self.new_result != ResultKind::Equal
    }
}

impl ComparisonGraph {
    /// Merges `other` into this graph, consuming it.
    ///
    /// Incoming vertices arrive with their originating arena's
    /// bookkeeping stripped: predecessor lists and `prevents_caching_of`
    /// refer to slots of the graph they came from and are rebuilt by the
    /// caller after absorption.
    pub fn absorb(&mut self, other: ComparisonGraph) -> AbsorbStats {
        let ComparisonGraph {
            arena,
            index,
            equal_funs: _,
        } = other;
        let mut slots: Vec<Option<Vertex>> = arena.into_iter().map(Some).collect();
        let mut stats = AbsorbStats::default();

        for (key, idx) in index {
            // Orphaned slots of the incoming arena carry no index entry
            // and are dropped with it.
            let Some(mut incoming) = slots[idx.as_usize()].take() else {
                continue;
            };
            incoming.predecessors = SidePair::default();
            incoming.prevents_caching_of.clear();

            match self.index.get(&key).copied() {
                None => {
                    let new_idx = VertexIdx::new(self.arena.len());
                    if incoming.result == ResultKind::Equal {
                        self.equal_funs.insert(key.clone());
                    }
                    self.arena.push(incoming);
                    self.index.insert(key, new_idx);
                    stats.inserted += 1;
                }
                Some(existing_idx) => {
                    let slot = existing_idx.as_usize();
                    if !self.arena[slot].compare_vertex_priority(&incoming) {
                        stats.kept += 1;
                        continue;
                    }
                    let old_result = self.arena[slot].result;
                    if old_result == ResultKind::AssumedEqual
                        && incoming.result != ResultKind::AssumedEqual
                    {
                        // The assumption this vertex forced onto its
                        // callers is gone, so their equality facts may
                        // be persisted again.
                        let restorable =
                            std::mem::take(&mut self.arena[slot].prevents_caching_of);
                        for blocked in restorable {
                            self.arena[blocked.as_usize()].cachable = true;
                        }
                    }
                    if incoming.result == ResultKind::Equal {
                        self.equal_funs.insert(key.clone());
                    } else {
                        self.equal_funs.remove(&key);
                    }
                    tracing::debug!(
                        function = %key,
                        old = %old_result,
                        new = %incoming.result,
                        "replacing vertex with a higher-priority result"
                    );
                    stats.displaced.push(DisplacedVertex {
                        name: key,
                        old_result,
                        new_result: incoming.result,
                    });
                    self.arena[slot] = incoming;
                    stats.replaced += 1;
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::{Edge, Side};

    fn make_vertex(name: &str, result: ResultKind) -> Vertex {
        Vertex::new(
            SidePair::new(SymbolName::parse(name), SymbolName::parse(name)),
            result,
        )
    }

    fn with_callees(mut vertex: Vertex, side: Side, count: usize) -> Vertex {
        for i in 0..count {
            vertex.successors[side].push(Edge::new(
                SymbolName::parse(&format!("callee_{i}")),
                "app/main.c",
                10 + i as u32,
            ));
        }
        vertex
    }

    fn make_graph(vertices: Vec<Vertex>) -> ComparisonGraph {
        let mut builder = GraphBuilder::new();
        for vertex in vertices {
            builder.insert(vertex);
        }
        builder.normalize().expect("normalize")
    }

    #[test]
    fn test_unknown_names_are_inserted() {
        let mut graph = make_graph(vec![make_vertex("a", ResultKind::Equal)]);
        let stats = graph.absorb(make_graph(vec![
            make_vertex("b", ResultKind::Equal),
            make_vertex("c", ResultKind::NotEqual),
        ]));

        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.replaced, 0);
        assert_eq!(graph.len(), 3);
        assert!(graph.is_equal("b"));
        assert!(!graph.is_equal("c"));
    }

    #[test]
    fn test_assumed_equal_resident_is_always_replaced() {
        // The resident has strictly more callees; its result alone makes
        // it replaceable.
        let resident = with_callees(
            make_vertex("fun", ResultKind::AssumedEqual),
            Side::Left,
            3,
        );
        let mut graph = make_graph(vec![resident]);
        let stats = graph.absorb(make_graph(vec![make_vertex("fun", ResultKind::NotEqual)]));

        assert_eq!(stats.replaced, 1);
        let vertex = graph.get_named("fun").expect("fun");
        assert_eq!(vertex.result, ResultKind::NotEqual);
    }

    #[test]
    fn test_unknown_resident_is_replaced_even_by_assumed_equal() {
        let mut graph = make_graph(vec![make_vertex("fun", ResultKind::Unknown)]);
        let stats = graph.absorb(make_graph(vec![make_vertex(
            "fun",
            ResultKind::AssumedEqual,
        )]));

        assert_eq!(stats.replaced, 1);
        let vertex = graph.get_named("fun").expect("fun");
        assert_eq!(vertex.result, ResultKind::AssumedEqual);
    }

    #[test]
    fn test_more_callees_displace_fewer() {
        let mut graph = make_graph(vec![with_callees(
            make_vertex("fun", ResultKind::NotEqual),
            Side::Left,
            1,
        )]);
        let richer = with_callees(make_vertex("fun", ResultKind::NotEqual), Side::Right, 2);
        let stats = graph.absorb(make_graph(vec![richer]));

        assert_eq!(stats.replaced, 1, "a deeper comparison wins the slot");
        let vertex = graph.get_named("fun").expect("fun");
        assert_eq!(vertex.successors[Side::Right].len(), 2);
    }

    #[test]
    fn test_shallower_incoming_is_dropped() {
        let mut graph = make_graph(vec![with_callees(
            make_vertex("fun", ResultKind::Equal),
            Side::Left,
            2,
        )]);
        let stats = graph.absorb(make_graph(vec![make_vertex("fun", ResultKind::NotEqual)]));

        assert_eq!(stats.kept, 1);
        assert_eq!(stats.replaced, 0);
        assert_eq!(graph.get_named("fun").expect("fun").result, ResultKind::Equal);
        assert!(graph.is_equal("fun"), "the kept resident stays cachable-equal");
    }

    #[test]
    fn test_replacing_assumed_equal_restores_cachability() {
        let mut graph = make_graph(vec![
            make_vertex("caller", ResultKind::Equal),
            make_vertex("assumed", ResultKind::AssumedEqual),
        ]);
        let caller = graph.idx_of(&SymbolName::parse("caller")).expect("caller");
        let assumed = graph.idx_of(&SymbolName::parse("assumed")).expect("assumed");
        graph.vertex_mut(caller).cachable = false;
        graph.vertex_mut(assumed).prevents_caching_of.push(caller);

        graph.absorb(make_graph(vec![make_vertex("assumed", ResultKind::Equal)]));

        assert!(
            graph.vertex(caller).cachable,
            "resolving the assumption must restore its callers"
        );
        assert_eq!(graph.vertex(assumed).result, ResultKind::Equal);
    }

    #[test]
    fn test_assumed_equal_replaced_by_assumed_equal_keeps_marks() {
        let mut graph = make_graph(vec![
            make_vertex("caller", ResultKind::Equal),
            make_vertex("assumed", ResultKind::AssumedEqual),
        ]);
        let caller = graph.idx_of(&SymbolName::parse("caller")).expect("caller");
        let assumed = graph.idx_of(&SymbolName::parse("assumed")).expect("assumed");
        graph.vertex_mut(caller).cachable = false;
        graph.vertex_mut(assumed).prevents_caching_of.push(caller);

        let richer = with_callees(
            make_vertex("assumed", ResultKind::AssumedEqual),
            Side::Left,
            1,
        );
        graph.absorb(make_graph(vec![richer]));

        assert!(
            !graph.vertex(caller).cachable,
            "the assumption still stands, so the caller stays blocked"
        );
    }

    #[test]
    fn test_displaced_records_name_and_results() {
        let mut graph = make_graph(vec![make_vertex("fun", ResultKind::Equal)]);
        let richer = with_callees(make_vertex("fun", ResultKind::NotEqual), Side::Left, 1);
        let stats = graph.absorb(make_graph(vec![richer]));

        assert_eq!(stats.displaced.len(), 1);
        let displaced = &stats.displaced[0];
        assert_eq!(displaced.name.canonical(), "fun");
        assert_eq!(displaced.old_result, ResultKind::Equal);
        assert_eq!(displaced.new_result, ResultKind::NotEqual);
        assert!(displaced.invalidates_equality());
        assert!(
            !graph.is_equal("fun"),
            "a displaced equality must leave the equal set"
        );
    }

    #[test]
    fn test_existing_indices_survive_absorption() {
        let mut graph = make_graph(vec![make_vertex("stable", ResultKind::NotEqual)]);
        let before = graph.idx_of(&SymbolName::parse("stable")).expect("stable");

        graph.absorb(make_graph(vec![
            make_vertex("fresh_a", ResultKind::Equal),
            make_vertex("fresh_b", ResultKind::Unknown),
        ]));

        let after = graph.idx_of(&SymbolName::parse("stable")).expect("stable");
        assert_eq!(before, after, "absorption must never move resident slots");
    }
}
