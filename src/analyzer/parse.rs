//! Conversion from analyzer records to graph vertices.

use crate::analyzer::wire::{ComparisonRecord, DifferingObject, SourceRef};
use crate::graph::GraphBuilder;
use crate::model::{
    Callstack, CallstackEntry, Edge, NonFunDiff, Side, SidePair, SymbolName, SyntaxDiff, TypeDiff,
    Vertex,
};

/// Builds an unnormalized graph from one analyzer report.
///
/// Each record becomes one vertex; each observed call site becomes a
/// successor edge on its side. Variant-suffixed names are recognized
/// here, at the boundary, so nothing past the builder ever sees the
/// wire spelling.
#[must_use]
pub fn build_graph(records: &[ComparisonRecord]) -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    for record in records {
        let idx = builder.insert(vertex_from_record(record));
        for side in Side::BOTH {
            let info = match side {
                Side::Left => &record.first,
                Side::Right => &record.second,
            };
            for call in &info.calls {
                builder.add_edge(
                    idx,
                    side,
                    Edge::new(SymbolName::parse(&call.function), call.file.clone(), call.line),
                );
            }
        }
    }
    builder
}

fn vertex_from_record(record: &ComparisonRecord) -> Vertex {
    let mut vertex = Vertex::new(
        SidePair::new(
            SymbolName::parse(&record.first.function),
            SymbolName::parse(&record.second.function),
        ),
        record.result,
    )
    .with_location(Side::Left, record.first.file.clone(), record.first.line)
    .with_location(Side::Right, record.second.file.clone(), record.second.line);
    vertex.nonfun_diffs = record
        .differing_objects
        .iter()
        .map(convert_differing_object)
        .collect();
    vertex
}

fn convert_differing_object(object: &DifferingObject) -> NonFunDiff {
    match object {
        DifferingObject::Syntax(record) => NonFunDiff::Syntax(SyntaxDiff {
            name: record.name.clone(),
            parent_fun: record.function.clone(),
            callstack: SidePair::new(
                convert_stack(&record.stack_first),
                convert_stack(&record.stack_second),
            ),
            body: SidePair::new(record.body_first.clone(), record.body_second.clone()),
        }),
        DifferingObject::Type(record) => NonFunDiff::Type(TypeDiff {
            name: record.name.clone(),
            parent_fun: record.function.clone(),
            callstack: SidePair::new(
                convert_stack(&record.stack_first),
                convert_stack(&record.stack_second),
            ),
            file: SidePair::new(record.file_first.clone(), record.file_second.clone()),
            line: SidePair::new(record.line_first, record.line_second),
        }),
    }
}

fn convert_stack(stack: &[SourceRef]) -> Callstack {
    Callstack::new(
        stack
            .iter()
            .map(|hop| CallstackEntry::new(hop.function.clone(), hop.file.clone(), hop.line))
            .collect(),
    )
}
