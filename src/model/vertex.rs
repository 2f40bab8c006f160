//! Vertices and edges of the comparison graph.
//!
//! A [`Vertex`] is one function-pair comparison outcome; its [`Edge`]s are
//! the call references the analyzer discovered while comparing, one list
//! per [`Side`]. Vertices live in an arena owned by the graph and are
//! addressed by [`VertexIdx`], which keeps reverse traversal cheap without
//! back-pointers.

use crate::model::{ResultKind, Side, SidePair, SymbolName};
use std::fmt;
use std::path::PathBuf;

/// Arena index of a vertex within one comparison graph.
///
/// Indices are only meaningful inside the graph that issued them; merging
/// graphs re-interns vertices rather than translating indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIdx(u32);

impl VertexIdx {
    pub(crate) fn new(slot: usize) -> Self {
        debug_assert!(slot <= u32::MAX as usize);
        Self(slot as u32)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Whether an edge carries reportable semantics or only connectivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeKind {
    /// Load-bearing: non-equality of the target surfaces in the report.
    #[default]
    Strong,
    /// Navigation only; must never generate a visible diff.
    Weak,
}

/// A call reference discovered by the analyzer, scoped to one side.
///
/// `file`/`line` locate the call site, not the callee's definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target: SymbolName,
    pub file: PathBuf,
    pub line: u32,
    pub kind: EdgeKind,
}

impl Edge {
    /// A strong edge to `target` from the given call site.
    pub fn new(target: SymbolName, file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            target,
            file: file.into(),
            line,
            kind: EdgeKind::Strong,
        }
    }
}

/// One hop of a rendered call path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallstackEntry {
    pub function: String,
    pub file: PathBuf,
    pub line: u32,
}

impl CallstackEntry {
    pub fn new(function: impl Into<String>, file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for CallstackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.function, self.file.display(), self.line)
    }
}

impl From<&Edge> for CallstackEntry {
    fn from(edge: &Edge) -> Self {
        Self {
            function: edge.target.canonical().to_string(),
            file: edge.file.clone(),
            line: edge.line,
        }
    }
}

/// A root-to-leaf call path, rendered one hop per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Callstack {
    entries: Vec<CallstackEntry>,
}

impl Callstack {
    #[must_use]
    pub fn new(entries: Vec<CallstackEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: CallstackEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CallstackEntry] {
        &self.entries
    }

    /// This path extended by `suffix`, for prefixing a parent's path onto
    /// a symbol's own expansion stack.
    #[must_use]
    pub fn concat(&self, suffix: &Callstack) -> Callstack {
        let mut entries = self.entries.clone();
        entries.extend(suffix.entries.iter().cloned());
        Callstack { entries }
    }
}

impl fmt::Display for Callstack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Macro or inline-asm bodies differ under this vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiff {
    pub name: String,
    pub parent_fun: String,
    pub callstack: SidePair<Callstack>,
    pub body: SidePair<String>,
}

/// Composite type layout differs under this vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiff {
    pub name: String,
    pub parent_fun: String,
    pub callstack: SidePair<Callstack>,
    pub file: SidePair<PathBuf>,
    pub line: SidePair<u32>,
}

/// A non-function difference found while comparing one function pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonFunDiff {
    Syntax(SyntaxDiff),
    Type(TypeDiff),
}

impl NonFunDiff {
    /// The differing symbol's name (macro, asm snippet, or type).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            NonFunDiff::Syntax(d) => &d.name,
            NonFunDiff::Type(d) => &d.name,
        }
    }

    /// The function whose comparison surfaced this difference.
    #[must_use]
    pub fn parent_fun(&self) -> &str {
        match self {
            NonFunDiff::Syntax(d) => &d.parent_fun,
            NonFunDiff::Type(d) => &d.parent_fun,
        }
    }

    /// The analyzer-supplied stack from the parent down to the symbol.
    #[must_use]
    pub fn callstack(&self, side: Side) -> &Callstack {
        match self {
            NonFunDiff::Syntax(d) => &d.callstack[side],
            NonFunDiff::Type(d) => &d.callstack[side],
        }
    }
}

/// One function-pair comparison outcome.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Function name per side; sides may differ when the analyzer coupled
    /// differently-named functions.
    pub names: SidePair<SymbolName>,
    pub result: ResultKind,
    /// Definition location per side, when debug info provided one.
    pub files: SidePair<Option<PathBuf>>,
    pub lines: SidePair<Option<u32>>,
    /// Outgoing call edges per side.
    pub successors: SidePair<Vec<Edge>>,
    /// Reverse edges, rebuilt on demand before uncachability marking.
    pub predecessors: SidePair<Vec<VertexIdx>>,
    pub nonfun_diffs: Vec<NonFunDiff>,
    /// Whether this vertex's equality may be persisted to the on-disk cache.
    pub cachable: bool,
    /// Vertices whose `cachable` flag was cleared because of this vertex;
    /// reinstated if this vertex's result moves away from `AssumedEqual`.
    pub prevents_caching_of: Vec<VertexIdx>,
}

impl Vertex {
    pub fn new(names: SidePair<SymbolName>, result: ResultKind) -> Self {
        Self {
            names,
            result,
            files: SidePair::default(),
            lines: SidePair::default(),
            successors: SidePair::default(),
            predecessors: SidePair::default(),
            nonfun_diffs: Vec::new(),
            cachable: true,
            prevents_caching_of: Vec::new(),
        }
    }

    /// The name this vertex is keyed under in the graph.
    #[must_use]
    pub fn key(&self) -> &SymbolName {
        &self.names.left
    }

    /// Attach a definition location for one side.
    #[must_use]
    pub fn with_location(
        mut self,
        side: Side,
        file: Option<PathBuf>,
        line: Option<u32>,
    ) -> Self {
        self.files[side] = file;
        self.lines[side] = line;
        self
    }

    /// True when `other`'s data should take this vertex's place during
    /// graph absorption.
    ///
    /// Low-confidence results (`AssumedEqual`, `Unknown`) always yield to
    /// fresher data, whatever it says. Otherwise the incoming vertex wins
    /// only if it saw strictly more call edges on some side, which happens
    /// when it was produced after linking additional modules.
    #[must_use]
    pub fn compare_vertex_priority(&self, other: &Vertex) -> bool {
        if matches!(self.result, ResultKind::AssumedEqual | ResultKind::Unknown) {
            return true;
        }
        Side::BOTH
            .iter()
            .any(|&side| other.successors[side].len() > self.successors[side].len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vertex(name: &str, result: ResultKind) -> Vertex {
        Vertex::new(
            SidePair::new(SymbolName::parse(name), SymbolName::parse(name)),
            result,
        )
    }

    #[test]
    fn test_callstack_entry_rendering() {
        let entry = CallstackEntry::new("do_check", "app/main.c", 58);
        assert_eq!(entry.to_string(), "do_check at app/main.c:58");
    }

    #[test]
    fn test_callstack_rendering_joins_with_newlines() {
        let stack = Callstack::new(vec![
            CallstackEntry::new("main_function", "app/main.c", 10),
            CallstackEntry::new("do_check", "app/main.c", 58),
        ]);
        assert_eq!(
            stack.to_string(),
            "main_function at app/main.c:10\ndo_check at app/main.c:58"
        );
    }

    #[test]
    fn test_empty_callstack_renders_empty() {
        assert_eq!(Callstack::default().to_string(), "");
    }

    #[test]
    fn test_callstack_concat() {
        let parent = Callstack::new(vec![CallstackEntry::new("do_check", "app/main.c", 58)]);
        let own = Callstack::new(vec![CallstackEntry::new("MACRO", "app/defs.h", 3)]);
        let full = parent.concat(&own);
        assert_eq!(full.len(), 2);
        assert_eq!(full.entries()[0].function, "do_check");
        assert_eq!(full.entries()[1].function, "MACRO");
    }

    #[test]
    fn test_priority_low_confidence_always_yields() {
        let assumed = make_vertex("f", ResultKind::AssumedEqual);
        let unknown = make_vertex("f", ResultKind::Unknown);
        let incoming = make_vertex("f", ResultKind::Unknown);

        assert!(
            assumed.compare_vertex_priority(&incoming),
            "assumed-equal must yield even to an incoming unknown"
        );
        assert!(unknown.compare_vertex_priority(&incoming));
    }

    #[test]
    fn test_priority_more_edges_wins() {
        let existing = make_vertex("f", ResultKind::NotEqual);
        let mut incoming = make_vertex("f", ResultKind::Equal);
        incoming.successors[Side::Right].push(Edge::new(
            SymbolName::parse("callee"),
            "fs/file.c",
            12,
        ));

        assert!(
            existing.compare_vertex_priority(&incoming),
            "an extra edge on either side should displace the settled vertex"
        );
        assert!(
            !incoming.compare_vertex_priority(&existing),
            "fewer edges must not displace"
        );
    }

    #[test]
    fn test_priority_equal_edge_counts_keep_existing() {
        let existing = make_vertex("f", ResultKind::NotEqual);
        let incoming = make_vertex("f", ResultKind::Equal);
        assert!(!existing.compare_vertex_priority(&incoming));
    }
}
