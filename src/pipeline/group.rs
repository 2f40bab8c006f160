//! Per-group comparison driving and plan execution.
//!
//! One [`GroupRunner`] owns the comparison graph and equality cache of a
//! single module pair. Entry functions of the group run strictly in
//! order: each analyzer invocation may report functions an earlier one
//! already reached, and absorption plus cache rollback depend on seeing
//! those collisions one at a time.

use super::exit_codes;
use crate::analyzer::{build_graph, CompareRequest, ComparisonRecord, FunctionAnalyzer};
use crate::cache::{CacheStats, EqualityCache};
use crate::config::{ComparisonGroup, Plan};
use crate::error::{CacheErrorKind, KernDiffError, Result};
use crate::graph::{AbsorbStats, ComparisonGraph, GraphStats};
use crate::model::{ResultKind, Side, Vertex};
use crate::report::{DiffKind, DiffRecord};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ============================================================================
// Cache placement
// ============================================================================

/// Keeps a throwaway cache directory alive for the runner's lifetime.
enum CacheHome {
    Throwaway(tempfile::TempDir),
    Persistent(PathBuf),
}

/// Stable per-pair cache directory name under a persistent root.
fn group_dir_name(left: &Path, right: &Path) -> String {
    let flatten = |path: &Path| path.to_string_lossy().replace('/', "$");
    format!("{}:{}", flatten(left), flatten(right))
}

// ============================================================================
// Group runner
// ============================================================================

/// Drives every comparison of one module pair.
///
/// The runner hands the analyzer its cache directory on each
/// invocation, absorbs the returned partial graph, and persists fresh
/// confirmed equalities back into the cache so later invocations can
/// reuse them. When absorption overturns an equality that the most
/// recent cache batch already persisted, that batch is rolled back
/// before anything else is written.
pub struct GroupRunner<'a> {
    analyzer: &'a dyn FunctionAnalyzer,
    left: PathBuf,
    right: PathBuf,
    graph: ComparisonGraph,
    cache: EqualityCache,
    _home: CacheHome,
    /// Entry functions in request order, deduplicated.
    entries: Vec<String>,
    /// Canonical names persisted to the cache at any point of the run.
    written: HashSet<String>,
    /// Names persisted by the most recent cache update, the only batch
    /// rollback can still undo.
    last_batch: Vec<String>,
}

impl<'a> GroupRunner<'a> {
    /// Sets up a runner with its own cache directory.
    ///
    /// With a persistent root the group gets a stable subdirectory
    /// named after its module pair, so repeated runs see earlier
    /// equalities. Without one the cache lives in a temporary directory
    /// deleted when the runner drops.
    pub fn new(
        analyzer: &'a dyn FunctionAnalyzer,
        group: &ComparisonGroup,
        cache_root: Option<&Path>,
    ) -> Result<Self> {
        let (home, cache_dir) = match cache_root {
            Some(root) => {
                let dir = root.join(group_dir_name(&group.left, &group.right));
                (CacheHome::Persistent(dir.clone()), dir)
            }
            None => {
                let temp = tempfile::tempdir().map_err(|err| {
                    KernDiffError::cache(
                        "temporary directory",
                        CacheErrorKind::DirectoryUnavailable {
                            path: std::env::temp_dir(),
                            message: err.to_string(),
                        },
                    )
                })?;
                let dir = temp.path().to_path_buf();
                (CacheHome::Throwaway(temp), dir)
            }
        };
        Ok(Self {
            analyzer,
            left: group.left.clone(),
            right: group.right.clone(),
            graph: ComparisonGraph::new(),
            cache: EqualityCache::new(cache_dir)?,
            _home: home,
            entries: Vec::new(),
            written: HashSet::new(),
            last_batch: Vec::new(),
        })
    }

    /// The graph accumulated so far.
    #[must_use]
    pub fn graph(&self) -> &ComparisonGraph {
        &self.graph
    }

    /// Compares one entry function, reusing earlier conclusive results.
    ///
    /// A function that an earlier invocation already resolved
    /// conclusively is not sent to the analyzer again; it still counts
    /// as an entry for report extraction.
    pub fn compare_function(&mut self, function: &str) -> Result<()> {
        if !self.entries.iter().any(|entry| entry == function) {
            self.entries.push(function.to_string());
        }
        if let Some(vertex) = self.graph.get_named(function) {
            if vertex.result.is_conclusive() {
                tracing::debug!(function, result = %vertex.result, "already resolved, skipping");
                return Ok(());
            }
        }

        let request = CompareRequest {
            left_module: &self.left,
            right_module: &self.right,
            function,
            cache_dir: Some(self.cache.dir()),
        };
        let mut records = self.analyzer.compare(&request)?;
        if !records.iter().any(|record| record.first.function == function) {
            tracing::warn!(function, "no record for the requested function, recording an error");
            records.push(ComparisonRecord::failure(function, ResultKind::Error));
        }

        let fresh = build_graph(&records).normalize()?;
        let stats = self.graph.absorb(fresh);
        tracing::debug!(
            function,
            inserted = stats.inserted,
            replaced = stats.replaced,
            kept = stats.kept,
            "absorbed analyzer output"
        );
        self.revert_invalidated(&stats)?;
        self.graph.populate_predecessors();
        self.graph.mark_uncachable_from_assumed_equal();
        self.persist_new_equalities()
    }

    /// Undoes the last cache batch if absorption overturned any
    /// equality it persisted.
    ///
    /// Only the most recent batch is recoverable. An overturned
    /// equality written in an older batch stays in the cache file; the
    /// analyzer may reuse the stale line for the rest of the run.
    fn revert_invalidated(&mut self, stats: &AbsorbStats) -> Result<()> {
        let invalidated: HashSet<&str> = stats
            .displaced
            .iter()
            .filter(|displaced| displaced.invalidates_equality())
            .map(|displaced| displaced.name.canonical())
            .collect();
        if invalidated.is_empty() {
            return Ok(());
        }

        if self
            .last_batch
            .iter()
            .any(|name| invalidated.contains(name.as_str()))
        {
            tracing::info!(
                overturned = invalidated.len(),
                batch = self.last_batch.len(),
                "last cache batch contains an overturned equality, rolling it back"
            );
            self.cache.rollback()?;
            for name in std::mem::take(&mut self.last_batch) {
                self.written.remove(&name);
            }
        }
        for name in &invalidated {
            if self.written.contains(*name) {
                tracing::warn!(
                    function = %name,
                    "overturned equality persisted in an earlier batch, cache line is stale"
                );
            }
        }
        Ok(())
    }

    /// Writes confirmed equalities that no earlier batch covered.
    fn persist_new_equalities(&mut self) -> Result<()> {
        let candidates: Vec<&Vertex> = self
            .graph
            .iter()
            .filter(|(_, vertex)| {
                vertex.result.is_confirmed_equality()
                    && !self.written.contains(vertex.names[Side::Left].canonical())
            })
            .map(|(_, vertex)| vertex)
            .collect();
        let fresh = self.cache.update(candidates)?;
        self.written.extend(fresh.iter().cloned());
        // Reassigned even when empty: update reset the rollback window.
        self.last_batch = fresh;
        Ok(())
    }

    /// Extracts the group's report and releases the runner.
    ///
    /// Records are deduplicated by kind and name across entries; the
    /// first extraction wins, so a difference keeps the call path of
    /// the entry that reached it first.
    pub fn finish(self) -> Result<GroupReport> {
        let mut deduped: IndexMap<(DiffKind, String), DiffRecord> = IndexMap::new();
        for entry in &self.entries {
            for record in self.graph.to_fun_pair_list(entry, entry)? {
                deduped
                    .entry((record.kind, record.name.clone()))
                    .or_insert(record);
            }
        }
        Ok(GroupReport {
            left: self.left,
            right: self.right,
            functions: self.entries,
            result: self.graph.aggregate_result(),
            records: deduped.into_values().collect(),
            graph: self.graph.stats(),
            cache: self.cache.stats(),
        })
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Verdict and difference records of one module pair.
#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Entry functions compared, in plan order.
    pub functions: Vec<String>,
    /// Rolled-up verdict over every vertex of the group's graph.
    pub result: ResultKind,
    pub records: Vec<DiffRecord>,
    pub graph: GraphStats,
    pub cache: CacheStats,
}

impl GroupReport {
    /// True when the analyzer crashed or timed out on some function.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.graph.failures() > 0
    }
}

/// The folded report over every group of a plan.
#[derive(Debug, Serialize)]
pub struct AggregatedReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub tool_version: String,
    /// Worst verdict over all groups.
    pub result: ResultKind,
    pub groups: Vec<GroupReport>,
}

impl AggregatedReport {
    /// Folds group reports and stamps run metadata.
    #[must_use]
    pub fn new(groups: Vec<GroupReport>) -> Self {
        Self {
            generated_at: chrono::Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            result: ResultKind::aggregate(groups.iter().map(|group| group.result)),
            groups,
        }
    }

    /// Exit code for CI use. Degraded analyses outrank plain
    /// differences so a flaky analyzer cannot masquerade as a verdict.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.result.is_failure() {
            exit_codes::DEGRADED
        } else if matches!(self.result, ResultKind::NotEqual | ResultKind::Unknown) {
            exit_codes::DIFFERENCES_FOUND
        } else {
            exit_codes::SUCCESS
        }
    }
}

// ============================================================================
// Plan execution
// ============================================================================

/// Run-scoped settings for [`run_plan`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Root for persistent group caches; unset gives every group a
    /// throwaway directory.
    pub cache_root: Option<PathBuf>,
    /// Stop scheduling new groups after the first fatal error instead
    /// of letting the remaining groups finish.
    pub fail_fast: bool,
}

/// Runs every group of a plan and folds the reports.
///
/// Groups are independent and run on the rayon pool; functions inside a
/// group stay sequential. A group setup or extraction failure is fatal
/// for the whole run, while per-function analyzer failures only degrade
/// the affected group's verdict.
pub fn run_plan(
    analyzer: &(dyn FunctionAnalyzer + Sync),
    plan: &Plan,
    options: &RunOptions,
) -> Result<AggregatedReport> {
    plan.validate()?;
    let run_group = |group: &ComparisonGroup| {
        let mut runner = GroupRunner::new(analyzer, group, options.cache_root.as_deref())?;
        for function in &group.functions {
            runner.compare_function(function)?;
        }
        runner.finish()
    };

    let groups = if options.fail_fast {
        plan.groups
            .par_iter()
            .map(run_group)
            .collect::<Result<Vec<_>>>()?
    } else {
        let outcomes: Vec<Result<GroupReport>> = plan.groups.par_iter().map(run_group).collect();
        let mut groups = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            groups.push(outcome?);
        }
        groups
    };
    Ok(AggregatedReport::new(groups))
}
