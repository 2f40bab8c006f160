//! Comparison outcomes and their aggregation order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing one function pair.
///
/// Declaration order is the aggregation order: rolling up a subtree takes
/// the maximum over its members, so a single degraded leaf dominates the
/// group verdict. `AssumedEqual` sits directly below `NotEqual` so that any
/// concrete disagreement overrides an equality that was merely assumed,
/// while inconclusive outcomes rank above `NotEqual` so a degraded analysis
/// is never mistaken for a clean verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    /// Function bodies are syntactically identical.
    EqualSyntax,
    /// Proven semantically equal.
    Equal,
    /// Equal modulo assumptions reported by the analyzer.
    EqualUnderAssumptions,
    /// No body was available on at least one side; equality is provisional
    /// and may be upgraded or downgraded once a body turns up elsewhere.
    AssumedEqual,
    /// Proven semantically different.
    NotEqual,
    /// The analyzer could not decide.
    Unknown,
    /// The analyzer ran out of time.
    Timeout,
    /// The analyzer failed.
    Error,
}

impl ResultKind {
    /// Roll up a set of outcomes into the group verdict (monotonic max).
    ///
    /// An empty set aggregates to [`ResultKind::Equal`].
    #[must_use]
    pub fn aggregate(kinds: impl IntoIterator<Item = ResultKind>) -> ResultKind {
        kinds.into_iter().max().unwrap_or(ResultKind::Equal)
    }

    /// True once re-comparing this pair cannot improve the outcome.
    ///
    /// `Unknown` and `AssumedEqual` results are worth re-analyzing when more
    /// modules get linked in; everything else is settled.
    #[must_use]
    pub const fn is_conclusive(self) -> bool {
        !matches!(self, ResultKind::Unknown | ResultKind::AssumedEqual)
    }

    /// True for outcomes caused by analyzer failure rather than analysis.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, ResultKind::Timeout | ResultKind::Error)
    }

    /// True for equalities solid enough to persist across invocations.
    ///
    /// Assumed and assumption-laden equalities stay out of the cache;
    /// they can still be overturned.
    #[must_use]
    pub const fn is_confirmed_equality(self) -> bool {
        matches!(self, ResultKind::EqualSyntax | ResultKind::Equal)
    }

    /// The wire name of this outcome, as the analyzer emits it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResultKind::EqualSyntax => "equal-syntax",
            ResultKind::Equal => "equal",
            ResultKind::EqualUnderAssumptions => "equal-under-assumptions",
            ResultKind::AssumedEqual => "assumed-equal",
            ResultKind::NotEqual => "not-equal",
            ResultKind::Unknown => "unknown",
            ResultKind::Timeout => "timeout",
            ResultKind::Error => "error",
        }
    }

    /// All outcomes in aggregation order.
    pub const ALL: [ResultKind; 8] = [
        ResultKind::EqualSyntax,
        ResultKind::Equal,
        ResultKind::EqualUnderAssumptions,
        ResultKind::AssumedEqual,
        ResultKind::NotEqual,
        ResultKind::Unknown,
        ResultKind::Timeout,
        ResultKind::Error,
    ];
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
