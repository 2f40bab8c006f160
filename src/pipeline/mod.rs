//! Comparison run orchestration.
//!
//! A [`GroupRunner`] drives all entry functions of one module pair
//! sequentially against a shared comparison graph and equality cache.
//! [`run_plan`] runs independent groups in parallel and folds their
//! reports into one [`AggregatedReport`] whose [`exit_code`] is meant
//! for CI consumption.
//!
//! [`exit_code`]: AggregatedReport::exit_code

mod group;
mod output;

pub use group::{run_plan, AggregatedReport, GroupReport, GroupRunner, RunOptions};
pub use output::{render_report, write_report, OutputTarget};

// ============================================================================
// Exit codes
// ============================================================================

/// Exit codes for scripting and CI integration.
pub mod exit_codes {
    /// All compared functions are semantically equal.
    pub const SUCCESS: i32 = 0;

    /// At least one compared function differs or could not be decided.
    pub const DIFFERENCES_FOUND: i32 = 1;

    /// The analyzer crashed or timed out on at least one function, so
    /// the verdict is incomplete.
    pub const DEGRADED: i32 = 2;

    /// A fatal error aborted the run before a verdict was reached.
    pub const ERROR: i32 = 3;
}

// ============================================================================
// Directory helpers
// ============================================================================

/// Well-known directories used by the pipeline.
pub mod dirs {
    use std::path::PathBuf;

    /// Root directory for persistent equality caches when the user
    /// asks to keep them but names no location.
    ///
    /// Resolves to the platform cache directory (for example
    /// `~/.cache/kerndiff` on Linux), falling back to a `.kerndiff`
    /// directory under the working directory.
    #[must_use]
    pub fn default_cache_root() -> PathBuf {
        ::dirs::cache_dir()
            .map(|dir| dir.join("kerndiff"))
            .unwrap_or_else(|| PathBuf::from(".kerndiff"))
    }
}
