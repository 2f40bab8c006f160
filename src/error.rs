//! Unified error types for kerndiff.
//!
//! Fatal conditions only: degraded analyzer outcomes (timeouts, solver
//! errors) are recorded as graph vertices, never surfaced through this
//! module.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kerndiff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KernDiffError {
    /// Errors talking to the external analyzer
    #[error("Analyzer invocation failed: {context}")]
    Analyzer {
        context: String,
        #[source]
        source: AnalyzerErrorKind,
    },

    /// Errors in comparison graph construction or queries
    #[error("Comparison graph error: {context}")]
    Graph {
        context: String,
        #[source]
        source: GraphErrorKind,
    },

    /// Errors in the persistent equality cache
    #[error("Equality cache error: {context}")]
    Cache {
        context: String,
        #[source]
        source: CacheErrorKind,
    },

    /// Errors during report extraction or serialization
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific analyzer error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalyzerErrorKind {
    #[error("Invalid YAML in analyzer output: {0}")]
    InvalidYaml(String),

    #[error("Could not launch '{program}': {message}")]
    Launch { program: String, message: String },
}

/// Specific comparison graph error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GraphErrorKind {
    #[error("Queued variant '{name}' has no vertex - insertion contract broken")]
    UnresolvedVariant { name: String },

    #[error("Function '{name}' is not present in the graph")]
    UnknownFunction { name: String },
}

/// Specific equality cache error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CacheErrorKind {
    #[error("Cache directory unavailable: {path:?}: {message}")]
    DirectoryUnavailable { path: PathBuf, message: String },

    #[error("Rollback of {rollback} bytes exceeds file length {len}: {path:?}")]
    RollbackBeyondStart {
        path: PathBuf,
        len: u64,
        rollback: u64,
    },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Entry function '{function}' was never compared")]
    MissingEntry { function: String },

    #[error("No call path recorded for '{function}'")]
    CallstackUnavailable { function: String },

    #[error("Report serialization failed: {0}")]
    Serialization(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for kerndiff operations
pub type Result<T> = std::result::Result<T, KernDiffError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl KernDiffError {
    /// Create an analyzer error with context
    pub fn analyzer(context: impl Into<String>, source: AnalyzerErrorKind) -> Self {
        Self::Analyzer {
            context: context.into(),
            source,
        }
    }

    /// Create an analyzer launch error
    pub fn launch(program: impl Into<String>, message: impl Into<String>) -> Self {
        let program = program.into();
        Self::analyzer(
            format!("spawning '{program}'"),
            AnalyzerErrorKind::Launch {
                program,
                message: message.into(),
            },
        )
    }

    /// Create a graph error with context
    pub fn graph(context: impl Into<String>, source: GraphErrorKind) -> Self {
        Self::Graph {
            context: context.into(),
            source,
        }
    }

    /// Create a graph error for an unresolved variant name
    pub fn unresolved_variant(name: impl Into<String>) -> Self {
        Self::graph(
            "normalization",
            GraphErrorKind::UnresolvedVariant { name: name.into() },
        )
    }

    /// Create a graph error for a function missing from the graph
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::graph(
            "lookup",
            GraphErrorKind::UnknownFunction { name: name.into() },
        )
    }

    /// Create a cache error with context
    pub fn cache(context: impl Into<String>, source: CacheErrorKind) -> Self {
        Self::Cache {
            context: context.into(),
            source,
        }
    }

    /// Create a report error with context
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for KernDiffError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_yaml_ng::Error> for KernDiffError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::analyzer(
            "YAML deserialization",
            AnalyzerErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

impl From<serde_json::Error> for KernDiffError {
    fn from(err: serde_json::Error) -> Self {
        Self::report(
            "JSON serialization",
            ReportErrorKind::Serialization(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// building a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (only evaluated on error).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<KernDiffError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: KernDiffError, new_ctx: &str) -> KernDiffError {
    match err {
        KernDiffError::Analyzer {
            context: existing,
            source,
        } => KernDiffError::Analyzer {
            context: chain_context(new_ctx, &existing),
            source,
        },
        KernDiffError::Graph {
            context: existing,
            source,
        } => KernDiffError::Graph {
            context: chain_context(new_ctx, &existing),
            source,
        },
        KernDiffError::Cache {
            context: existing,
            source,
        } => KernDiffError::Cache {
            context: chain_context(new_ctx, &existing),
            source,
        },
        KernDiffError::Report {
            context: existing,
            source,
        } => KernDiffError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        KernDiffError::Io {
            path,
            message,
            source,
        } => KernDiffError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        KernDiffError::Config(msg) => KernDiffError::Config(chain_context(new_ctx, &msg)),
        KernDiffError::Validation(msg) => KernDiffError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| KernDiffError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| KernDiffError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KernDiffError::unresolved_variant("do_check.void");
        let display = err.to_string();
        assert!(
            display.contains("graph"),
            "Error message should mention the graph: {}",
            display
        );

        let err = KernDiffError::launch("simpll-cmp", "No such file or directory");
        let display = err.to_string();
        assert!(
            display.contains("simpll-cmp"),
            "Error message should name the analyzer binary: {}",
            display
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = KernDiffError::io("/tmp/kerndiff/cache", io_err);

        assert!(err.to_string().contains("/tmp/kerndiff/cache"));
    }

    #[test]
    fn test_context_chaining() {
        let initial_err: Result<()> = Err(KernDiffError::graph(
            "initial context",
            GraphErrorKind::UnknownFunction {
                name: "do_check".to_string(),
            },
        ));

        let err_with_context = initial_err.context("outer context");

        match err_with_context {
            Err(KernDiffError::Graph { context, .. }) => {
                assert!(
                    context.contains("outer context"),
                    "Should contain outer context: {}",
                    context
                );
                assert!(
                    context.contains("initial context"),
                    "Should contain initial context: {}",
                    context
                );
            }
            _ => panic!("Expected Graph error"),
        }
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(KernDiffError::cache(
                "base",
                CacheErrorKind::DirectoryUnavailable {
                    path: PathBuf::from("/nope"),
                    message: "read-only filesystem".to_string(),
                },
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(KernDiffError::Cache { context, .. }) => {
                assert!(context.contains("outer layer"), "Missing outer: {}", context);
                assert!(
                    context.contains("middle layer"),
                    "Missing middle: {}",
                    context
                );
                assert!(context.contains("base"), "Missing base: {}", context);
            }
            _ => panic!("Expected Cache error"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(KernDiffError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let some_value: Option<i32> = Some(42);
        let result = some_value.context_none("missing value");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);

        let none_value: Option<i32> = None;
        let result = none_value.context_none("missing value");
        match result {
            Err(KernDiffError::Validation(msg)) => {
                assert_eq!(msg, "missing value");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
        assert_eq!(
            chain_context("outer", "middle: inner"),
            "outer: middle: inner"
        );
    }
}
