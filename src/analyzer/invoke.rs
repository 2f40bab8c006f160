//! Launching the external analyzer.
//!
//! The analyzer is an SMT-backed comparator invoked once per entry
//! function. It prints its report to stdout and reads previously
//! confirmed equalities from the cache directory it is handed. Process
//! failures degrade into error records so one broken comparison never
//! takes down the rest of a group.

use crate::analyzer::wire::{parse_report, ComparisonRecord};
use crate::error::{ErrorContext, KernDiffError, Result};
use crate::model::ResultKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One comparison the analyzer is asked to run.
#[derive(Debug, Clone)]
pub struct CompareRequest<'a> {
    pub left_module: &'a Path,
    pub right_module: &'a Path,
    pub function: &'a str,
    /// Equality cache directory to share with the analyzer, if any.
    pub cache_dir: Option<&'a Path>,
}

/// Produces comparison records for one entry function.
///
/// The production implementation shells out; tests substitute canned
/// reports.
pub trait FunctionAnalyzer {
    /// Compares `request.function` between the two modules.
    ///
    /// # Errors
    ///
    /// Implementations fail only for conditions that invalidate the
    /// whole group, such as an unlaunchable binary or an unreadable
    /// report. Per-function analysis failures are returned as records
    /// with a failure result instead.
    fn compare(&self, request: &CompareRequest<'_>) -> Result<Vec<ComparisonRecord>>;
}

/// Analyzer invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Appends pass-through arguments placed after the standard ones.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl FunctionAnalyzer for CommandAnalyzer {
    fn compare(&self, request: &CompareRequest<'_>) -> Result<Vec<ComparisonRecord>> {
        let mut command = Command::new(&self.program);
        command
            .arg("--first")
            .arg(request.left_module)
            .arg("--second")
            .arg(request.right_module)
            .arg("--function")
            .arg(request.function);
        if let Some(cache_dir) = request.cache_dir {
            command.arg("--cache-dir").arg(cache_dir);
        }
        command
            .args(&self.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            program = %self.program.display(),
            function = request.function,
            "launching analyzer"
        );
        let output = command.output().map_err(|err| {
            KernDiffError::launch(self.program.display().to_string(), err.to_string())
        })?;

        if !output.status.success() {
            tracing::warn!(
                function = request.function,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "analyzer failed, recording an error result"
            );
            return Ok(vec![ComparisonRecord::failure(
                request.function,
                ResultKind::Error,
            )]);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_report(&stdout).with_context(|| format!("report for '{}'", request.function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request<'a>(function: &'a str) -> CompareRequest<'a> {
        CompareRequest {
            left_module: Path::new("old/vmlinux.ll"),
            right_module: Path::new("new/vmlinux.ll"),
            function,
            cache_dir: None,
        }
    }

    #[test]
    fn test_unlaunchable_program_is_fatal() {
        let analyzer = CommandAnalyzer::new("/nonexistent/analyzer-binary");
        let err = analyzer
            .compare(&make_request("main_function"))
            .expect_err("spawn must fail");
        assert!(err.to_string().contains("analyzer-binary"));
    }

    #[test]
    fn test_failing_analyzer_degrades_to_an_error_record() {
        let analyzer = CommandAnalyzer::new("false");
        let records = analyzer
            .compare(&make_request("main_function"))
            .expect("failure records are data");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result, ResultKind::Error);
        assert_eq!(records[0].first.function, "main_function");
    }

    #[test]
    fn test_quiet_success_is_an_empty_report() {
        let analyzer = CommandAnalyzer::new("true");
        let records = analyzer
            .compare(&make_request("main_function"))
            .expect("empty report");
        assert!(records.is_empty());
    }
}
