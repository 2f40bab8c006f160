//! Compare command handler.
//!
//! Implements the `compare` subcommand: resolves the analyzer and cache
//! placement from an effective configuration, runs the plan, and writes
//! the report.

use crate::analyzer::CommandAnalyzer;
use crate::config::{CompareConfig, Plan};
use crate::pipeline::{self, run_plan, write_report, RunOptions};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the compare command; returns the process exit code.
pub fn run_compare(config: &CompareConfig, plan: &Plan) -> Result<i32> {
    config.validate()?;
    plan.validate()?;

    let program = config
        .analyzer
        .clone()
        .context("no analyzer executable configured")?;
    let analyzer = CommandAnalyzer::new(program).with_args(config.analyzer_args.iter().cloned());

    let cache_root: Option<PathBuf> = match (&config.cache_dir, config.keep_cache) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(pipeline::dirs::default_cache_root()),
        (None, false) => None,
    };
    tracing::debug!(
        analyzer = %analyzer.program().display(),
        groups = plan.groups.len(),
        persistent_cache = cache_root.is_some(),
        "starting comparison run"
    );
    let options = RunOptions {
        cache_root,
        fail_fast: config.fail_fast,
    };

    let report = match config.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("worker pool setup failed")?;
            pool.install(|| run_plan(&analyzer, plan, &options))?
        }
        None => run_plan(&analyzer, plan, &options)?,
    };

    write_report(&report, &config.output)?;
    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, OutputFormat};
    use crate::pipeline::exit_codes;

    fn make_config(analyzer: &str) -> CompareConfig {
        CompareConfig {
            analyzer: Some(PathBuf::from(analyzer)),
            ..CompareConfig::default()
        }
    }

    fn make_plan() -> Plan {
        Plan::single(
            PathBuf::from("build/old.ll"),
            PathBuf::from("build/new.ll"),
            vec!["main".to_string()],
        )
    }

    #[test]
    fn test_missing_analyzer_is_rejected() {
        let config = CompareConfig::default();
        assert!(run_compare(&config, &make_plan()).is_err());
    }

    #[test]
    fn test_silent_analyzer_yields_degraded_exit_code() {
        // `true` exits zero without printing a report, so the requested
        // function degrades to an error record.
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = make_config("true");
        config.output = OutputConfig {
            format: OutputFormat::Json,
            file: Some(dir.path().join("report.json")),
        };
        let code = run_compare(&config, &make_plan()).expect("compare run");
        assert_eq!(code, exit_codes::DEGRADED);

        let report = std::fs::read_to_string(dir.path().join("report.json")).expect("report file");
        assert!(report.contains("\"error\""), "got: {report}");
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        let mut config = make_config("true");
        config.jobs = Some(0);
        assert!(run_compare(&config, &make_plan()).is_err());
    }
}
