//! Report rendering and delivery.
//!
//! Structured formats serialize [`AggregatedReport`] as-is; the summary
//! format is a compact human rendering with one block per group and the
//! call path of every reported difference.

use super::AggregatedReport;
use crate::config::{OutputConfig, OutputFormat};
use crate::error::{KernDiffError, ReportErrorKind, Result};
use crate::report::DiffEndpoint;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Where a rendered report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    #[must_use]
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stdout,
        }
    }
}

/// Renders a report in the requested format.
pub fn render_report(report: &AggregatedReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Summary => Ok(render_summary(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        // From<serde_yaml_ng::Error> maps to the analyzer parse bucket,
        // wrong for rendering.
        OutputFormat::Yaml => serde_yaml_ng::to_string(report).map_err(|err| {
            KernDiffError::report(
                "YAML rendering",
                ReportErrorKind::Serialization(err.to_string()),
            )
        }),
    }
}

/// Renders and delivers a report per the output settings.
pub fn write_report(report: &AggregatedReport, output: &OutputConfig) -> Result<()> {
    let content = render_report(report, output.format)?;
    match OutputTarget::from_option(output.file.as_deref()) {
        OutputTarget::Stdout => println!("{}", content.trim_end_matches('\n')),
        OutputTarget::File(path) => {
            std::fs::write(&path, &content).map_err(|err| KernDiffError::io(path.clone(), err))?;
            tracing::info!("Report written to {}", path.display());
        }
    }
    Ok(())
}

fn render_summary(report: &AggregatedReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "kerndiff {} ({})",
        report.tool_version, report.generated_at
    );
    let _ = writeln!(out, "overall result: {}", report.result);

    for group in &report.groups {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} vs {}: {}",
            group.left.display(),
            group.right.display(),
            group.result
        );
        let _ = writeln!(out, "  entries: {}", group.functions.join(", "));

        let mut counts = String::new();
        for (kind, count) in &group.graph.by_result {
            if !counts.is_empty() {
                counts.push_str(", ");
            }
            let _ = write!(counts, "{kind} {count}");
        }
        if counts.is_empty() {
            let _ = writeln!(out, "  vertices: {}", group.graph.vertices);
        } else {
            let _ = writeln!(out, "  vertices: {} ({counts})", group.graph.vertices);
        }
        let _ = writeln!(
            out,
            "  cache: {} lines written, {} skipped, {} bytes rolled back",
            group.cache.lines_written, group.cache.lines_skipped, group.cache.bytes_rolled_back
        );

        if group.records.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  differences:");
        for record in &group.records {
            let _ = writeln!(out, "    {} {} [{}]", record.kind, record.name, record.result);
            render_endpoint(&mut out, "left", &record.left);
            render_endpoint(&mut out, "right", &record.right);
        }
    }
    out
}

fn render_endpoint(out: &mut String, label: &str, endpoint: &DiffEndpoint) {
    match (&endpoint.file, endpoint.line) {
        (Some(file), Some(line)) => {
            let _ = writeln!(
                out,
                "      {label}: {} at {}:{line}",
                endpoint.name,
                file.display()
            );
        }
        _ => {
            let _ = writeln!(out, "      {label}: {}", endpoint.name);
        }
    }
    for hop in endpoint.callstack.lines() {
        let _ = writeln!(out, "        {hop}");
    }
}
