//! Run settings and comparison plans.
//!
//! Two YAML surfaces exist. An optional settings file carries the
//! analyzer location, output preferences, and parallelism, and is
//! discovered from the usual places; CLI flags override it. A plan file
//! lists the module pairs and entry functions to compare.
//!
//! # Plan file
//!
//! ```yaml
//! groups:
//!   - left: old/net/ipv4.ll
//!     right: new/net/ipv4.ll
//!     functions:
//!       - tcp_connect
//!       - tcp_close
//! ```

use crate::error::{KernDiffError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Run settings
// ============================================================================

/// Settings for a comparison run, loadable from a config file.
///
/// Everything is optional here; the CLI supplies or overrides values,
/// and [`CompareConfig::validate`] decides whether the merged result is
/// runnable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompareConfig {
    /// Analyzer binary invoked for every entry function.
    pub analyzer: Option<PathBuf>,
    /// Extra arguments appended to every analyzer invocation.
    pub analyzer_args: Vec<String>,
    /// Persistent equality cache directory. Unset means one throwaway
    /// directory per comparison group.
    pub cache_dir: Option<PathBuf>,
    /// Keep group caches on disk after the run.
    pub keep_cache: bool,
    /// Report format and destination.
    pub output: OutputConfig,
    /// Worker threads for comparison groups; unset uses all cores.
    pub jobs: Option<usize>,
    /// Abort the run at the first fatal group error instead of letting
    /// the remaining groups finish.
    pub fail_fast: bool,
}

impl CompareConfig {
    /// Checks that the merged settings can drive a run.
    pub fn validate(&self) -> Result<()> {
        let Some(analyzer) = &self.analyzer else {
            return Err(KernDiffError::config(
                "no analyzer binary given (flag --analyzer or config key 'analyzer')",
            ));
        };
        if analyzer.as_os_str().is_empty() {
            return Err(KernDiffError::config("analyzer binary path is empty"));
        }
        if self.jobs == Some(0) {
            return Err(KernDiffError::config("jobs must be at least 1"));
        }
        Ok(())
    }
}

/// Where and how the aggregated report is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Report file; stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Report rendering formats.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-group counts and the rolled-up verdict.
    #[default]
    Summary,
    /// Full record list as JSON.
    Json,
    /// Full record list as YAML.
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutputFormat::Summary => "summary",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Comparison plans
// ============================================================================

/// One module pair compared in isolation, with its own graph and cache.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonGroup {
    /// Old-side module.
    pub left: PathBuf,
    /// New-side module.
    pub right: PathBuf,
    /// Entry functions compared within this group, in order.
    pub functions: Vec<String>,
}

/// Everything one run compares.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    pub groups: Vec<ComparisonGroup>,
}

impl Plan {
    /// A plan with a single group, as assembled from direct CLI flags.
    #[must_use]
    pub fn single(left: PathBuf, right: PathBuf, functions: Vec<String>) -> Self {
        Self {
            groups: vec![ComparisonGroup {
                left,
                right,
                functions,
            }],
        }
    }

    /// Loads a plan file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|err| KernDiffError::io(path, err))?;
        let plan: Plan = serde_yaml_ng::from_str(&content).map_err(|err| {
            KernDiffError::config(format!("plan file {}: {err}", path.display()))
        })?;
        Ok(plan)
    }

    /// Rejects plans that cannot produce any comparison.
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(KernDiffError::validation(
                "plan contains no comparison groups",
            ));
        }
        for (index, group) in self.groups.iter().enumerate() {
            if group.functions.is_empty() {
                return Err(KernDiffError::validation(format!(
                    "group {index} ({} vs {}) lists no functions",
                    group.left.display(),
                    group.right.display()
                )));
            }
            if group.functions.iter().any(|f| f.trim().is_empty()) {
                return Err(KernDiffError::validation(format!(
                    "group {index} contains an empty function name"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Config file discovery and loading
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[".kerndiff.yaml", ".kerndiff.yml", "kerndiff.yaml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Current directory
/// 2. User config directory (~/.config/kerndiff/)
/// 3. Home directory
#[must_use]
pub fn discover_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join("kerndiff")) {
            return Some(path);
        }
    }
    if let Some(home) = dirs::home_dir() {
        if let Some(path) = find_config_in_dir(&home) {
            return Some(path);
        }
    }
    None
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Load a [`CompareConfig`] from a YAML file.
pub fn load_config_file(path: &Path) -> Result<CompareConfig> {
    let content = std::fs::read_to_string(path).map_err(|err| KernDiffError::io(path, err))?;
    let config = serde_yaml_ng::from_str(&content).map_err(|err| {
        KernDiffError::config(format!("config file {}: {err}", path.display()))
    })?;
    Ok(config)
}

/// Load config from a discovered file, or fall back to defaults.
#[must_use]
pub fn load_or_default() -> (CompareConfig, Option<PathBuf>) {
    match discover_config_file() {
        None => (CompareConfig::default(), None),
        Some(path) => match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(err) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), err);
                (CompareConfig::default(), None)
            }
        },
    }
}

// ============================================================================
// JSON Schema generation
// ============================================================================

/// JSON Schema for the settings file format, for editor validation.
#[must_use]
pub fn config_schema_json() -> String {
    let schema = schemars::schema_for!(CompareConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

/// JSON Schema for plan files.
#[must_use]
pub fn plan_schema_json() -> String {
    let schema = schemars::schema_for!(Plan);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

/// Commented starter settings file, written by `kerndiff config init`.
#[must_use]
pub fn example_config() -> &'static str {
    r#"# kerndiff settings
#
# Values here are defaults; command-line flags override them.

# Analyzer executable invoked once per entry function.
analyzer: /usr/local/bin/semdiff

# Extra arguments appended to every analyzer invocation.
analyzer_args: []

# Persistent equality cache root. Comment out to use throwaway caches.
# cache_dir: ~/.cache/kerndiff

# Keep caches under the default root even without cache_dir.
keep_cache: false

output:
  # summary, json, or yaml
  format: summary
  # Report file; omit to print to stdout.
  # file: report.json

# Worker threads for independent comparison groups; omit for the
# rayon default.
# jobs: 4

# Abort at the first fatal group error instead of finishing the
# remaining groups.
fail_fast: false
"#
}
