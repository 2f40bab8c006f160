//! YAML record format produced by the analyzer.
//!
//! One document per invocation, a list of records, one record per
//! compared function pair. Field names are kebab-case on the wire.
//! Optional fields stay optional here; the graph layer decides what a
//! missing file or line means.

use crate::error::Result;
use crate::model::ResultKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One compared function pair as reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComparisonRecord {
    pub first: FunctionInfo,
    pub second: FunctionInfo,
    pub result: ResultKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differing_objects: Vec<DifferingObject>,
}

impl ComparisonRecord {
    /// Synthesizes a record for a function the analyzer failed on, so
    /// the failure aggregates like any other outcome.
    #[must_use]
    pub fn failure(function: &str, result: ResultKind) -> Self {
        Self {
            first: FunctionInfo::named(function),
            second: FunctionInfo::named(function),
            result,
            differing_objects: Vec::new(),
        }
    }
}

/// One side of a compared pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionInfo {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Call sites observed in this side's body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<SourceRef>,
}

impl FunctionInfo {
    #[must_use]
    pub fn named(function: &str) -> Self {
        Self {
            function: function.to_string(),
            file: None,
            line: None,
            calls: Vec::new(),
        }
    }
}

/// A function occurrence at a source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceRef {
    pub function: String,
    pub file: PathBuf,
    pub line: u32,
}

/// A non-function difference attached to a record.
///
/// Untagged on the wire; the type variant is tried first because its
/// required location fields never appear on a syntax record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifferingObject {
    Type(TypeDiffRecord),
    Syntax(SyntaxDiffRecord),
}

/// Differing macro or inline-asm body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyntaxDiffRecord {
    pub name: String,
    /// Function whose comparison surfaced the difference.
    pub function: String,
    #[serde(default)]
    pub stack_first: Vec<SourceRef>,
    #[serde(default)]
    pub stack_second: Vec<SourceRef>,
    pub body_first: String,
    pub body_second: String,
}

/// Differing composite type layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDiffRecord {
    pub name: String,
    pub function: String,
    #[serde(default)]
    pub stack_first: Vec<SourceRef>,
    #[serde(default)]
    pub stack_second: Vec<SourceRef>,
    pub file_first: PathBuf,
    pub file_second: PathBuf,
    pub line_first: u32,
    pub line_second: u32,
}

/// Parses one analyzer report document.
///
/// A blank document is a valid empty report. Anything else must be a
/// YAML list of [`ComparisonRecord`]s.
///
/// # Errors
///
/// Malformed YAML is fatal; a half-read report must never feed the
/// graph.
pub fn parse_report(text: &str) -> Result<Vec<ComparisonRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records = serde_yaml_ng::from_str(text)?;
    Ok(records)
}
