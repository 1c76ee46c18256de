//! Machine-readable JSON report. Field names and nesting are a stable interface.
use crate::classify::{EvalResult, Verdict};
use crate::stats::RunStats;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub binary: String,
    pub data: String,
    pub total: usize,
    pub results: Vec<JsonCaseResult>,
    pub stats: RunStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonCaseResult {
    pub id: String,
    pub language: String,
    pub error_type: String,
    pub success: bool,
    pub no_error_detected: bool,
    pub has_summary: bool,
    pub has_explanation: bool,
    pub has_suggestion: bool,
    pub inference_time_ms: u64,
    pub error_message: Option<String>,
    pub why_output: Value,
}

impl From<&EvalResult<'_>> for JsonCaseResult {
    fn from(result: &EvalResult<'_>) -> Self {
        Self {
            id: result.case.id.clone(),
            language: result.case.language.clone(),
            error_type: result.case.error_type.clone(),
            success: result.verdict == Verdict::Success,
            no_error_detected: result.verdict == Verdict::Inconclusive,
            has_summary: result.presence.has_summary,
            has_explanation: result.presence.has_explanation,
            has_suggestion: result.presence.has_suggestion,
            inference_time_ms: result.elapsed_ms(),
            error_message: result.error_message.clone(),
            why_output: result
                .outcome
                .as_ref()
                .map_or_else(|| Value::Object(Map::new()), |outcome| outcome.output.to_json()),
        }
    }
}

pub fn build_report(
    subject: &Path,
    corpus: &Path,
    results: &[EvalResult<'_>],
    stats: &RunStats,
) -> JsonReport {
    JsonReport {
        binary: subject.display().to_string(),
        data: corpus.display().to_string(),
        total: results.len(),
        results: results.iter().map(JsonCaseResult::from).collect(),
        stats: *stats,
    }
}

pub fn render_json(
    subject: &Path,
    corpus: &Path,
    results: &[EvalResult<'_>],
    stats: &RunStats,
) -> Result<String> {
    let report = build_report(subject, corpus, results, stats);
    serde_json::to_string_pretty(&report).context("serialize JSON report")
}
