//! Error-case corpus loading and case selection.
//!
//! The corpus is a YAML sequence of labeled error messages. Loading is
//! all-or-nothing: a single bad record fails the whole load.
use crate::error::EvalError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Default corpus location relative to the working directory.
pub const DEFAULT_CORPUS_PATH: &str = "eval/errors.yaml";

/// One labeled error message fed to the subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorCase {
    pub id: String,
    pub language: String,
    pub error_type: String,
    pub error_text: String,
}

/// How to narrow the loaded corpus before running.
#[derive(Debug, Clone, Default)]
pub struct CaseSelection {
    /// Exact id match; takes priority over `filter`.
    pub id: Option<String>,
    /// Case-insensitive substring over id and language.
    pub filter: Option<String>,
    pub limit: Option<usize>,
}

/// Load and validate every case in the corpus, preserving file order.
pub fn load_cases(path: &Path) -> Result<Vec<ErrorCase>, EvalError> {
    if !path.is_file() {
        return Err(EvalError::corpus(path, "file not found"));
    }
    let content = fs::read_to_string(path).map_err(|err| EvalError::corpus(path, err.to_string()))?;
    parse_cases(path, &content)
}

fn parse_cases(path: &Path, content: &str) -> Result<Vec<ErrorCase>, EvalError> {
    let raw: Vec<ErrorCase> =
        serde_yaml::from_str(content).map_err(|err| EvalError::corpus(path, err.to_string()))?;

    let mut seen = BTreeSet::new();
    let mut cases = Vec::with_capacity(raw.len());
    for mut case in raw {
        if !seen.insert(case.id.clone()) {
            return Err(EvalError::corpus(
                path,
                format!("duplicate case id {:?}", case.id),
            ));
        }
        let trimmed_len = case.error_text.trim_end_matches('\n').len();
        case.error_text.truncate(trimmed_len);
        cases.push(case);
    }
    Ok(cases)
}

/// Apply id/filter/limit selection. An id or filter that matches nothing is an error.
pub fn select_cases(
    cases: Vec<ErrorCase>,
    selection: &CaseSelection,
) -> Result<Vec<ErrorCase>, EvalError> {
    let mut selected = if let Some(id) = selection.id.as_deref() {
        let matched = filter_by_id(cases, id);
        if matched.is_empty() {
            return Err(EvalError::EmptySelection(format!("No case with id: {id}")));
        }
        matched
    } else if let Some(filter) = selection.filter.as_deref() {
        let matched = filter_by_substring(cases, filter);
        if matched.is_empty() {
            return Err(EvalError::EmptySelection(format!(
                "No cases match filter: {filter}"
            )));
        }
        matched
    } else {
        cases
    };

    if let Some(limit) = selection.limit {
        selected.truncate(limit);
    }
    Ok(selected)
}

pub fn filter_by_id(cases: Vec<ErrorCase>, id: &str) -> Vec<ErrorCase> {
    cases.into_iter().filter(|case| case.id == id).collect()
}

pub fn filter_by_substring(cases: Vec<ErrorCase>, needle: &str) -> Vec<ErrorCase> {
    let needle = needle.to_lowercase();
    cases
        .into_iter()
        .filter(|case| {
            case.id.to_lowercase().contains(&needle)
                || case.language.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
#[path = "corpus_tests.rs"]
mod tests;
