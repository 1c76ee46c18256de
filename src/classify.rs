//! Response classification: turn one invocation outcome into a verdict.
//!
//! Rule priority: a `no_error` declaration wins over a parse error, which
//! wins over field-presence checks. Invocation failures short-circuit all
//! three and always yield `Failure`.
use crate::corpus::ErrorCase;
use crate::subject::{InvocationOutcome, StructuredResponse};
use std::fmt;

pub const PARSE_ERROR_MESSAGE: &str = "Failed to parse JSON output";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
    /// The subject declared the input contains no actionable error.
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Success => "success",
            Verdict::Failure => "failure",
            Verdict::Inconclusive => "inconclusive",
        };
        f.write_str(label)
    }
}

/// Which diagnosis fields were present and non-blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub has_summary: bool,
    pub has_explanation: bool,
    pub has_suggestion: bool,
}

impl Presence {
    pub fn of(response: &StructuredResponse) -> Self {
        Self {
            has_summary: non_blank(response.summary.as_deref()),
            has_explanation: non_blank(response.explanation.as_deref()),
            has_suggestion: non_blank(response.suggestion.as_deref()),
        }
    }

    /// Names of the present fields, in report order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.has_summary, "summary"),
            (self.has_explanation, "explanation"),
            (self.has_suggestion, "suggestion"),
        ]
        .into_iter()
        .filter_map(|(present, label)| present.then_some(label))
        .collect()
    }
}

/// One evaluated case.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult<'a> {
    pub case: &'a ErrorCase,
    /// `None` when the subject could not be run at all.
    pub outcome: Option<InvocationOutcome>,
    pub verdict: Verdict,
    pub presence: Presence,
    pub error_message: Option<String>,
}

impl EvalResult<'_> {
    pub fn elapsed_ms(&self) -> u64 {
        self.outcome.as_ref().map_or(0, |outcome| outcome.elapsed_ms)
    }

    pub fn response(&self) -> Option<&StructuredResponse> {
        self.outcome.as_ref().and_then(|outcome| outcome.output.response())
    }
}

/// Derive the verdict for a completed invocation.
pub fn classify(case: &ErrorCase, outcome: InvocationOutcome) -> EvalResult<'_> {
    let response = outcome.output.response();

    let (verdict, presence, error_message) = if response.and_then(|r| r.no_error) == Some(true) {
        (Verdict::Inconclusive, Presence::default(), None)
    } else if outcome.output.is_parse_error() {
        (
            Verdict::Failure,
            Presence::default(),
            Some(PARSE_ERROR_MESSAGE.to_string()),
        )
    } else {
        let presence = response.map(Presence::of).unwrap_or_default();
        let verdict = if presence.has_summary || presence.has_explanation {
            Verdict::Success
        } else {
            Verdict::Failure
        };
        (verdict, presence, None)
    };

    EvalResult {
        case,
        outcome: Some(outcome),
        verdict,
        presence,
        error_message,
    }
}

/// Result for a case whose subject invocation failed before classification.
pub fn invocation_failed<'a>(case: &'a ErrorCase, message: &str) -> EvalResult<'a> {
    EvalResult {
        case,
        outcome: None,
        verdict: Verdict::Failure,
        presence: Presence::default(),
        error_message: Some(format!("why failed: {message}")),
    }
}

fn non_blank(field: Option<&str>) -> bool {
    field.is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
