//! Human-readable terminal report.
//!
//! Two richness levels: a one-line summary per case (optionally with a
//! summary preview) and a detailed block with markdown-rendered fields.
use super::markdown::render_markdown;
use super::Palette;
use crate::classify::{EvalResult, Verdict};
use crate::corpus::ErrorCase;
use crate::stats::RunStats;
use crate::subject::{ResponseStats, SubjectOutput};
use crate::util::{rule, truncate_chars};
use std::fmt::Write as _;
use std::path::Path;

const RULE_WIDTH: usize = 70;
const SUMMARY_PREVIEW_CHARS: usize = 80;
const INPUT_PREVIEW_LINES: usize = 8;
const INPUT_LINE_CHARS: usize = 90;
const RAW_OUTPUT_PREVIEW_CHARS: usize = 200;
const FIELD_INDENT: &str = "    ";

pub fn render_header(subject: &Path, case_count: usize, c: &Palette) -> String {
    format!(
        "\n{}why eval{}\n{}Binary: {}{}\n{}Cases: {case_count}{}\n",
        c.bold(),
        c.reset(),
        c.dim(),
        subject.display(),
        c.reset(),
        c.dim(),
        c.reset(),
    )
}

/// Transient progress line; ends in `\r` so the result line overwrites it.
pub fn render_progress(case: &ErrorCase, c: &Palette) -> String {
    format!("  {}Running {}...{}\r", c.dim(), case.id, c.reset())
}

/// One status line per result, plus a summary preview when verbose.
pub fn render_summary_line(result: &EvalResult<'_>, verbose: bool, c: &Palette) -> String {
    let (icon, status) = match result.verdict {
        Verdict::Inconclusive => (
            format!("{}?{}", c.yellow(), c.reset()),
            format!("{}no error detected{}", c.yellow(), c.reset()),
        ),
        Verdict::Success => (
            format!("{}✓{}", c.green(), c.reset()),
            format!("{}{}{}", c.green(), result.presence.labels().join(", "), c.reset()),
        ),
        Verdict::Failure => {
            let mut status = format!("{}failed{}", c.red(), c.reset());
            if let Some(message) = result.error_message.as_deref() {
                let _ = write!(status, " ({message})");
            }
            (format!("{}✗{}", c.red(), c.reset()), status)
        }
    };

    let elapsed = result.elapsed_ms();
    let timing = if elapsed > 0 {
        format!(" {}({elapsed}ms){}", c.dim(), c.reset())
    } else {
        String::new()
    };

    let mut out = format!(
        "  {icon} {}{}{} [{}] - {status}{timing}",
        c.bold(),
        result.case.id,
        c.reset(),
        result.case.language,
    );

    if verbose && result.verdict == Verdict::Success {
        if let Some(summary) = result
            .response()
            .and_then(|response| response.summary.as_deref())
            .filter(|summary| !summary.is_empty())
        {
            let _ = write!(
                out,
                "\n      {}Summary:{} {}...",
                c.cyan(),
                c.reset(),
                truncate_chars(summary, SUMMARY_PREVIEW_CHARS)
            );
        }
    }
    out
}

/// Full per-case block: header, optional input echo, rendered response.
pub fn render_detailed(result: &EvalResult<'_>, show_input: bool, c: &Palette) -> String {
    let case = result.case;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}{}{}", c.bold(), rule('═', RULE_WIDTH), c.reset());
    let _ = writeln!(out, "{}{}{} [{}]", c.bold(), case.id, c.reset(), case.language);
    let _ = writeln!(out, "{}Error type: {}{}", c.dim(), case.error_type, c.reset());
    let _ = writeln!(out, "{}{}{}", c.bold(), rule('─', RULE_WIDTH), c.reset());

    if show_input {
        let _ = writeln!(out, "\n{}▸ Input Error:{}", c.blue(), c.reset());
        let lines: Vec<&str> = case.error_text.trim().split('\n').collect();
        for line in lines.iter().take(INPUT_PREVIEW_LINES) {
            let _ = writeln!(
                out,
                "  {}{}{}",
                c.dim(),
                truncate_chars(line, INPUT_LINE_CHARS),
                c.reset()
            );
        }
        if lines.len() > INPUT_PREVIEW_LINES {
            let _ = writeln!(
                out,
                "  {}... ({} more lines){}",
                c.dim(),
                lines.len() - INPUT_PREVIEW_LINES,
                c.reset()
            );
        }
    }

    let _ = writeln!(out, "\n{}▸ Why Output:{}", c.blue(), c.reset());

    let output = result.outcome.as_ref().map(|outcome| &outcome.output);
    match (result.verdict, output) {
        (Verdict::Inconclusive, _) => {
            let _ = writeln!(out, "  {}No error detected in input{}", c.yellow(), c.reset());
        }
        (_, Some(SubjectOutput::Unparseable { raw_output })) => {
            let _ = writeln!(out, "  {}Failed to parse JSON output{}", c.red(), c.reset());
            let _ = writeln!(
                out,
                "  {}{}{}",
                c.dim(),
                truncate_chars(raw_output, RAW_OUTPUT_PREVIEW_CHARS),
                c.reset()
            );
        }
        (Verdict::Success, Some(SubjectOutput::Parsed { response, .. })) => {
            let fields = [
                ("Summary:", c.white(), response.summary.as_deref()),
                ("Explanation:", c.blue(), response.explanation.as_deref()),
                ("Suggestion:", c.green(), response.suggestion.as_deref()),
            ];
            for (label, color, text) in fields {
                if let Some(text) = text.filter(|text| !text.is_empty()) {
                    let _ = writeln!(out, "\n  {color}{}{label}{}", c.bold(), c.reset());
                    let _ = writeln!(out, "{}", render_markdown(text, FIELD_INDENT, c));
                }
            }
            if let Some(stats) = response.stats.as_ref() {
                render_response_stats(&mut out, stats, c);
            }
        }
        _ => {
            let message = result
                .error_message
                .as_deref()
                .unwrap_or("no summary or explanation in response");
            let _ = writeln!(out, "  {}Failed: {message}{}", c.red(), c.reset());
            if let Some(stderr) = result
                .outcome
                .as_ref()
                .map(|outcome| outcome.raw_stderr.trim())
                .filter(|stderr| !stderr.is_empty())
            {
                let _ = writeln!(
                    out,
                    "  {}{}{}",
                    c.dim(),
                    truncate_chars(stderr, RAW_OUTPUT_PREVIEW_CHARS),
                    c.reset()
                );
            }
        }
    }

    out
}

fn render_response_stats(out: &mut String, stats: &ResponseStats, c: &Palette) {
    let _ = writeln!(out, "\n  {}Stats:{}", c.magenta(), c.reset());
    let _ = writeln!(
        out,
        "    Backend: {}",
        stats.backend.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(
        out,
        "    Tokens: prompt {}, gen {}",
        stats.prompt_tokens.unwrap_or(0),
        stats.generated_tokens.unwrap_or(0)
    );
    let _ = writeln!(out, "    Speed: {:.1} tok/s", stats.gen_tok_per_s.unwrap_or(0.0));
}

/// Closing run summary.
pub fn render_run_summary(stats: &RunStats, c: &Palette) -> String {
    let total = stats.total();
    let mut out = format!("\n{}Summary{}\n", c.bold(), c.reset());
    let _ = writeln!(out, "  {}Success:{} {}/{total}", c.green(), c.reset(), stats.success);
    if stats.failed > 0 {
        let _ = writeln!(out, "  {}Failed:{} {}", c.red(), c.reset(), stats.failed);
    }
    if stats.no_error_detected > 0 {
        let _ = writeln!(
            out,
            "  {}No error detected:{} {}",
            c.yellow(),
            c.reset(),
            stats.no_error_detected
        );
    }
    let _ = writeln!(
        out,
        "  {}Avg inference:{} {}ms",
        c.magenta(),
        c.reset(),
        stats.avg_inference_ms
    );
    out
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
