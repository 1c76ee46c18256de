//! Run driver: load, select, evaluate sequentially, report.
//!
//! Anything that prevents building the case list or resolving the subject
//! fails before the first case. Per-case failures are folded into results.
use crate::classify::{self, EvalResult};
use crate::cli::EvalArgs;
use crate::corpus::{self, ErrorCase};
use crate::discover;
use crate::report::{json, terminal, Palette};
use crate::stats;
use crate::subject::SubjectInvoker;
use anyhow::Result;
use std::io::{IsTerminal, Write};

/// How per-case and final output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Summary { verbose: bool },
    Detailed { show_input: bool },
    Json,
}

impl OutputMode {
    pub fn from_args(args: &EvalArgs) -> Self {
        if args.json {
            OutputMode::Json
        } else if args.detailed {
            OutputMode::Detailed {
                show_input: !args.hide_input,
            }
        } else {
            OutputMode::Summary {
                verbose: args.verbose,
            }
        }
    }
}

/// Evaluate every case in order. Never fails; subject errors become results.
pub fn evaluate_cases<'a, F>(
    invoker: &SubjectInvoker,
    cases: &'a [ErrorCase],
    mut on_result: F,
) -> Vec<EvalResult<'a>>
where
    F: FnMut(Progress<'_, 'a>),
{
    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        on_result(Progress::Started(case));
        let result = evaluate_case(invoker, case);
        on_result(Progress::Finished(&result));
        results.push(result);
    }
    results
}

/// Callback events emitted while the run progresses.
pub enum Progress<'r, 'a> {
    Started(&'a ErrorCase),
    Finished(&'r EvalResult<'a>),
}

pub fn evaluate_case<'a>(invoker: &SubjectInvoker, case: &'a ErrorCase) -> EvalResult<'a> {
    let result = match invoker.invoke(&case.error_text) {
        Ok(outcome) => classify::classify(case, outcome),
        Err(err) => {
            tracing::warn!(case = %case.id, error = %err, "subject invocation failed");
            classify::invocation_failed(case, &err.to_string())
        }
    };
    let outcome = result.outcome.as_ref();
    tracing::info!(
        case = %case.id,
        verdict = %result.verdict,
        elapsed_ms = result.elapsed_ms(),
        exit_code = ?outcome.and_then(|outcome| outcome.exit_code),
        stdout_bytes = outcome.map_or(0, |outcome| outcome.raw_stdout.len()),
        "case evaluated"
    );
    result
}

/// Full CLI run. Returns `Err` only for fatal setup failures.
pub fn run_eval(args: &EvalArgs, palette: &Palette) -> Result<()> {
    let subject = discover::resolve_subject(args.binary.as_deref())?;
    let cases = corpus::load_cases(&args.data)?;
    let cases = corpus::select_cases(cases, &args.selection())?;
    tracing::debug!(cases = cases.len(), subject = %subject.display(), "starting evaluation run");

    let mode = OutputMode::from_args(args);
    let invoker = SubjectInvoker::new(subject, args.timeout());
    let show_progress = std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();

    if mode != OutputMode::Json {
        write!(stdout, "{}", terminal::render_header(invoker.path(), cases.len(), palette))?;
        writeln!(stdout)?;
    }

    let results = evaluate_cases(&invoker, &cases, |event| {
        // Terminal writes are best effort; a closed stdout should not abort the run.
        let _ = match (event, mode) {
            (Progress::Started(case), OutputMode::Summary { .. }) if show_progress => {
                write!(stdout, "{}", terminal::render_progress(case, palette))
                    .and_then(|()| stdout.flush())
            }
            (Progress::Finished(result), OutputMode::Summary { verbose }) => {
                writeln!(stdout, "{}", terminal::render_summary_line(result, verbose, palette))
            }
            (Progress::Finished(result), OutputMode::Detailed { show_input }) => {
                write!(stdout, "{}", terminal::render_detailed(result, show_input, palette))
            }
            _ => Ok(()),
        };
    });

    let stats = stats::aggregate(&results);
    match mode {
        OutputMode::Json => {
            let text = json::render_json(invoker.path(), &args.data, &results, &stats)?;
            writeln!(stdout, "{text}")?;
        }
        _ => {
            writeln!(stdout, "{}", terminal::render_run_summary(&stats, palette))?;
        }
    }
    stdout.flush()?;
    Ok(())
}
