//! Subject invocation: run the `why` binary once per case and capture its output.
//!
//! The subject receives the error text on stdin and is asked for structured
//! JSON output with inference stats. A malformed JSON body is data, not a
//! fault; only launch and IO failures become `EvalError::SubjectInvocation`.
use crate::error::EvalError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Flags requesting structured output and stats inclusion.
pub const SUBJECT_FLAGS: [&str; 2] = ["--json", "--stats"];

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Decoded subject response. Every field is optional.
///
/// Fields are decoded independently: a value of the wrong type reads as
/// absent instead of rejecting the whole object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub suggestion: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub no_error: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub stats: Option<ResponseStats>,
}

/// Inference stats reported by the subject; informational only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseStats {
    #[serde(default, deserialize_with = "lenient")]
    pub backend: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub generated_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub gen_tok_per_s: Option<f64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// What the subject printed, after the decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectOutput {
    /// Stdout decoded as a JSON object; `raw` keeps unknown keys too.
    Parsed {
        response: StructuredResponse,
        raw: Value,
    },
    /// Non-empty stdout that is not a JSON object.
    Unparseable { raw_output: String },
    /// Nothing on stdout; no decode was attempted.
    Empty { raw_output: String, stderr: String },
}

impl SubjectOutput {
    /// Build the output from captured stdout/stderr.
    pub fn from_captured(stdout: &str, stderr: &str) -> Self {
        if stdout.trim().is_empty() {
            return SubjectOutput::Empty {
                raw_output: stdout.to_string(),
                stderr: stderr.to_string(),
            };
        }
        let decoded = serde_json::from_str::<Value>(stdout)
            .ok()
            .filter(Value::is_object)
            .and_then(|raw| {
                StructuredResponse::deserialize(&raw)
                    .ok()
                    .map(|response| (response, raw))
            });
        match decoded {
            Some((response, raw)) => SubjectOutput::Parsed { response, raw },
            None => {
                tracing::warn!(
                    stdout_bytes = stdout.len(),
                    "subject output is not a JSON object"
                );
                SubjectOutput::Unparseable {
                    raw_output: stdout.to_string(),
                }
            }
        }
    }

    pub fn response(&self) -> Option<&StructuredResponse> {
        match self {
            SubjectOutput::Parsed { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, SubjectOutput::Unparseable { .. })
    }

    /// JSON view used by the machine report.
    pub fn to_json(&self) -> Value {
        match self {
            SubjectOutput::Parsed { raw, .. } => raw.clone(),
            SubjectOutput::Unparseable { raw_output } => json!({
                "raw_output": raw_output,
                "parse_error": true,
            }),
            SubjectOutput::Empty { raw_output, stderr } => json!({
                "raw_output": raw_output,
                "stderr": stderr,
            }),
        }
    }
}

/// Everything captured from one subject run.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    pub raw_stdout: String,
    pub raw_stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
    pub output: SubjectOutput,
}

/// Runs the subject binary with the fixed invocation contract.
#[derive(Debug, Clone)]
pub struct SubjectInvoker {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl SubjectInvoker {
    pub fn new(path: PathBuf, timeout: Option<Duration>) -> Self {
        Self { path, timeout }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the subject on one error text, blocking until it exits.
    pub fn invoke(&self, error_text: &str) -> Result<InvocationOutcome, EvalError> {
        tracing::debug!(
            subject = %self.path.display(),
            input_bytes = error_text.len(),
            "invoking subject"
        );

        let start = Instant::now();
        let mut child = Command::new(&self.path)
            .args(SUBJECT_FLAGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                EvalError::SubjectInvocation(format!("spawn {}: {err}", self.path.display()))
            })?;

        let writer = spawn_stdin_writer(&mut child, error_text);
        let output = match self.timeout {
            None => child
                .wait_with_output()
                .map_err(|err| EvalError::SubjectInvocation(format!("wait for subject: {err}")))?,
            Some(timeout) => wait_with_deadline(child, start, timeout)?,
        };
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        join_stdin_writer(writer)?;

        let raw_stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let raw_stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let output_kind = SubjectOutput::from_captured(&raw_stdout, &raw_stderr);

        Ok(InvocationOutcome {
            exit_code: output.status.code(),
            elapsed_ms,
            output: output_kind,
            raw_stdout,
            raw_stderr,
        })
    }
}

fn spawn_stdin_writer(
    child: &mut Child,
    error_text: &str,
) -> Option<JoinHandle<std::io::Result<()>>> {
    let mut stdin = child.stdin.take()?;
    let input = error_text.to_string();
    Some(thread::spawn(move || {
        // Dropping stdin at the end of the closure closes the pipe.
        match stdin.write_all(input.as_bytes()) {
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    }))
}

fn join_stdin_writer(
    writer: Option<JoinHandle<std::io::Result<()>>>,
) -> Result<(), EvalError> {
    let Some(writer) = writer else {
        return Ok(());
    };
    match writer.join() {
        Ok(result) => result
            .map_err(|err| EvalError::SubjectInvocation(format!("write subject stdin: {err}"))),
        Err(_) => Err(EvalError::SubjectInvocation(
            "stdin writer thread panicked".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_reader<R: Read + Send + 'static>(
    source: Option<R>,
    stream: Stream,
    done: Sender<(Stream, Vec<u8>)>,
) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            // A read error leaves whatever was captured so far.
            let _ = source.read_to_end(&mut buf);
        }
        // The receiver is gone once the invocation has timed out.
        let _ = done.send((stream, buf));
    });
}

/// Wait for exit and for both pipes to close, all within `timeout`.
///
/// A subject that exits while a background process still holds its pipes
/// is treated as still running.
fn wait_with_deadline(
    mut child: Child,
    start: Instant,
    timeout: Duration,
) -> Result<Output, EvalError> {
    let (done, drained) = mpsc::channel();
    spawn_reader(child.stdout.take(), Stream::Stdout, done.clone());
    spawn_reader(child.stderr.take(), Stream::Stderr, done);

    let mut status = None;
    let mut stdout = None;
    let mut stderr = None;
    loop {
        if status.is_none() {
            status = child.try_wait().map_err(|err| {
                EvalError::SubjectInvocation(format!("check subject status: {err}"))
            })?;
        }
        if let (Some(status), true, true) = (status, stdout.is_some(), stderr.is_some()) {
            return Ok(Output {
                status,
                stdout: stdout.unwrap_or_default(),
                stderr: stderr.unwrap_or_default(),
            });
        }
        if start.elapsed() > timeout {
            if status.is_none() {
                let _ = child.kill();
                let _ = child.wait();
            }
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                exited = status.is_some(),
                "subject timed out"
            );
            return Err(EvalError::SubjectInvocation(format!(
                "timed out after {}s",
                timeout.as_secs()
            )));
        }
        match drained.recv_timeout(POLL_INTERVAL) {
            Ok((Stream::Stdout, buf)) => stdout = Some(buf),
            Ok((Stream::Stderr, buf)) => stderr = Some(buf),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Both readers are gone; only the exit status is outstanding.
                stdout.get_or_insert_with(Vec::new);
                stderr.get_or_insert_with(Vec::new);
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
