//! Run-level aggregation over evaluated cases.
use crate::classify::{EvalResult, Verdict};
use serde::{Deserialize, Serialize};

/// Counts and mean latency for one run. Field names are part of the JSON report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub success: usize,
    pub failed: usize,
    pub no_error_detected: usize,
    pub avg_inference_ms: u64,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.success + self.failed + self.no_error_detected
    }
}

pub fn aggregate(results: &[EvalResult<'_>]) -> RunStats {
    let mut stats = RunStats::default();
    let mut timed_total: u64 = 0;
    let mut timed_count: u64 = 0;

    for result in results {
        match result.verdict {
            Verdict::Success => stats.success += 1,
            Verdict::Failure => stats.failed += 1,
            Verdict::Inconclusive => stats.no_error_detected += 1,
        }
        let elapsed = result.elapsed_ms();
        if elapsed > 0 {
            timed_total = timed_total.saturating_add(elapsed);
            timed_count += 1;
        }
    }

    stats.avg_inference_ms = if timed_count == 0 {
        0
    } else {
        timed_total / timed_count
    };
    stats
}

#[cfg(test)]
mod tests {
    use super::{aggregate, RunStats};
    use crate::classify::{invocation_failed, EvalResult, Presence, Verdict};
    use crate::corpus::ErrorCase;
    use crate::subject::{InvocationOutcome, SubjectOutput};

    fn case(id: &str) -> ErrorCase {
        ErrorCase {
            id: id.to_string(),
            language: "c".to_string(),
            error_type: "segfault".to_string(),
            error_text: "Segmentation fault (core dumped)".to_string(),
        }
    }

    fn timed<'a>(case: &'a ErrorCase, verdict: Verdict, elapsed_ms: u64) -> EvalResult<'a> {
        EvalResult {
            case,
            outcome: Some(InvocationOutcome {
                raw_stdout: String::new(),
                raw_stderr: String::new(),
                exit_code: Some(0),
                elapsed_ms,
                output: SubjectOutput::from_captured("", ""),
            }),
            verdict,
            presence: Presence::default(),
            error_message: None,
        }
    }

    #[test]
    fn counts_partition_the_results() {
        let cases: Vec<ErrorCase> = (0..5).map(|i| case(&format!("c{i}"))).collect();
        let results = vec![
            timed(&cases[0], Verdict::Success, 100),
            timed(&cases[1], Verdict::Failure, 200),
            timed(&cases[2], Verdict::Inconclusive, 301),
            timed(&cases[3], Verdict::Success, 0),
            invocation_failed(&cases[4], "boom"),
        ];
        let stats = aggregate(&results);
        assert_eq!(
            stats,
            RunStats {
                success: 2,
                failed: 2,
                no_error_detected: 1,
                avg_inference_ms: 200,
            }
        );
        assert_eq!(stats.total(), results.len());
    }

    #[test]
    fn average_truncates_toward_zero() {
        let cases = [case("a"), case("b")];
        let results = vec![
            timed(&cases[0], Verdict::Success, 10),
            timed(&cases[1], Verdict::Success, 11),
        ];
        assert_eq!(aggregate(&results).avg_inference_ms, 10);
    }

    #[test]
    fn average_is_zero_without_timed_results() {
        assert_eq!(aggregate(&[]), RunStats::default());

        let cases = [case("a")];
        let results = vec![timed(&cases[0], Verdict::Failure, 0)];
        let stats = aggregate(&results);
        assert_eq!(stats.avg_inference_ms, 0);
        assert_eq!(stats.failed, 1);
    }
}
