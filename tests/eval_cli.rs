#![cfg(unix)]

mod common;

use common::{stderr_text, stdout_text, TestFixture};
use serde_json::Value;

#[test]
fn json_report_summarizes_mixed_run() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["--json"]);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));

    let report: Value =
        serde_json::from_str(&stdout_text(&output)).expect("stdout is one JSON document");
    assert_eq!(report["total"], 4);
    assert_eq!(report["data"], fixture.corpus.display().to_string());
    assert_eq!(report["stats"]["success"], 1);
    assert_eq!(report["stats"]["failed"], 2);
    assert_eq!(report["stats"]["no_error_detected"], 1);

    let results = report["results"].as_array().expect("results array");
    let ids: Vec<&str> = results.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, ["python_key_error", "c_segfault", "clean_build_log", "rust_hint_only"]);

    let key_error = &results[0];
    assert_eq!(key_error["success"], true);
    assert_eq!(key_error["has_summary"], true);
    assert_eq!(key_error["has_explanation"], true);
    assert_eq!(key_error["has_suggestion"], true);
    assert_eq!(key_error["why_output"]["stats"]["backend"], "fake");

    let segfault = &results[1];
    assert_eq!(segfault["success"], false);
    assert_eq!(segfault["error_message"], "Failed to parse JSON output");
    assert_eq!(segfault["why_output"]["parse_error"], true);
    assert_eq!(segfault["why_output"]["raw_output"], "I think this is a segfault.\n");

    assert_eq!(results[2]["no_error_detected"], true);
    assert_eq!(results[2]["success"], false);

    let hint_only = &results[3];
    assert_eq!(hint_only["success"], false);
    assert_eq!(hint_only["has_suggestion"], true);
    assert_eq!(hint_only["no_error_detected"], false);
}

#[test]
fn summary_mode_prints_one_line_per_case_without_color_when_piped() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&[]);
    assert!(output.status.success());

    let text = stdout_text(&output);
    assert!(!text.contains('\x1b'), "piped output must be plain: {text:?}");
    assert!(text.contains("why eval\n"));
    assert!(text.contains("Cases: 4\n"));
    assert!(text.contains("  ✓ python_key_error [python] - summary, explanation, suggestion"));
    assert!(text.contains("  ✗ c_segfault [c] - failed (Failed to parse JSON output)"));
    assert!(text.contains("  ? clean_build_log [rust] - no error detected"));
    assert!(text.contains("  ✗ rust_hint_only [rust] - failed"));
    assert!(text.contains("  Success: 1/4\n  Failed: 2\n  No error detected: 1\n"));
    assert!(!text.contains("Running "));
}

#[test]
fn detailed_mode_renders_markdown_fields() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["--id", "python_key_error", "--detailed", "--no-color"]);
    assert!(output.status.success());

    let text = stdout_text(&output);
    assert!(text.contains("Cases: 1\n"));
    assert!(text.contains("▸ Input Error:\n  Traceback (most recent call last):\n"));
    assert!(text.contains("  Summary:\n    Missing dictionary key username\n"));
    assert!(text.contains("  Explanation:\n    The user dict has no such key.\n"));
    assert!(text.contains("    Use user.get(\"username\")\n"));
    assert!(text.contains("    Speed: 41.2 tok/s\n") || text.contains("    Speed: 41.3 tok/s\n"));
}

#[test]
fn hide_input_drops_the_echo() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["-f", "SEGFAULT", "-d", "--hide-input"]);
    assert!(output.status.success());

    let text = stdout_text(&output);
    assert!(!text.contains("Input Error"));
    assert!(text.contains("c_segfault [c]"));
    assert!(text.contains("  Failed to parse JSON output\n  I think this is a segfault.\n"));
}

#[test]
fn filter_matches_language_and_limit_truncates() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["--filter", "Rust", "--limit", "1", "--json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_str(&stdout_text(&output)).expect("json");
    assert_eq!(report["total"], 1);
    assert_eq!(report["results"][0]["id"], "clean_build_log");
}

#[test]
fn unknown_id_is_fatal_before_any_case_runs() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["--id", "does_not_exist"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_text(&output).is_empty());
    assert!(stderr_text(&output).contains("Error: No case with id: does_not_exist"));
}

#[test]
fn unmatched_filter_is_fatal() {
    let fixture = TestFixture::standard();
    let output = fixture.run(&["--filter", "haskell"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("No cases match filter: haskell"));
}

#[test]
fn missing_corpus_is_fatal() {
    let fixture = TestFixture::standard();
    std::fs::remove_file(&fixture.corpus).expect("remove corpus");
    let output = fixture.run(&["--json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_text(&output).is_empty());
    assert!(stderr_text(&output).contains("file not found"));
}

#[test]
fn malformed_corpus_is_fatal() {
    let fixture = TestFixture::with_corpus("- id: only_an_id\n");
    let output = fixture.run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("missing field"));
}

#[test]
fn missing_binary_is_fatal() {
    let fixture = TestFixture::standard();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_why-eval"))
        .arg("--binary")
        .arg(fixture.dir.path().join("nope"))
        .arg("--data")
        .arg(&fixture.corpus)
        .output()
        .expect("run why-eval");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("Binary not found"));
}

#[test]
fn failing_subject_does_not_fail_the_run() {
    let fixture = TestFixture::standard();
    common::write_executable(
        &fixture.subject,
        "#!/bin/sh\ncat >/dev/null\necho 'crashed' >&2\nexit 101\n",
    );
    let output = fixture.run(&["--json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_str(&stdout_text(&output)).expect("json");
    assert_eq!(report["stats"]["failed"], 4);
    assert_eq!(report["results"][0]["why_output"]["stderr"], "crashed\n");
}
