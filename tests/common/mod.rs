//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// Writing an executable while another test forks can fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Fake `why` that answers by input content.
///
/// Inputs mentioning KeyError get a full diagnosis, "Finished" gets a
/// no-error declaration, "hint" gets a suggestion only, everything else
/// gets non-JSON text. Any flags other than `--json --stats` yield garbage.
pub const FAKE_SUBJECT: &str = r#"#!/bin/sh
if [ "$1" != "--json" ] || [ "$2" != "--stats" ]; then
  echo "unexpected flags: $*"
  exit 2
fi
input=$(cat)
case "$input" in
  *KeyError*)
    printf '%s' '{"summary":"Missing dictionary key `username`","explanation":"The **user** dict has no such key.","suggestion":"Use `user.get(\"username\")`","stats":{"backend":"fake","prompt_tokens":12,"generated_tokens":30,"gen_tok_per_s":41.25}}'
    ;;
  *Finished*)
    printf '%s' '{"no_error":true}'
    ;;
  *hint*)
    printf '%s' '{"suggestion":"try again"}'
    ;;
  *)
    echo "I think this is a segfault."
    ;;
esac
"#;

pub const CORPUS: &str = r#"
- id: python_key_error
  language: python
  error_type: key-error
  error_text: |
    Traceback (most recent call last):
    KeyError: 'username'
- id: c_segfault
  language: c
  error_type: segfault
  error_text: "Segmentation fault (core dumped)\n"
- id: clean_build_log
  language: rust
  error_type: no-error
  error_text: "Finished `release` profile"
- id: rust_hint_only
  language: rust
  error_type: borrow-check
  error_text: "hint: consider cloning"
"#;

/// Scratch directory holding a fake subject and a corpus.
pub struct TestFixture {
    pub dir: TempDir,
    pub subject: PathBuf,
    pub corpus: PathBuf,
    _guard: MutexGuard<'static, ()>,
}

impl TestFixture {
    pub fn standard() -> Self {
        Self::with_corpus(CORPUS)
    }

    pub fn with_corpus(corpus: &str) -> Self {
        let guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().expect("create temp dir");
        let subject = dir.path().join("why");
        write_executable(&subject, FAKE_SUBJECT);
        let corpus_path = dir.path().join("errors.yaml");
        std::fs::write(&corpus_path, corpus).expect("write corpus");
        Self {
            dir,
            subject,
            corpus: corpus_path,
            _guard: guard,
        }
    }

    /// Run why-eval with the fixture's subject and corpus plus `extra` args.
    pub fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_why-eval"))
            .arg("--binary")
            .arg(&self.subject)
            .arg("--data")
            .arg(&self.corpus)
            .args(extra)
            .current_dir(self.dir.path())
            .env_remove("NO_COLOR")
            .env_remove("WHY_EVAL_LOG")
            .env_remove("RUST_LOG")
            .output()
            .expect("run why-eval")
    }
}

pub fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, contents).expect("write executable");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod executable");
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
