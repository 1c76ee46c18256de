//! Locate the subject binary.
use crate::error::EvalError;
use std::path::{Path, PathBuf};

/// Build outputs checked, in order, before falling back to `PATH`.
const CANDIDATES: [&str; 4] = [
    "./result/bin/why",
    "./why-embedded",
    "./target/release/why",
    "./target/debug/why",
];

const SUBJECT_NAME: &str = "why";

/// Resolve an explicit `--binary`, or discover one from build outputs and `PATH`.
pub fn resolve_subject(explicit: Option<&Path>) -> Result<PathBuf, EvalError> {
    if let Some(path) = explicit {
        return path.canonicalize().map_err(|_| {
            EvalError::SubjectNotFound(format!("Binary not found: {}", path.display()))
        });
    }
    discover_in(Path::new("."))
        .ok_or_else(|| EvalError::SubjectNotFound("Could not find why binary.".to_string()))
}

fn discover_in(root: &Path) -> Option<PathBuf> {
    for candidate in CANDIDATES {
        let path = root.join(candidate);
        if is_executable(&path) {
            if let Ok(resolved) = path.canonicalize() {
                tracing::debug!(path = %resolved.display(), "discovered subject build output");
                return Some(resolved);
            }
        }
    }
    which::which(SUBJECT_NAME).ok()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
