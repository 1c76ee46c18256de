//! Error taxonomy for the evaluation run.
//!
//! Corpus and configuration errors are fatal and surface before any case runs.
//! `SubjectInvocation` is per-case and is folded into that case's result.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to load corpus {}: {reason}", path.display())]
    CorpusLoad { path: PathBuf, reason: String },

    #[error("{0}")]
    SubjectInvocation(String),

    #[error("{0}")]
    SubjectNotFound(String),

    #[error("{0}")]
    EmptySelection(String),
}

impl EvalError {
    pub fn corpus(path: &std::path::Path, reason: impl Into<String>) -> Self {
        EvalError::CorpusLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
