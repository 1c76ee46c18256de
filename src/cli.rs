//! CLI argument parsing for the evaluation run.
//!
//! The CLI only gathers options; case selection, invocation and reporting
//! live in their own modules so the run driver can be exercised directly.
use crate::corpus::{CaseSelection, DEFAULT_CORPUS_PATH};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "why-eval",
    version,
    about = "Evaluate the `why` CLI against labeled error cases",
    after_help = "Examples:\n  \
        why-eval                      # Run all cases\n  \
        why-eval -v                   # Verbose output\n  \
        why-eval -d                   # Detailed output with markdown\n  \
        why-eval -f python            # Filter by language\n  \
        why-eval -f nix -d            # Show Nix errors in detail\n  \
        why-eval --id rust_borrow -d  # Run specific case\n  \
        why-eval --limit 10           # Run first 10 cases"
)]
pub struct EvalArgs {
    /// Path to why binary (auto-detected if not specified)
    #[arg(long, short = 'b', value_name = "PATH")]
    pub binary: Option<PathBuf>,

    /// Path to errors YAML
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CORPUS_PATH)]
    pub data: PathBuf,

    /// Filter cases by language or id (substring match)
    #[arg(long, short = 'f', conflicts_with = "id")]
    pub filter: Option<String>,

    /// Run only the case with this exact id
    #[arg(long)]
    pub id: Option<String>,

    /// Limit number of cases to run
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Show more detail in summary output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Show full detailed output with markdown rendering
    #[arg(long, short = 'd')]
    pub detailed: bool,

    /// Output results as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Hide input error in detailed view
    #[arg(long)]
    pub hide_input: bool,

    /// Kill the subject and fail the case after this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

impl EvalArgs {
    pub fn selection(&self) -> CaseSelection {
        CaseSelection {
            id: self.id.clone(),
            filter: self.filter.clone(),
            limit: self
                .limit
                .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX)),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
