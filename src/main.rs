use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod classify;
mod cli;
mod corpus;
mod discover;
mod error;
mod report;
mod run;
mod stats;
mod subject;
mod util;

use error::EvalError;
use report::Palette;

fn main() -> ExitCode {
    init_tracing();
    let args = cli::EvalArgs::parse();
    let palette = Palette::detect(args.no_color);

    match run::run_eval(&args, &palette) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}Error:{} {err:#}", palette.red(), palette.reset());
            if args.binary.is_none()
                && matches!(err.downcast_ref::<EvalError>(), Some(EvalError::SubjectNotFound(_)))
            {
                eprintln!(
                    "{}Try: cargo build --release, or pass --binary <path>{}",
                    palette.dim(),
                    palette.reset()
                );
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the JSON report on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("WHY_EVAL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
