//! ## skimmer-cli
//! **Operational front-end for the extraction pipeline**
//!
//! Exit codes: 0 on full success, 1 when some documents failed or were
//! dropped, 2 on fatal setup errors.

use std::process::ExitCode;

use clap::Parser;
use skimmer_telemetry::logging::EventLogger;
use skimmer_telemetry::metrics::MetricsRecorder;

mod commands;

use commands::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    EventLogger::init(cli.verbosity);
    let metrics = MetricsRecorder::new();

    match commands::run(cli, metrics) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fatal: {err:#}");
            ExitCode::from(2)
        }
    }
}
