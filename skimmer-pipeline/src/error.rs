use thiserror::Error;

use skimmer_config::ConfigError;
use skimmer_output::OutputError;
use skimmer_scanners::ScanError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pattern-build failures are fatal: misconfiguration would produce
    /// silent garbage.
    #[error("pattern build failed: {0}")]
    PatternBuild(#[from] ScanError),

    #[error("output setup failed: {0}")]
    Output(#[from] OutputError),

    #[error("worker thread panicked")]
    WorkerPanic,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
