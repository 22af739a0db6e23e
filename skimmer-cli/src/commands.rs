use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use skimmer_config::SkimmerConfig;
use skimmer_pipeline::Pipeline;
use skimmer_telemetry::metrics::MetricsRecorder;

#[derive(Parser, Debug)]
#[command(name = "skimmer", version, about = "Document entity-extraction engine")]
pub struct Cli {
    /// Input files or directories (directories are walked one level).
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Compute worker count; 0 uses the CPU count.
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    /// Output directory for `.md` / `.json` siblings.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Configuration file (YAML); defaults merge with `config/skimmer.yaml`.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Documents per worker batch flush.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Bounded work-queue capacity.
    #[arg(long)]
    pub queue_size: Option<usize>,

    /// 0 = warn, 1 = info, 2 = debug, 3 = trace.
    #[arg(long, default_value_t = 1)]
    pub verbosity: u8,
}

pub fn run(cli: Cli, metrics: MetricsRecorder) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => SkimmerConfig::load_from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SkimmerConfig::load().context("loading configuration")?,
    };

    if cli.workers > 0 {
        config.pipeline.workers = cli.workers;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(queue_size) = cli.queue_size {
        config.pipeline.queue_capacity = queue_size;
    }

    let files = collect_inputs(&cli.inputs)?;
    anyhow::ensure!(!files.is_empty(), "no input files found");

    let pipeline = Pipeline::new(config, metrics).context("pipeline setup")?;
    let summary = pipeline.run(&files).context("pipeline run")?;

    info!(
        processed = summary.processed,
        failed = summary.failed,
        dropped = summary.dropped,
        wall_time_ms = summary.wall_time_ms,
        "run complete"
    );
    for (kind, count) in &summary.error_counts {
        info!(kind = %kind, count = *count, "errors recorded");
    }

    Ok(ExitCode::from(summary.exit_code() as u8))
}

fn collect_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut children: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("reading directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            children.sort();
            files.extend(children);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "skimmer",
            "docs/a.md",
            "--workers",
            "4",
            "--output",
            "out",
            "--batch-size",
            "10",
            "--queue-size",
            "50",
            "--verbosity",
            "2",
        ]);
        assert_eq!(cli.inputs, vec![PathBuf::from("docs/a.md")]);
        assert_eq!(cli.workers, 4);
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(cli.batch_size, Some(10));
        assert_eq!(cli.queue_size, Some(50));
        assert_eq!(cli.verbosity, 2);
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["skimmer"]).is_err());
    }
}
