//! # Skimmer Configuration System
//!
//! Hierarchical configuration for every pipeline component.
//!
//! ## Features
//! - **Unified Configuration**: one source of truth across all crates
//! - **Validation**: runtime validation of critical parameters at load
//! - **Environment Awareness**: `SKIMMER_*` variables override files

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod extractor;
mod normalize;
mod output;
mod patterns;
mod pipeline;
mod router;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use extractor::ExtractorConfig;
pub use normalize::NormalizeConfig;
pub use output::OutputConfig;
pub use patterns::PatternsConfig;
pub use pipeline::PipelineConfig;
pub use router::RouterConfig;
pub use telemetry::TelemetryConfig;

/// Top-level configuration container for all Skimmer components.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Default)]
pub struct SkimmerConfig {
    /// Content-routing thresholds.
    #[validate(nested)]
    pub router: RouterConfig,

    /// Raw-extraction knobs (cleaning, ORG cascade, limits).
    #[validate(nested)]
    pub extractor: ExtractorConfig,

    /// Canonicalization thresholds (fuzzy matching, fingerprints).
    #[validate(nested)]
    pub normalize: NormalizeConfig,

    /// Worker pool, queue, and batching parameters.
    #[validate(nested)]
    pub pipeline: PipelineConfig,

    /// Output directory settings.
    #[validate(nested)]
    pub output: OutputConfig,

    /// Pattern-file locations.
    #[validate(nested)]
    pub patterns: PatternsConfig,

    /// Logging configuration.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl SkimmerConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/skimmer.yaml` - base settings. If missing, defaults are used.
    /// 3. `SKIMMER_*` environment variables (`__`-separated nesting).
    pub fn load() -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(SkimmerConfig::default()));

        let figment = if Path::new("config/skimmer.yaml").exists() {
            figment.merge(Yaml::file("config/skimmer.yaml"))
        } else {
            figment
        };

        figment
            .merge(Env::prefixed("SKIMMER_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(SkimmerConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SKIMMER_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = SkimmerConfig::default();
        config.validate().expect("default config should validate");
    }

    #[test]
    fn invalid_threshold_rejected() {
        let mut config = SkimmerConfig::default();
        config.router.keyword_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn worker_count_resolution() {
        let mut config = SkimmerConfig::default();
        config.pipeline.workers = 0;
        config.pipeline.max_workers = 4;
        let resolved = config.pipeline.resolved_workers();
        assert!(resolved >= 1 && resolved <= 4);
    }
}
