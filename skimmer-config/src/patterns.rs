//! Pattern-file locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PatternsConfig {
    /// Root directory of keyword pattern sets (one subdirectory per set,
    /// one term per line inside `*.txt` files).
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Regex pattern configuration file. Missing file means built-in
    /// defaults.
    #[serde(default = "default_regex_file")]
    pub regex_file: PathBuf,

    /// Directory for cached automatons, keyed by corpus content hash.
    #[serde(default = "default_cache_directory")]
    pub cache_directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("config/patterns")
}

fn default_regex_file() -> PathBuf {
    PathBuf::from("config/regex_patterns.yaml")
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from(".skimmer-cache")
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            regex_file: default_regex_file(),
            cache_directory: default_cache_directory(),
        }
    }
}
