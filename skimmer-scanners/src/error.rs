use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("empty pattern rejected in set '{set}'")]
    EmptyPattern { set: String },

    #[error("conflicting values for duplicate patterns in set '{set}': {collisions:?}")]
    DuplicateConflict {
        set: String,
        collisions: Vec<String>,
    },

    #[error("automaton build failed for set '{set}': {source}")]
    Build {
        set: String,
        source: aho_corasick::BuildError,
    },

    #[error("unknown pattern set '{0}'")]
    UnknownSet(String),

    #[error("pattern config parse error: {0}")]
    PatternConfig(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
