//! Content-hash-keyed corpus cache.
//!
//! The person-name corpora run to hundreds of thousands of entries spread
//! over several files; parsing and deduplicating them dominates startup.
//! The merged line set is cached to disk keyed by a blake3 hash of the
//! source bytes, so unchanged corpora skip the merge on the next run.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ScanError;
use crate::patterns::parse_pattern_lines;

pub struct CorpusCache {
    dir: PathBuf,
}

impl CorpusCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the merged, deduplicated term list for `set_name`, reading
    /// the cache when the source files are unchanged.
    pub fn load_or_build(
        &self,
        set_name: &str,
        sources: &[PathBuf],
    ) -> Result<Vec<String>, ScanError> {
        let mut hasher = blake3::Hasher::new();
        let mut contents = Vec::with_capacity(sources.len());
        for source in sources {
            let bytes = fs::read(source)?;
            hasher.update(&bytes);
            contents.push(bytes);
        }
        let key = hasher.finalize().to_hex();
        let cache_path = self.dir.join(format!("{set_name}-{}.lines", &key[..16]));

        if let Ok(cached) = fs::read_to_string(&cache_path) {
            debug!(set = set_name, path = %cache_path.display(), "corpus cache hit");
            return Ok(cached.lines().map(str::to_string).collect());
        }

        let mut terms = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for bytes in &contents {
            let content = String::from_utf8_lossy(bytes);
            for term in parse_pattern_lines(&content) {
                if seen.insert(term.to_lowercase()) {
                    terms.push(term);
                }
            }
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(&cache_path, terms.join("\n"))?;
        debug!(set = set_name, terms = terms.len(), "corpus cache written");
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_roundtrip_and_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("names.txt");
        fs::write(&source, "Jane\njane\nJohn\n").unwrap();

        let cache = CorpusCache::new(dir.path().join("cache"));
        let first = cache
            .load_or_build("first_names", &[source.clone()])
            .unwrap();
        assert_eq!(first, vec!["Jane", "John"]);

        // Unchanged source hits the cache file.
        let second = cache
            .load_or_build("first_names", &[source.clone()])
            .unwrap();
        assert_eq!(second, first);

        // Changed source gets a new key and a rebuilt list.
        fs::write(&source, "Alice\n").unwrap();
        let third = cache.load_or_build("first_names", &[source]).unwrap();
        assert_eq!(third, vec!["Alice"]);
    }
}
