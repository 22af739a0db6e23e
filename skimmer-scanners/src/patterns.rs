//! Line-oriented pattern-file and reference-file loading.
//!
//! Keyword pattern sets live under `<root>/<set-name>/*.txt`, one term per
//! line, `#`-prefixed comments ignored. The file stem becomes the term's
//! associated value (its subtype: `gpe/us_states.txt` tags every term
//! `us_states`). Duplicates across files within a set are deduplicated at
//! build time. A `case_sensitive` marker file inside a set directory
//! switches that set to case-sensitive scanning.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ScanError;

/// One entry of the government reference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernmentRecord {
    pub formal_name: String,
    pub abbreviation: String,
    pub website: String,
    pub mission: String,
}

/// Parses one pattern file: trims lines, drops blanks and `#` comments.
pub fn parse_pattern_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Loaded pattern set: `(term, subtype)` entries in first-seen order plus
/// the case flag.
#[derive(Debug, Clone)]
pub struct LoadedSet {
    pub name: String,
    pub entries: Vec<(String, String)>,
    pub case_insensitive: bool,
}

/// Loads every `*.txt` file of one set directory, deduplicating across
/// files while preserving first-seen order.
pub fn load_set_dir(dir: &Path) -> Result<LoadedSet, ScanError> {
    let name = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let case_insensitive = !dir.join("case_sensitive").exists();

    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    for file in &files {
        let subtype = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = fs::read_to_string(file)?;
        for term in parse_pattern_lines(&content) {
            let key = if case_insensitive {
                term.to_lowercase()
            } else {
                term.clone()
            };
            if seen.insert(key) {
                entries.push((term, subtype.clone()));
            }
        }
    }

    debug!(set = %name, files = files.len(), terms = entries.len(), "loaded pattern set");
    Ok(LoadedSet {
        name,
        entries,
        case_insensitive,
    })
}

/// Loads every set directory under the pattern root.
pub fn load_all_sets(root: &Path) -> Result<Vec<LoadedSet>, ScanError> {
    let mut sets = Vec::new();
    if !root.exists() {
        warn!(root = %root.display(), "pattern directory missing, using built-in sets only");
        return Ok(sets);
    }
    let mut dirs: Vec<_> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    for dir in dirs {
        sets.push(load_set_dir(&dir)?);
    }
    Ok(sets)
}

/// Parses the `|`-separated government reference file:
/// `formal name|abbreviation|website|mission`.
pub fn parse_government_records(content: &str) -> Vec<GovernmentRecord> {
    parse_pattern_lines(content)
        .into_iter()
        .filter_map(|line| {
            let mut fields = line.split('|').map(str::trim);
            let formal_name = fields.next()?.to_string();
            if formal_name.is_empty() {
                return None;
            }
            Some(GovernmentRecord {
                formal_name,
                abbreviation: fields.next().unwrap_or_default().to_string(),
                website: fields.next().unwrap_or_default().to_string(),
                mission: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn comments_and_blanks_ignored() {
        let lines = parse_pattern_lines("# header\n\nOSHA\n  EPA  \n# trailing\n");
        assert_eq!(lines, vec!["OSHA", "EPA"]);
    }

    #[test]
    fn set_dir_dedups_across_files_and_tags_subtypes() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = fs::File::create(dir.path().join("agencies.txt")).unwrap();
        writeln!(a, "OSHA\nEPA").unwrap();
        let mut b = fs::File::create(dir.path().join("companies.txt")).unwrap();
        writeln!(b, "epa\nAcme Corp").unwrap();

        let set = load_set_dir(dir.path()).unwrap();
        assert_eq!(
            set.entries,
            vec![
                ("OSHA".to_string(), "agencies".to_string()),
                ("EPA".to_string(), "agencies".to_string()),
                ("Acme Corp".to_string(), "companies".to_string()),
            ]
        );
        assert!(set.case_insensitive);
    }

    #[test]
    fn case_sensitive_marker_respected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "IT\nit\n").unwrap();
        fs::write(dir.path().join("case_sensitive"), "").unwrap();

        let set = load_set_dir(dir.path()).unwrap();
        assert!(!set.case_insensitive);
        assert_eq!(set.entries.len(), 2);
    }

    #[test]
    fn government_records_parse_partial_fields() {
        let records = parse_government_records(
            "Occupational Safety and Health Administration|OSHA|https://www.osha.gov|Assure safe working conditions\nEnvironmental Protection Agency|EPA\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].abbreviation, "OSHA");
        assert_eq!(records[1].website, "");
    }
}
