//! Organization grouping: legal-suffix stemming and government linking.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::entity::GovernmentMetadata;
use skimmer_scanners::patterns::GovernmentRecord;

static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\s,]+(?:Inc|Corp|LLC|Ltd|LP|LLP|Co|Company|Corporation|Incorporated)\.?\s*$")
        .expect("static regex")
});

/// Strips trailing legal suffixes and case-folds for exact stem matching.
pub fn org_stem(name: &str) -> String {
    LEGAL_SUFFIX.replace(name.trim(), "").trim().to_lowercase()
}

/// Reference index over the known-government list; lookup by formal name or
/// abbreviation, case-insensitive.
pub struct GovernmentIndex {
    by_key: HashMap<String, GovernmentRecord>,
}

impl GovernmentIndex {
    pub fn new(records: Vec<GovernmentRecord>) -> Self {
        let mut by_key = HashMap::new();
        for record in records {
            by_key.insert(record.formal_name.to_lowercase(), record.clone());
            if !record.abbreviation.is_empty() {
                by_key.insert(record.abbreviation.to_lowercase(), record);
            }
        }
        Self { by_key }
    }

    pub fn empty() -> Self {
        Self {
            by_key: HashMap::new(),
        }
    }

    pub fn lookup(&self, surface: &str) -> Option<&GovernmentRecord> {
        self.by_key.get(&surface.trim().to_lowercase())
    }

    pub fn metadata_for(&self, record: &GovernmentRecord) -> GovernmentMetadata {
        GovernmentMetadata {
            formal_name: record.formal_name.clone(),
            abbreviation: record.abbreviation.clone(),
            website: record.website.clone(),
            mission: record.mission.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osha() -> GovernmentRecord {
        GovernmentRecord {
            formal_name: "Occupational Safety and Health Administration".into(),
            abbreviation: "OSHA".into(),
            website: "https://www.osha.gov".into(),
            mission: "Assure safe and healthful working conditions".into(),
        }
    }

    #[test]
    fn stems_drop_legal_suffixes() {
        assert_eq!(org_stem("Acme Corp"), "acme");
        assert_eq!(org_stem("Acme, Inc."), "acme");
        assert_eq!(org_stem("Acme Holdings"), "acme holdings");
    }

    #[test]
    fn government_lookup_by_abbreviation_and_name() {
        let index = GovernmentIndex::new(vec![osha()]);
        assert!(index.lookup("OSHA").is_some());
        assert!(index.lookup("osha").is_some());
        assert!(index
            .lookup("Occupational Safety and Health Administration")
            .is_some());
        assert!(index.lookup("EPA").is_none());
    }
}
