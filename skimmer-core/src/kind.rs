//! Entity kinds recognized by the engine.

use serde::{Deserialize, Serialize};

/// Closed set of entity kinds. The first eight are the "Core 8"; the rest
/// are auxiliary kinds produced by the structured scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Org,
    Loc,
    Gpe,
    Date,
    Time,
    Money,
    Measurement,
    Phone,
    Email,
    Url,
    Regulation,
    RangeIndicator,
}

impl EntityKind {
    /// The Core 8 kinds, in canonical emission order.
    pub const CORE8: [EntityKind; 8] = [
        EntityKind::Person,
        EntityKind::Org,
        EntityKind::Loc,
        EntityKind::Gpe,
        EntityKind::Date,
        EntityKind::Time,
        EntityKind::Money,
        EntityKind::Measurement,
    ];

    /// Every kind, in canonical emission order.
    pub const ALL: [EntityKind; 13] = [
        EntityKind::Person,
        EntityKind::Org,
        EntityKind::Loc,
        EntityKind::Gpe,
        EntityKind::Date,
        EntityKind::Time,
        EntityKind::Money,
        EntityKind::Measurement,
        EntityKind::Phone,
        EntityKind::Email,
        EntityKind::Url,
        EntityKind::Regulation,
        EntityKind::RangeIndicator,
    ];

    /// Fixed ID prefix for canonical entities of this kind.
    ///
    /// Government-linked organizations use [`GOV_PREFIX`] instead.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Person => "p",
            EntityKind::Org => "org",
            EntityKind::Loc => "loc",
            EntityKind::Gpe => "gpe",
            EntityKind::Date => "d",
            EntityKind::Time => "t",
            EntityKind::Money => "mon",
            EntityKind::Measurement => "meas",
            EntityKind::Phone => "ph",
            EntityKind::Email => "em",
            EntityKind::Url => "url",
            EntityKind::Regulation => "reg",
            EntityKind::RangeIndicator => "rng",
        }
    }

    /// Lowercase label used as the frontmatter key for this kind.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Org => "org",
            EntityKind::Loc => "loc",
            EntityKind::Gpe => "gpe",
            EntityKind::Date => "date",
            EntityKind::Time => "time",
            EntityKind::Money => "money",
            EntityKind::Measurement => "measurement",
            EntityKind::Phone => "phone",
            EntityKind::Email => "email",
            EntityKind::Url => "url",
            EntityKind::Regulation => "regulation",
            EntityKind::RangeIndicator => "range_indicator",
        }
    }

    /// Kinds matched by the keyword scanner against corpus pattern sets.
    pub fn is_keyword_kind(self) -> bool {
        matches!(
            self,
            EntityKind::Person | EntityKind::Org | EntityKind::Loc | EntityKind::Gpe
        )
    }

    /// Kinds produced by the structured (regex) scanner.
    pub fn is_structured_kind(self) -> bool {
        !self.is_keyword_kind()
    }

    /// Kinds that can carry a range-indicator flag.
    pub fn is_rangeable(self) -> bool {
        matches!(
            self,
            EntityKind::Measurement | EntityKind::Money | EntityKind::Date | EntityKind::Time
        )
    }
}

/// ID prefix for organizations linked to a known government body.
pub const GOV_PREFIX: &str = "gov";

/// Formats a canonical entity ID: fixed prefix plus zero-padded counter.
pub fn format_entity_id(prefix: &str, counter: u32) -> String {
    format!("{prefix}{counter:05}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in EntityKind::ALL {
            assert!(seen.insert(kind.prefix()), "duplicate prefix for {kind:?}");
        }
        assert!(!seen.contains(GOV_PREFIX));
    }

    #[test]
    fn id_format_is_zero_padded() {
        assert_eq!(format_entity_id("p", 1), "p00001");
        assert_eq!(format_entity_id("org", 42), "org00042");
        assert_eq!(format_entity_id("gov", 1), "gov00001");
    }

    #[test]
    fn core8_are_keyword_or_structured() {
        assert!(EntityKind::Org.is_keyword_kind());
        assert!(EntityKind::Money.is_structured_kind());
        assert!(EntityKind::Money.is_rangeable());
        assert!(!EntityKind::Org.is_rangeable());
    }
}
