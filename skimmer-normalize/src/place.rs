//! LOC / GPE canonical forms: exact case-folded grouping with US-state and
//! country standardization.

use skimmer_core::entity::PlaceMetadata;

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("USA", "United States"),
    ("U.S.", "United States"),
    ("America", "United States"),
    ("UK", "United Kingdom"),
    ("Britain", "United Kingdom"),
    ("UAE", "United Arab Emirates"),
    ("PRC", "China"),
    ("ROC", "Taiwan"),
];

/// Canonical surface for a GPE/LOC mention given its subcategory tag.
pub fn canonical_place_form(text: &str, subcategory: Option<&str>) -> String {
    let text = text.trim();
    match subcategory {
        Some("us_states") => US_STATES
            .iter()
            .find(|(abbr, _)| abbr.eq_ignore_ascii_case(text))
            .map(|(_, full)| full.to_string())
            .unwrap_or_else(|| text.to_string()),
        Some("countries") => COUNTRY_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(text))
            .map(|(_, full)| full.to_string())
            .unwrap_or_else(|| text.to_string()),
        _ => text.to_string(),
    }
}

/// Category label for the metadata block.
fn category_for(subcategory: Option<&str>, gpe: bool) -> &'static str {
    match subcategory {
        Some("countries") => "country",
        Some("us_states") => "state",
        Some("major_cities") | Some("urban_settlements") => "city",
        Some("provinces") | Some("territories") => "administrative_division",
        Some("mountains") | Some("rivers") | Some("lakes") => "natural_feature",
        Some("landmarks") | Some("buildings") => "structure",
        Some("parks") | Some("forests") => "protected_area",
        _ if gpe => "geopolitical_entity",
        _ => "location",
    }
}

fn political_level(subcategory: Option<&str>) -> Option<&'static str> {
    match subcategory {
        Some("countries") => Some("national"),
        Some("us_states") => Some("state"),
        Some("provinces") => Some("provincial"),
        Some("territories") => Some("territorial"),
        Some("major_cities") | Some("urban_settlements") => Some("municipal"),
        _ => None,
    }
}

/// Builds place metadata for one canonical group.
pub fn place_metadata(subcategory: Option<&str>, gpe: bool) -> PlaceMetadata {
    PlaceMetadata {
        subcategory: subcategory.map(str::to_string),
        category: category_for(subcategory, gpe).to_string(),
        political_level: political_level(subcategory).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_abbreviations_expand() {
        assert_eq!(canonical_place_form("CA", Some("us_states")), "California");
        assert_eq!(canonical_place_form("ny", Some("us_states")), "New York");
        assert_eq!(
            canonical_place_form("California", Some("us_states")),
            "California"
        );
    }

    #[test]
    fn country_aliases_standardize() {
        assert_eq!(canonical_place_form("USA", Some("countries")), "United States");
        assert_eq!(canonical_place_form("UK", Some("countries")), "United Kingdom");
        assert_eq!(canonical_place_form("France", Some("countries")), "France");
    }

    #[test]
    fn cities_kept_verbatim() {
        assert_eq!(canonical_place_form("Boston", Some("major_cities")), "Boston");
    }

    #[test]
    fn metadata_classification() {
        let meta = place_metadata(Some("us_states"), true);
        assert_eq!(meta.category, "state");
        assert_eq!(meta.political_level.as_deref(), Some("state"));

        let meta = place_metadata(Some("rivers"), false);
        assert_eq!(meta.category, "natural_feature");
        assert_eq!(meta.political_level, None);
    }
}
