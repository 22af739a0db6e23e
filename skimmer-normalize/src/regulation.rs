//! Regulatory citation parsing: CFR, ISO, ANSI, NFPA.

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::entity::{RegulationMetadata, RegulationScheme};

static CFR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})\s*CFR\s*(\d{1,4})(?:\.(\d+))?").expect("static regex"));
static ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ISO\s+(\d+)(?::(\d{4}))?").expect("static regex"));
static ANSI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ANSI\s+([A-Z]?\d+(?:\.\d+)*)").expect("static regex"));
static NFPA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^NFPA\s+(\d+[A-Z]?)").expect("static regex"));

/// Parsed regulation reference.
pub struct ParsedRegulation {
    /// Slash-free packed form, e.g. `CFR-29-1910-132`.
    pub canonical: String,
    pub metadata: RegulationMetadata,
}

fn cfr_authority(title: &str) -> (&'static str, &'static str) {
    match title {
        "29" => ("Department of Labor", "Occupational Safety"),
        "40" => ("Environmental Protection Agency", "Environmental Protection"),
        "49" => ("Department of Transportation", "Transportation"),
        "21" => ("Food and Drug Administration", "Food and Drug Safety"),
        _ => ("Federal Government", "Federal Regulation"),
    }
}

/// Parses one regulation surface; `None` when no scheme matches.
pub fn parse_regulation(text: &str) -> Option<ParsedRegulation> {
    let text = text.trim();

    if let Some(caps) = CFR.captures(text) {
        let title = caps[1].to_string();
        let part = caps[2].to_string();
        let section = caps.get(3).map(|m| m.as_str().to_string());
        let (authority, subject_area) = cfr_authority(&title);
        let canonical = match &section {
            Some(section) => format!("CFR-{title}-{part}-{section}"),
            None => format!("CFR-{title}-{part}"),
        };
        let citation = match &section {
            Some(section) => format!("{title} CFR § {part}.{section}"),
            None => format!("{title} CFR § {part}"),
        };
        return Some(ParsedRegulation {
            canonical,
            metadata: RegulationMetadata {
                scheme: RegulationScheme::Cfr,
                title: Some(title),
                part: Some(part),
                section,
                authority: authority.to_string(),
                subject_area: subject_area.to_string(),
                citation,
            },
        });
    }

    if let Some(caps) = ISO.captures(text) {
        let number = caps[1].to_string();
        let year = caps.get(2).map(|m| m.as_str().to_string());
        let canonical = match &year {
            Some(year) => format!("ISO-{number}-{year}"),
            None => format!("ISO-{number}"),
        };
        let citation = match &year {
            Some(year) => format!("ISO {number}:{year}"),
            None => format!("ISO {number}"),
        };
        return Some(ParsedRegulation {
            canonical,
            metadata: RegulationMetadata {
                scheme: RegulationScheme::Iso,
                title: Some(number),
                part: year,
                section: None,
                authority: "International Organization for Standardization".to_string(),
                subject_area: "International Standards".to_string(),
                citation,
            },
        });
    }

    if let Some(caps) = ANSI.captures(text) {
        let designator = caps[1].to_string();
        return Some(ParsedRegulation {
            canonical: format!("ANSI-{designator}"),
            metadata: RegulationMetadata {
                scheme: RegulationScheme::Ansi,
                title: Some(designator.clone()),
                part: None,
                section: None,
                authority: "American National Standards Institute".to_string(),
                subject_area: "American National Standards".to_string(),
                citation: format!("ANSI {designator}"),
            },
        });
    }

    if let Some(caps) = NFPA.captures(text) {
        let number = caps[1].to_string();
        return Some(ParsedRegulation {
            canonical: format!("NFPA-{number}"),
            metadata: RegulationMetadata {
                scheme: RegulationScheme::Nfpa,
                title: Some(number.clone()),
                part: None,
                section: None,
                authority: "National Fire Protection Association".to_string(),
                subject_area: "Fire Protection Standards".to_string(),
                citation: format!("NFPA {number}"),
            },
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfr_with_section() {
        let parsed = parse_regulation("29 CFR 1910.132").unwrap();
        assert_eq!(parsed.canonical, "CFR-29-1910-132");
        assert_eq!(parsed.metadata.authority, "Department of Labor");
        assert_eq!(parsed.metadata.citation, "29 CFR § 1910.132");
    }

    #[test]
    fn cfr_without_section() {
        let parsed = parse_regulation("40 CFR 261").unwrap();
        assert_eq!(parsed.canonical, "CFR-40-261");
        assert_eq!(parsed.metadata.authority, "Environmental Protection Agency");
    }

    #[test]
    fn iso_with_year() {
        let parsed = parse_regulation("ISO 9001:2015").unwrap();
        assert_eq!(parsed.canonical, "ISO-9001-2015");
        assert_eq!(parsed.metadata.scheme, RegulationScheme::Iso);
    }

    #[test]
    fn ansi_designator() {
        let parsed = parse_regulation("ANSI Z359.11").unwrap();
        assert_eq!(parsed.canonical, "ANSI-Z359.11");
    }

    #[test]
    fn nfpa_number() {
        let parsed = parse_regulation("NFPA 70E").unwrap();
        assert_eq!(parsed.canonical, "NFPA-70E");
    }

    #[test]
    fn unknown_scheme_is_none() {
        assert!(parse_regulation("Section 5(a)(1)").is_none());
    }
}
