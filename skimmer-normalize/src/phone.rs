//! Phone parsing to E.164 with North-American metadata.

use skimmer_core::entity::{PhoneClass, PhoneMetadata};

const TOLL_FREE_AREA_CODES: &[&str] = &["800", "888", "877", "866", "855", "844", "833", "822"];

/// Parsed phone number.
pub struct ParsedPhone {
    /// E.164 form, e.g. `+15551234567`.
    pub canonical: String,
    pub metadata: PhoneMetadata,
}

/// Parses one phone surface. Recognizes North-American 10- and 11-digit
/// forms; other international forms get a best-effort country split.
pub fn parse_phone(text: &str) -> Option<ParsedPhone> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 || digits.len() > 15 {
        return None;
    }

    let (country_code, area_code, subscriber) = if digits.len() == 10 {
        ("1".to_string(), Some(digits[..3].to_string()), Some(digits[3..].to_string()))
    } else if digits.len() == 11 && digits.starts_with('1') {
        ("1".to_string(), Some(digits[1..4].to_string()), Some(digits[4..].to_string()))
    } else {
        let cc_len = if digits.len() > 11 { 2 } else { 1 };
        let rest = &digits[cc_len..];
        let area = (rest.len() >= 6).then(|| rest[..3].to_string());
        let subscriber = match &area {
            Some(_) => Some(rest[3..].to_string()),
            None => Some(rest.to_string()),
        };
        (digits[..cc_len].to_string(), area, subscriber)
    };

    let classification = match &area_code {
        Some(area) if TOLL_FREE_AREA_CODES.contains(&area.as_str()) => PhoneClass::TollFree,
        Some(_) => PhoneClass::Landline,
        None => PhoneClass::Unknown,
    };

    let canonical = format!(
        "+{country_code}{}{}",
        area_code.as_deref().unwrap_or(""),
        subscriber.as_deref().unwrap_or("")
    );

    Some(ParsedPhone {
        canonical: canonical.clone(),
        metadata: PhoneMetadata {
            e164: canonical,
            country_code,
            area_code,
            subscriber,
            classification,
        },
    })
}
