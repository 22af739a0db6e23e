//! Date and time parsing to canonical forms.
//!
//! Dates canonicalize to ISO 8601; `Month D-D, Y` ranges keep both
//! endpoints as `start to end`. Times canonicalize to 24-hour `HH:MM:SS`.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::entity::{DateMetadata, DateType, TimeMetadata};

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\d{1,2})\s*[-–]\s*(\d{1,2}),?\s+(\d{4})$").expect("static regex")
});
static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})(?:st|nd|rd|th)").expect("static regex"));
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(AM|PM)?\b").expect("static regex")
});

/// Parsed date: canonical string plus metadata.
pub struct ParsedDate {
    pub canonical: String,
    pub metadata: DateMetadata,
}

/// Parses one date surface; `None` means unparseable.
pub fn parse_date(text: &str) -> Option<ParsedDate> {
    let text = text.trim();

    if let Some(caps) = DATE_RANGE.captures(text) {
        let month = &caps[1];
        let (start_day, end_day) = (&caps[2], &caps[3]);
        let year = &caps[4];
        let start = parse_single(&format!("{month} {start_day}, {year}"));
        let end = parse_single(&format!("{month} {end_day}, {year}"));
        if let (Some(start), Some(end)) = (start, end) {
            let canonical = format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));
            return Some(ParsedDate {
                canonical: canonical.clone(),
                metadata: DateMetadata {
                    date_type: DateType::Range,
                    year: start.year(),
                    month: start.month(),
                    day: None,
                    quarter: quarter_of(start.month()),
                    day_of_week: None,
                    start_date: Some(start.format("%Y-%m-%d").to_string()),
                    end_date: Some(end.format("%Y-%m-%d").to_string()),
                    duration_days: Some((end - start).num_days() + 1),
                    original_format: text.to_string(),
                },
            });
        }
    }

    let date = parse_single(text)?;
    Some(ParsedDate {
        canonical: date.format("%Y-%m-%d").to_string(),
        metadata: DateMetadata {
            date_type: DateType::Single,
            year: date.year(),
            month: date.month(),
            day: Some(date.day()),
            quarter: quarter_of(date.month()),
            day_of_week: Some(date.format("%A").to_string()),
            start_date: None,
            end_date: None,
            duration_days: None,
            original_format: text.to_string(),
        },
    })
}

fn parse_single(text: &str) -> Option<NaiveDate> {
    let cleaned = ORDINAL_SUFFIX.replace_all(text.trim(), "$1");
    let cleaned = cleaned.as_ref();
    const FORMATS: &[&str] = &[
        "%B %d, %Y",
        "%B %d %Y",
        "%b %d, %Y",
        "%b %d %Y",
        "%m/%d/%Y",
        "%m-%d-%Y",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%y",
        "%d %B %Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}

fn quarter_of(month: u32) -> u8 {
    ((month - 1) / 3 + 1) as u8
}

/// Parsed time: canonical `HH:MM:SS` plus metadata.
pub struct ParsedTime {
    pub canonical: String,
    pub metadata: TimeMetadata,
}

/// Parses one time surface to 24-hour form; `None` means unparseable.
pub fn parse_time(text: &str) -> Option<ParsedTime> {
    let caps = TIME_PATTERN.captures(text.trim())?;
    let hour: u8 = caps[1].parse().ok()?;
    let minute: u8 = caps
        .get(2)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let second: u8 = caps
        .get(3)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    let period = caps.get(4).map(|m| m.as_str().to_uppercase());

    // A bare number with neither minutes nor an AM/PM marker is not a time.
    if caps.get(2).is_none() && period.is_none() {
        return None;
    }

    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let hour_24 = match period.as_deref() {
        Some("PM") if hour != 12 => hour + 12,
        Some("AM") if hour == 12 => 0,
        _ => hour,
    };
    if hour_24 > 23 {
        return None;
    }

    let minutes_from_midnight = u16::from(hour_24) * 60 + u16::from(minute);
    Some(ParsedTime {
        canonical: format!("{hour_24:02}:{minute:02}:{second:02}"),
        metadata: TimeMetadata {
            original_format: text.trim().to_string(),
            hour: hour_24,
            minute,
            second,
            minutes_from_midnight,
            business_hours: (9..17).contains(&hour_24),
        },
    })
}
