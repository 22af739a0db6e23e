//! Canonical entities: one record per real-world entity per document.

use serde::{Deserialize, Serialize};

use crate::kind::EntityKind;
use crate::mention::Mention;

/// Normalized representation of one entity, grouping all of its surface
/// mentions under a stable per-document ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Chosen canonical surface form (longest alias, ISO date, SI value, ...).
    pub normalized: String,
    /// Surface variants other than the canonical form, first-seen order.
    pub aliases: Vec<String>,
    pub count: usize,
    pub mentions: Vec<Mention>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntityMetadata>,
}

impl CanonicalEntity {
    /// True when `surface` is one of this entity's known surface forms.
    pub fn knows_surface(&self, surface: &str) -> bool {
        self.normalized == surface || self.aliases.iter().any(|a| a == surface)
    }

    /// Highest confidence across the grouped mentions.
    pub fn max_confidence(&self) -> f64 {
        self.mentions.iter().map(|m| m.confidence).fold(0.0, f64::max)
    }

    /// Records an alias unless it is already known.
    pub fn add_alias(&mut self, surface: &str) {
        if !self.knows_surface(surface) {
            self.aliases.push(surface.to_string());
        }
    }
}

/// Per-kind metadata attached to a canonical entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityMetadata {
    Date(DateMetadata),
    Time(TimeMetadata),
    Money(MoneyMetadata),
    Measurement(MeasurementMetadata),
    Phone(PhoneMetadata),
    Regulation(RegulationMetadata),
    Place(PlaceMetadata),
    Government(GovernmentMetadata),
    /// Typed parsing failed; the entity survives with its original surface.
    ParseError(ParseErrorMetadata),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseErrorMetadata {
    pub parse_error: bool,
    pub original_text: String,
}

impl ParseErrorMetadata {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            parse_error: true,
            original_text: original.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateMetadata {
    pub date_type: DateType,
    pub year: i32,
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    pub quarter: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    pub original_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    Single,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMetadata {
    pub original_format: String,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub minutes_from_midnight: u16,
    pub business_hours: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyMetadata {
    /// ISO-4217 currency code.
    pub currency: String,
    pub original_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<String>,
    pub multiplier: f64,
    pub formatted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementClass {
    Length,
    Weight,
    Volume,
    Temperature,
    Time,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMetadata {
    pub original_value: f64,
    pub original_unit: String,
    pub si_value: f64,
    pub si_unit: String,
    pub class: MeasurementClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneMetadata {
    pub e164: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<String>,
    pub classification: PhoneClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneClass {
    TollFree,
    Landline,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationMetadata {
    pub scheme: RegulationScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub authority: String,
    pub subject_area: String,
    pub citation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegulationScheme {
    Cfr,
    Iso,
    Ansi,
    Nfpa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub political_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernmentMetadata {
    pub formal_name: String,
    pub abbreviation: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub website: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub mission: String,
}
