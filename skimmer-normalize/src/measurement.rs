//! Measurement parsing and SI conversion.
//!
//! Classifies units into length / weight / volume / temperature / time /
//! percent and converts to the base unit (meters, kilograms, liters, °C,
//! seconds; percent stays percent, not ratio).

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::entity::{MeasurementClass, MeasurementMetadata};

use crate::money::format_decimal;

static MEASUREMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([0-9][0-9,]*\.?[0-9]*)\s*(°\s?[A-Za-z]|%|[A-Za-z]+)"#).expect("static regex")
});

/// Parsed measurement.
pub struct ParsedMeasurement {
    /// SI value as a decimal string.
    pub canonical: String,
    pub metadata: MeasurementMetadata,
}

struct UnitInfo {
    class: MeasurementClass,
    si_unit: &'static str,
    /// Multiplicative factor to the SI base unit; temperature uses the
    /// dedicated formulas instead.
    factor: f64,
}

fn unit_info(unit: &str) -> Option<UnitInfo> {
    use MeasurementClass::*;
    let unit = unit.trim().to_lowercase().replace(' ', "");
    let (class, si_unit, factor) = match unit.as_str() {
        // Length -> meters
        "in" | "inch" | "inches" => (Length, "meters", 0.0254),
        "ft" | "feet" | "foot" => (Length, "meters", 0.3048),
        "yd" | "yard" | "yards" => (Length, "meters", 0.9144),
        "mi" | "mile" | "miles" => (Length, "meters", 1609.34),
        "mm" => (Length, "meters", 0.001),
        "cm" => (Length, "meters", 0.01),
        "m" | "meter" | "meters" | "metre" | "metres" => (Length, "meters", 1.0),
        "km" => (Length, "meters", 1000.0),
        // Weight -> kilograms
        "lb" | "lbs" | "pound" | "pounds" => (Weight, "kilograms", 0.453592),
        "oz" | "ounce" | "ounces" => (Weight, "kilograms", 0.0283495),
        "g" | "gram" | "grams" => (Weight, "kilograms", 0.001),
        "mg" => (Weight, "kilograms", 1e-6),
        "kg" | "kilogram" | "kilograms" => (Weight, "kilograms", 1.0),
        "ton" | "tons" => (Weight, "kilograms", 1000.0),
        // Volume -> liters
        "gal" | "gallon" | "gallons" => (Volume, "liters", 3.78541),
        "qt" | "quart" | "quarts" => (Volume, "liters", 0.946353),
        "pt" | "pint" | "pints" => (Volume, "liters", 0.473176),
        "ml" | "milliliter" | "milliliters" => (Volume, "liters", 0.001),
        "l" | "liter" | "liters" | "litre" | "litres" => (Volume, "liters", 1.0),
        // Temperature -> celsius (factor unused)
        "°f" | "f" | "fahrenheit" => (Temperature, "celsius", 1.0),
        "°c" | "c" | "celsius" => (Temperature, "celsius", 1.0),
        "k" | "kelvin" => (Temperature, "celsius", 1.0),
        // Time -> seconds
        "ms" | "millisecond" | "milliseconds" => (Time, "seconds", 0.001),
        "s" | "sec" | "second" | "seconds" => (Time, "seconds", 1.0),
        "min" | "minute" | "minutes" => (Time, "seconds", 60.0),
        "hr" | "hour" | "hours" => (Time, "seconds", 3600.0),
        "day" | "days" => (Time, "seconds", 86_400.0),
        "week" | "weeks" => (Time, "seconds", 604_800.0),
        "month" | "months" => (Time, "seconds", 2_592_000.0),
        "year" | "years" => (Time, "seconds", 31_536_000.0),
        // Percent stays percent
        "%" | "percent" | "percentage" => (Percent, "percent", 1.0),
        _ => return None,
    };
    Some(UnitInfo {
        class,
        si_unit,
        factor,
    })
}

/// Converts one value to its SI base unit.
pub fn convert(value: f64, unit: &str) -> Option<(f64, MeasurementClass, &'static str)> {
    let info = unit_info(unit)?;
    let si_value = match info.class {
        MeasurementClass::Temperature => match unit.trim().to_lowercase().replace(' ', "").as_str()
        {
            "°f" | "f" | "fahrenheit" => (value - 32.0) * 5.0 / 9.0,
            "k" | "kelvin" => value - 273.15,
            _ => value,
        },
        _ => value * info.factor,
    };
    Some((si_value, info.class, info.si_unit))
}

/// Parses the first value-with-unit in `text`.
pub fn parse_measurement(text: &str) -> Option<ParsedMeasurement> {
    for caps in MEASUREMENT.captures_iter(text) {
        let value: f64 = caps[1].replace(',', "").parse().ok()?;
        let unit = caps[2].trim().to_string();
        let Some((si_value, class, si_unit)) = convert(value, &unit) else {
            continue;
        };
        let canonical = if class == MeasurementClass::Temperature {
            format_decimal((si_value * 100.0).round() / 100.0)
        } else if si_value.abs() >= 1.0 {
            format_decimal((si_value * 1e4).round() / 1e4)
        } else {
            format_decimal((si_value * 1e6).round() / 1e6)
        };
        return Some(ParsedMeasurement {
            canonical,
            metadata: MeasurementMetadata {
                original_value: value,
                original_unit: unit,
                si_value,
                si_unit: si_unit.to_string(),
                class,
            },
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feet_to_meters() {
        let parsed = parse_measurement("6 feet").unwrap();
        assert_eq!(parsed.canonical, "1.8288");
        assert_eq!(parsed.metadata.original_value, 6.0);
        assert_eq!(parsed.metadata.original_unit, "feet");
        assert_eq!(parsed.metadata.si_unit, "meters");
        assert_eq!(parsed.metadata.class, MeasurementClass::Length);
    }

    #[test]
    fn fahrenheit_to_celsius() {
        let parsed = parse_measurement("98.6 °F").unwrap();
        assert_eq!(parsed.canonical, "37");
        assert!((parsed.metadata.si_value - 37.0).abs() < 1e-9);
    }

    #[test]
    fn kelvin_to_celsius() {
        let parsed = parse_measurement("300 K").unwrap();
        assert!((parsed.metadata.si_value - 26.85).abs() < 1e-9);
    }

    #[test]
    fn percent_stays_percent() {
        let parsed = parse_measurement("85%").unwrap();
        assert_eq!(parsed.canonical, "85");
        assert_eq!(parsed.metadata.class, MeasurementClass::Percent);
        assert_eq!(parsed.metadata.si_unit, "percent");
    }

    #[test]
    fn pounds_to_kilograms() {
        let parsed = parse_measurement("50 lbs").unwrap();
        assert!((parsed.metadata.si_value - 22.6796).abs() < 1e-4);
    }

    #[test]
    fn range_surface_parses_first_unit_hit() {
        // "30-37 inches": the first value with a unit is "37 inches".
        let parsed = parse_measurement("30-37 inches").unwrap();
        assert_eq!(parsed.metadata.original_value, 37.0);
        assert_eq!(parsed.metadata.original_unit, "inches");
    }

    #[test]
    fn unknown_unit_is_none() {
        assert!(parse_measurement("5 foos").is_none());
        assert!(parse_measurement("no numbers").is_none());
    }

    #[test]
    fn small_values_keep_precision() {
        let parsed = parse_measurement("3 mm").unwrap();
        assert_eq!(parsed.canonical, "0.003");
    }

    #[test]
    fn conversion_is_consistent() {
        // si_value in metadata must equal convert() of the original pair.
        let parsed = parse_measurement("30 inches").unwrap();
        let (expected, _, _) = convert(
            parsed.metadata.original_value,
            &parsed.metadata.original_unit,
        )
        .unwrap();
        assert!((parsed.metadata.si_value - expected).abs() < 1e-6);
    }
}
