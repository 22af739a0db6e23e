//! Money parsing: symbol/word currency, magnitude multipliers, actual value.

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::entity::MoneyMetadata;

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([€£¥₹$]?)\s*([0-9][0-9,]*\.?[0-9]*)\s*(thousand|million|billion|trillion|[kmbt])?\s*([A-Za-z]{3}|dollars?|euros?|pounds?)?",
    )
    .expect("static regex")
});

/// Parsed money value.
pub struct ParsedMoney {
    /// Actual numeric value as a decimal string.
    pub canonical: String,
    pub metadata: MoneyMetadata,
}

fn currency_for_symbol(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        "¥" => Some("JPY"),
        "₹" => Some("INR"),
        _ => None,
    }
}

fn currency_for_word(word: &str) -> Option<&'static str> {
    match word.to_lowercase().as_str() {
        "usd" | "dollar" | "dollars" => Some("USD"),
        "eur" | "euro" | "euros" => Some("EUR"),
        "gbp" | "pound" | "pounds" => Some("GBP"),
        "jpy" => Some("JPY"),
        "cad" => Some("CAD"),
        "aud" => Some("AUD"),
        _ => None,
    }
}

fn multiplier_for(magnitude: &str) -> f64 {
    match magnitude.to_lowercase().as_str() {
        "thousand" | "k" => 1e3,
        "million" | "m" => 1e6,
        "billion" | "b" => 1e9,
        "trillion" | "t" => 1e12,
        _ => 1.0,
    }
}

/// Formats a value as a plain decimal string without a trailing `.0`.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.6}");
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Parses one money surface; `None` when no amount is found.
pub fn parse_money(text: &str) -> Option<ParsedMoney> {
    let caps = MONEY
        .captures_iter(text)
        .find(|c| !c[2].is_empty())?;

    let symbol = caps.get(1).map_or("", |m| m.as_str());
    let amount = caps[2].replace(',', "");
    let base_value: f64 = amount.parse().ok()?;
    let magnitude = caps
        .get(3)
        .map(|m| m.as_str().to_lowercase())
        .filter(|m| !m.is_empty());
    let currency_word = caps.get(4).map(|m| m.as_str());

    let multiplier = magnitude.as_deref().map_or(1.0, multiplier_for);
    let actual = base_value * multiplier;

    let currency = currency_word
        .and_then(currency_for_word)
        .or_else(|| currency_for_symbol(symbol))
        .unwrap_or("USD");

    Some(ParsedMoney {
        canonical: format_decimal(actual),
        metadata: MoneyMetadata {
            currency: currency.to_string(),
            original_value: base_value,
            magnitude,
            multiplier,
            formatted: format!("{currency} {actual:.2}"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_with_magnitude() {
        let parsed = parse_money("$2.5 million").unwrap();
        assert_eq!(parsed.canonical, "2500000");
        assert_eq!(parsed.metadata.currency, "USD");
        assert_eq!(parsed.metadata.original_value, 2.5);
        assert_eq!(parsed.metadata.magnitude.as_deref(), Some("million"));
        assert_eq!(parsed.metadata.multiplier, 1_000_000.0);
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(parse_money("$1,234.56").unwrap().canonical, "1234.56");
    }

    #[test]
    fn currency_words() {
        let parsed = parse_money("500 euros").unwrap();
        assert_eq!(parsed.metadata.currency, "EUR");
        assert_eq!(parsed.canonical, "500");
    }

    #[test]
    fn short_magnitude_suffix() {
        assert_eq!(parse_money("$10K").unwrap().canonical, "10000");
        assert_eq!(parse_money("$3B").unwrap().canonical, "3000000000");
    }

    #[test]
    fn default_currency_is_usd() {
        assert_eq!(parse_money("1,000 dollars").unwrap().metadata.currency, "USD");
    }

    #[test]
    fn no_amount_is_none() {
        assert!(parse_money("free of charge").is_none());
    }

    #[test]
    fn decimal_formatting() {
        assert_eq!(format_decimal(2500000.0), "2500000");
        assert_eq!(format_decimal(1234.56), "1234.56");
        assert_eq!(format_decimal(0.5), "0.5");
    }
}
