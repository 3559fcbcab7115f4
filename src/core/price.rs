// distress-triage - core/price.rs
//
// Free-text asking price parsing.
// Core layer: pure logic. Every malformed input has a defined fallback
// (None); nothing here returns an error or panics on bad data.
//
// Rules, first match wins:
//   1. blank                                   -> None
//   2. "no numeric price" marker phrase        -> None (even if digits present)
//   3. currency range  $X[m|k] - $Y[m|k]       -> rounded mean of both bounds
//   4. single currency $X[m|k]                 -> value with multiplier
//   5. plain number after stripping , $ spaces -> value
//   6. anything else                           -> None

use regex::Regex;
use std::sync::OnceLock;

/// Phrases that mean the listing has no usable numeric price.
/// Compared case-insensitively as substrings.
pub const NO_PRICE_MARKERS: &[&str] = &[
    "contact agent",
    "poa",
    "expressions of interest",
    "price on application",
    "price on request",
    "undisclosed",
    "by negotiation",
    "for sale",
    "just listed",
    "under contract",
    "listing price not available",
    "auction",
    "submit all offers",
];

fn range_regex() -> &'static Regex {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    RANGE.get_or_init(|| {
        Regex::new(r"(?i)\$\s*([\d,]+(?:\.\d+)?)\s*([mk])?\s*[-\u{2013}]\s*\$\s*([\d,]+(?:\.\d+)?)\s*([mk])?")
            .expect("price range: invalid regex")
    })
}

fn single_regex() -> &'static Regex {
    static SINGLE: OnceLock<Regex> = OnceLock::new();
    SINGLE.get_or_init(|| {
        Regex::new(r"(?i)\$\s*([\d,]+(?:\.\d+)?)\s*([mk])?").expect("price single: invalid regex")
    })
}

fn plain_regex() -> &'static Regex {
    static PLAIN: OnceLock<Regex> = OnceLock::new();
    PLAIN.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("price plain: invalid regex"))
}

/// True if the text contains one of the "no numeric price" phrases.
pub fn is_no_price_marker(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    NO_PRICE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Extract a whole-dollar asking price from free text.
///
/// ```
/// use distress_triage::core::price::parse_price;
/// assert_eq!(parse_price(Some("$2.5M")), Some(2_500_000));
/// assert_eq!(parse_price(Some("$850k - $900k")), Some(875_000));
/// assert_eq!(parse_price(Some("Contact Agent")), None);
/// ```
pub fn parse_price(raw: Option<&str>) -> Option<i64> {
    let text = raw?.trim();
    if text.is_empty() || is_no_price_marker(text) {
        return None;
    }

    if let Some(caps) = range_regex().captures(text) {
        let low = amount(caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str()));
        let high = amount(caps.get(3).map(|m| m.as_str()), caps.get(4).map(|m| m.as_str()));
        match (low, high) {
            (Some(a), Some(b)) => return Some(round((a + b) / 2.0)),
            (Some(v), None) | (None, Some(v)) => return Some(round(v)),
            (None, None) => {}
        }
    }

    if let Some(caps) = single_regex().captures(text) {
        if let Some(v) = amount(caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str())) {
            return Some(round(v));
        }
    }

    let stripped: String = text
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    if plain_regex().is_match(&stripped) {
        return stripped.parse::<f64>().ok().map(round);
    }

    None
}

/// Parse a captured number with an optional `m`/`k` magnitude suffix.
fn amount(number: Option<&str>, suffix: Option<&str>) -> Option<f64> {
    let digits: String = number?.chars().filter(|c| *c != ',').collect();
    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let multiplier = match suffix.map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "m" => 1_000_000.0,
        Some(s) if s == "k" => 1_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

/// Round half away from zero; prices are never negative so this matches
/// round-half-up.
fn round(value: f64) -> i64 {
    value.round() as i64
}
