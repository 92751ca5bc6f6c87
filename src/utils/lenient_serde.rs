//! Serde helpers for vendor payloads that encode booleans and prices as
//! either JSON scalars or strings (`"true"`, `"1199"`, `"1.199,00 €"`).

use serde::{self, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Text(String),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
}

/// Deserialize a boolean sent as `true`, `"true"`, `"1"` or `1`; `null` is `false`.
///
/// Unknown strings are rejected rather than silently read as `false`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagRepr>::deserialize(deserializer)? {
        None => Ok(false),
        Some(FlagRepr::Bool(value)) => Ok(value),
        Some(FlagRepr::Number(value)) => Ok(value != 0),
        Some(FlagRepr::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean flag `{other}`"
            ))),
        },
    }
}

/// Deserialize an optional price sent as a number or a numeric string.
///
/// `null` and unparseable strings both map to `None`: price is informational.
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<PriceRepr>::deserialize(deserializer)?;
    Ok(match repr {
        Some(PriceRepr::Number(value)) => Some(value),
        Some(PriceRepr::Text(text)) => parse_price(&text),
        None => None,
    })
}

/// Parse a price string, tolerating currency symbols and either `.` or `,`
/// as the decimal separator.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    // The rightmost separator is the decimal one when it is followed by at
    // most two digits; every other separator groups thousands.
    let decimal_at = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (Some(at), None) | (None, Some(at)) => {
            let digits_after = cleaned.len() - at - 1;
            let occurrences = cleaned.matches(cleaned.as_bytes()[at] as char).count();
            (occurrences == 1 && digits_after <= 2).then_some(at)
        }
        (None, None) => None,
    };

    let normalized: String = cleaned
        .char_indices()
        .filter_map(|(idx, c)| match c {
            '.' | ',' if Some(idx) == decimal_at => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect();

    normalized.parse::<f64>().ok()
}
