//! Field parsing utilities shared by the extractors
//!
//! Helpers for turning raw header values and table cells into numbers with
//! errors that name the offending field.

use crate::constants::CHARACTER_REPLACEMENTS;
use crate::{Error, Result};

/// Replace known mis-encoded character sequences with ASCII equivalents
pub fn normalize_encoding(text: &str) -> String {
    CHARACTER_REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Decode raw file bytes as UTF-8, falling back to Latin-1
///
/// Instrument exports are not consistently UTF-8; a Latin-1 file decodes
/// byte-for-byte so that `²` survives for [`normalize_encoding`].
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parse a whole value as a float
pub fn parse_number(value: &str, context: &str) -> Result<f64> {
    let trimmed = value.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| Error::number_format(context, trimmed))
}

/// Parse the first space-delimited token of a value (e.g. `"0.13 cm^2"`)
pub fn parse_leading_number(value: &str, context: &str) -> Result<f64> {
    let token = value.trim().split(' ').next().unwrap_or_default();
    parse_number(token, context)
}

/// Parse a table cell, reading an empty cell as NaN
pub fn parse_cell(value: &str, context: &str) -> Result<f64> {
    if value.trim().is_empty() {
        Ok(f64::NAN)
    } else {
        parse_number(value, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_encoding() {
        assert_eq!(normalize_encoding("Area (cmÂ²)"), "Area (cm^2)");
        assert_eq!(normalize_encoding("Area (cm²)"), "Area (cm^2)");
        assert_eq!(normalize_encoding("plain"), "plain");
    }

    #[test]
    fn test_decode_text_latin1_fallback() {
        assert_eq!(decode_text("cm²".as_bytes()), "cm²");
        assert_eq!(decode_text(&[b'c', b'm', 0xB2]), "cm²");
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("0.13 cm2", "area").unwrap(), 0.13);
        assert_eq!(parse_leading_number(" 1.5", "area").unwrap(), 1.5);
        assert!(matches!(
            parse_leading_number("cm2 0.13", "area"),
            Err(Error::NumberFormat { .. })
        ));
    }

    #[test]
    fn test_parse_cell() {
        assert!(parse_cell("", "Voltage").unwrap().is_nan());
        assert_eq!(parse_cell("-0.25\r", "Voltage").unwrap(), -0.25);
        assert!(parse_cell("abc", "Voltage").is_err());
    }
}
