//! Value cleaning shared by every domain parser.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use pricedb_core::DisplayNames;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

/// Timestamp layout used by the asset source.
pub const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a numeric JSON value into an exact decimal.
///
/// Strings may carry `,` or Arabic (`٬`) thousands separators and Persian or
/// Arabic-Indic digits. Anything unparseable is `None`, never zero.
#[must_use]
pub fn clean_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(&clean_numeric_text(s)),
        _ => None,
    }
}

fn clean_numeric_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{066C}' | ' ' | '\u{00A0}'))
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from_digit(u32::from(c) - 0x06F0, 10).unwrap_or(c),
            '\u{0660}'..='\u{0669}' => char::from_digit(u32::from(c) - 0x0660, 10).unwrap_or(c),
            '\u{066B}' => '.',
            other => other,
        })
        .collect()
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Converts a rial amount to toman, truncating toward zero.
#[must_use]
pub fn rial_to_toman(rial: Decimal) -> Option<i64> {
    (rial / Decimal::TEN).trunc().to_i64()
}

/// Localizes a source timestamp (`2024-03-01 10:00:00`) in `tz` and
/// converts it to UTC. Unparseable text and wall-clock times skipped by a
/// DST transition yield `None`.
#[must_use]
pub fn parse_source_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), SOURCE_TIMESTAMP_FORMAT).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Title-cased name synthesized from a symbol: `price_dollar_rl` becomes
/// `Price Dollar Rl`.
#[must_use]
pub fn synthesize_name(symbol: &str) -> String {
    symbol
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves the Persian and English display names for an asset.
///
/// Precedence per language: static override table, then the title reported
/// by the source, then [`synthesize_name`].
#[must_use]
pub fn resolve_display_names(
    symbol: &str,
    overrides: Option<&DisplayNames>,
    api_title_fa: Option<&str>,
    api_title_en: Option<&str>,
) -> (String, String) {
    fn usable(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    let pick = |fixed: Option<&str>, api: Option<&str>| -> String {
        usable(fixed)
            .or_else(|| usable(api))
            .map_or_else(|| synthesize_name(symbol), str::to_owned)
    };

    let name_fa = pick(overrides.map(|n| n.name_fa.as_str()), api_title_fa);
    let name_en = pick(overrides.map(|n| n.name_en.as_str()), api_title_en);
    (name_fa, name_en)
}

/// Trims each string value, drops empties, and joins with `", "`.
#[must_use]
pub fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(clean_decimal(&json!("1,234,567.89")), Some(dec!(1234567.89)));
        assert_eq!(clean_decimal(&json!("1٬250٬000")), Some(dec!(1250000)));
    }

    #[test]
    fn converts_persian_and_arabic_digits() {
        assert_eq!(clean_decimal(&json!("۱۲۳٬۴۵۶")), Some(dec!(123456)));
        assert_eq!(clean_decimal(&json!("٣٫٥")), Some(dec!(3.5)));
    }

    #[test]
    fn numbers_pass_through_exactly() {
        assert_eq!(clean_decimal(&json!(42)), Some(dec!(42)));
        assert_eq!(clean_decimal(&json!(-0.75)), Some(dec!(-0.75)));
    }

    #[test]
    fn unparseable_is_none_not_zero() {
        assert_eq!(clean_decimal(&json!("")), None);
        assert_eq!(clean_decimal(&json!("N/A")), None);
        assert_eq!(clean_decimal(&json!(null)), None);
        assert_eq!(clean_decimal(&json!(true)), None);
        assert_eq!(clean_decimal(&json!({"p": 1})), None);
    }

    #[test]
    fn rial_to_toman_truncates() {
        assert_eq!(rial_to_toman(dec!(125000009)), Some(12_500_000));
        assert_eq!(rial_to_toman(dec!(9)), Some(0));
    }

    #[test]
    fn tehran_timestamp_converts_to_utc() {
        let ts = parse_source_timestamp("2024-03-01 10:00:00", chrono_tz::Asia::Tehran).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T06:30:00+00:00");
    }

    #[test]
    fn malformed_timestamp_is_none() {
        assert!(parse_source_timestamp("01/03/2024 10:00", chrono_tz::Asia::Tehran).is_none());
        assert!(parse_source_timestamp("", chrono_tz::UTC).is_none());
    }

    #[test]
    fn synthesized_names_are_title_cased() {
        assert_eq!(synthesize_name("price_dollar_rl"), "Price Dollar Rl");
        assert_eq!(synthesize_name("crypto-bitcoin"), "Crypto Bitcoin");
        assert_eq!(synthesize_name("GERAM18"), "Geram18");
    }

    #[test]
    fn override_table_beats_api_titles() {
        let fixed = DisplayNames {
            name_fa: "دلار".to_owned(),
            name_en: "US Dollar".to_owned(),
        };
        let (fa, en) = resolve_display_names(
            "price_dollar_rl",
            Some(&fixed),
            Some("دلار آزاد"),
            Some("Dollar"),
        );
        assert_eq!(fa, "دلار");
        assert_eq!(en, "US Dollar");
    }

    #[test]
    fn api_titles_beat_synthesized_name() {
        let (fa, en) = resolve_display_names("sekee", None, Some("سکه امامی"), None);
        assert_eq!(fa, "سکه امامی");
        assert_eq!(en, "Sekee");
    }

    #[test]
    fn blank_api_title_falls_through() {
        let (fa, _) = resolve_display_names("btc-irr", None, Some("  "), None);
        assert_eq!(fa, "Btc Irr");
    }

    #[test]
    fn join_values_drops_blanks() {
        let values = json!([" 6.1 inch ", "", "OLED", null, "  "]);
        assert_eq!(join_values(values.as_array().unwrap()), "6.1 inch, OLED");
    }
}
