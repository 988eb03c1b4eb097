//! Forgiving traversal over loosely structured JSON.
//!
//! Paths are dot-separated segments such as `"images.main.url.0"`. A segment
//! that parses as an integer indexes into an array; any other segment applied
//! to an array selects its first element. JSON `null` counts as absent at
//! every step. No lookup ever fails: a missing key, a type mismatch or an
//! out-of-range index all yield `None`.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::normalize::clean_decimal;

/// Value at `path`, or `None`. An empty path returns `value` itself.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    if current.is_null() {
        return None;
    }
    if path.is_empty() {
        return Some(current);
    }

    for segment in path.split('.') {
        current = match current {
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(index) => items.get(index)?,
                Err(_) => items.first()?,
            },
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }

    Some(current)
}

/// Trimmed, non-empty text at `path`. Numbers are rendered as text so a
/// year reported as `1402` and one reported as `"1402"` read the same.
#[must_use]
pub fn text_at(value: &Value, path: &str) -> Option<String> {
    let text = match lookup(value, path)? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// [`text_at`] with a fallback.
#[must_use]
pub fn text_or(value: &Value, path: &str, default: &str) -> String {
    text_at(value, path).unwrap_or_else(|| default.to_owned())
}

/// Integer at `path`. Accepts JSON integers, integral floats and numeric
/// strings.
#[must_use]
pub fn i64_at(value: &Value, path: &str) -> Option<i64> {
    match lookup(value, path)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .and_then(|f| format!("{f:.0}").parse().ok())
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Positive integer id at `path`. Zero and negatives count as absent.
#[must_use]
pub fn id_at(value: &Value, path: &str) -> Option<i64> {
    i64_at(value, path).filter(|id| *id > 0)
}

/// Exact decimal at `path`, via [`clean_decimal`].
#[must_use]
pub fn decimal_at(value: &Value, path: &str) -> Option<Decimal> {
    lookup(value, path).and_then(clean_decimal)
}

#[must_use]
pub fn bool_at(value: &Value, path: &str) -> Option<bool> {
    match lookup(value, path)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Array at `path`, or an empty slice.
#[must_use]
pub fn array_at<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    match lookup(value, path) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}
