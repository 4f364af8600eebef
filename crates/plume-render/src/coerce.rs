//! Argument coercion.
//!
//! Filters declare the argument type they need; before a filter runs its
//! resolved argument is converted here. A failed conversion is a
//! [`ResolutionFailure::Unconvertible`], the same error class as an argument
//! that did not resolve at all.

use crate::error::ResolutionFailure;
use crate::value::Value;

/// Convert a value to an integer.
///
/// - integers pass through;
/// - floats truncate toward zero, infinities and NaN are rejected;
/// - strings parse with [`parse_int`];
/// - anything else, booleans included, is rejected.
pub fn to_integer(value: &Value) -> Result<i64, ResolutionFailure> {
    let converted = match value {
        Value::Integer(n) => Some(*n),
        Value::Float(f) => float_to_integer(*f),
        Value::String(s) | Value::SafeString(s) => parse_int(s),
        Value::Boolean(_)
        | Value::None
        | Value::List(_)
        | Value::Map(_)
        | Value::Opaque(_) => None,
    };

    converted.ok_or_else(|| ResolutionFailure::Unconvertible {
        value: value.to_string(),
        target: "integer",
    })
}

fn float_to_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX is not representable; 2^63 is the first float past it.
    if truncated < i64::MIN as f64 || truncated >= 9_223_372_036_854_775_808.0 {
        return None;
    }
    Some(truncated as i64)
}

/// Parse a base-10 integer. Surrounding whitespace is ignored, one sign
/// is allowed, and single underscores may separate digits.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut joined = String::with_capacity(digits.len());
    for group in digits.split('_') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        joined.push_str(group);
    }

    let magnitude: i128 = joined.parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}
