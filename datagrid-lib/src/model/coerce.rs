//! Loose value coercions used by search, filtering and sorting.
//!
//! Records are untyped JSON. Values are stringified for matching, and
//! ordering uses loose relational comparison: string against string by
//! UTF-16 code units, anything else numerically.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Number;
use serde_json::Value;

/// Text used when a field is absent from a record.
pub const MISSING_FIELD: &str = "undefined";

/// Stringifies a value for display and substring matching.
///
/// `null` becomes `"null"`, objects become `"[object Object]"` and arrays
/// join their elements with commas (null elements render empty).
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Stringifies a possibly missing field.
pub fn field_string(value: Option<&Value>) -> String {
    value
        .map(display_string)
        .unwrap_or_else(|| MISSING_FIELD.to_string())
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Compares two possibly missing field values with loose relational rules.
///
/// Pairs that are neither less nor greater (equal values, `NaN`, missing
/// fields) compare as `Equal`, so a stable sort keeps their input order.
pub fn relational_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (Primitive::from_field(a), Primitive::from_field(b)) {
        (Primitive::Str(x), Primitive::Str(y)) => x.encode_utf16().cmp(y.encode_utf16()),
        (x, y) => x
            .to_number()
            .partial_cmp(&y.to_number())
            .unwrap_or(Ordering::Equal),
    }
}

fn number_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    float_string(n.as_f64().unwrap_or(f64::NAN))
}

fn float_string(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // Exponent form with an explicit sign: 1e+21, 1.5e-7.
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    if f.fract() == 0.0 {
        return format!("{:.0}", f);
    }
    f.to_string()
}

/// A field reduced to the primitive used for comparison.
enum Primitive<'a> {
    Str(Cow<'a, str>),
    Num(f64),
}

impl<'a> Primitive<'a> {
    fn from_field(value: Option<&'a Value>) -> Self {
        match value {
            None => Primitive::Num(f64::NAN),
            Some(Value::Null) => Primitive::Num(0.0),
            Some(Value::Bool(b)) => Primitive::Num(if *b { 1.0 } else { 0.0 }),
            Some(Value::Number(n)) => Primitive::Num(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Primitive::Str(Cow::Borrowed(s)),
            Some(other) => Primitive::Str(Cow::Owned(display_string(other))),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Primitive::Num(n) => *n,
            Primitive::Str(s) => string_to_number(s),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust accepts "inf" and "nan" spellings that loose coercion rejects.
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
