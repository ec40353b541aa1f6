use serde_json::Value;
use std::fmt;

/// A payload flowing through a port.
///
/// `Absent` means nothing has been produced (an unconnected input, or an output
/// that has not been written yet). JSON `null` is a real value and is carried
/// as `Json(Value::Null)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PortValue {
    #[default]
    Absent,
    Json(Value),
}

impl PortValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, PortValue::Absent)
    }

    /// Absent or JSON `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, PortValue::Absent | PortValue::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PortValue::Absent => None,
            PortValue::Json(v) => Some(v),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            PortValue::Absent => None,
            PortValue::Json(v) => Some(v),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }
}

impl From<Value> for PortValue {
    fn from(value: Value) -> Self {
        PortValue::Json(value)
    }
}

impl From<Option<Value>> for PortValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(PortValue::Absent, PortValue::Json)
    }
}

impl From<&str> for PortValue {
    fn from(value: &str) -> Self {
        PortValue::Json(Value::String(value.to_string()))
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Absent => write!(f, "undefined"),
            PortValue::Json(v) => write!(f, "{}", to_js_string(v)),
        }
    }
}

/// Converts a JSON value to text the way a dynamic language's `String(x)` would.
///
/// Strings are returned verbatim (no quotes), integral numbers lose their
/// fractional part, arrays join their elements with `,` and objects collapse
/// to `[object Object]`.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            use itertools::Itertools;
            items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => to_js_string(other),
                })
                .join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip digits, positional between `1e-6` and `1e21` and
/// exponent form (`1e+21`, `1.5e-7`) outside that range.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }
    let exponential = format!("{:e}", n);
    match exponential.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => exponential,
    }
}

/// Numeric coercion of a port value, `NaN` when there is no sensible number.
pub fn to_number(value: &PortValue) -> f64 {
    match value {
        PortValue::Absent => f64::NAN,
        PortValue::Json(v) => json_to_number(v),
    }
}

fn json_to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => string_to_number(&to_js_string(single)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Whole-string numeric conversion: blank text is zero, anything else must parse fully.
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace.
///
/// Returns `None` when no digits lead the text, so `"12px"` is `Some(12.0)`
/// while `"px12"` and `""` are `None`.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}
