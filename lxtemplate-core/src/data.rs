//! Data Bag - Dotted-Path Access
//!
//! A bag is an ordered JSON object. Paths are split on a separator and
//! walked one segment at a time; a missing segment resolves to "absent",
//! never to an error.

use serde_json::{Map, Value};
use thiserror::Error;

pub type DataBag = Map<String, Value>;

pub const DEFAULT_SEPARATOR: &str = ".";

/// Returned by `get` for absent paths.
pub static EMPTY: Value = Value::String(String::new());

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Data must be an object, got {0}")]
    NotAMap(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Resolve `path` against `bag`.
///
/// An empty path is absent. Arrays are indexed by numeric segments; any
/// other scalar stops the walk. An empty separator treats the whole path
/// as one top-level key.
pub fn lookup<'a>(bag: &'a DataBag, path: &str, separator: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    if separator.is_empty() {
        return bag.get(path);
    }

    let mut segments = path.split(separator);
    let first = segments.next()?;
    let mut current = bag.get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(list) => list.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Loose truthiness: absent, null, false, zero, "", "0" and empty
/// collections are all falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !(s.is_empty() || s == "0"),
        Some(Value::Array(list)) => !list.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// Text form used wherever a value is interpolated into markup.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Numeric check for scalars: JSON numbers and strings that parse as a
/// plain decimal number (optional sign, fraction and exponent).
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => is_numeric_str(s),
        _ => false,
    }
}

fn is_numeric_str(s: &str) -> bool {
    let s = s.trim_start();
    if s.is_empty() {
        return false;
    }
    // f64 parsing also accepts "inf" and "NaN", which are not numeric here
    s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && s.parse::<f64>().is_ok()
}

/// Attachment id from a number or a numeric string. Integral floats
/// (`12.0`, `"12.0"`) count as ids.
pub fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<u64> {
    (f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64).then(|| f as u64)
}

/// Top-level write. Dotted keys are rejected.
pub fn set(bag: &mut DataBag, key: &str, value: Value, separator: &str) -> Result<(), HelperError> {
    if !separator.is_empty() && key.contains(separator) {
        tracing::warn!(key, "rejected nested set");
        return Err(HelperError::UnsupportedOperation(format!(
            "set nested key is not supported: {}",
            key
        )));
    }
    bag.insert(key.to_string(), value);
    Ok(())
}

pub fn into_bag(value: Value) -> Result<DataBag, HelperError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(HelperError::NotAMap(kind_of(&other).to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
