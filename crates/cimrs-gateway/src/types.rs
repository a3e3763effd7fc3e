//! Type mapper between typed CIM values and JSON.
//!
//! Every JSON value the gateway emits is built here, never by serializing a
//! generic map, so integers stay integers of the exact width and `Null`
//! stays `null`. The same module converts key values to and from the
//! literal form used in instance URIs.

use cimrs_kernel::model::{CimType, CimValue};
use serde_json::{Number, Value};
use thiserror::Error;

/// Conversion failures between [`CimValue`], JSON and key literals.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum TypeError {
    /// The JSON value has the wrong shape for the declared type.
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    /// A number does not fit the declared integer width.
    #[error("value {value} is out of range for {ty}")]
    OutOfRange { ty: CimType, value: String },

    /// A key literal cannot be read as the key property's type.
    #[error("'{literal}' is not a valid {ty} literal")]
    InvalidLiteral { ty: CimType, literal: String },

    /// Null and array values have no key literal.
    #[error("{0} cannot be used as a key value")]
    NotScalar(String),
}

/// Canonical name of a CIM type as used in class representations.
pub fn type_name(ty: CimType) -> &'static str {
    ty.as_str()
}

// ─────────────────────────────────────────────────────────────────────────────
// CIM → JSON
// ─────────────────────────────────────────────────────────────────────────────

/// Encode a value as JSON.
///
/// Integers become JSON numbers built from their exact `u64`/`i64` value.
/// Non-finite reals have no JSON number form and are written as the strings
/// `"NaN"`, `"INF"` and `"-INF"`.
pub fn to_json(value: &CimValue) -> Value {
    match value {
        CimValue::Null => Value::Null,
        CimValue::Boolean(b) => Value::Bool(*b),
        CimValue::Uint8(v) => Value::from(u64::from(*v)),
        CimValue::Uint16(v) => Value::from(u64::from(*v)),
        CimValue::Uint32(v) => Value::from(u64::from(*v)),
        CimValue::Uint64(v) => Value::from(*v),
        CimValue::Sint8(v) => Value::from(i64::from(*v)),
        CimValue::Sint16(v) => Value::from(i64::from(*v)),
        CimValue::Sint32(v) => Value::from(i64::from(*v)),
        CimValue::Sint64(v) => Value::from(*v),
        // Widen through the shortest decimal form so 0.1f32 stays 0.1.
        CimValue::Real32(v) => real_to_json(v.to_string().parse().unwrap_or(f64::from(*v))),
        CimValue::Real64(v) => real_to_json(*v),
        CimValue::Char16(c) => Value::String(c.to_string()),
        CimValue::String(s) | CimValue::DateTime(s) | CimValue::Reference(s) => {
            Value::String(s.clone())
        }
        CimValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
    }
}

fn real_to_json(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None if v.is_nan() => Value::String("NaN".to_string()),
        None if v.is_sign_negative() => Value::String("-INF".to_string()),
        None => Value::String("INF".to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON → CIM
// ─────────────────────────────────────────────────────────────────────────────

/// Decode JSON into a value of the declared type.
///
/// `null` decodes to [`CimValue::Null`] for every type. Integer ranges are
/// checked against the declared width.
pub fn from_json(ty: CimType, is_array: bool, value: &Value) -> Result<CimValue, TypeError> {
    if value.is_null() {
        return Ok(CimValue::Null);
    }
    if is_array {
        let Value::Array(items) = value else {
            return Err(mismatch(&format!("{ty}[]"), value));
        };
        return items
            .iter()
            .map(|item| from_json(ty, false, item))
            .collect::<Result<Vec<_>, _>>()
            .map(CimValue::Array);
    }

    match ty {
        CimType::Boolean => value
            .as_bool()
            .map(CimValue::Boolean)
            .ok_or_else(|| mismatch("boolean", value)),
        CimType::Uint8 => unsigned(ty, value).map(CimValue::Uint8),
        CimType::Uint16 => unsigned(ty, value).map(CimValue::Uint16),
        CimType::Uint32 => unsigned(ty, value).map(CimValue::Uint32),
        CimType::Uint64 => unsigned(ty, value).map(CimValue::Uint64),
        CimType::Sint8 => signed(ty, value).map(CimValue::Sint8),
        CimType::Sint16 => signed(ty, value).map(CimValue::Sint16),
        CimType::Sint32 => signed(ty, value).map(CimValue::Sint32),
        CimType::Sint64 => signed(ty, value).map(CimValue::Sint64),
        CimType::Real32 => real(ty, value).map(|v| CimValue::Real32(v as f32)),
        CimType::Real64 => real(ty, value).map(CimValue::Real64),
        CimType::Char16 => {
            let s = string(ty, value)?;
            single_char(s).map(CimValue::Char16).ok_or_else(|| TypeError::InvalidLiteral {
                ty,
                literal: s.to_string(),
            })
        }
        CimType::String => string(ty, value).map(|s| CimValue::String(s.to_string())),
        CimType::Datetime => string(ty, value).map(|s| CimValue::DateTime(s.to_string())),
        CimType::Reference => string(ty, value).map(|s| CimValue::Reference(s.to_string())),
    }
}

fn unsigned<T: TryFrom<u64>>(ty: CimType, value: &Value) -> Result<T, TypeError> {
    let n = match value.as_u64() {
        Some(n) => n,
        None if value.is_number() => return Err(out_of_range(ty, value)),
        None => return Err(mismatch(ty.as_str(), value)),
    };
    T::try_from(n).map_err(|_| out_of_range(ty, value))
}

fn signed<T: TryFrom<i64>>(ty: CimType, value: &Value) -> Result<T, TypeError> {
    let n = match value.as_i64() {
        Some(n) => n,
        None if value.is_number() => return Err(out_of_range(ty, value)),
        None => return Err(mismatch(ty.as_str(), value)),
    };
    T::try_from(n).map_err(|_| out_of_range(ty, value))
}

fn real(ty: CimType, value: &Value) -> Result<f64, TypeError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| out_of_range(ty, value)),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            _ => Err(mismatch(ty.as_str(), value)),
        },
        _ => Err(mismatch(ty.as_str(), value)),
    }
}

fn string(ty: CimType, value: &Value) -> Result<&str, TypeError> {
    value.as_str().ok_or_else(|| mismatch(ty.as_str(), value))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn mismatch(expected: &str, found: &Value) -> TypeError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    TypeError::Mismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn out_of_range(ty: CimType, value: &Value) -> TypeError {
    TypeError::OutOfRange {
        ty,
        value: value.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Key literals
// ─────────────────────────────────────────────────────────────────────────────

/// Literal form of a scalar key value as it appears in an instance URI,
/// before percent-encoding.
pub fn key_literal(value: &CimValue) -> Result<String, TypeError> {
    let literal = match value {
        CimValue::Null => return Err(TypeError::NotScalar("null".to_string())),
        CimValue::Array(_) => return Err(TypeError::NotScalar("array".to_string())),
        CimValue::Boolean(b) => b.to_string(),
        CimValue::Uint8(v) => v.to_string(),
        CimValue::Uint16(v) => v.to_string(),
        CimValue::Uint32(v) => v.to_string(),
        CimValue::Uint64(v) => v.to_string(),
        CimValue::Sint8(v) => v.to_string(),
        CimValue::Sint16(v) => v.to_string(),
        CimValue::Sint32(v) => v.to_string(),
        CimValue::Sint64(v) => v.to_string(),
        CimValue::Real32(v) => v.to_string(),
        CimValue::Real64(v) => v.to_string(),
        CimValue::Char16(c) => c.to_string(),
        CimValue::String(s) | CimValue::DateTime(s) | CimValue::Reference(s) => s.clone(),
    };
    Ok(literal)
}

/// Read a key literal as a value of `ty`. Inverse of [`key_literal`].
pub fn parse_key_literal(ty: CimType, literal: &str) -> Result<CimValue, TypeError> {
    let invalid = || TypeError::InvalidLiteral {
        ty,
        literal: literal.to_string(),
    };

    let value = match ty {
        CimType::Boolean => {
            if literal.eq_ignore_ascii_case("true") {
                CimValue::Boolean(true)
            } else if literal.eq_ignore_ascii_case("false") {
                CimValue::Boolean(false)
            } else {
                return Err(invalid());
            }
        }
        CimType::Uint8 => CimValue::Uint8(literal.parse().map_err(|_| invalid())?),
        CimType::Uint16 => CimValue::Uint16(literal.parse().map_err(|_| invalid())?),
        CimType::Uint32 => CimValue::Uint32(literal.parse().map_err(|_| invalid())?),
        CimType::Uint64 => CimValue::Uint64(literal.parse().map_err(|_| invalid())?),
        CimType::Sint8 => CimValue::Sint8(literal.parse().map_err(|_| invalid())?),
        CimType::Sint16 => CimValue::Sint16(literal.parse().map_err(|_| invalid())?),
        CimType::Sint32 => CimValue::Sint32(literal.parse().map_err(|_| invalid())?),
        CimType::Sint64 => CimValue::Sint64(literal.parse().map_err(|_| invalid())?),
        CimType::Real32 => CimValue::Real32(literal.parse().map_err(|_| invalid())?),
        CimType::Real64 => CimValue::Real64(literal.parse().map_err(|_| invalid())?),
        CimType::Char16 => CimValue::Char16(single_char(literal).ok_or_else(invalid)?),
        CimType::String => CimValue::String(literal.to_string()),
        CimType::Datetime => CimValue::DateTime(literal.to_string()),
        CimType::Reference => CimValue::Reference(literal.to_string()),
    };
    Ok(value)
}
