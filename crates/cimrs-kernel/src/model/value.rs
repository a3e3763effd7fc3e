//! Typed CIM values.
//!
//! [`CimValue`] keeps the declared width and signedness of every integer so
//! that the JSON type mapper can emit exact numbers instead of whatever a
//! generic serializer would pick for a mixed map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// CimType
// ─────────────────────────────────────────────────────────────────────────────

/// Scalar CIM data types. Array-ness is carried separately by the property
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CimType {
    Boolean,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
    Real32,
    Real64,
    Char16,
    String,
    Datetime,
    Reference,
}

impl CimType {
    /// Canonical lowercase type name as used in class representations.
    pub fn as_str(&self) -> &'static str {
        match self {
            CimType::Boolean => "boolean",
            CimType::Uint8 => "uint8",
            CimType::Sint8 => "sint8",
            CimType::Uint16 => "uint16",
            CimType::Sint16 => "sint16",
            CimType::Uint32 => "uint32",
            CimType::Sint32 => "sint32",
            CimType::Uint64 => "uint64",
            CimType::Sint64 => "sint64",
            CimType::Real32 => "real32",
            CimType::Real64 => "real64",
            CimType::Char16 => "char16",
            CimType::String => "string",
            CimType::Datetime => "datetime",
            CimType::Reference => "reference",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            CimType::Uint8
                | CimType::Sint8
                | CimType::Uint16
                | CimType::Sint16
                | CimType::Uint32
                | CimType::Sint32
                | CimType::Uint64
                | CimType::Sint64
        )
    }

    pub fn is_real(&self) -> bool {
        matches!(self, CimType::Real32 | CimType::Real64)
    }
}

impl fmt::Display for CimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`CimType::from_str`] for an unrecognised type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CIM type '{0}'")]
pub struct UnknownCimType(pub String);

impl FromStr for CimType {
    type Err = UnknownCimType;

    /// Case-insensitive parse of a canonical type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "boolean" => CimType::Boolean,
            "uint8" => CimType::Uint8,
            "sint8" => CimType::Sint8,
            "uint16" => CimType::Uint16,
            "sint16" => CimType::Sint16,
            "uint32" => CimType::Uint32,
            "sint32" => CimType::Sint32,
            "uint64" => CimType::Uint64,
            "sint64" => CimType::Sint64,
            "real32" => CimType::Real32,
            "real64" => CimType::Real64,
            "char16" => CimType::Char16,
            "string" => CimType::String,
            "datetime" => CimType::Datetime,
            "reference" => CimType::Reference,
            _ => return Err(UnknownCimType(s.to_string())),
        };
        Ok(ty)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CimValue
// ─────────────────────────────────────────────────────────────────────────────

/// A typed property, qualifier or key value.
///
/// `Null` is a value in its own right: an unset property is `Null`, not
/// absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CimValue {
    #[default]
    Null,
    Boolean(bool),
    Uint8(u8),
    Sint8(i8),
    Uint16(u16),
    Sint16(i16),
    Uint32(u32),
    Sint32(i32),
    Uint64(u64),
    Sint64(i64),
    Real32(f32),
    Real64(f64),
    Char16(char),
    String(String),
    /// CIM datetime in its interchange string form
    /// (`yyyymmddhhmmss.mmmmmmsutc` or an interval).
    DateTime(String),
    /// Object path of the referenced instance.
    Reference(String),
    Array(Vec<CimValue>),
}

impl CimValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CimValue::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, CimValue::Array(_))
    }

    /// Scalar type of this value. `None` for `Null` and arrays, whose type
    /// comes from the declaring property.
    pub fn cim_type(&self) -> Option<CimType> {
        let ty = match self {
            CimValue::Null | CimValue::Array(_) => return None,
            CimValue::Boolean(_) => CimType::Boolean,
            CimValue::Uint8(_) => CimType::Uint8,
            CimValue::Sint8(_) => CimType::Sint8,
            CimValue::Uint16(_) => CimType::Uint16,
            CimValue::Sint16(_) => CimType::Sint16,
            CimValue::Uint32(_) => CimType::Uint32,
            CimValue::Sint32(_) => CimType::Sint32,
            CimValue::Uint64(_) => CimType::Uint64,
            CimValue::Sint64(_) => CimType::Sint64,
            CimValue::Real32(_) => CimType::Real32,
            CimValue::Real64(_) => CimType::Real64,
            CimValue::Char16(_) => CimType::Char16,
            CimValue::String(_) => CimType::String,
            CimValue::DateTime(_) => CimType::Datetime,
            CimValue::Reference(_) => CimType::Reference,
        };
        Some(ty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CimValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for CimValue {
    fn from(v: bool) -> Self {
        CimValue::Boolean(v)
    }
}

impl From<&str> for CimValue {
    fn from(v: &str) -> Self {
        CimValue::String(v.to_string())
    }
}

impl From<String> for CimValue {
    fn from(v: String) -> Self {
        CimValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_parse_case_insensitively() {
        assert_eq!("UINT32".parse::<CimType>().unwrap(), CimType::Uint32);
        assert_eq!("DateTime".parse::<CimType>().unwrap(), CimType::Datetime);
        assert!("uint128".parse::<CimType>().is_err());
    }

    #[test]
    fn type_name_round_trips_through_display() {
        for ty in [
            CimType::Boolean,
            CimType::Sint64,
            CimType::Real32,
            CimType::Char16,
            CimType::Reference,
        ] {
            assert_eq!(ty.to_string().parse::<CimType>().unwrap(), ty);
        }
    }

    #[test]
    fn null_and_arrays_have_no_scalar_type() {
        assert_eq!(CimValue::Null.cim_type(), None);
        assert_eq!(CimValue::Array(vec![CimValue::Uint8(1)]).cim_type(), None);
        assert_eq!(CimValue::Sint16(-3).cim_type(), Some(CimType::Sint16));
        assert_eq!(CimValue::default(), CimValue::Null);
    }
}
