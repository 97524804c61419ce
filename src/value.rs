//! Scalar values in the wire vocabulary.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use crate::types::WireType;

/// A single cell, widened to the type InfluxDB would report for it.
///
/// Table cells are read through this type (see [`Column::value`]) and decoded
/// annotated CSV cells are cast into it before landing in a column.
///
/// [`Column::value`]: crate::table::Column::value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    /// Any float width; `OrderedFloat` so values compare and hash.
    Double(OrderedFloat<f64>),
    Bool(bool),
    /// Any signed integer width.
    Long(i64),
    /// Any unsigned integer width.
    UnsignedLong(u64),
    Time(DateTime<Utc>),
    /// Missing cell: an invalid row, or an empty CSV cell with no default.
    Null,
}

// Typed accessors return `None` on a variant mismatch; no conversion is
// attempted between signed and unsigned or between numbers and strings.
impl Value {
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    pub fn as_double(&self) -> Option<f64> {
        if let Value::Double(d) = self { Some(d.0) } else { None }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self { Some(*b) } else { None }
    }

    pub fn as_long(&self) -> Option<i64> {
        if let Value::Long(n) = self { Some(*n) } else { None }
    }

    pub fn as_unsigned_long(&self) -> Option<u64> {
        if let Value::UnsignedLong(n) = self { Some(*n) } else { None }
    }

    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        if let Value::Time(t) = self { Some(t) } else { None }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Annotation type a column holding this value would carry, `None` for `Null`.
    pub fn wire_type(&self) -> Option<WireType> {
        Some(match self {
            Value::String(_) => WireType::String,
            Value::Double(_) => WireType::Double,
            Value::Bool(_) => WireType::Boolean,
            Value::Long(_) => WireType::Long,
            Value::UnsignedLong(_) => WireType::UnsignedLong,
            Value::Time(_) => WireType::DateTime,
            Value::Null => return None,
        })
    }
}

/// Renders the cell text as it appears in annotated CSV; `Null` renders empty.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Double(d) => write!(f, "{}", d.0),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Long(n) => write!(f, "{}", n),
            Value::UnsignedLong(n) => write!(f, "{}", n),
            Value::Time(t) => {
                f.write_str(&t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
            }
            Value::Null => Ok(()),
        }
    }
}
