//! Wire types and per-table metadata shared by the encoder and decoder.

use std::convert::Infallible;
use std::str::FromStr;

/// Data types exchanged with InfluxDB.
///
/// Annotation tokens outside this vocabulary are kept verbatim in
/// [`WireType::Opaque`] and decoded as strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireType {
    /// String data type.
    String,
    /// RFC3339 timestamp (with optional nanosecond precision).
    DateTime,
    /// Signed 64-bit integer.
    Long,
    /// Unsigned 64-bit integer.
    UnsignedLong,
    /// 64-bit floating point.
    Double,
    /// Boolean value.
    Boolean,
    /// Unrecognized annotation token.
    Opaque(String),
}

impl FromStr for WireType {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input {
            "string" => Self::String,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "long" => Self::Long,
            "unsignedLong" => Self::UnsignedLong,
            "dateTime:RFC3339" | "dateTime:RFC3339Nano" => Self::DateTime,
            other => Self::Opaque(other.to_string()),
        })
    }
}

impl From<&str> for WireType {
    fn from(input: &str) -> Self {
        match input.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WireType::String => "string",
            WireType::Double => "double",
            WireType::Boolean => "boolean",
            WireType::Long => "long",
            WireType::UnsignedLong => "unsignedLong",
            WireType::DateTime => "dateTime:RFC3339",
            WireType::Opaque(token) => token,
        };
        write!(f, "{}", s)
    }
}

/// Role a column plays in a line protocol point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    /// The time axis; written as the point timestamp.
    Timestamp,
    /// Indexed string attribute.
    Tag,
    /// Typed measurement value.
    Field,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnRole::Timestamp => "timestamp",
            ColumnRole::Tag => "tag",
            ColumnRole::Field => "field",
        };
        write!(f, "{}", s)
    }
}

/// Metadata for a column in a result table.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaColumn {
    /// Column name.
    pub name: String,
    /// Data type of the column.
    pub wire_type: WireType,
    /// Whether this column is part of the group key.
    pub group: bool,
    /// Default value for missing entries.
    pub default_value: String,
}

impl MetaColumn {
    /// Create a column with no group flag and an empty default.
    pub fn new(name: impl Into<String>, wire_type: WireType) -> Self {
        Self {
            name: name.into(),
            wire_type,
            group: false,
            default_value: String::new(),
        }
    }
}

/// Metadata for one result table recovered from an annotation group.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultMetadata {
    /// Table position in the response, in arrival order.
    pub position: usize,
    /// Column definitions, already sliced to the kept leading columns.
    pub columns: Vec<MetaColumn>,
    /// Number of data rows attributed to this table.
    pub row_count: usize,
}

impl ResultMetadata {
    /// Create metadata with no rows attributed yet.
    pub fn new(position: usize, columns: Vec<MetaColumn>) -> Self {
        Self {
            position,
            columns,
            row_count: 0,
        }
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&MetaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
