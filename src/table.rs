//! In-memory columnar tables.
//!
//! A [`Table`] is an ordered set of equally long, homogeneously typed
//! [`Column`]s with an optional time index. Encoding reads from it; decoding
//! produces one per result table.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use crate::error::{Error, Result};
use crate::types::WireType;
use crate::value::Value;

/// Name of the column InfluxDB uses for point timestamps.
pub const TIME_COLUMN: &str = "_time";

/// Typed storage for one column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
    DateTime(Vec<DateTime<Utc>>),
}

macro_rules! for_each_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Int8($v) => $body,
            ColumnData::Int16($v) => $body,
            ColumnData::Int32($v) => $body,
            ColumnData::Int64($v) => $body,
            ColumnData::UInt8($v) => $body,
            ColumnData::UInt16($v) => $body,
            ColumnData::UInt32($v) => $body,
            ColumnData::UInt64($v) => $body,
            ColumnData::Float32($v) => $body,
            ColumnData::Float64($v) => $body,
            ColumnData::Bool($v) => $body,
            ColumnData::String($v) => $body,
            ColumnData::DateTime($v) => $body,
        }
    };
}

impl ColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        for_each_variant!(self, v => v.len())
    }

    /// Returns true if the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wire type this storage type maps to.
    pub fn wire_type(&self) -> WireType {
        match self {
            ColumnData::Int8(_)
            | ColumnData::Int16(_)
            | ColumnData::Int32(_)
            | ColumnData::Int64(_) => WireType::Long,
            ColumnData::UInt8(_)
            | ColumnData::UInt16(_)
            | ColumnData::UInt32(_)
            | ColumnData::UInt64(_) => WireType::UnsignedLong,
            ColumnData::Float32(_) | ColumnData::Float64(_) => WireType::Double,
            ColumnData::Bool(_) => WireType::Boolean,
            ColumnData::String(_) => WireType::String,
            ColumnData::DateTime(_) => WireType::DateTime,
        }
    }

    /// Short storage type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int8(_) => "int8",
            ColumnData::Int16(_) => "int16",
            ColumnData::Int32(_) => "int32",
            ColumnData::Int64(_) => "int64",
            ColumnData::UInt8(_) => "uint8",
            ColumnData::UInt16(_) => "uint16",
            ColumnData::UInt32(_) => "uint32",
            ColumnData::UInt64(_) => "uint64",
            ColumnData::Float32(_) => "float32",
            ColumnData::Float64(_) => "float64",
            ColumnData::Bool(_) => "bool",
            ColumnData::String(_) => "string",
            ColumnData::DateTime(_) => "datetime",
        }
    }

    /// Value at `row`, widened to the wire vocabulary.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn value(&self, row: usize) -> Value {
        match self {
            ColumnData::Int8(v) => Value::Long(v[row].into()),
            ColumnData::Int16(v) => Value::Long(v[row].into()),
            ColumnData::Int32(v) => Value::Long(v[row].into()),
            ColumnData::Int64(v) => Value::Long(v[row]),
            ColumnData::UInt8(v) => Value::UnsignedLong(v[row].into()),
            ColumnData::UInt16(v) => Value::UnsignedLong(v[row].into()),
            ColumnData::UInt32(v) => Value::UnsignedLong(v[row].into()),
            ColumnData::UInt64(v) => Value::UnsignedLong(v[row]),
            ColumnData::Float32(v) => Value::Double(OrderedFloat(v[row].into())),
            ColumnData::Float64(v) => Value::Double(OrderedFloat(v[row])),
            ColumnData::Bool(v) => Value::Bool(v[row]),
            ColumnData::String(v) => Value::String(v[row].clone()),
            ColumnData::DateTime(v) => Value::Time(v[row]),
        }
    }
}

/// A named column with an optional validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
    validity: Option<Vec<bool>>,
}

impl Column {
    /// Create a column where every row is valid.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            validity: None,
        }
    }

    /// Attach a validity mask; `false` marks a null row.
    pub fn with_validity(mut self, validity: Vec<bool>) -> Result<Self> {
        if validity.len() != self.data.len() {
            return Err(Error::schema(
                &self.name,
                format!(
                    "validity mask has {} rows, column has {}",
                    validity.len(),
                    self.data.len()
                ),
            ));
        }
        self.validity = if validity.iter().all(|v| *v) {
            None
        } else {
            Some(validity)
        };
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns false if `row` is null.
    pub fn is_valid(&self, row: usize) -> bool {
        self.validity.as_ref().is_none_or(|v| v[row])
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        self.validity
            .as_ref()
            .map_or(0, |v| v.iter().filter(|valid| !**valid).count())
    }

    /// Value at `row`, or `Value::Null` if the row is null.
    pub fn value(&self, row: usize) -> Value {
        if self.is_valid(row) {
            self.data.value(row)
        } else {
            Value::Null
        }
    }
}

/// An ordered collection of equally long columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    time_index: Option<usize>,
}

impl Table {
    /// Build a table, rejecting unequal lengths and duplicate names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for col in &columns[1..] {
                if col.len() != rows {
                    return Err(Error::schema(
                        col.name(),
                        format!("has {} rows, expected {}", col.len(), rows),
                    ));
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(Error::schema(col.name(), "duplicate column name"));
            }
        }
        Ok(Self {
            columns,
            time_index: None,
        })
    }

    /// Designate `name` as the time axis.
    ///
    /// The column must hold `DateTime` values or `Int64` epoch nanoseconds.
    pub fn with_time_column(mut self, name: &str) -> Result<Self> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::schema(name, "time column not found"))?;
        match self.columns[idx].data() {
            ColumnData::DateTime(_) | ColumnData::Int64(_) => {}
            other => {
                return Err(Error::schema(
                    name,
                    format!("time column must be datetime or int64, got {}", other.type_name()),
                ));
            }
        }
        self.time_index = Some(idx);
        Ok(self)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// The designated time column, if any.
    pub fn time_column(&self) -> Option<&Column> {
        self.time_index.map(|i| &self.columns[i])
    }

    pub(crate) fn time_index(&self) -> Option<usize> {
        self.time_index
    }

    pub fn is_time_indexed(&self) -> bool {
        self.time_index.is_some()
    }
}
