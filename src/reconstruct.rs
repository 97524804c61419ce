//! Typed table reconstruction from decoded metadata and data rows.
//!
//! Each [`ResultMetadata`] owns the next `row_count` data rows, in order. Rows
//! are split as CSV records, cast per wire type into column builders, and the
//! builders become the columns of one [`Table`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use ordered_float::OrderedFloat;

use crate::decoder::split_fields;
use crate::error::{Error, Result};
use crate::options::DecoderOptions;
use crate::table::{Column, ColumnData, TIME_COLUMN, Table};
use crate::timestamp::parse_timestamp;
use crate::types::{MetaColumn, ResultMetadata, WireType};
use crate::value::Value;

/// Build one table per metadata record, consuming `data_lines` in order.
pub(crate) fn reconstruct(
    metadata: &[ResultMetadata],
    data_lines: &[String],
    options: &DecoderOptions,
) -> Result<Vec<Table>> {
    if metadata.is_empty() {
        return Err(Error::EmptyResult);
    }

    let first = options.first_column();
    let mut offset = 0;
    let mut tables = Vec::with_capacity(metadata.len());

    for (t, meta) in metadata.iter().enumerate() {
        let end = offset + meta.row_count;
        let Some(rows) = data_lines.get(offset..end) else {
            return Err(Error::consistency(
                t,
                None,
                format!(
                    "expected {} rows but only {} remain",
                    meta.row_count,
                    data_lines.len().saturating_sub(offset)
                ),
            ));
        };

        let kept: Vec<bool> = meta.columns.iter().map(|c| options.keeps(&c.name)).collect();
        let mut builders: Vec<ColumnBuilder> = meta
            .columns
            .iter()
            .zip(&kept)
            .filter(|(_, keep)| **keep)
            .map(|(col, _)| ColumnBuilder::new(col, meta.row_count))
            .collect();

        let expected = first + meta.columns.len();
        for (r, line) in rows.iter().enumerate() {
            let fields = split_fields(line)?;
            if fields.len() != expected {
                return Err(Error::consistency(
                    t,
                    Some(r),
                    format!("expected {} columns, got {}", expected, fields.len()),
                ));
            }
            let mut builder = builders.iter_mut();
            let cells = fields.iter().skip(first);
            for ((col, raw), keep) in meta.columns.iter().zip(cells).zip(&kept) {
                if !keep {
                    continue;
                }
                if let Some(b) = builder.next() {
                    let value = parse_value(raw, col, t, r)?;
                    b.push(value, t, r)?;
                }
            }
        }

        let columns = builders
            .into_iter()
            .map(|b| b.finish(t))
            .collect::<Result<Vec<_>>>()?;
        let table = Table::from_columns(columns)?;
        let table = match table.column(TIME_COLUMN).map(Column::data) {
            Some(ColumnData::DateTime(_)) => table.with_time_column(TIME_COLUMN)?,
            _ => table,
        };
        debug!(
            "reconstructed table {} with {} rows and {} columns",
            t,
            table.num_rows(),
            table.num_columns()
        );
        tables.push(table);
        offset = end;
    }

    if offset != data_lines.len() {
        return Err(Error::consistency(
            metadata.len() - 1,
            None,
            format!(
                "{} data rows are not attributed to any table",
                data_lines.len() - offset
            ),
        ));
    }

    Ok(tables)
}

/// Cast one cell according to its column's wire type.
///
/// Empty cells take the column default; if that is empty too the cell is null,
/// except for strings. Timestamps stay strings here and are parsed per column
/// once the table is filled.
fn parse_value(raw: &str, col: &MetaColumn, table: usize, row: usize) -> Result<Value> {
    let s = if raw.is_empty() { col.default_value.as_str() } else { raw };
    let is_string = matches!(col.wire_type, WireType::String | WireType::Opaque(_));
    if s.is_empty() && !is_string {
        return Ok(Value::Null);
    }

    match &col.wire_type {
        WireType::String | WireType::Opaque(_) | WireType::DateTime => Ok(Value::String(s.to_string())),
        WireType::Double => parse_number(s, "double", &col.name, table, row)
            .map(|v| Value::Double(OrderedFloat(v))),
        WireType::Long => parse_number(s, "long", &col.name, table, row).map(Value::Long),
        WireType::UnsignedLong => {
            parse_number(s, "unsignedLong", &col.name, table, row).map(Value::UnsignedLong)
        }
        WireType::Boolean => Ok(Value::Bool(s.eq_ignore_ascii_case("true"))),
    }
}

fn parse_number<T>(s: &str, kind: &str, column: &str, table: usize, row: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| Error::Parse {
        message: format!(
            "Invalid {} '{}' for column '{}' (table {}, row {}): {}",
            kind, s, column, table, row, e
        ),
    })
}

enum BuilderData {
    String(Vec<String>),
    /// Raw RFC3339 text, parsed in `finish`.
    DateTime(Vec<String>),
    Long(Vec<i64>),
    UnsignedLong(Vec<u64>),
    Double(Vec<f64>),
    Boolean(Vec<bool>),
}

struct ColumnBuilder {
    name: String,
    data: BuilderData,
    validity: Vec<bool>,
}

impl ColumnBuilder {
    fn new(col: &MetaColumn, rows: usize) -> Self {
        let data = match col.wire_type {
            WireType::String | WireType::Opaque(_) => BuilderData::String(Vec::with_capacity(rows)),
            WireType::DateTime => BuilderData::DateTime(Vec::with_capacity(rows)),
            WireType::Long => BuilderData::Long(Vec::with_capacity(rows)),
            WireType::UnsignedLong => BuilderData::UnsignedLong(Vec::with_capacity(rows)),
            WireType::Double => BuilderData::Double(Vec::with_capacity(rows)),
            WireType::Boolean => BuilderData::Boolean(Vec::with_capacity(rows)),
        };
        Self {
            name: col.name.clone(),
            data,
            validity: Vec::with_capacity(rows),
        }
    }

    fn push(&mut self, value: Value, table: usize, row: usize) -> Result<()> {
        let valid = !value.is_null();
        match (&mut self.data, value) {
            (BuilderData::String(v) | BuilderData::DateTime(v), Value::String(s)) => v.push(s),
            (BuilderData::String(v) | BuilderData::DateTime(v), Value::Null) => v.push(String::new()),
            (BuilderData::Long(v), Value::Long(x)) => v.push(x),
            (BuilderData::Long(v), Value::Null) => v.push(0),
            (BuilderData::UnsignedLong(v), Value::UnsignedLong(x)) => v.push(x),
            (BuilderData::UnsignedLong(v), Value::Null) => v.push(0),
            (BuilderData::Double(v), Value::Double(x)) => v.push(x.into_inner()),
            (BuilderData::Double(v), Value::Null) => v.push(f64::NAN),
            (BuilderData::Boolean(v), Value::Bool(x)) => v.push(x),
            (BuilderData::Boolean(v), Value::Null) => v.push(false),
            (_, other) => {
                return Err(Error::consistency(
                    table,
                    Some(row),
                    format!("value {:?} does not fit column '{}'", other, self.name),
                ));
            }
        }
        self.validity.push(valid);
        Ok(())
    }

    fn finish(self, table: usize) -> Result<Column> {
        let data = match self.data {
            BuilderData::String(v) => ColumnData::String(v),
            BuilderData::DateTime(raw) => {
                let mut parsed = Vec::with_capacity(raw.len());
                for (row, (s, valid)) in raw.iter().zip(&self.validity).enumerate() {
                    if !valid {
                        parsed.push(DateTime::<Utc>::UNIX_EPOCH);
                        continue;
                    }
                    let t = parse_timestamp(s).map_err(|e| Error::Parse {
                        message: format!(
                            "column '{}' (table {}, row {}): {}",
                            self.name, table, row, e
                        ),
                    })?;
                    parsed.push(t);
                }
                ColumnData::DateTime(parsed)
            }
            BuilderData::Long(v) => ColumnData::Int64(v),
            BuilderData::UnsignedLong(v) => ColumnData::UInt64(v),
            BuilderData::Double(v) => ColumnData::Float64(v),
            BuilderData::Boolean(v) => ColumnData::Bool(v),
        };
        Column::new(self.name, data).with_validity(self.validity)
    }
}
