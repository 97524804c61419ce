//! Line protocol encoder.
//!
//! [`LineProtocolEncoder`] turns a [`Table`] into line protocol text, one
//! batch of rows at a time:
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] timestamp\n
//! ```
//!
//! Names are escaped once when the encoder is built. Rows whose fields are all
//! non-finite, null or of a type with no field encoding are dropped rather than
//! written as a point without fields.
//!
//! # Example
//!
//! ```
//! use influxdb_table_codec::table::{Column, ColumnData, Table};
//! use influxdb_table_codec::LineProtocolEncoder;
//!
//! let table = Table::from_columns(vec![
//!     Column::new("time", ColumnData::Int64(vec![1, 2])),
//!     Column::new("host", ColumnData::String(vec!["a".into(), "b".into()])),
//!     Column::new("load", ColumnData::Float64(vec![0.5, f64::NAN])),
//! ])?
//! .with_time_column("time")?;
//!
//! let mut encoder = LineProtocolEncoder::new(&table, "cpu", &["host"])?;
//! let batch = encoder.next_batch(100).unwrap();
//! assert_eq!(batch.text, "cpu,host=a load=0.5 1\n");
//! assert!(encoder.next_batch(100).is_none());
//! # Ok::<(), influxdb_table_codec::Error>(())
//! ```

use std::fmt::Write;
use std::ops::Range;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::escape::{EscapeClass, escape, write_escaped};
use crate::options::EncoderOptions;
use crate::table::{Column, ColumnData, Table};
use crate::types::{ColumnRole, WireType};

/// Counters accumulated while encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Lines produced.
    pub rows_written: usize,
    /// Rows that produced no line.
    pub rows_dropped: usize,
    /// Field values left out of otherwise written or dropped rows.
    pub fields_skipped: usize,
}

/// One encoder output unit: the serialized rows `rows.start..rows.end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Source row range covered by this batch.
    pub rows: Range<usize>,
    /// Newline-terminated line protocol text.
    pub text: String,
    /// Number of lines in `text`; less than the range length when rows were dropped.
    pub lines: usize,
}

/// Outcome of serializing a single row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowOutcome {
    /// Whether a line was appended.
    pub written: bool,
    /// Fields left out of the row.
    pub skipped_fields: usize,
}

#[derive(Clone, Debug)]
struct NamedColumn {
    index: usize,
    escaped: String,
}

/// Serializes individual table rows into line protocol.
///
/// Holds the escaped measurement, tag and field names so every row reuses
/// them.
#[derive(Clone, Debug)]
pub struct RowSerializer<'a> {
    table: &'a Table,
    measurement: String,
    tags: Vec<NamedColumn>,
    fields: Vec<NamedColumn>,
    time: usize,
}

impl<'a> RowSerializer<'a> {
    /// Resolve column roles against `table`.
    ///
    /// `fields` defaults to every column that is neither the time column nor a
    /// tag, in table order.
    pub fn new(
        table: &'a Table,
        measurement: &str,
        tags: &[&str],
        fields: Option<&[&str]>,
    ) -> Result<Self> {
        if measurement.is_empty() {
            return Err(Error::schema(measurement, "measurement name is empty"));
        }
        let time = table
            .time_index()
            .ok_or_else(|| Error::schema("<time>", "table has no designated time column"))?;

        let mut tag_cols = Vec::with_capacity(tags.len());
        for &name in tags {
            let index = resolve(table, name, time, ColumnRole::Tag)?;
            if tag_cols.iter().any(|t: &NamedColumn| t.index == index) {
                return Err(Error::schema(name, "tag listed more than once"));
            }
            tag_cols.push(NamedColumn {
                index,
                escaped: escape(name, EscapeClass::Key).into_owned(),
            });
        }

        let field_indices: Vec<usize> = match fields {
            Some(names) => {
                let mut out = Vec::with_capacity(names.len());
                for &name in names {
                    let index = resolve(table, name, time, ColumnRole::Field)?;
                    if tag_cols.iter().any(|t| t.index == index) {
                        return Err(Error::schema(name, "column is both a tag and a field"));
                    }
                    if out.contains(&index) {
                        return Err(Error::schema(name, "field listed more than once"));
                    }
                    out.push(index);
                }
                out
            }
            None => (0..table.num_columns())
                .filter(|i| *i != time && !tag_cols.iter().any(|t| t.index == *i))
                .collect(),
        };
        if field_indices.is_empty() {
            return Err(Error::schema(measurement, "no field columns to write"));
        }

        let columns = table.columns();
        let field_cols = field_indices
            .into_iter()
            .map(|index| NamedColumn {
                index,
                escaped: escape(columns[index].name(), EscapeClass::Key).into_owned(),
            })
            .collect();

        Ok(Self {
            table,
            measurement: escape(measurement, EscapeClass::Measurement).into_owned(),
            tags: tag_cols,
            fields: field_cols,
            time,
        })
    }

    /// Field columns whose storage type has no field encoding. They are
    /// skipped on every row.
    pub fn unsupported_fields(&self) -> impl Iterator<Item = &Column> {
        let columns = self.table.columns();
        self.fields
            .iter()
            .map(move |f| &columns[f.index])
            .filter(|col| !has_field_encoding(col.data()))
    }

    /// Escaped measurement name.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Escaped tag names, in write order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.escaped.as_str())
    }

    /// Escaped field names, in write order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.escaped.as_str())
    }

    /// Role assigned to a column, `None` if it is not written.
    pub fn role(&self, column: &str) -> Option<ColumnRole> {
        let index = self.table.column_index(column)?;
        if index == self.time {
            Some(ColumnRole::Timestamp)
        } else if self.tags.iter().any(|t| t.index == index) {
            Some(ColumnRole::Tag)
        } else if self.fields.iter().any(|f| f.index == index) {
            Some(ColumnRole::Field)
        } else {
            None
        }
    }

    /// Append the line for `row` to `out`.
    ///
    /// Nothing is appended if no field could be written or the timestamp is
    /// unusable.
    pub fn write_row(&self, out: &mut String, row: usize) -> RowOutcome {
        let columns = self.table.columns();
        let Some(timestamp) = timestamp_nanos(&columns[self.time], row) else {
            warn!(
                "row {} has a null or out-of-range timestamp in '{}'; dropping it",
                row,
                columns[self.time].name()
            );
            return RowOutcome {
                written: false,
                skipped_fields: 0,
            };
        };

        let start = out.len();
        out.push_str(&self.measurement);

        for tag in &self.tags {
            let mark = out.len();
            out.push(',');
            out.push_str(&tag.escaped);
            out.push('=');
            if !write_tag_value(out, &columns[tag.index], row) {
                out.truncate(mark);
            }
        }
        out.push(' ');

        let mut written = 0;
        let mut skipped = 0;
        for field in &self.fields {
            let mark = out.len();
            if written > 0 {
                out.push(',');
            }
            out.push_str(&field.escaped);
            out.push('=');
            let col = &columns[field.index];
            if col.is_valid(row) && write_field_value(out, col.data(), row) {
                written += 1;
            } else {
                out.truncate(mark);
                skipped += 1;
            }
        }

        if written == 0 {
            out.truncate(start);
            return RowOutcome {
                written: false,
                skipped_fields: skipped,
            };
        }

        let _ = writeln!(out, " {}", timestamp);
        RowOutcome {
            written: true,
            skipped_fields: skipped,
        }
    }
}

fn resolve(table: &Table, name: &str, time: usize, role: ColumnRole) -> Result<usize> {
    let index = table
        .column_index(name)
        .ok_or_else(|| Error::schema(name, format!("{} column not found", role)))?;
    if index == time {
        return Err(Error::schema(
            name,
            format!("time column cannot be used as a {}", role),
        ));
    }
    Ok(index)
}

fn has_field_encoding(data: &ColumnData) -> bool {
    !matches!(data.wire_type(), WireType::Boolean | WireType::DateTime)
}

fn timestamp_nanos(col: &Column, row: usize) -> Option<i64> {
    if !col.is_valid(row) {
        return None;
    }
    match col.data() {
        ColumnData::DateTime(v) => v[row].timestamp_nanos_opt(),
        ColumnData::Int64(v) => Some(v[row]),
        _ => None,
    }
}

/// Write a tag value. Returns false for null or empty values, which line
/// protocol cannot represent.
fn write_tag_value(out: &mut String, col: &Column, row: usize) -> bool {
    if !col.is_valid(row) {
        return false;
    }
    match col.data() {
        ColumnData::String(v) => {
            if v[row].is_empty() {
                return false;
            }
            write_escaped(out, &v[row], EscapeClass::Key);
        }
        other => {
            let text = other.value(row).to_string();
            write_escaped(out, &text, EscapeClass::Key);
        }
    }
    true
}

/// Write a field value with its type suffix. Returns false if the value has no
/// line protocol form.
fn write_field_value(out: &mut String, data: &ColumnData, row: usize) -> bool {
    match data {
        ColumnData::Int8(v) => write_int(out, v[row], 'i'),
        ColumnData::Int16(v) => write_int(out, v[row], 'i'),
        ColumnData::Int32(v) => write_int(out, v[row], 'i'),
        ColumnData::Int64(v) => write_int(out, v[row], 'i'),
        ColumnData::UInt8(v) => write_int(out, v[row], 'u'),
        ColumnData::UInt16(v) => write_int(out, v[row], 'u'),
        ColumnData::UInt32(v) => write_int(out, v[row], 'u'),
        ColumnData::UInt64(v) => write_int(out, v[row], 'u'),
        ColumnData::Float32(v) => {
            if !v[row].is_finite() {
                return false;
            }
            let _ = write!(out, "{}", v[row]);
        }
        ColumnData::Float64(v) => {
            if !v[row].is_finite() {
                return false;
            }
            let _ = write!(out, "{}", v[row]);
        }
        ColumnData::String(v) => {
            out.push('"');
            write_escaped(out, &v[row], EscapeClass::StringField);
            out.push('"');
        }
        ColumnData::Bool(_) | ColumnData::DateTime(_) => return false,
    }
    true
}

fn write_int(out: &mut String, value: impl std::fmt::Display, suffix: char) {
    let _ = write!(out, "{}{}", value, suffix);
}

/// Pull-based batch producer over a table.
///
/// Each call to [`next_batch`](Self::next_batch) serializes the next run of
/// rows. The cursor only moves forward and the encoder cannot be cloned to
/// replay batches; encode the table again with a fresh encoder.
///
/// ```compile_fail
/// # use influxdb_table_codec::table::{Column, ColumnData, Table};
/// # use influxdb_table_codec::LineProtocolEncoder;
/// # let table = Table::from_columns(vec![
/// #     Column::new("t", ColumnData::Int64(vec![1])),
/// #     Column::new("v", ColumnData::Int64(vec![1])),
/// # ])?
/// # .with_time_column("t")?;
/// let encoder = LineProtocolEncoder::new(&table, "m", &[])?;
/// let replay = encoder.clone();
/// # Ok::<(), influxdb_table_codec::Error>(())
/// ```
#[derive(Debug)]
pub struct LineProtocolEncoder<'a> {
    rows: RowSerializer<'a>,
    cursor: usize,
    total: usize,
    stats: EncodeStats,
}

impl<'a> LineProtocolEncoder<'a> {
    /// Encoder writing `tags` as tags and every other non-time column as a field.
    pub fn new(table: &'a Table, measurement: &str, tags: &[&str]) -> Result<Self> {
        Self::from_serializer(RowSerializer::new(table, measurement, tags, None)?)
    }

    /// Encoder with an explicit field list.
    pub fn with_fields(
        table: &'a Table,
        measurement: &str,
        tags: &[&str],
        fields: &[&str],
    ) -> Result<Self> {
        Self::from_serializer(RowSerializer::new(table, measurement, tags, Some(fields))?)
    }

    fn from_serializer(rows: RowSerializer<'a>) -> Result<Self> {
        let total = rows.table.num_rows();
        Ok(Self {
            rows,
            cursor: 0,
            total,
            stats: EncodeStats::default(),
        })
    }

    /// Serialize up to `batch_size` rows from the cursor.
    ///
    /// Returns `None` once every row has been consumed. A batch whose rows were
    /// all dropped is still returned, with empty text.
    pub fn next_batch(&mut self, batch_size: usize) -> Option<Batch> {
        if self.cursor >= self.total {
            return None;
        }
        let start = self.cursor;
        let end = start.saturating_add(batch_size.max(1)).min(self.total);
        if start == 0 {
            for col in self.rows.unsupported_fields() {
                warn!(
                    "column '{}' has type {} with no line protocol field encoding; it will be skipped",
                    col.name(),
                    col.data().type_name()
                );
            }
        }

        let mut text = String::new();
        let mut lines = 0;
        for row in start..end {
            let outcome = self.rows.write_row(&mut text, row);
            self.stats.fields_skipped += outcome.skipped_fields;
            if outcome.written {
                lines += 1;
            } else {
                self.stats.rows_dropped += 1;
            }
        }
        self.stats.rows_written += lines;
        self.cursor = end;

        debug!(
            "encoded rows {}..{} of {} into {} lines ({} bytes)",
            start,
            end,
            self.total,
            lines,
            text.len()
        );
        Some(Batch {
            rows: start..end,
            text,
            lines,
        })
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.total - self.cursor
    }

    /// Counters for the rows consumed so far.
    pub fn stats(&self) -> EncodeStats {
        self.stats
    }

    /// Row serializer holding the resolved column roles.
    pub fn serializer(&self) -> &RowSerializer<'a> {
        &self.rows
    }

    /// Iterate over the remaining batches.
    pub fn batches(self, batch_size: usize) -> Batches<'a> {
        Batches {
            encoder: self,
            batch_size,
        }
    }

    /// Iterate over the remaining batches using configured options.
    pub fn batches_with(self, options: &EncoderOptions) -> Batches<'a> {
        self.batches(options.batch_size)
    }
}

/// Iterator adapter returned by [`LineProtocolEncoder::batches`].
#[derive(Debug)]
pub struct Batches<'a> {
    encoder: LineProtocolEncoder<'a>,
    batch_size: usize,
}

impl Batches<'_> {
    /// Counters for the batches yielded so far.
    pub fn stats(&self) -> EncodeStats {
        self.encoder.stats()
    }
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        self.encoder.next_batch(self.batch_size)
    }
}

/// Encode a whole table as one string.
pub fn to_line_protocol(table: &Table, measurement: &str, tags: &[&str]) -> Result<String> {
    let encoder = LineProtocolEncoder::new(table, measurement, tags)?;
    Ok(encoder.batches(usize::MAX).map(|b| b.text).collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn table(columns: Vec<Column>) -> Table {
        Table::from_columns(columns)
            .unwrap()
            .with_time_column("time")
            .unwrap()
    }

    fn times(n: usize) -> Column {
        Column::new("time", ColumnData::Int64((1..=n as i64).collect()))
    }

    fn strings(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            ColumnData::String(values.iter().map(|s| s.to_string()).collect()),
        )
    }

    #[test]
    fn test_tags_and_fields() {
        let t = table(vec![
            times(2),
            strings("host", &["a", "b"]),
            strings("region", &["eu", "us"]),
            Column::new("count", ColumnData::Int32(vec![3, -4])),
            Column::new("load", ColumnData::Float64(vec![0.25, 1.0])),
        ]);
        let text = to_line_protocol(&t, "cpu", &["host", "region"]).unwrap();
        assert_eq!(
            text,
            "cpu,host=a,region=eu count=3i,load=0.25 1\n\
             cpu,host=b,region=us count=-4i,load=1 2\n"
        );
    }

    #[test]
    fn test_no_tags_uses_space() {
        let t = table(vec![times(1), Column::new("v", ColumnData::UInt16(vec![7]))]);
        assert_eq!(to_line_protocol(&t, "m", &[]).unwrap(), "m v=7u 1\n");
    }

    #[test]
    fn test_integer_boundaries() {
        let t = table(vec![
            times(1),
            Column::new("u", ColumnData::UInt64(vec![u64::MAX])),
            Column::new("i", ColumnData::Int64(vec![-1])),
        ]);
        assert_eq!(
            to_line_protocol(&t, "m", &[]).unwrap(),
            "m u=18446744073709551615u,i=-1i 1\n"
        );
    }

    #[test]
    fn test_string_fields_are_quoted_and_escaped() {
        let t = table(vec![times(1), strings("msg", &[r#"he said "hi", \o"#])]);
        assert_eq!(
            to_line_protocol(&t, "log", &[]).unwrap(),
            "log msg=\"he said \\\"hi\\\", \\\\o\" 1\n"
        );
    }

    #[test]
    fn test_names_and_tag_values_are_escaped() {
        let t = table(vec![
            times(1),
            strings("rack id", &["r 1,a=b"]),
            Column::new("v=x", ColumnData::Float64(vec![1.5])),
        ]);
        assert_eq!(
            to_line_protocol(&t, "my measure,x", &["rack id"]).unwrap(),
            "my\\ measure\\,x,rack\\ id=r\\ 1\\,a\\=b v\\=x=1.5 1\n"
        );
    }

    #[test]
    fn test_partial_nan_row_keeps_remaining_fields() {
        let t = table(vec![
            times(3),
            Column::new("a", ColumnData::Float64(vec![1.0, f64::NAN, 3.0])),
            Column::new("b", ColumnData::Float64(vec![f64::INFINITY, 2.0, f64::NEG_INFINITY])),
        ]);
        let mut enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        let batch = enc.next_batch(10).unwrap();
        assert_eq!(batch.text, "m a=1 1\nm b=2 2\nm a=3 3\n");
        assert_eq!(enc.stats().fields_skipped, 3);
        assert_eq!(enc.stats().rows_dropped, 0);
    }

    #[test]
    fn test_nan_between_fields_leaves_single_separator() {
        let t = table(vec![
            times(1),
            Column::new("a", ColumnData::Float64(vec![1.0])),
            Column::new("b", ColumnData::Float64(vec![f64::NAN])),
            Column::new("c", ColumnData::Float64(vec![3.0])),
        ]);
        let mut enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        assert_eq!(enc.next_batch(10).unwrap().text, "m a=1,c=3 1\n");
        assert_eq!(enc.stats().fields_skipped, 1);
        assert_eq!(enc.stats().rows_written, 1);
    }

    #[test]
    fn test_all_nan_row_is_dropped() {
        let t = table(vec![
            times(3),
            Column::new("a", ColumnData::Float32(vec![f32::NAN, 1.5, f32::NAN])),
            Column::new("b", ColumnData::Float64(vec![f64::NAN, f64::NAN, f64::NAN])),
        ]);
        let mut enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        let batch = enc.next_batch(10).unwrap();
        assert_eq!(batch.text, "m a=1.5 2\n");
        assert_eq!(batch.lines, 1);
        assert_eq!(batch.rows, 0..3);
        assert_eq!(
            enc.stats(),
            EncodeStats {
                rows_written: 1,
                rows_dropped: 2,
                fields_skipped: 5,
            }
        );
    }

    #[test]
    fn test_null_cells_behave_like_missing_values() {
        let t = table(vec![
            times(2),
            strings("host", &["a", "b"]).with_validity(vec![false, true]).unwrap(),
            Column::new("v", ColumnData::Int64(vec![1, 2]))
                .with_validity(vec![true, false])
                .unwrap(),
            Column::new("w", ColumnData::Int64(vec![10, 20])),
        ]);
        assert_eq!(
            to_line_protocol(&t, "m", &["host"]).unwrap(),
            "m v=1i,w=10i 1\nm,host=b w=20i 2\n"
        );
    }

    #[test]
    fn test_unsupported_field_type_is_skipped() {
        let t = table(vec![
            times(2),
            Column::new("ok", ColumnData::Bool(vec![true, false])),
            Column::new("v", ColumnData::Float64(vec![f64::NAN, 2.0])),
        ]);
        let mut enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        let unsupported: Vec<&str> =
            enc.serializer().unsupported_fields().map(Column::name).collect();
        assert_eq!(unsupported, vec!["ok"]);
        let batch = enc.next_batch(10).unwrap();
        assert_eq!(batch.text, "m v=2 2\n");
        assert_eq!(enc.stats().fields_skipped, 3);
        assert_eq!(enc.stats().rows_dropped, 1);
    }

    #[test]
    fn test_datetime_timestamps() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 3).unwrap();
        let t = Table::from_columns(vec![
            Column::new("time", ColumnData::DateTime(vec![ts])),
            Column::new("v", ColumnData::Int8(vec![1])),
        ])
        .unwrap()
        .with_time_column("time")
        .unwrap();
        assert_eq!(
            to_line_protocol(&t, "m", &[]).unwrap(),
            "m v=1i 1672531203000000000\n"
        );
    }

    #[test]
    fn test_numeric_tags_render_as_text() {
        let t = table(vec![
            times(1),
            Column::new("slot", ColumnData::UInt8(vec![4])),
            Column::new("v", ColumnData::Int8(vec![1])),
        ]);
        assert_eq!(to_line_protocol(&t, "m", &["slot"]).unwrap(), "m,slot=4 v=1i 1\n");
    }

    #[test]
    fn test_batches_cover_rows_without_gaps() {
        let t = table(vec![
            times(10),
            Column::new("v", ColumnData::Int64((0..10).collect())),
        ]);
        let enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        let batches: Vec<Batch> = enc.batches(4).collect();
        let ranges: Vec<_> = batches.iter().map(|b| b.rows.clone()).collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert_eq!(batches.iter().map(|b| b.lines).sum::<usize>(), 10);
        assert!(batches.iter().all(|b| b.text.ends_with('\n')));

        let joined: String = batches.into_iter().map(|b| b.text).collect();
        assert_eq!(joined, to_line_protocol(&t, "m", &[]).unwrap());
    }

    #[test]
    fn test_encoder_is_not_restartable() {
        let t = table(vec![times(2), Column::new("v", ColumnData::Int64(vec![1, 2]))]);
        let mut enc = LineProtocolEncoder::new(&t, "m", &[]).unwrap();
        assert_eq!(enc.remaining(), 2);
        assert!(enc.next_batch(usize::MAX).is_some());
        assert_eq!(enc.remaining(), 0);
        assert!(enc.next_batch(1).is_none());
        assert!(enc.next_batch(1).is_none());
    }

    #[test]
    fn test_explicit_fields() {
        let t = table(vec![
            times(1),
            Column::new("a", ColumnData::Int64(vec![1])),
            Column::new("b", ColumnData::Int64(vec![2])),
        ]);
        let mut enc = LineProtocolEncoder::with_fields(&t, "m", &[], &["b"]).unwrap();
        assert_eq!(enc.next_batch(1).unwrap().text, "m b=2i 1\n");
    }

    #[test]
    fn test_schema_errors() {
        let t = table(vec![times(1), Column::new("a", ColumnData::Int64(vec![1]))]);

        let err = LineProtocolEncoder::new(&t, "m", &["missing"]).unwrap_err();
        assert!(matches!(err, Error::Schema { ref column, .. } if column == "missing"));

        assert!(LineProtocolEncoder::new(&t, "m", &["time"]).is_err());
        assert!(LineProtocolEncoder::new(&t, "", &[]).is_err());
        // Every non-time column is a tag, so nothing is left to write
        assert!(LineProtocolEncoder::new(&t, "m", &["a"]).is_err());
        assert!(LineProtocolEncoder::with_fields(&t, "m", &["a"], &["a"]).is_err());

        let untimed =
            Table::from_columns(vec![Column::new("a", ColumnData::Int64(vec![1]))]).unwrap();
        assert!(LineProtocolEncoder::new(&untimed, "m", &[]).is_err());
    }

    #[test]
    fn test_roles_partition_columns() {
        let t = table(vec![
            times(1),
            strings("host", &["h"]),
            Column::new("a", ColumnData::Int64(vec![1])),
            Column::new("b", ColumnData::Int64(vec![2])),
        ]);
        let rows = RowSerializer::new(&t, "m", &["host"], Some(&["a"][..])).unwrap();
        assert_eq!(rows.role("time"), Some(ColumnRole::Timestamp));
        assert_eq!(rows.role("host"), Some(ColumnRole::Tag));
        assert_eq!(rows.role("a"), Some(ColumnRole::Field));
        assert_eq!(rows.role("b"), None);
        assert_eq!(rows.role("zzz"), None);
    }

    #[test]
    fn test_escaped_names_exposed() {
        let t = table(vec![
            times(1),
            strings("a b", &["x"]),
            Column::new("c,d", ColumnData::Int64(vec![1])),
        ]);
        let enc = LineProtocolEncoder::new(&t, "m m", &["a b"]).unwrap();
        let rows = enc.serializer();
        assert_eq!(rows.measurement(), "m\\ m");
        assert_eq!(rows.tag_names().collect::<Vec<_>>(), vec!["a\\ b"]);
        assert_eq!(rows.field_names().collect::<Vec<_>>(), vec!["c\\,d"]);
    }
}
