//! Push-based decoder for InfluxDB annotated CSV.
//!
//! This module decodes the format returned by the `/api/v2/query` endpoint:
//!
//! ```text
//! #datatype,string,long,dateTime:RFC3339,double
//! #group,false,false,false,false
//! #default,_result,,,
//! ,result,table,_time,_value
//! ,,0,2023-01-01T00:00:03Z,1.5
//! ```
//!
//! Chunks are fed in arrival order through [`AnnotatedCsvDecoder::append`]. The
//! decoder keeps a [`StreamBuffer`] for incomplete input, classifies every
//! released line as annotation, column-name row or data row, and records one
//! [`ResultMetadata`] per column-name row. [`AnnotatedCsvDecoder::finish`] turns
//! the collected metadata and rows into typed tables.
//!
//! One decoder serves exactly one response.
//!
//! # Example
//!
//! ```
//! use influxdb_table_codec::AnnotatedCsvDecoder;
//!
//! let mut decoder = AnnotatedCsvDecoder::new();
//! decoder.append("#datatype,string,long,long\n#default,_result,,\n,result,table,_va")?;
//! decoder.append("lue\n,,0,42\n")?;
//! let tables = decoder.finish()?;
//! assert_eq!(tables[0].num_rows(), 1);
//! # Ok::<(), influxdb_table_codec::Error>(())
//! ```

use csv::{ReaderBuilder, StringRecord};
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::buffer::StreamBuffer;
use crate::error::{Error, Result};
use crate::options::DecoderOptions;
use crate::reconstruct::reconstruct;
use crate::table::Table;
use crate::types::{MetaColumn, ResultMetadata};

const RESULT_HEADER: &str = ",result";
const ERROR_HEADER: &str = ",error";

/// Annotation rows seen since the last column-name row, indexed by CSV field.
#[derive(Debug, Default)]
struct PendingAnnotations {
    datatype: Option<Vec<String>>,
    group: Option<Vec<String>>,
    default: Option<Vec<String>>,
}

impl PendingAnnotations {
    fn is_empty(&self) -> bool {
        self.datatype.is_none() && self.group.is_none() && self.default.is_none()
    }
}

/// Decoding state for a single response.
#[derive(Debug, Default)]
pub(crate) struct StreamState {
    data_lines: Vec<String>,
    metadata: Vec<ResultMetadata>,
    annotations: PendingAnnotations,
    in_error_table: bool,
    lines_seen: usize,
}

impl StreamState {
    /// Route one complete line.
    fn classify(&mut self, line: String, first_column: usize) -> Result<()> {
        self.lines_seen += 1;

        if line.starts_with('#') {
            return self.annotation(&line);
        }
        if is_header(&line, RESULT_HEADER) {
            return self.header(&line, first_column);
        }
        if is_header(&line, ERROR_HEADER) {
            self.annotations = PendingAnnotations::default();
            self.in_error_table = true;
            return Ok(());
        }
        if self.in_error_table {
            return Err(query_error(&line));
        }

        let table = self.metadata.len();
        match self.metadata.last_mut() {
            Some(meta) => {
                meta.row_count += 1;
                self.data_lines.push(line);
                Ok(())
            }
            None => Err(Error::consistency(
                table,
                Some(0),
                format!("data row before any column-name row (line {})", self.lines_seen),
            )),
        }
    }

    fn annotation(&mut self, line: &str) -> Result<()> {
        let fields: Vec<String> = split_fields(line)?.iter().map(str::to_string).collect();
        match fields.first().map(String::as_str) {
            Some("#datatype") => self.annotations.datatype = Some(fields),
            Some("#group") => self.annotations.group = Some(fields),
            Some("#default") => self.annotations.default = Some(fields),
            other => debug!("ignoring unknown annotation {:?}", other),
        }
        Ok(())
    }

    /// Close the pending annotation group with its column-name row.
    fn header(&mut self, line: &str, first_column: usize) -> Result<()> {
        let position = self.metadata.len();
        let annotations = std::mem::take(&mut self.annotations);
        let Some(datatype) = annotations.datatype else {
            return Err(Error::consistency(
                position,
                None,
                "column-name row without a #datatype annotation",
            ));
        };

        let names = split_fields(line)?;
        if names.len() != datatype.len() {
            return Err(Error::consistency(
                position,
                None,
                format!(
                    "#datatype has {} columns but the column-name row has {}",
                    datatype.len(),
                    names.len()
                ),
            ));
        }

        let cell = |row: &Option<Vec<String>>, i: usize| -> Option<String> {
            row.as_ref().and_then(|r| r.get(i)).cloned()
        };
        let columns: Vec<MetaColumn> = (first_column..names.len())
            .map(|i| MetaColumn {
                name: names[i].to_string(),
                wire_type: datatype[i].as_str().into(),
                group: cell(&annotations.group, i).is_some_and(|g| g == "true"),
                default_value: cell(&annotations.default, i).unwrap_or_default(),
            })
            .collect();

        debug!(
            "result table {} starts with {} columns after {} lines",
            position,
            columns.len(),
            self.lines_seen
        );
        self.metadata.push(ResultMetadata::new(position, columns));
        self.in_error_table = false;
        Ok(())
    }
}

fn is_header(line: &str, prefix: &str) -> bool {
    line.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(','))
}

/// Split one line into its CSV fields, undoing `"` quoting.
pub(crate) fn split_fields(line: &str) -> Result<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false) // the caller classifies header rows
        .flexible(true)
        .buffer_capacity(line.len() + 1)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|e| Error::Csv(format!("CSV read error: {}", e)))?;
    Ok(record)
}

/// Build the error carried in an `,error,reference` table row.
fn query_error(line: &str) -> Error {
    let record = match split_fields(line) {
        Ok(record) => record,
        Err(e) => return e,
    };
    let message = record
        .get(1)
        .filter(|m| !m.is_empty())
        .unwrap_or("Unknown query error");
    Error::Query {
        message: message.to_string(),
        reference: record.get(2).filter(|r| !r.is_empty()).map(str::to_string),
    }
}

/// Incremental decoder for one annotated CSV response.
///
/// After any error the decoder is in an unspecified state and should be
/// dropped.
#[derive(Debug, Default)]
pub struct AnnotatedCsvDecoder {
    options: DecoderOptions,
    buffer: StreamBuffer,
    state: StreamState,
}

impl AnnotatedCsvDecoder {
    /// Decoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with the given leading-column and projection options.
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options this decoder was built with.
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Feed the next chunk of the response.
    ///
    /// Chunk boundaries may fall anywhere, including inside a line or a
    /// multi-byte character.
    pub fn append(&mut self, chunk: impl AsRef<[u8]>) -> Result<()> {
        let lines = self.buffer.append(chunk.as_ref())?;
        self.dispatch(lines)
    }

    /// Flush buffered input and build one table per result group.
    pub fn finish(mut self) -> Result<Vec<Table>> {
        let lines = self.buffer.finish()?;
        self.dispatch(lines)?;

        if !self.state.annotations.is_empty() {
            return Err(Error::consistency(
                self.state.metadata.len(),
                None,
                "annotation group ended without a column-name row",
            ));
        }
        debug!(
            "response complete: {} tables, {} data rows",
            self.state.metadata.len(),
            self.state.data_lines.len()
        );
        reconstruct(&self.state.metadata, &self.state.data_lines, &self.options)
    }

    /// Metadata recorded so far, in arrival order.
    pub fn metadata(&self) -> &[ResultMetadata] {
        &self.state.metadata
    }

    /// Data rows recorded so far.
    pub fn data_row_count(&self) -> usize {
        self.state.data_lines.len()
    }

    /// Bytes waiting for a later chunk.
    pub fn pending_len(&self) -> usize {
        self.buffer.pending_len()
    }

    fn dispatch(&mut self, lines: Vec<String>) -> Result<()> {
        let first = self.options.first_column();
        for line in lines {
            self.state.classify(line, first)?;
        }
        Ok(())
    }
}

/// Decode a complete response held in memory.
pub fn decode_tables(input: impl AsRef<[u8]>, options: &DecoderOptions) -> Result<Vec<Table>> {
    let mut decoder = AnnotatedCsvDecoder::with_options(options.clone());
    decoder.append(input)?;
    decoder.finish()
}

/// Read buffer size for [`decode_reader`].
const READ_CHUNK: usize = 64 * 1024;

/// Decode a response from an async reader, feeding chunks as they are read.
pub async fn decode_reader<R>(mut reader: R, options: &DecoderOptions) -> Result<Vec<Table>>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = AnnotatedCsvDecoder::with_options(options.clone());
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        decoder.append(&buf[..n])?;
    }
    decoder.finish()
}
