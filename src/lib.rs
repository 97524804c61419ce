//! # influxdb-table-codec
//!
//! Move columnar tables in and out of InfluxDB 2.x.
//!
//! The write path turns a [`Table`] into line protocol, a batch of rows at a
//! time, so large tables can be sent as a chunked request body:
//!
//! ```ignore
//! let mut encoder = LineProtocolEncoder::new(&table, "weather", &["station"])?;
//! while let Some(batch) = encoder.next_batch(50_000) {
//!     send(batch.text);
//! }
//! ```
//!
//! The read path accepts the annotated CSV returned by `/api/v2/query` in
//! chunks of any size, split anywhere, and rebuilds one typed table per
//! result group:
//!
//! ```ignore
//! let mut decoder = AnnotatedCsvDecoder::new();
//! while let Some(chunk) = body.next().await {
//!     decoder.append(chunk?)?;
//! }
//! let tables = decoder.finish()?;
//! ```
//!
//! ## Type mapping
//!
//! | Column storage   | Line protocol        | Annotated CSV      | Decoded as  |
//! |------------------|----------------------|--------------------|-------------|
//! | int8..int64      | `42i`                | `long`             | `Int64`     |
//! | uint8..uint64    | `42u`                | `unsignedLong`     | `UInt64`    |
//! | float32, float64 | `4.2` (NaN/Inf skipped) | `double`        | `Float64`   |
//! | string           | `"quoted"`           | `string`           | `String`    |
//! | bool             | not written          | `boolean`          | `Bool`      |
//! | datetime         | epoch ns timestamp   | `dateTime:RFC3339` | `DateTime`  |
//!
//! [`Client`] wires both paths to a server; everything else works offline.

pub mod buffer;
pub mod client;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod options;
mod reconstruct;
pub mod table;
pub mod timestamp;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use client::{Client, WriteRequest};
pub use decoder::{AnnotatedCsvDecoder, decode_reader, decode_tables};
pub use encoder::{Batch, EncodeStats, LineProtocolEncoder, RowSerializer, to_line_protocol};
pub use error::{Error, Result};
pub use options::{DecoderOptions, EncoderOptions};
pub use table::{Column, ColumnData, Table};
pub use types::{ColumnRole, MetaColumn, ResultMetadata, WireType};
pub use value::Value;
