//! Error types for influxdb-table-codec.

use thiserror::Error;

/// Error type for influxdb-table-codec operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize query to JSON.
    #[error("Failed to serialize query: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to split a CSV line into fields.
    #[error("CSV parse error: {0}")]
    Csv(String),

    /// A column named by the caller is missing or unusable in its role.
    ///
    /// Raised before any encoding starts.
    #[error("Schema error for column '{column}': {reason}")]
    Schema {
        /// Offending column name.
        column: String,
        /// Why the column was rejected.
        reason: String,
    },

    /// The response contained no recognizable result group.
    #[error("Query returned no result tables")]
    EmptyResult,

    /// Decoded metadata and data rows disagree.
    ///
    /// This points at a truncated response or a defect in the decoder, and is
    /// never recovered from locally.
    #[error("Inconsistent result in table {table}{}: {message}", .row.map(|r| format!(", row {r}")).unwrap_or_default())]
    Consistency {
        /// Index of the result table being reconstructed.
        table: usize,
        /// Row within that table, when known.
        row: Option<usize>,
        /// Description of the mismatch.
        message: String,
    },

    /// Failed to parse a value from the response.
    #[error("Failed to parse value: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },

    /// Query returned an error from InfluxDB.
    #[error("Query error from InfluxDB: {message}")]
    Query {
        /// Error message returned by InfluxDB.
        message: String,
        /// Optional reference link for debugging.
        reference: Option<String>,
    },

    /// I/O error during streaming.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Schema {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn consistency(table: usize, row: Option<usize>, message: impl Into<String>) -> Self {
        Error::Consistency {
            table,
            row,
            message: message.into(),
        }
    }
}

/// Result type alias for influxdb-table-codec operations.
pub type Result<T> = std::result::Result<T, Error>;
