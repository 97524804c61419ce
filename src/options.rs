//! Tuning options for the encoder and decoder.
//!
//! Both structs deserialize from partial documents; missing keys take the
//! [`Default`] values.

use serde::{Deserialize, Serialize};

/// Rows per batch when none is configured. Large enough that most tables go
/// out as a single batch.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// Options for [`LineProtocolEncoder`](crate::LineProtocolEncoder).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderOptions {
    /// Maximum rows serialized into one batch.
    pub batch_size: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Options for [`AnnotatedCsvDecoder`](crate::AnnotatedCsvDecoder).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecoderOptions {
    /// Keep the leading `result` and `table` columns in decoded tables.
    pub keep_result_table_columns: bool,
    /// Only keep these columns, by name. `None` keeps everything.
    pub columns: Option<Vec<String>>,
}

impl DecoderOptions {
    /// Index of the first CSV field copied into decoded tables.
    ///
    /// Field 0 is the annotation column and is always dropped.
    pub(crate) fn first_column(&self) -> usize {
        if self.keep_result_table_columns { 1 } else { 3 }
    }

    pub(crate) fn keeps(&self, name: &str) -> bool {
        self.columns
            .as_ref()
            .is_none_or(|cols| cols.iter().any(|c| c == name))
    }
}
