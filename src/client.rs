//! Thin InfluxDB 2.x transport for whole tables.
//!
//! Writes stream encoder batches as a chunked request body; queries push
//! response chunks into an [`AnnotatedCsvDecoder`] as they arrive.

use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::{Body, Method, Url};
use serde::Serialize;

use crate::decoder::AnnotatedCsvDecoder;
use crate::encoder::LineProtocolEncoder;
use crate::error::{Error, Result};
use crate::options::{DecoderOptions, EncoderOptions};
use crate::table::Table;

/// InfluxDB 2.x client for table writes and queries.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use influxdb_table_codec::{Client, WriteRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("http://localhost:8086", "my-org", "my-token")?;
///
///     let request = WriteRequest::new("temperature").tags(["host"]);
///     client.write_table("sensors", Arc::new(table), &request).await?;
///
///     let tables = client.query_tables(r#"
///         from(bucket: "sensors")
///         |> range(start: -1h)
///         |> pivot(rowKey: ["_time"], columnKey: ["_field"], valueColumn: "_value")
///     "#).await?;
///     println!("{} tables", tables.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    org: String,
    token: String,
}

/// Body of a `/api/v2/query` request.
///
/// The dialect asks for exactly the annotation rows the decoder understands,
/// RFC3339 timestamps and a column-name row per table.
#[derive(Debug, Serialize)]
struct QueryPayload {
    query: String,
    #[serde(rename = "type")]
    language: &'static str,
    dialect: QueryDialect,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryDialect {
    annotations: [&'static str; 3],
    comment_prefix: &'static str,
    date_time_format: &'static str,
    delimiter: &'static str,
    header: bool,
}

impl QueryPayload {
    fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: "flux",
            dialect: QueryDialect {
                annotations: ["datatype", "group", "default"],
                comment_prefix: "#",
                date_time_format: "RFC3339",
                delimiter: ",",
                header: true,
            },
        }
    }
}

/// How a table is mapped onto line protocol for a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    /// Measurement every row is written to.
    pub measurement: String,
    /// Columns written as tags.
    pub tags: Vec<String>,
    /// Columns written as fields; `None` means every remaining non-time column.
    pub fields: Option<Vec<String>>,
    pub options: EncoderOptions,
}

impl WriteRequest {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: None,
            options: EncoderOptions::default(),
        }
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    /// Check this request's column roles against `table` without encoding.
    pub fn validate(&self, table: &Table) -> Result<()> {
        self.encoder(table).map(drop)
    }

    /// Build an encoder over `table` with this request's column roles.
    pub fn encoder<'t>(&self, table: &'t Table) -> Result<LineProtocolEncoder<'t>> {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        match &self.fields {
            Some(fields) => {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                LineProtocolEncoder::with_fields(table, &self.measurement, &tags, &fields)
            }
            None => LineProtocolEncoder::new(table, &self.measurement, &tags),
        }
    }
}

impl Client {
    /// Client for the server at `url` (e.g. `http://localhost:8086`), acting
    /// for `org` with an API `token`.
    pub fn new(
        url: impl Into<String>,
        org: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), url, org, token)
    }

    /// Same as [`Client::new`] over a preconfigured reqwest client, for
    /// timeouts, proxies or TLS settings.
    pub fn with_http_client(
        http: reqwest::Client,
        url: impl Into<String>,
        org: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let url = url.into();
        let base_url = Url::parse(&url).map_err(|e| Error::Parse {
            message: format!("Invalid InfluxDB URL '{}': {}", url, e),
        })?;
        Ok(Self {
            http,
            base_url,
            org: org.into(),
            token: token.into(),
        })
    }

    /// Base URL of the server.
    pub fn url(&self) -> &Url {
        &self.base_url
    }

    /// Organization every request acts for.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Build the full URL for an API endpoint.
    fn endpoint(&self, path: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.to_string()
    }

    /// Write `table` to `bucket` as nanosecond-precision line protocol.
    ///
    /// Column roles are checked before the request is sent. Batches are
    /// encoded lazily while the body is being transmitted.
    pub async fn write_table(
        &self,
        bucket: &str,
        table: Arc<Table>,
        request: &WriteRequest,
    ) -> Result<()> {
        request.validate(&table)?;

        let request = request.clone();
        let batch_size = request.options.batch_size;
        let body = stream! {
            match request.encoder(&table) {
                Ok(mut encoder) => {
                    while let Some(batch) = encoder.next_batch(batch_size) {
                        if batch.lines > 0 {
                            yield Ok::<String, Error>(batch.text);
                        }
                    }
                    let stats = encoder.stats();
                    if stats.rows_dropped > 0 {
                        warn!(
                            "{} of {} rows had no writable fields and were not sent",
                            stats.rows_dropped,
                            table.num_rows()
                        );
                    }
                    debug!("write body complete: {:?}", stats);
                }
                Err(e) => yield Err(e),
            }
        };

        self.http
            .request(Method::POST, self.endpoint("/api/v2/write"))
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", bucket),
                ("precision", "ns"),
            ])
            .body(Body::wrap_stream(body))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Execute a Flux query and decode every result table.
    pub async fn query_tables(&self, query: impl Into<String>) -> Result<Vec<Table>> {
        self.query_tables_with(query, &DecoderOptions::default()).await
    }

    /// Execute a Flux query and decode it with the given options.
    ///
    /// Returns [`Error::EmptyResult`] if the response holds no result table.
    pub async fn query_tables_with(
        &self,
        query: impl Into<String>,
        options: &DecoderOptions,
    ) -> Result<Vec<Table>> {
        let endpoint = self.endpoint("/api/v2/query");
        let payload = QueryPayload::new(query);
        let body = serde_json::to_string(&payload)?;

        let response = self
            .http
            .request(Method::POST, &endpoint)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/csv")
            .header("Content-Type", "application/json")
            .query(&[("org", &self.org)])
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        let mut decoder = AnnotatedCsvDecoder::with_options(options.clone());
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            decoder.append(chunk?)?;
        }
        decoder.finish()
    }
}
