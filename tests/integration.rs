//! Integration tests against a live InfluxDB 2.x server.
//!
//! These tests require a running InfluxDB instance with the org, bucket and
//! token below, for example:
//!
//! ```text
//! docker run -d -p 8086:8086 \
//!   -e DOCKER_INFLUXDB_INIT_MODE=setup \
//!   -e DOCKER_INFLUXDB_INIT_USERNAME=admin \
//!   -e DOCKER_INFLUXDB_INIT_PASSWORD=password123 \
//!   -e DOCKER_INFLUXDB_INIT_ORG=test-org \
//!   -e DOCKER_INFLUXDB_INIT_BUCKET=test-bucket \
//!   -e DOCKER_INFLUXDB_INIT_ADMIN_TOKEN=test-token-for-development-only \
//!   influxdb:2
//! ```
//!
//! Run tests with: `cargo test --test integration`. Each test returns early
//! when no server answers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use influxdb_table_codec::{
    Client, Column, ColumnData, DecoderOptions, Error, Table, Value, WriteRequest,
};
use serial_test::serial;

const INFLUXDB_URL: &str = "http://localhost:8086";
const INFLUXDB_ORG: &str = "test-org";
const INFLUXDB_TOKEN: &str = "test-token-for-development-only";
const INFLUXDB_BUCKET: &str = "test-bucket";

/// Helper to check if InfluxDB is available
async fn influxdb_available() -> bool {
    let client = reqwest::Client::new();
    client
        .get(format!("{}/health", INFLUXDB_URL))
        .timeout(Duration::from_secs(2))
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

/// Helper to delete all data in bucket
async fn clear_bucket() -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let url = format!(
        "{}/api/v2/delete?org={}&bucket={}",
        INFLUXDB_URL, INFLUXDB_ORG, INFLUXDB_BUCKET
    );

    let body = serde_json::json!({
        "start": "1970-01-01T00:00:00Z",
        "stop": "2100-01-01T00:00:00Z"
    });

    client
        .post(&url)
        .header("Authorization", format!("Token {}", INFLUXDB_TOKEN))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?;

    Ok(())
}

fn client() -> Client {
    Client::new(INFLUXDB_URL, INFLUXDB_ORG, INFLUXDB_TOKEN).unwrap()
}

/// `count` points one second apart, cycling over three stations.
fn sensor_table(count: usize) -> Table {
    let base = Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap();
    let times = (0..count)
        .map(|i| base + chrono::Duration::seconds(i as i64))
        .collect();
    let stations = (0..count).map(|i| format!("station {}", i % 3)).collect();
    let temps = (0..count).map(|i| 20.0 + (i % 10) as f64 * 0.5).collect();
    let counts = (0..count).map(|i| i as i64).collect();

    Table::from_columns(vec![
        Column::new("time", ColumnData::DateTime(times)),
        Column::new("station", ColumnData::String(stations)),
        Column::new("temp", ColumnData::Float64(temps)),
        Column::new("count", ColumnData::Int64(counts)),
    ])
    .unwrap()
    .with_time_column("time")
    .unwrap()
}

fn pivot_query(measurement: &str) -> String {
    format!(
        r#"from(bucket: "{}")
           |> range(start: 2023-01-01T00:00:00Z)
           |> filter(fn: (r) => r._measurement == "{}")
           |> pivot(rowKey: ["_time"], columnKey: ["_field"], valueColumn: "_value")
           |> drop(columns: ["_start", "_stop"])"#,
        INFLUXDB_BUCKET, measurement
    )
}

// ============================================================================
// Write then Query
// ============================================================================

#[tokio::test]
#[serial]
async fn test_write_then_query_tables() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }
    let _ = env_logger::builder().is_test(true).try_init();

    clear_bucket().await.unwrap();

    let table = Arc::new(sensor_table(90));
    let request = WriteRequest::new("sensors").tags(["station"]).batch_size(25);
    client()
        .write_table(INFLUXDB_BUCKET, Arc::clone(&table), &request)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let tables = client().query_tables(pivot_query("sensors")).await.unwrap();

    // One result table per station series
    assert_eq!(tables.len(), 3);
    let total: usize = tables.iter().map(Table::num_rows).sum();
    assert_eq!(total, 90);

    for t in &tables {
        assert!(t.is_time_indexed());
        assert_eq!(t.num_rows(), 30);
        let station = t.column("station").unwrap().value(0);
        assert!(matches!(station, Value::String(ref s) if s.starts_with("station ")));
        assert!(matches!(t.column("temp").unwrap().data(), ColumnData::Float64(_)));
        assert!(matches!(t.column("count").unwrap().data(), ColumnData::Int64(_)));
    }
}

#[tokio::test]
#[serial]
async fn test_query_keeps_result_table_columns() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }

    clear_bucket().await.unwrap();

    let table = Arc::new(sensor_table(6));
    let request = WriteRequest::new("kept").tags(["station"]);
    client()
        .write_table(INFLUXDB_BUCKET, table, &request)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let options = DecoderOptions {
        keep_result_table_columns: true,
        ..DecoderOptions::default()
    };
    let tables = client()
        .query_tables_with(pivot_query("kept"), &options)
        .await
        .unwrap();

    for t in &tables {
        let names: Vec<_> = t.column_names().collect();
        assert_eq!(&names[..2], &["result", "table"]);
    }
}

#[tokio::test]
#[serial]
async fn test_rows_without_fields_are_not_sent() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }

    clear_bucket().await.unwrap();

    let table = Table::from_columns(vec![
        Column::new(
            "t",
            ColumnData::Int64(vec![1_700_000_000_000_000_000, 1_700_000_001_000_000_000]),
        ),
        Column::new("v", ColumnData::Float64(vec![f64::NAN, 1.5])),
    ])
    .unwrap()
    .with_time_column("t")
    .unwrap();
    client()
        .write_table(INFLUXDB_BUCKET, Arc::new(table), &WriteRequest::new("sparse"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let tables = client().query_tables(pivot_query("sparse")).await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].num_rows(), 1);
    assert_eq!(tables[0].column("v").unwrap().value(0), Value::Double(1.5.into()));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
#[serial]
async fn test_empty_result() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }

    clear_bucket().await.unwrap();

    let result = client().query_tables(pivot_query("nonexistent")).await;
    assert!(matches!(result, Err(Error::EmptyResult)), "got {:?}", result);
}

#[tokio::test]
#[serial]
async fn test_invalid_query() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }

    let result = client().query_tables("this is not valid flux").await;
    assert!(result.is_err(), "Expected error for invalid query");
}

#[tokio::test]
#[serial]
async fn test_write_rejects_unknown_tag() {
    if !influxdb_available().await {
        eprintln!("Skipping test: InfluxDB not available");
        return;
    }

    let request = WriteRequest::new("sensors").tags(["missing"]);
    let result = client()
        .write_table(INFLUXDB_BUCKET, Arc::new(sensor_table(3)), &request)
        .await;
    assert!(matches!(result, Err(Error::Schema { .. })), "got {:?}", result);
}
