//! Integration tests for the as-of training-set assembler
//!
//! These pin the point-in-time correctness properties: a training row
//! must never carry a feature value newer than its observation date, and
//! a missing feature value must surface as an explicit null.

use chrono::{DateTime, TimeZone, Utc};
use featuremill_core::{FeatureRow, Frame, Row, Value};
use featuremill_engine::{create_training_set, EngineError, FeatureLookup};
use featuremill_store::{FeatureStore, InMemoryStore, TableKeys, WriteMode};
use std::collections::HashMap;
use std::sync::Arc;

fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn growth_row(id: i64, at: DateTime<Utc>, growth: f64) -> FeatureRow {
    let mut values = HashMap::new();
    values.insert("growth".to_string(), Value::Number(growth));
    FeatureRow::new(id, at, values)
}

fn label_row(id: i64, at: DateTime<Utc>, commit: i64) -> Row {
    let mut row = Row::new();
    row.insert("customer_id".to_string(), Value::Number(id as f64));
    row.insert("observation_date".to_string(), Value::Timestamp(at));
    row.insert("commit".to_string(), Value::Number(commit as f64));
    row
}

fn label_frame(rows: Vec<Row>) -> Frame {
    Frame::from_rows(
        vec![
            "customer_id".to_string(),
            "observation_date".to_string(),
            "commit".to_string(),
        ],
        rows,
    )
    .unwrap()
}

fn growth_lookup() -> FeatureLookup {
    FeatureLookup::new("dbu_growth", vec!["growth".to_string()], "customer_id")
        .with_timestamp_lookup_key("observation_date")
}

async fn store_with_growth(rows: Vec<FeatureRow>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .materialize(
            "dbu_growth",
            &TableKeys::new("customer_id", "observation_date"),
            rows,
            WriteMode::Overwrite,
        )
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_as_of_join_selects_latest_at_or_before() {
    // Label (7, 2023-06-01) against rows at 2023-01-01 (0.10) and
    // 2023-07-01 (0.20) must pick 0.10, never the future 0.20.
    let store = store_with_growth(vec![
        growth_row(7, ts(2023, 1, 1), 0.10),
        growth_row(7, ts(2023, 7, 1), 0.20),
    ])
    .await;

    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);
    let training_set = create_training_set(store, labels, vec![growth_lookup()], "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    assert_eq!(df.len(), 1);
    assert_eq!(df.cell(0, "growth"), Some(&Value::Number(0.10)));
    assert_eq!(df.cell(0, "commit"), Some(&Value::Number(0.0)));
}

#[tokio::test]
async fn test_no_label_leakage_across_many_labels() {
    let mut feature_rows = Vec::new();
    for month in 1..=12u32 {
        feature_rows.push(growth_row(1, ts(2023, month, 1), month as f64 / 100.0));
    }
    let store = store_with_growth(feature_rows).await;

    let labels = label_frame(vec![
        label_row(1, ts(2023, 3, 15), 1),
        label_row(1, ts(2023, 8, 1), 0),
        label_row(1, ts(2023, 12, 31), 1),
    ]);
    let training_set = create_training_set(store.clone(), labels, vec![growth_lookup()], "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    // Every joined value must come from a row stamped at or before the
    // label's observation date.
    let expected = [0.03, 0.08, 0.12];
    for (idx, want) in expected.iter().enumerate() {
        let got = df.cell(idx, "growth").unwrap().as_f64().unwrap();
        assert!((got - want).abs() < 1e-9, "row {}: got {}", idx, got);
    }
}

#[tokio::test]
async fn test_missing_history_yields_null_not_default() {
    let store = store_with_growth(vec![growth_row(7, ts(2023, 7, 1), 0.20)]).await;

    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);
    let training_set = create_training_set(store, labels, vec![growth_lookup()], "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    assert_eq!(df.cell(0, "growth"), Some(&Value::Null));
}

#[tokio::test]
async fn test_unknown_entity_yields_null() {
    let store = store_with_growth(vec![growth_row(7, ts(2023, 1, 1), 0.10)]).await;

    let labels = label_frame(vec![label_row(99, ts(2023, 6, 1), 1)]);
    let training_set = create_training_set(store, labels, vec![growth_lookup()], "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    assert_eq!(df.cell(0, "growth"), Some(&Value::Null));
}

#[tokio::test]
async fn test_unknown_feature_rejected_at_creation() {
    let store = store_with_growth(vec![growth_row(7, ts(2023, 1, 1), 0.10)]).await;

    let lookup = FeatureLookup::new("dbu_growth", vec!["shrinkage".to_string()], "customer_id")
        .with_timestamp_lookup_key("observation_date");
    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);

    let result = create_training_set(store, labels, vec![lookup], "commit").await;
    assert!(matches!(
        result.err(),
        Some(EngineError::UnknownFeature { .. })
    ));
}

#[tokio::test]
async fn test_unknown_table_rejected_at_creation() {
    let store = Arc::new(InMemoryStore::new());
    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);

    let result = create_training_set(store, labels, vec![growth_lookup()], "commit").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_same_feature_name_across_lookups_rejected_at_creation() {
    // Two tables both exposing "growth": joining both would let the
    // second lookup overwrite the first, so creation must fail.
    let store = store_with_growth(vec![growth_row(7, ts(2023, 1, 1), 0.10)]).await;
    store
        .materialize(
            "job_growth",
            &TableKeys::new("customer_id", "observation_date"),
            vec![growth_row(7, ts(2023, 1, 1), 0.99)],
            WriteMode::Overwrite,
        )
        .await
        .unwrap();

    let lookups = vec![
        growth_lookup(),
        FeatureLookup::new("job_growth", vec!["growth".to_string()], "customer_id")
            .with_timestamp_lookup_key("observation_date"),
    ];
    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);

    let result = create_training_set(store, labels, lookups, "commit").await;
    assert!(matches!(
        result.err(),
        Some(EngineError::ColumnCollision(column)) if column == "growth"
    ));
}

#[tokio::test]
async fn test_missing_label_column_rejected() {
    let store = store_with_growth(vec![growth_row(7, ts(2023, 1, 1), 0.10)]).await;
    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 0)]);

    let result = create_training_set(store, labels, vec![growth_lookup()], "renewed").await;
    assert!(matches!(
        result.err(),
        Some(EngineError::LabelColumnNotFound(_))
    ));
}

#[tokio::test]
async fn test_dimension_lookup_joins_current_row() {
    let store = Arc::new(InMemoryStore::new());
    store
        .materialize(
            "dbu_growth",
            &TableKeys::new("customer_id", "observation_date"),
            vec![growth_row(7, ts(2023, 1, 1), 0.10)],
            WriteMode::Overwrite,
        )
        .await
        .unwrap();

    let mut customer = Row::new();
    customer.insert("customer_id".to_string(), Value::Number(7.0));
    customer.insert("tier".to_string(), Value::String("enterprise".to_string()));
    store.load_source("customers", vec![customer]).await.unwrap();
    store
        .register_dimension("customers", "customer_id")
        .await
        .unwrap();

    let labels = label_frame(vec![label_row(7, ts(2023, 6, 1), 1)]);
    let lookups = vec![
        growth_lookup(),
        FeatureLookup::new("customers", vec!["tier".to_string()], "customer_id"),
    ];
    let training_set = create_training_set(store, labels, lookups, "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    assert_eq!(
        df.cell(0, "tier"),
        Some(&Value::String("enterprise".to_string()))
    );
    assert_eq!(df.cell(0, "growth"), Some(&Value::Number(0.10)));
}
