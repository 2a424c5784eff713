//! End-to-end churn-model pipeline tests
//!
//! Mirrors the intended usage: load raw source tables, build the
//! exploratory training frame straight from the spec, then materialize
//! feature tables, register the dimension table, and assemble the same
//! training set through point-in-time lookups.

use chrono::{DateTime, TimeZone, Utc};
use featuremill_sdk::{
    ClientError, FeatureClient, FeatureLookup, FeatureStore, Frame, Row, Value,
};

const CHURN_SPEC: &str = r#"
version: "0.1"

source_tables:
  - name: dbu
    entity_key: customer_id
    timestamp_key: date
  - name: customer_support
    entity_key: customer_id
    timestamp_key: date
  - name: customers
    entity_key: customer_id
  - name: renewal_eol
    entity_key: customer_id
    timestamp_key: observation_date

feature_tables:
  - name: dbu_growth
    source: dbu
    entity_key: customer_id
    timestamp_key: observation_date
    features:
      - name: sql_dbu_growth
        derivation: windowed_growth
        source_column: sql_dbu
        window_lengths: [3, 6]
      - name: job_dbu_growth
        derivation: windowed_growth
        source_column: job_dbu
        window_lengths: [3, 6]
  - name: customer_service_calls
    source: customer_support
    entity_key: customer_id
    timestamp_key: observation_date
    features:
      - name: customer_service_count
        derivation: trailing_count
        window_length: 6

dimension_tables:
  - name: customers
    entity_key: customer_id
    features: [tier]

label:
  table: renewal_eol
  entity_key: customer_id
  timestamp_key: observation_date
  label_column: commit
"#;

fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn dbu_row(id: i64, at: DateTime<Utc>, sql_dbu: f64, job_dbu: f64) -> Row {
    let mut row = Row::new();
    row.insert("customer_id".to_string(), Value::from(id));
    row.insert("date".to_string(), Value::Timestamp(at));
    row.insert("sql_dbu".to_string(), Value::Number(sql_dbu));
    row.insert("job_dbu".to_string(), Value::Number(job_dbu));
    row
}

fn support_row(id: i64, at: DateTime<Utc>) -> Row {
    let mut row = Row::new();
    row.insert("customer_id".to_string(), Value::from(id));
    row.insert("date".to_string(), Value::Timestamp(at));
    row
}

fn customer_row(id: i64, tier: &str) -> Row {
    let mut row = Row::new();
    row.insert("customer_id".to_string(), Value::from(id));
    row.insert("tier".to_string(), Value::from(tier));
    row
}

fn renewal_row(id: i64, at: DateTime<Utc>, commit: i64) -> Row {
    let mut row = Row::new();
    row.insert("customer_id".to_string(), Value::from(id));
    row.insert("observation_date".to_string(), Value::Timestamp(at));
    row.insert("commit".to_string(), Value::from(commit));
    row
}

/// Customer 7: seven months of steady usage with a May spike, three
/// support calls. Customer 1: a single month of history (all windows
/// partial) and no support calls at all.
async fn seeded_client() -> FeatureClient {
    let client = FeatureClient::builder()
        .with_spec_content(CHURN_SPEC)
        .build()
        .unwrap();

    let mut dbu = Vec::new();
    for (year, month) in [(2022, 11), (2022, 12), (2023, 1), (2023, 2), (2023, 3), (2023, 4)] {
        dbu.push(dbu_row(7, ts(year, month, 15), 100.0, 50.0));
    }
    dbu.push(dbu_row(7, ts(2023, 5, 15), 200.0, 50.0));
    dbu.push(dbu_row(1, ts(2023, 5, 10), 100.0, 10.0));
    client.load_source_table("dbu", dbu).await.unwrap();

    client
        .load_source_table(
            "customer_support",
            vec![
                support_row(7, ts(2023, 4, 3)),
                support_row(7, ts(2023, 4, 20)),
                support_row(7, ts(2023, 5, 9)),
            ],
        )
        .await
        .unwrap();

    client
        .load_source_table(
            "customers",
            vec![customer_row(7, "enterprise"), customer_row(1, "standard")],
        )
        .await
        .unwrap();

    client
        .load_source_table(
            "renewal_eol",
            vec![
                renewal_row(7, ts(2023, 6, 1), 0),
                renewal_row(1, ts(2023, 6, 1), 1),
            ],
        )
        .await
        .unwrap();

    client
}

fn notebook_lookups() -> Vec<FeatureLookup> {
    vec![
        FeatureLookup::new(
            "dbu_growth",
            vec![
                "sql_dbu_growth_window_length_3".to_string(),
                "sql_dbu_growth_window_length_6".to_string(),
                "job_dbu_growth_window_length_3".to_string(),
                "job_dbu_growth_window_length_6".to_string(),
            ],
            "customer_id",
        )
        .with_timestamp_lookup_key("observation_date"),
        FeatureLookup::new(
            "customer_service_calls",
            vec!["customer_service_count".to_string()],
            "customer_id",
        )
        .with_timestamp_lookup_key("observation_date"),
        FeatureLookup::new("customers", vec!["tier".to_string()], "customer_id"),
    ]
}

fn assert_churn_frame(df: &Frame) {
    assert_eq!(df.len(), 2);

    // Customer 7: May usage bucket is stamped 2023-06-01, exactly the
    // observation date, so it is visible to the join.
    assert_eq!(
        df.cell(0, "sql_dbu_growth_window_length_3"),
        Some(&Value::Number(1.0))
    );
    assert_eq!(
        df.cell(0, "sql_dbu_growth_window_length_6"),
        Some(&Value::Number(1.0))
    );
    assert_eq!(
        df.cell(0, "job_dbu_growth_window_length_3"),
        Some(&Value::Number(0.0))
    );
    assert_eq!(
        df.cell(0, "job_dbu_growth_window_length_6"),
        Some(&Value::Number(0.0))
    );
    assert_eq!(
        df.cell(0, "customer_service_count"),
        Some(&Value::Number(3.0))
    );
    assert_eq!(
        df.cell(0, "tier"),
        Some(&Value::String("enterprise".to_string()))
    );
    assert_eq!(df.cell(0, "commit"), Some(&Value::Number(0.0)));

    // Customer 1: partial windows and no support history -> nulls, never
    // zero defaults; the time-invariant tier still resolves.
    assert_eq!(
        df.cell(1, "sql_dbu_growth_window_length_3"),
        Some(&Value::Null)
    );
    assert_eq!(
        df.cell(1, "sql_dbu_growth_window_length_6"),
        Some(&Value::Null)
    );
    assert_eq!(df.cell(1, "customer_service_count"), Some(&Value::Null));
    assert_eq!(
        df.cell(1, "tier"),
        Some(&Value::String("standard".to_string()))
    );
    assert_eq!(df.cell(1, "commit"), Some(&Value::Number(1.0)));
}

#[tokio::test]
async fn test_exploratory_training_data_set() {
    let client = seeded_client().await;
    let df = client.build_training_data_set().await.unwrap();
    assert_churn_frame(&df);
}

#[tokio::test]
async fn test_feature_store_path_matches_exploratory_path() {
    let client = seeded_client().await;
    let exploratory = client.build_training_data_set().await.unwrap();

    client.build_feature_table("dbu_growth", false).await.unwrap();
    client
        .build_feature_table("customer_service_calls", false)
        .await
        .unwrap();
    client.register_dimension_table("customers").await.unwrap();

    let labels = client.label_frame().await.unwrap();
    let training_set = client
        .create_training_set(labels, notebook_lookups(), "commit")
        .await
        .unwrap();
    let df = training_set.load_df().await.unwrap();

    assert_churn_frame(&df);
    for column in exploratory.columns() {
        assert!(
            df.columns().iter().any(|c| c == column),
            "missing column {}",
            column
        );
    }
}

#[tokio::test]
async fn test_rebuild_without_drop_is_idempotent() {
    let client = seeded_client().await;

    client.build_feature_table("dbu_growth", false).await.unwrap();
    let once = client.store().feature_rows("dbu_growth").await.unwrap();

    client.build_feature_table("dbu_growth", false).await.unwrap();
    let twice = client.store().feature_rows("dbu_growth").await.unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_drop_existing_discards_prior_rows() {
    let client = seeded_client().await;
    client.build_feature_table("dbu_growth", false).await.unwrap();

    // Reload the source with customer 1 only, then rebuild both ways
    let reloaded = vec![dbu_row(1, ts(2023, 5, 10), 100.0, 10.0)];
    client.load_source_table("dbu", reloaded).await.unwrap();

    client.build_feature_table("dbu_growth", false).await.unwrap();
    let upserted = client.store().feature_rows("dbu_growth").await.unwrap();
    assert!(
        upserted
            .iter()
            .any(|r| r.entity_id == Value::String("7".to_string())),
        "upsert must preserve history not covered by the batch"
    );

    client.build_feature_table("dbu_growth", true).await.unwrap();
    let rebuilt = client.store().feature_rows("dbu_growth").await.unwrap();
    assert!(
        rebuilt
            .iter()
            .all(|r| r.entity_id != Value::String("7".to_string())),
        "drop_existing must discard prior rows"
    );
}

#[tokio::test]
async fn test_dimension_registration_does_not_mutate_source() {
    let client = seeded_client().await;
    let before = client.store().source_rows("customers").await.unwrap();

    client.register_dimension_table("customers").await.unwrap();
    let _ = client.build_training_data_set().await.unwrap();

    let after = client.store().source_rows("customers").await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_feature_table_rejected() {
    let client = seeded_client().await;
    let result = client.build_feature_table("usage_growth", false).await;
    assert!(matches!(result, Err(ClientError::UnknownSpecTable(_))));
}

#[tokio::test]
async fn test_source_table_must_be_declared() {
    let client = seeded_client().await;
    let result = client.load_source_table("salesforce_raw", vec![]).await;
    assert!(matches!(result, Err(ClientError::UnknownSpecTable(_))));
}
