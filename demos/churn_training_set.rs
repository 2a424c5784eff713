//! Churn-model training set example
//!
//! This example demonstrates:
//! - Building a FeatureClient from a YAML feature spec
//! - Loading raw source tables and building the exploratory training frame
//! - Materializing feature tables and registering a dimension table
//! - Assembling the same training set through point-in-time lookups

use chrono::{TimeZone, Utc};
use featuremill_core::{Frame, Row, Value};
use featuremill_sdk::{FeatureClient, FeatureLookup};

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

fn row(pairs: Vec<(&str, Value)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn print_frame(df: &Frame) {
    println!("  columns: {}", df.columns().join(", "));
    for record in df.rows() {
        let cells: Vec<String> = df
            .columns()
            .iter()
            .map(|c| match record.get(c) {
                Some(Value::Null) | None => "null".to_string(),
                Some(Value::Number(n)) => format!("{:.2}", n),
                Some(Value::String(s)) => s.clone(),
                Some(Value::Timestamp(ts)) => ts.date_naive().to_string(),
                Some(Value::Bool(b)) => b.to_string(),
            })
            .collect();
        println!("  {}", cells.join(" | "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Churn Training Set Example ===\n");

    let client = FeatureClient::builder()
        .with_spec_content(CHURN_SPEC)
        .build()?;

    // Seed raw source tables (the notebook reads these with SQL)
    let mut dbu = Vec::new();
    for (year, month, sql, job) in [
        (2022, 11, 100.0, 50.0),
        (2022, 12, 105.0, 50.0),
        (2023, 1, 110.0, 52.0),
        (2023, 2, 118.0, 51.0),
        (2023, 3, 126.0, 53.0),
        (2023, 4, 140.0, 52.0),
        (2023, 5, 160.0, 54.0),
    ] {
        dbu.push(row(vec![
            ("customer_id", Value::from(7i64)),
            ("date", Value::Timestamp(Utc.with_ymd_and_hms(year, month, 15, 0, 0, 0).unwrap())),
            ("sql_dbu", Value::Number(sql)),
            ("job_dbu", Value::Number(job)),
        ]));
    }
    client.load_source_table("dbu", dbu).await?;

    client
        .load_source_table(
            "customer_support",
            vec![
                row(vec![
                    ("customer_id", Value::from(7i64)),
                    ("date", Value::Timestamp(Utc.with_ymd_and_hms(2023, 4, 3, 0, 0, 0).unwrap())),
                ]),
                row(vec![
                    ("customer_id", Value::from(7i64)),
                    ("date", Value::Timestamp(Utc.with_ymd_and_hms(2023, 5, 9, 0, 0, 0).unwrap())),
                ]),
            ],
        )
        .await?;

    client
        .load_source_table(
            "customers",
            vec![row(vec![
                ("customer_id", Value::from(7i64)),
                ("tier", Value::from("enterprise")),
            ])],
        )
        .await?;

    client
        .load_source_table(
            "renewal_eol",
            vec![row(vec![
                ("customer_id", Value::from(7i64)),
                ("observation_date", Value::Timestamp(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap())),
                ("commit", Value::from(0i64)),
            ])],
        )
        .await?;

    // Exploratory path: flat training frame straight from the spec
    println!("Exploratory training data set:");
    let df = client.build_training_data_set().await?;
    print_frame(&df);

    // Feature-store path: materialize, register, then join as-of
    let report = client.build_feature_table("dbu_growth", false).await?;
    println!(
        "\nMaterialized {} ({} rows)",
        report.table, report.rows_total
    );
    let report = client
        .build_feature_table("customer_service_calls", false)
        .await?;
    println!("Materialized {} ({} rows)", report.table, report.rows_total);
    client.register_dimension_table("customers").await?;
    println!("Registered dimension table customers");

    let lookups = vec![
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
    ];

    let labels = client.label_frame().await?;
    let training_set = client.create_training_set(labels, lookups, "commit").await?;
    let df = training_set.load_df().await?;

    println!("\nTraining set from the feature store:");
    print_frame(&df);

    Ok(())
}
