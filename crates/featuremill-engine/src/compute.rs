//! Spec-driven feature computation
//!
//! Turns raw source rows into feature rows for one feature table: events
//! are bucketed per entity per calendar month, metrics are aggregated,
//! and each derivation emits its output columns for every bucket in the
//! entity's observed span. Months without events aggregate to zero, so
//! quiet periods show up in the features instead of disappearing.

use crate::bucket::{bucket_stamp, month_index};
use crate::error::{EngineError, Result};
use featuremill_core::{
    Derivation, FeatureRow, FeatureTableSpec, PartialWindowPolicy, Row, SourceTableSpec, Value,
};
use featuremill_store::encode_key;
use std::collections::{BTreeMap, HashMap};

struct EntityEvents<'a> {
    /// Original entity key value, kept for the output rows
    entity: Value,
    /// (month bucket, source row)
    events: Vec<(i32, &'a Row)>,
}

/// Compute all feature rows for one feature table from its source rows
pub fn compute_feature_table(
    table: &FeatureTableSpec,
    source: &SourceTableSpec,
    source_rows: &[Row],
) -> Result<Vec<FeatureRow>> {
    let timestamp_key = source
        .timestamp_key
        .as_deref()
        .ok_or_else(|| EngineError::SourceNotTimestamped(source.name.clone()))?;

    let entities = group_by_entity(table, source, timestamp_key, source_rows)?;
    let mut out = Vec::new();

    for series in entities.values() {
        compute_entity_rows(table, source, series, &mut out)?;
    }

    tracing::debug!(
        table = table.name.as_str(),
        entities = entities.len(),
        rows = out.len(),
        "computed feature rows"
    );
    Ok(out)
}

fn group_by_entity<'a>(
    table: &FeatureTableSpec,
    source: &SourceTableSpec,
    timestamp_key: &str,
    source_rows: &'a [Row],
) -> Result<HashMap<String, EntityEvents<'a>>> {
    let mut entities: HashMap<String, EntityEvents<'a>> = HashMap::new();

    for row in source_rows {
        let entity = row.get(&table.entity_key).ok_or_else(|| {
            EngineError::MissingColumn {
                table: source.name.clone(),
                column: table.entity_key.clone(),
            }
        })?;
        let key = encode_key(entity)?;

        let ts_value = row.get(timestamp_key).ok_or_else(|| {
            EngineError::MissingColumn {
                table: source.name.clone(),
                column: timestamp_key.to_string(),
            }
        })?;
        let ts = ts_value
            .as_timestamp()
            .ok_or_else(|| EngineError::TypeMismatch {
                table: source.name.clone(),
                column: timestamp_key.to_string(),
                expected: "timestamp".to_string(),
                actual: ts_value.type_name().to_string(),
            })?;

        entities
            .entry(key)
            .or_insert_with(|| EntityEvents {
                entity: entity.clone(),
                events: Vec::new(),
            })
            .events
            .push((month_index(ts), row));
    }

    Ok(entities)
}

/// Monthly sums of a metric column. Null cells aggregate as zero usage.
fn monthly_sums(
    source_name: &str,
    column: &str,
    events: &[(i32, &Row)],
) -> Result<BTreeMap<i32, f64>> {
    let mut sums: BTreeMap<i32, f64> = BTreeMap::new();
    for (bucket, row) in events {
        let cell = row.get(column).ok_or_else(|| EngineError::MissingColumn {
            table: source_name.to_string(),
            column: column.to_string(),
        })?;
        let amount = match cell {
            Value::Null => 0.0,
            Value::Number(n) => *n,
            other => {
                return Err(EngineError::TypeMismatch {
                    table: source_name.to_string(),
                    column: column.to_string(),
                    expected: "number".to_string(),
                    actual: other.type_name().to_string(),
                })
            }
        };
        *sums.entry(*bucket).or_insert(0.0) += amount;
    }
    Ok(sums)
}

fn monthly_counts(events: &[(i32, &Row)]) -> BTreeMap<i32, u64> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for (bucket, _) in events {
        *counts.entry(*bucket).or_insert(0) += 1;
    }
    counts
}

fn compute_entity_rows(
    table: &FeatureTableSpec,
    source: &SourceTableSpec,
    series: &EntityEvents<'_>,
    out: &mut Vec<FeatureRow>,
) -> Result<()> {
    let first = match series.events.iter().map(|(b, _)| *b).min() {
        Some(b) => b,
        None => return Ok(()),
    };
    let last = series
        .events
        .iter()
        .map(|(b, _)| *b)
        .max()
        .unwrap_or(first);

    // Pre-aggregate each metric column once per entity
    let mut sums: HashMap<&str, BTreeMap<i32, f64>> = HashMap::new();
    for feature in &table.features {
        if let Derivation::WindowedGrowth(growth) = &feature.derivation {
            if !sums.contains_key(growth.source_column.as_str()) {
                sums.insert(
                    growth.source_column.as_str(),
                    monthly_sums(&source.name, &growth.source_column, &series.events)?,
                );
            }
        }
    }
    let counts = monthly_counts(&series.events);

    for bucket in first..=last {
        let mut values: HashMap<String, Value> = HashMap::new();
        let mut drop_row = false;

        for feature in &table.features {
            match &feature.derivation {
                Derivation::WindowedGrowth(growth) => {
                    let metric = &sums[growth.source_column.as_str()];
                    let current = metric.get(&bucket).copied().unwrap_or(0.0);

                    for (window, column) in
                        growth.window_lengths.iter().zip(feature.output_columns())
                    {
                        let base_bucket = bucket - *window as i32;
                        if base_bucket < first {
                            // Window reaches past the start of history
                            match growth.partial_windows {
                                PartialWindowPolicy::Null => {
                                    values.insert(column, Value::Null);
                                }
                                PartialWindowPolicy::Drop => drop_row = true,
                            }
                            continue;
                        }
                        let base = metric.get(&base_bucket).copied().unwrap_or(0.0);
                        if base == 0.0 {
                            // Growth against a zero base is undefined
                            values.insert(column, Value::Null);
                        } else {
                            values.insert(column, Value::Number((current - base) / base));
                        }
                    }
                }
                Derivation::TrailingCount(count) => {
                    let from = bucket - count.window_length as i32 + 1;
                    let total: u64 = counts.range(from..=bucket).map(|(_, c)| *c).sum();
                    values.insert(feature.name.clone(), Value::Number(total as f64));
                }
            }
        }

        if !drop_row {
            out.push(FeatureRow::new(
                series.entity.clone(),
                bucket_stamp(bucket),
                values,
            ));
        }
    }

    Ok(())
}
