//! In-memory tabular data
//!
//! `Frame` is the exchange format between the spec-driven engine, the
//! feature store, and the training-set assembler: a list of column names
//! plus one `Row` map per record. It is deliberately small; Featuremill
//! is a batch orchestrator, not a dataframe library.

use crate::error::{CoreError, Result};
use crate::types::Value;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A single record: column name to cell value
pub type Row = HashMap<String, Value>;

/// One computed feature record, keyed by entity and observation time
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Entity key value (e.g. the customer_id)
    pub entity_id: Value,
    /// Observation timestamp the feature values are valid as of
    pub observed_at: DateTime<Utc>,
    /// Feature column name to value
    pub values: HashMap<String, Value>,
}

impl FeatureRow {
    pub fn new(
        entity_id: impl Into<Value>,
        observed_at: DateTime<Utc>,
        values: HashMap<String, Value>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            observed_at,
            values,
        }
    }
}

/// An ordered set of columns with row data
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Frame {
    /// Create an empty frame with the given column order
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a frame from rows, validating every row against the columns
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut frame = Self::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Append a row. Keys must be declared columns; missing columns are
    /// filled with an explicit `Value::Null`.
    pub fn push_row(&mut self, mut row: Row) -> Result<()> {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                return Err(CoreError::ColumnNotFound(key.clone()));
            }
        }
        for column in &self.columns {
            row.entry(column.clone()).or_insert(Value::Null);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_push_row_fills_missing_with_null() {
        let mut frame = Frame::new(vec!["customer_id".into(), "tier".into()]);
        frame
            .push_row(row(&[("customer_id", Value::Number(7.0))]))
            .unwrap();

        assert_eq!(frame.len(), 1);
        assert_eq!(frame.cell(0, "tier"), Some(&Value::Null));
    }

    #[test]
    fn test_push_row_rejects_unknown_column() {
        let mut frame = Frame::new(vec!["customer_id".into()]);
        let result = frame.push_row(row(&[("unknown", Value::Number(1.0))]));
        assert!(matches!(result, Err(CoreError::ColumnNotFound(_))));
    }

    #[test]
    fn test_from_rows() {
        let frame = Frame::from_rows(
            vec!["customer_id".into(), "commit".into()],
            vec![
                row(&[("customer_id", Value::Number(1.0)), ("commit", Value::Number(1.0))]),
                row(&[("customer_id", Value::Number(2.0)), ("commit", Value::Number(0.0))]),
            ],
        )
        .unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.cell(1, "commit"), Some(&Value::Number(0.0)));
    }
}
