//! Canonical lookup-key encoding
//!
//! Entity key values arrive as `Value`s (a customer_id may be a number in
//! one table and a string in another). Lookups and row keys both go
//! through one canonical string encoding so `7`, `7.0` and `"7"` address
//! the same entity.

use crate::error::{Result, StoreError};
use featuremill_core::Value;

/// Encode a value as a canonical entity-key string
pub fn encode_key(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                Ok(format!("{}", *n as i64))
            } else {
                Ok(n.to_string())
            }
        }
        Value::Bool(b) => Ok(b.to_string()),
        Value::Timestamp(ts) => Ok(ts.to_rfc3339()),
        Value::Null => Err(StoreError::InvalidKey(
            "null cannot be used as an entity key".to_string(),
        )),
    }
}
