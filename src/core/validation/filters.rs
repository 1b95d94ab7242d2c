//! Reusable field filters
//!
//! These filters transform field values before validation

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: cast numeric strings to numbers
///
/// Numbers pass through, `null` passes through, anything else fails.
pub fn to_number() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |field: &str, value: Value| match value {
        Value::Number(_) | Value::Null => Ok(value),
        Value::String(ref s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(json!(i))
            } else if let Ok(f) = trimmed.parse::<f64>()
                && f.is_finite()
            {
                Ok(json!(f))
            } else {
                Err(anyhow!(
                    "Cast to Number failed for value \"{}\" at path \"{}\"",
                    s,
                    field
                ))
            }
        }
        other => Err(anyhow!(
            "Cast to Number failed for value \"{}\" at path \"{}\"",
            other,
            field
        )),
    }
}

/// Filter: cast `"true"` / `"false"` to booleans
pub fn to_boolean() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |field: &str, value: Value| match value {
        Value::Bool(_) | Value::Null => Ok(value),
        Value::String(ref s) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(anyhow!(
                "Cast to Boolean failed for value \"{}\" at path \"{}\"",
                s,
                field
            )),
        },
        other => Err(anyhow!(
            "Cast to Boolean failed for value \"{}\" at path \"{}\"",
            other,
            field
        )),
    }
}

/// Filter: round number to specified decimal places
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| {
        if let Some(num) = value.as_f64() {
            Ok(json!(round_to(num, decimals)))
        } else {
            Ok(value)
        }
    }
}

/// Round a number to the given decimal places
pub fn round_to(num: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (num * factor).round() / factor
}
