//! Reusable field validators
//!
//! These validators are used by model schemas to check document fields

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Validator: field is required (present and not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            Err(format!("Path `{}` is required.", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be positive
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num <= 0.0 {
                Err(format!(
                    "Path `{}` must be positive (value: {})",
                    field, num
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !allowed.iter().any(|a| a == s) {
                Err(format!(
                    "`{}` is not a valid enum value for path `{}`.",
                    s, field
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: string must be an RFC 3339 timestamp or a `YYYY-MM-DD` date
pub fn date() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::String(s) => {
            if DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            {
                Ok(())
            } else {
                Err(format!(
                    "Cast to date failed for value \"{}\" at path \"{}\"",
                    s, field
                ))
            }
        }
        Value::Null => Ok(()),
        other => Err(format!(
            "Cast to date failed for value \"{}\" at path \"{}\"",
            other, field
        )),
    }
}
