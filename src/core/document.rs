//! Schemaless documents and identifiers
//!
//! Every entity in the system is stored as a JSON object. A handful of keys are
//! reserved and managed by the framework:
//!
//! - `_id`: the document identifier (a UUID rendered as a string)
//! - `removed`: soft-delete flag, `true` once the document has been deleted
//! - `enabled`: business on/off switch, defaults to `true`
//! - `created` / `updated`: RFC 3339 UTC timestamps

use crate::core::error::CrudError;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A stored document
pub type Document = Map<String, Value>;

pub const ID_KEY: &str = "_id";
pub const REMOVED_KEY: &str = "removed";
pub const ENABLED_KEY: &str = "enabled";
pub const CREATED_KEY: &str = "created";
pub const UPDATED_KEY: &str = "updated";

/// A validated document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier coming from an untrusted source (URL path, body)
    ///
    /// The parser's own message is kept so that it can be surfaced to the
    /// client as-is.
    pub fn parse(raw: &str) -> Result<Self, CrudError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| CrudError::InvalidId {
                raw: raw.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current time in the storage timestamp format
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Get the `_id` of a document as a string
pub fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_KEY).and_then(Value::as_str)
}

/// Whether the document carries the soft-delete flag
pub fn is_removed(doc: &Document) -> bool {
    doc.get(REMOVED_KEY).and_then(Value::as_bool).unwrap_or(false)
}

/// Read a numeric field, treating absent or non-numeric values as zero
pub fn number_field(doc: &Document, key: &str) -> f64 {
    doc.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Rank of a JSON type in the sort order
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over (possibly missing) field values
///
/// Values of different types are ordered by type first:
/// missing/null < numbers < strings < objects < arrays < booleans.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (vx, vy) in x.iter().zip(y.iter()) {
                let ord = compare_values(Some(vx), Some(vy));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(Value::Object(x)), Some(Value::Object(y))) => x.len().cmp(&y.len()),
        _ => Ordering::Equal,
    }
}
