//! Persistence collaborator
//!
//! The CRUD layer talks to storage exclusively through [`DocumentStore`]. The
//! trait is deliberately small: everything the controller needs is expressible
//! as find / count / insert / update over named collections.

use crate::core::document::Document;
use crate::core::query::{Filter, FindOptions};
use async_trait::async_trait;
use serde_json::Value;

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to convert document: {0}")]
    Conversion(String),

    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Changes applied to one document in a single atomic step
///
/// `set` overwrites top-level keys, `inc` adds to numeric fields (a missing
/// field counts as 0), `push` appends to array fields and `pull` removes
/// every equal element. A field must appear in at most one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modification {
    pub set: Document,
    pub inc: Vec<(String, f64)>,
    pub push: Vec<(String, Value)>,
    pub pull: Vec<(String, Value)>,
}

impl Modification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }

    pub fn inc(mut self, field: impl Into<String>, by: f64) -> Self {
        self.inc.push((field.into(), by));
        self
    }

    pub fn push(mut self, field: impl Into<String>, value: Value) -> Self {
        self.push.push((field.into(), value));
        self
    }

    pub fn pull(mut self, field: impl Into<String>, value: Value) -> Self {
        self.pull.push((field.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty() && self.push.is_empty() && self.pull.is_empty()
    }

    /// Apply the changes to a document held in memory
    pub fn apply_to(&self, doc: &mut Document) {
        for (key, value) in &self.set {
            doc.insert(key.clone(), value.clone());
        }
        for (field, by) in &self.inc {
            let current = doc.get(field).and_then(Value::as_f64).unwrap_or(0.0);
            doc.insert(field.clone(), serde_json::json!(current + by));
        }
        for (field, value) in &self.push {
            match doc.get_mut(field) {
                Some(Value::Array(items)) => items.push(value.clone()),
                _ => {
                    doc.insert(field.clone(), Value::Array(vec![value.clone()]));
                }
            }
        }
        for (field, value) in &self.pull {
            if let Some(Value::Array(items)) = doc.get_mut(field) {
                items.retain(|item| item != value);
            }
        }
    }
}

/// Storage backend for schemaless documents
///
/// Implementations must keep insertion order when no sort is requested and
/// apply the sort stably, so that ties keep insertion order too.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return it as stored
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// First document matching the filter
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// All documents matching the options' filter, sorted and windowed
    async fn find(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Number of documents matching the filter
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Overwrite the top-level keys of `patch` on the first matching document
    ///
    /// Returns the document after the update, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Apply `modification` to the first matching document atomically
    ///
    /// Concurrent modifications of the same document never lose each
    /// other's increments or array changes. Returns the document after the
    /// change, or `None` when nothing matched.
    async fn find_one_and_modify(
        &self,
        collection: &str,
        filter: &Filter,
        modification: Modification,
    ) -> Result<Option<Document>, StoreError>;
}
