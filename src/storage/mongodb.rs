//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! erp-rs = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! One MongoDB collection per model collection (`invoices`, `clients`, ...).
//! Documents are converted through `serde_json::Value`, so identifiers are
//! stored as strings in `_id` and timestamps as RFC 3339 strings.
//!
//! # Filter translation
//!
//! | condition | MongoDB |
//! |-----------|---------|
//! | `NotRemoved` | `{ removed: { $ne: true } }` |
//! | `IdIs(id)` | `{ _id: "<uuid>" }` |
//! | `Equals { field, value }` | `{ field: { $in: [<typed candidates>] } }` |
//! | `Contains { fields, needle }` | `{ $or: [{ f: { $regex: <escaped>, $options: "i" } }, ...] }` |

use crate::core::document::Document as JsonDocument;
use crate::core::query::{Condition, Filter, FindOptions, equal_candidates};
use crate::core::store::{DocumentStore, Modification, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON document into a BSON Document.
fn json_to_document(json: JsonDocument) -> Result<Document, StoreError> {
    match mongodb::bson::to_bson(&serde_json::Value::Object(json))
        .map_err(|e| StoreError::Conversion(format!("Failed to convert JSON to BSON: {}", e)))?
    {
        Bson::Document(d) => Ok(d),
        _ => Err(StoreError::Conversion(
            "Expected BSON document, got non-object".to_string(),
        )),
    }
}

/// Convert a BSON Document back into a JSON document.
fn document_to_json(doc: Document) -> Result<JsonDocument, StoreError> {
    match Bson::Document(doc).into_relaxed_extjson() {
        serde_json::Value::Object(obj) => Ok(obj),
        _ => Err(StoreError::Conversion(
            "Expected JSON object from BSON document".to_string(),
        )),
    }
}

fn json_to_bson(value: serde_json::Value) -> Result<Bson, StoreError> {
    mongodb::bson::to_bson(&value)
        .map_err(|e| StoreError::Conversion(format!("Failed to convert JSON to BSON: {}", e)))
}

/// Translate a filter into a MongoDB query document.
fn filter_to_document(filter: &Filter) -> Result<Document, StoreError> {
    let mut clauses: Vec<Document> = Vec::new();

    for condition in filter.conditions() {
        let clause = match condition {
            Condition::NotRemoved => doc! { "removed": { "$ne": true } },
            Condition::IdIs(id) => doc! { "_id": id.to_string() },
            Condition::Equals { field, value } => {
                let candidates = equal_candidates(value)
                    .into_iter()
                    .map(json_to_bson)
                    .collect::<Result<Vec<_>, _>>()?;
                doc! { field.as_str(): { "$in": candidates } }
            }
            Condition::Contains { fields, needle, .. } => {
                let pattern = regex::escape(needle);
                let any: Vec<Document> = fields
                    .iter()
                    .map(|f| doc! { f.as_str(): { "$regex": pattern.as_str(), "$options": "i" } })
                    .collect();
                doc! { "$or": any }
            }
        };
        clauses.push(clause);
    }

    Ok(match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    })
}

/// Translate a modification into a MongoDB update document.
fn modification_to_update(modification: Modification) -> Result<Document, StoreError> {
    let mut update = Document::new();

    if !modification.set.is_empty() {
        update.insert("$set", json_to_document(modification.set)?);
    }
    if !modification.inc.is_empty() {
        let mut inc = Document::new();
        for (field, by) in modification.inc {
            inc.insert(field, by);
        }
        update.insert("$inc", inc);
    }
    for (operator, entries) in [("$push", modification.push), ("$pull", modification.pull)] {
        if entries.is_empty() {
            continue;
        }
        let mut values = Document::new();
        for (field, value) in entries {
            values.insert(field, json_to_bson(value)?);
        }
        update.insert(operator, values);
    }

    Ok(update)
}

/// Skip and limit as the driver expects them, saturating instead of wrapping.
fn window(options: &FindOptions) -> (u64, Option<i64>) {
    let skip = u64::try_from(options.skip).unwrap_or(u64::MAX);
    let limit = options
        .limit
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
    (skip, limit)
}

// ---------------------------------------------------------------------------
// MongoDocumentStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use erp::storage::MongoDocumentStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoDocumentStore::new(client.database("erp"));
/// ```
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    /// Create a new `MongoDocumentStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect to `uri` and use `database`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = mongodb::Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to MongoDB: {}", e)))?;
        Ok(Self::new(client.database(database)))
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        doc: JsonDocument,
    ) -> Result<JsonDocument, StoreError> {
        let bson_doc = json_to_document(doc.clone())?;

        self.collection(collection)
            .insert_one(bson_doc)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to insert document: {}", e)))?;

        Ok(doc)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<JsonDocument>, StoreError> {
        self.collection(collection)
            .find_one(filter_to_document(filter)?)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to find document: {}", e)))?
            .map(document_to_json)
            .transpose()
    }

    async fn find(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<JsonDocument>, StoreError> {
        let (skip, limit) = window(options);
        let coll = self.collection(collection);
        let mut action = coll
            .find(filter_to_document(&options.filter)?)
            .skip(skip);

        if let Some(sort) = &options.sort {
            // Tie-break on creation time to keep insertion order
            let mut sort_doc = doc! { sort.field.as_str(): sort.direction.as_i32() };
            if sort.field != "created" {
                sort_doc.insert("created", 1);
            }
            action = action.sort(sort_doc);
        }
        if let Some(limit) = limit {
            action = action.limit(limit);
        }

        let cursor = action
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to list documents: {}", e)))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to collect documents: {}", e)))?;

        docs.into_iter().map(document_to_json).collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.collection(collection)
            .count_documents(filter_to_document(filter)?)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to count documents: {}", e)))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: JsonDocument,
    ) -> Result<Option<JsonDocument>, StoreError> {
        let set = json_to_document(patch)?;

        self.collection(collection)
            .find_one_and_update(filter_to_document(filter)?, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to update document: {}", e)))?
            .map(document_to_json)
            .transpose()
    }

    async fn find_one_and_modify(
        &self,
        collection: &str,
        filter: &Filter,
        modification: Modification,
    ) -> Result<Option<JsonDocument>, StoreError> {
        if modification.is_empty() {
            return self.find_one(collection, filter).await;
        }

        self.collection(collection)
            .find_one_and_update(
                filter_to_document(filter)?,
                modification_to_update(modification)?,
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to modify document: {}", e)))?
            .map(document_to_json)
            .transpose()
    }
}
