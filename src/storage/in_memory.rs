//! In-memory implementation of DocumentStore for testing and development

use crate::core::document::Document;
use crate::core::query::{Filter, FindOptions};
use crate::core::store::{DocumentStore, Modification, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory document store
///
/// Collections are vectors, so documents come back in insertion order unless
/// a sort is requested. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryDocumentStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire write lock: {}", e)))?;

        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        Ok(doc)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire read lock: {}", e)))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire read lock: {}", e)))?;

        let mut matching: Vec<&Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| options.filter.matches(d)).collect())
            .unwrap_or_default();

        // sort_by is stable: ties keep insertion order
        if let Some(sort) = &options.sort {
            matching.sort_by(|a, b| sort.compare(a, b));
        }

        let window = matching.into_iter().skip(options.skip);
        Ok(match options.limit {
            Some(limit) => window.take(limit).cloned().collect(),
            None => window.cloned().collect(),
        })
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire read lock: {}", e)))?;

        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire write lock: {}", e)))?;

        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(None);
        };

        for (key, value) in patch {
            doc.insert(key, value);
        }

        Ok(Some(doc.clone()))
    }

    async fn find_one_and_modify(
        &self,
        collection: &str,
        filter: &Filter,
        modification: Modification,
    ) -> Result<Option<Document>, StoreError> {
        // Match and modify under the same write lock
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Poisoned(format!("Failed to acquire write lock: {}", e)))?;

        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(None);
        };

        modification.apply_to(doc);
        Ok(Some(doc.clone()))
    }
}
