//! Storage implementations for different backends

pub mod in_memory;

#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryDocumentStore;

#[cfg(feature = "mongodb_backend")]
pub use self::mongodb::MongoDocumentStore;

use crate::config::StoreConfig;
use crate::core::store::DocumentStore;
use anyhow::Result;
use std::sync::Arc;

/// Open the store selected by the configuration
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config {
        StoreConfig::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StoreConfig::Mongodb { uri, database } => {
            tracing::info!(database = %database, "connecting to MongoDB");
            Ok(Arc::new(MongoDocumentStore::connect(uri, database).await?))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StoreConfig::Mongodb { .. } => Err(anyhow::anyhow!(
            "MongoDB backend requested but the `mongodb_backend` feature is disabled"
        )),
    }
}
