//! Server host for transport-agnostic API exposure
//!
//! The host holds all state needed to expose the API and is the single
//! source of truth for it. Exposures (currently REST) consume it to build
//! their routers.

use crate::config::AppConfig;
use crate::core::store::DocumentStore;
use crate::server::entity_registry::EntityRegistry;
use std::sync::Arc;

/// Host context containing all framework state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerBuilder::new()
///     .with_store(InMemoryDocumentStore::new())
///     .register_module(ErpModule::new())?
///     .build_host()?;
///
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    /// Effective configuration
    pub config: Arc<AppConfig>,

    /// Store shared by every controller
    pub store: Arc<dyn DocumentStore>,

    /// Entity registry for CRUD routes
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        entity_registry: EntityRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            entity_registry,
        }
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    /// Check if host has anything to serve
    pub fn is_ready(&self) -> bool {
        !self.entity_types().is_empty()
    }
}
