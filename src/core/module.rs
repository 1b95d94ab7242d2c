//! Module system
//!
//! A module groups entities and registers their CRUD descriptors at build time,
//! once the server knows which store and settings to hand them.

use crate::core::store::DocumentStore;
use crate::crud::ControllerSettings;
use crate::server::entity_registry::EntityRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Shared resources available to modules while they register entities
#[derive(Clone)]
pub struct ModuleContext {
    pub store: Arc<dyn DocumentStore>,
    pub settings: ControllerSettings,
}

/// Trait for a group of entities served together
pub trait Module: Send + Sync {
    /// Unique module name
    fn name(&self) -> &str;

    /// Module version
    fn version(&self) -> &str {
        "1.0.0"
    }

    /// List of entity types managed by this module
    fn entity_types(&self) -> Vec<&str>;

    /// Register entities with the entity registry
    ///
    /// Each entity descriptor provides the CRUD routes for that entity.
    fn register_entities(&self, registry: &mut EntityRegistry, ctx: &ModuleContext) -> Result<()>;
}
