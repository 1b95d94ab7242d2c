//! Entity registry for managing entity descriptors and auto-generating CRUD routes

use crate::crud::CrudController;
use crate::crud::handlers;
use axum::Router;
use std::collections::BTreeMap;

/// Trait that describes how to build routes for an entity
pub trait EntityDescriptor: Send + Sync {
    /// The entity route name (e.g., "invoice", "paymentMode")
    fn entity_type(&self) -> &str;

    /// The storage collection (e.g., "invoices")
    fn collection(&self) -> &str;

    /// Build the routes for this entity
    ///
    /// Routes are relative to the API prefix:
    /// - POST /{entity}/create
    /// - GET /{entity}/read/{id}
    /// - GET /{entity}/list
    fn build_routes(&self) -> Router;
}

/// Descriptor of a model served by the generic CRUD controller
pub struct CrudDescriptor {
    controller: CrudController,
}

impl CrudDescriptor {
    pub fn new(controller: CrudController) -> Self {
        Self { controller }
    }
}

impl EntityDescriptor for CrudDescriptor {
    fn entity_type(&self) -> &str {
        &self.controller.schema().entity
    }

    fn collection(&self) -> &str {
        &self.controller.schema().collection
    }

    fn build_routes(&self) -> Router {
        handlers::routes(self.controller.clone())
    }
}

/// Registry for all entities in the application
///
/// This registry collects entity descriptors from all registered modules
/// and can generate a router with all CRUD routes.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity descriptor
    ///
    /// The entity type name is the key; registering it twice replaces the
    /// first descriptor.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        if self.descriptors.contains_key(&entity_type) {
            tracing::warn!(entity = %entity_type, "entity registered twice, replacing");
        }
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Shorthand for registering a CRUD controller
    pub fn register_crud(&mut self, controller: CrudController) {
        self.register(Box::new(CrudDescriptor::new(controller)));
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    /// Get all registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.descriptors.contains_key(entity_type)
    }
}
