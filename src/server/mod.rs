//! Server module for building HTTP servers with auto-registered routes
//!
//! This module provides a `ServerBuilder` that registers:
//! - CRUD routes for all entities declared in modules, under the API prefix
//! - Health check routes

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use entity_registry::{CrudDescriptor, EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::ServerHost;
