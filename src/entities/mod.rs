//! ERP business entities
//!
//! Each entity is a [`ModelSchema`](crate::core::ModelSchema) plus, where the
//! business needs it, a set of hooks. [`ErpModule`] registers them all.

pub mod client;
pub mod invoice;
pub mod payment;
pub mod payment_mode;
pub mod quote;
pub mod taxes;

use crate::core::module::{Module, ModuleContext};
use crate::server::entity_registry::EntityRegistry;
use anyhow::{Result, bail};

/// Every entity this crate knows how to serve
pub const ALL_ENTITIES: &[&str] = &[
    client::ENTITY,
    invoice::ENTITY,
    quote::ENTITY,
    payment::ENTITY,
    taxes::ENTITY,
    payment_mode::ENTITY,
];

/// The ERP module: clients, invoices, quotes, payments, taxes and payment modes
#[derive(Debug, Clone)]
pub struct ErpModule {
    enabled: Vec<String>,
}

impl ErpModule {
    /// Module serving every entity
    pub fn new() -> Self {
        Self {
            enabled: ALL_ENTITIES.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Module serving a subset of the entities
    pub fn with_entities<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: entities.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ErpModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ErpModule {
    fn name(&self) -> &str {
        "erp"
    }

    fn entity_types(&self) -> Vec<&str> {
        self.enabled.iter().map(String::as_str).collect()
    }

    fn register_entities(&self, registry: &mut EntityRegistry, ctx: &ModuleContext) -> Result<()> {
        for entity in &self.enabled {
            let store = ctx.store.clone();
            let controller = match entity.as_str() {
                client::ENTITY => client::controller(store, ctx.settings),
                invoice::ENTITY => invoice::controller(store, ctx.settings),
                quote::ENTITY => quote::controller(store, ctx.settings),
                payment::ENTITY => payment::controller(store, ctx.settings),
                taxes::ENTITY => taxes::controller(store, ctx.settings),
                payment_mode::ENTITY => payment_mode::controller(store, ctx.settings),
                other => bail!("Unknown entity '{}' in module '{}'", other, self.name()),
            };
            tracing::debug!(entity = %entity, "entity registered");
            registry.register_crud(controller);
        }
        Ok(())
    }
}
