//! # erp-rs
//!
//! A document-backed ERP API. Every business entity (invoice, quote,
//! payment, client, taxes, payment mode) is served through one generic CRUD
//! controller with the same route shape, paginated listing, search, filters
//! and soft delete.
//!
//! ## Features
//!
//! - **Generic CRUD**: entities opt in by registering a `ModelSchema`
//! - **Paginated lists**: lenient `page` / `items` / `sortBy` / `filter` / `q` parsing
//! - **Soft delete**: removed documents never show up again in reads
//! - **Business hooks**: invoice totals, payment credit tracking
//! - **Pluggable storage**: in-memory, or MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use erp::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_store(InMemoryDocumentStore::new())
//!     .register_module(ErpModule::new())?
//!     .serve("127.0.0.1:8888")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod crud;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiResponse, Condition, CrudError, Document, DocumentId, DocumentStore, FieldKind,
        FieldRule, Filter, FindOptions, ListParams, ModelSchema, Modification, Module,
        ModuleContext, Pagination, RawQuery, StoreError,
    };

    // === CRUD ===
    pub use crate::crud::{ControllerSettings, CrudController, ModelHooks, NoHooks};

    // === Entities ===
    pub use crate::entities::ErpModule;

    // === Storage ===
    pub use crate::storage::InMemoryDocumentStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDocumentStore;

    // === Config ===
    pub use crate::config::{AppConfig, StoreConfig};

    // === Server ===
    pub use crate::server::{EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}
