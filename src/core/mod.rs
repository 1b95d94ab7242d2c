//! Core module containing the document model, query engine and collaborator traits

pub mod document;
pub mod error;
pub mod module;
pub mod query;
pub mod response;
pub mod schema;
pub mod store;
pub mod validation;

pub use document::{Document, DocumentId};
pub use error::{CrudError, FieldError};
pub use module::{Module, ModuleContext};
pub use query::{Condition, Filter, FindOptions, ListParams, Pagination, RawQuery, SortSpec};
pub use response::ApiResponse;
pub use schema::{FieldKind, FieldRule, ModelSchema};
pub use store::{DocumentStore, Modification, StoreError};
