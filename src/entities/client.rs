//! Client: the customer invoices and quotes are addressed to

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController};
use std::sync::Arc;

pub const ENTITY: &str = "client";

pub fn schema() -> ModelSchema {
    ModelSchema::new(ENTITY, "Client", "clients")
        .field(FieldRule::new("name", FieldKind::String).required())
        .field(FieldRule::new("email", FieldKind::String))
        .field(FieldRule::new("phone", FieldKind::String))
        .field(FieldRule::new("country", FieldKind::String))
        .field(FieldRule::new("address", FieldKind::String))
        .search_fields(&["name", "email", "phone"])
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store, schema()).with_settings(settings)
}
