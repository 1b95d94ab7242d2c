//! Tax rates offered when drafting invoices and quotes

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController};
use serde_json::json;
use std::sync::Arc;

pub const ENTITY: &str = "taxes";

pub fn schema() -> ModelSchema {
    ModelSchema::new(ENTITY, "Taxes", "taxes")
        .field(FieldRule::new("taxName", FieldKind::String).required())
        .field(FieldRule::new("taxValue", FieldKind::Number).required())
        .field(FieldRule::new("isDefault", FieldKind::Boolean).default(json!(false)))
        .search_fields(&["taxName"])
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store, schema()).with_settings(settings)
}
