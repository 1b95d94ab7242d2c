//! Payment modes (cash, wire transfer, ...)

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController};
use serde_json::json;
use std::sync::Arc;

pub const ENTITY: &str = "paymentMode";

pub fn schema() -> ModelSchema {
    ModelSchema::new(ENTITY, "PaymentMode", "paymentmodes")
        .field(FieldRule::new("name", FieldKind::String).required())
        .field(FieldRule::new("description", FieldKind::String).required())
        .field(FieldRule::new("ref", FieldKind::String))
        .field(FieldRule::new("isDefault", FieldKind::Boolean).default(json!(false)))
        .search_fields(&["name", "description"])
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store, schema()).with_settings(settings)
}
