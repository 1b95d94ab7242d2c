//! Payment received against an invoice

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController, PaymentHooks};
use serde_json::json;
use std::sync::Arc;

pub const ENTITY: &str = "payment";

pub fn schema() -> ModelSchema {
    ModelSchema::new(ENTITY, "Payment", "payments")
        .field(FieldRule::new("number", FieldKind::Number).required())
        .field(FieldRule::new("date", FieldKind::Date))
        .field(FieldRule::new("amount", FieldKind::Number).required())
        .field(FieldRule::new("currency", FieldKind::String).default(json!("NA")))
        .field(FieldRule::new("ref", FieldKind::String))
        .field(FieldRule::new("description", FieldKind::String))
        .field(FieldRule::new("pdf", FieldKind::String))
        .reference("client", "clients", true)
        .reference("invoice", "invoices", true)
        .reference("paymentMode", "paymentmodes", false)
        .search_fields(&["ref", "description"])
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store.clone(), schema())
        .with_hooks(PaymentHooks::new(store))
        .with_settings(settings)
}
