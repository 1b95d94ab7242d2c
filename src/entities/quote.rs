//! Quote: an invoice proposal, without payment tracking

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController, TotalsHooks};
use crate::entities::invoice::commercial_document;
use serde_json::json;
use std::sync::Arc;

pub const ENTITY: &str = "quote";

pub const STATUSES: &[&str] = &[
    "draft", "pending", "sent", "accepted", "declined", "cancelled", "on hold",
];

pub fn schema() -> ModelSchema {
    commercial_document(ModelSchema::new(ENTITY, "Quote", "quotes"))
        .field(FieldRule::new("converted", FieldKind::Boolean).default(json!(false)))
        .field(
            FieldRule::new("status", FieldKind::String)
                .default(json!("draft"))
                .allowed(STATUSES),
        )
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store.clone(), schema())
        .with_hooks(TotalsHooks::quote(store))
        .with_settings(settings)
}
