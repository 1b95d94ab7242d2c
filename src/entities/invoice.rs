//! Invoice
//!
//! Totals are always computed server-side from the line items and tax rate;
//! client-supplied `subTotal`, `taxTotal` and `total` are overwritten.

use crate::core::schema::{FieldKind, FieldRule, ModelSchema};
use crate::core::store::DocumentStore;
use crate::crud::{ControllerSettings, CrudController, TotalsHooks};
use serde_json::json;
use std::sync::Arc;

pub const ENTITY: &str = "invoice";

pub const PAYMENT_STATUSES: &[&str] = &["unpaid", "paid", "partially"];
pub const STATUSES: &[&str] = &["draft", "pending", "sent", "refunded", "cancelled", "on hold"];
pub const RECURRENCES: &[&str] = &["daily", "weekly", "monthly", "annually", "quarter"];

/// Rules of one invoice or quote line
pub(crate) fn line_items() -> FieldRule {
    FieldRule::new("items", FieldKind::Array).required().items(vec![
        FieldRule::new("itemName", FieldKind::String).required(),
        FieldRule::new("description", FieldKind::String),
        FieldRule::new("quantity", FieldKind::Number)
            .required()
            .default(json!(1)),
        FieldRule::new("price", FieldKind::Number).required(),
        FieldRule::new("total", FieldKind::Number),
    ])
}

/// Fields shared by invoices and quotes
pub(crate) fn commercial_document(schema: ModelSchema) -> ModelSchema {
    schema
        .field(FieldRule::new("number", FieldKind::Number).required())
        .field(FieldRule::new("year", FieldKind::Number).required())
        .field(FieldRule::new("content", FieldKind::String))
        .field(FieldRule::new("date", FieldKind::Date).required())
        .field(FieldRule::new("expiredDate", FieldKind::Date).required())
        .field(FieldRule::new("notes", FieldKind::String))
        .field(line_items())
        .field(FieldRule::new("taxRate", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("subTotal", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("taxTotal", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("total", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("currency", FieldKind::String).default(json!("NA")))
        .field(FieldRule::new("discount", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("approved", FieldKind::Boolean).default(json!(false)))
        .field(FieldRule::new("pdf", FieldKind::String))
        .reference("client", "clients", true)
        .search_fields(&["content", "notes", "status"])
}

pub fn schema() -> ModelSchema {
    commercial_document(ModelSchema::new(ENTITY, "Invoice", "invoices"))
        .field(
            FieldRule::new("recurring", FieldKind::String).allowed(RECURRENCES),
        )
        .field(FieldRule::new("credit", FieldKind::Number).default(json!(0)))
        .field(FieldRule::new("payment", FieldKind::Array).default(json!([])))
        .field(
            FieldRule::new("paymentStatus", FieldKind::String)
                .default(json!("unpaid"))
                .allowed(PAYMENT_STATUSES),
        )
        .field(FieldRule::new("isOverdue", FieldKind::Boolean).default(json!(false)))
        .field(
            FieldRule::new("status", FieldKind::String)
                .default(json!("draft"))
                .allowed(STATUSES),
        )
}

pub fn controller(store: Arc<dyn DocumentStore>, settings: ControllerSettings) -> CrudController {
    CrudController::new(store.clone(), schema())
        .with_hooks(TotalsHooks::invoice(store))
        .with_settings(settings)
}
