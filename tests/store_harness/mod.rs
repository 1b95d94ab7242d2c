//! Shared test harness for document store backends
//!
//! Provides document builders and two macro-generated suites:
//!
//! - `document_store_tests!` validates a `DocumentStore` implementation
//!   directly against the storage contract
//! - `rest_integration_tests!` drives the full ERP router over HTTP on top
//!   of a given store
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//!
//! document_store_tests!(InMemoryDocumentStore::new());
//! rest_integration_tests!(InMemoryDocumentStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod rest_tests;

use axum_test::TestServer;
use erp::core::document::{Document, DocumentId};
use erp::core::store::DocumentStore;
use erp::entities::ErpModule;
use erp::server::ServerBuilder;
use serde_json::{Value, json};
use std::sync::Arc;

/// Collection used by the contract suite
pub const RECORDS: &str = "records";

/// Build a document from a JSON object literal
pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("expected a JSON object")
}

/// A live record with a fresh id
///
/// `seq` drives the `created` timestamp so that backends which tie-break on
/// creation time see records in insertion order.
pub fn record(seq: u32, name: &str, rank: i64) -> Document {
    doc(json!({
        "_id": DocumentId::new().to_string(),
        "name": name,
        "rank": rank,
        "removed": false,
        "enabled": true,
        "created": format!("2025-01-01T00:{:02}:{:02}.000Z", seq / 60, seq % 60),
    }))
}

/// Names of a list of documents, in order
pub fn names(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .filter_map(|d| d.get("name").and_then(Value::as_str).map(String::from))
        .collect()
}

/// Names of a JSON array of documents, in order
pub fn result_names(result: &Value) -> Vec<String> {
    result
        .as_array()
        .map(|docs| {
            docs.iter()
                .filter_map(|d| d["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Full ERP router over the given store
pub fn erp_server(store: Arc<dyn DocumentStore>) -> TestServer {
    let router = ServerBuilder::new()
        .with_shared_store(store)
        .register_module(ErpModule::new())
        .expect("module registration")
        .build()
        .expect("router build");
    TestServer::try_new(router).expect("test server")
}

/// POST `/api/{entity}/create` and return the created document
pub async fn create(server: &TestServer, entity: &str, body: Value) -> Value {
    let response = server
        .post(&format!("/api/{}/create", entity))
        .json(&body)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["result"].clone()
}

pub fn id_of(document: &Value) -> String {
    document["_id"]
        .as_str()
        .expect("document without _id")
        .to_string()
}

pub fn client_body(name: &str, country: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "country": country,
    })
}

pub fn invoice_body(number: i64, client_id: &str, items: Value, tax_rate: f64) -> Value {
    json!({
        "number": number,
        "year": 2025,
        "date": "2025-01-15",
        "expiredDate": "2025-02-15",
        "client": client_id,
        "items": items,
        "taxRate": tax_rate,
        "currency": "USD",
    })
}

pub fn payment_body(number: i64, invoice: &Value, amount: f64) -> Value {
    json!({
        "number": number,
        "amount": amount,
        "invoice": id_of(invoice),
        "client": invoice["client"],
        "currency": "USD",
    })
}

/// Read a numeric field of a JSON document
pub fn number(document: &Value, key: &str) -> f64 {
    document[key]
        .as_f64()
        .unwrap_or_else(|| panic!("field {key} is not a number: {document}"))
}
