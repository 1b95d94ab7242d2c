//! Macro-generated REST integration test suite.
//!
//! Drives the full ERP router (every entity, default pagination) over HTTP
//! through `axum-test`, on top of the given store.
//!
//! # Generated Tests
//!
//! ## Health
//! - `test_health_check`
//!
//! ## Single documents
//! - `test_create_and_read_client`
//! - `test_create_missing_required_field`: 400 with field details
//! - `test_malformed_json_body`: 400 validation envelope
//! - `test_update_client`
//! - `test_invalid_id_returns_400`
//! - `test_soft_delete_hides_document`: gone from read, list, listAll,
//!   search, filter and summary
//! - `test_delete_twice_succeeds`
//!
//! ## Lists
//! - `test_list_default_page`
//! - `test_list_empty_collection_returns_203`
//! - `test_list_page_window`
//! - `test_list_sorted_by_name`
//! - `test_list_filter_and_search`
//! - `test_list_all`
//! - `test_search_endpoint`
//! - `test_filter_endpoint`
//! - `test_summary`
//! - `test_operator_field_names_are_ignored`: `$`-prefixed or empty-segment
//!   names in `sortBy`, `filter` and `fields` are dropped
//!
//! ## Business rules
//! - `test_invoice_totals_computed`
//! - `test_invoice_references_populated`
//! - `test_payment_credit_flow`
//! - `test_concurrent_payments_keep_credit_consistent`
//!
//! ## Routing
//! - `test_unknown_route_returns_404`

/// Generate the REST integration suite.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `DocumentStore + 'static`. It is re-evaluated for each test.
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_contract_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use serde_json::{Value, json};
            use std::sync::Arc;

            async fn server() -> TestServer {
                erp_server(Arc::new($factory))
            }

            async fn seed_clients(server: &TestServer, count: usize) -> Vec<String> {
                let mut ids = Vec::new();
                for i in 0..count {
                    let client = create(server, "client", client_body(&format!("Client {:02}", i), "FR")).await;
                    ids.push(id_of(&client));
                }
                ids
            }

            async fn seed_invoice(server: &TestServer) -> Value {
                let client = create(server, "client", client_body("Acme", "US")).await;
                create(
                    server,
                    "invoice",
                    invoice_body(
                        1,
                        &id_of(&client),
                        json!([{"itemName": "Consulting", "quantity": 2, "price": 50}]),
                        20.0,
                    ),
                )
                .await
            }

            // ==================================================================
            // Health
            // ==================================================================

            #[tokio::test]
            async fn test_health_check() {
                let server = server().await;
                let response = server.get("/health").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["status"], "ok");
                assert_eq!(body["service"], "erp-rs");
            }

            // ==================================================================
            // Single documents
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_read_client() {
                let server = server().await;

                let response = server
                    .post("/api/client/create")
                    .json(&client_body("Acme Corp", "US"))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["message"], "Successfully Created the document in Model ");
                assert_eq!(body["result"]["removed"], false);
                assert_eq!(body["result"]["enabled"], true);
                assert!(body["result"]["created"].is_string());

                let id = id_of(&body["result"]);
                let response = server.get(&format!("/api/client/read/{}", id)).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["result"]["name"], "Acme Corp");
                assert_eq!(body["message"], "we found this document ");
            }

            #[tokio::test]
            async fn test_create_missing_required_field() {
                let server = server().await;
                let response = server
                    .post("/api/client/create")
                    .json(&json!({"email": "nobody@example.com"}))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["message"], "Required fields are not supplied");
                assert_eq!(body["error"]["fields"][0]["field"], "name");
            }

            #[tokio::test]
            async fn test_malformed_json_body() {
                let server = server().await;
                let response = server
                    .post("/api/client/create")
                    .text("{not json")
                    .content_type("application/json")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "VALIDATION_ERROR");
            }

            #[tokio::test]
            async fn test_update_client() {
                let server = server().await;
                let client = create(&server, "client", client_body("Acme", "US")).await;
                let id = id_of(&client);

                let response = server
                    .patch(&format!("/api/client/update/{}", id))
                    .json(&json!({"country": "FR"}))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "we update this document ");
                assert_eq!(body["result"]["country"], "FR");
                assert_eq!(body["result"]["name"], "Acme");
                assert_eq!(body["result"]["created"], client["created"]);
            }

            #[tokio::test]
            async fn test_invalid_id_returns_400() {
                let server = server().await;
                let response = server.get("/api/client/read/not-an-id").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "INVALID_ID");
            }

            #[tokio::test]
            async fn test_soft_delete_hides_document() {
                let server = server().await;
                let ids = seed_clients(&server, 3).await;

                let response = server.delete(&format!("/api/client/delete/{}", ids[1])).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "Successfully Deleted the document ");
                assert_eq!(body["result"]["removed"], true);

                let response = server.get(&format!("/api/client/read/{}", ids[1])).await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["message"], "No document found ");

                let response = server.get("/api/client/list").await;
                let body: Value = response.json();
                assert_eq!(body["pagination"]["count"], 2);
                assert!(!result_names(&body["result"]).contains(&"Client 01".to_string()));

                let response = server.get("/api/client/listAll").await;
                let body: Value = response.json();
                assert_eq!(body["result"].as_array().map(Vec::len), Some(2));
                assert!(!result_names(&body["result"]).contains(&"Client 01".to_string()));

                let response = server
                    .get("/api/client/search")
                    .add_query_param("q", "Client 01")
                    .await;
                response.assert_status(StatusCode::ACCEPTED);
                let body: Value = response.json();
                assert_eq!(body["result"], json!([]));

                let response = server
                    .get("/api/client/filter")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "FR")
                    .await;
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Client 00", "Client 02"]);

                let response = server
                    .get("/api/client/summary")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "FR")
                    .await;
                let body: Value = response.json();
                assert_eq!(body["result"], json!({"countFilter": 2, "countAllDocs": 2}));
            }

            #[tokio::test]
            async fn test_delete_twice_succeeds() {
                let server = server().await;
                let ids = seed_clients(&server, 1).await;
                let path = format!("/api/client/delete/{}", ids[0]);

                server.delete(&path).await.assert_status_ok();
                server.delete(&path).await.assert_status_ok();
            }

            // ==================================================================
            // Lists
            // ==================================================================

            #[tokio::test]
            async fn test_list_default_page() {
                let server = server().await;
                seed_clients(&server, 12).await;

                let response = server.get("/api/client/list").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "Successfully found all documents");
                assert_eq!(body["result"].as_array().map(Vec::len), Some(10));
                assert_eq!(body["pagination"], json!({"page": 1, "pages": 2, "count": 12}));
            }

            #[tokio::test]
            async fn test_list_empty_collection_returns_203() {
                let server = server().await;
                let response = server.get("/api/quote/list").await;
                response.assert_status(StatusCode::NON_AUTHORITATIVE_INFORMATION);
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["result"], json!([]));
                assert_eq!(body["message"], "Collection is Empty");
                assert_eq!(body["pagination"]["count"], 0);
            }

            #[tokio::test]
            async fn test_list_page_window() {
                let server = server().await;
                seed_clients(&server, 30).await;

                let response = server
                    .get("/api/client/list")
                    .add_query_param("page", 2)
                    .add_query_param("items", 5)
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["result"].as_array().map(Vec::len), Some(5));
                assert_eq!(body["pagination"], json!({"page": 2, "pages": 6, "count": 30}));
            }

            #[tokio::test]
            async fn test_list_sorted_by_name() {
                let server = server().await;
                for name in ["Globex", "Acme", "Initech"] {
                    create(&server, "client", client_body(name, "US")).await;
                }

                let response = server
                    .get("/api/client/list")
                    .add_query_param("sortBy", "name")
                    .add_query_param("sortValue", 1)
                    .await;
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Acme", "Globex", "Initech"]);

                let response = server
                    .get("/api/client/list")
                    .add_query_param("sortBy", "name")
                    .add_query_param("sortValue", -1)
                    .await;
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Initech", "Globex", "Acme"]);
            }

            #[tokio::test]
            async fn test_list_filter_and_search() {
                let server = server().await;
                create(&server, "client", client_body("Acme France", "FR")).await;
                create(&server, "client", client_body("Acme USA", "US")).await;
                create(&server, "client", client_body("Globex", "FR")).await;

                let response = server
                    .get("/api/client/list")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "FR")
                    .await;
                let body: Value = response.json();
                assert_eq!(body["pagination"]["count"], 2);

                let response = server
                    .get("/api/client/list")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "FR")
                    .add_query_param("fields", "name")
                    .add_query_param("q", "acme")
                    .await;
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Acme France"]);
                assert_eq!(body["pagination"]["count"], 1);
            }

            #[tokio::test]
            async fn test_list_all() {
                let server = server().await;
                let response = server.get("/api/client/listAll").await;
                response.assert_status(StatusCode::NON_AUTHORITATIVE_INFORMATION);
                let body: Value = response.json();
                assert_eq!(body["success"], false);

                seed_clients(&server, 3).await;
                let response = server.get("/api/client/listAll").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["result"].as_array().map(Vec::len), Some(3));
                assert!(body.get("pagination").is_none());
            }

            #[tokio::test]
            async fn test_search_endpoint() {
                let server = server().await;
                create(&server, "client", client_body("Acme Corp", "US")).await;
                create(&server, "client", client_body("Globex", "US")).await;

                let response = server.get("/api/client/search").await;
                response.assert_status(StatusCode::ACCEPTED);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["message"], "No document found by this request");

                let response = server
                    .get("/api/client/search")
                    .add_query_param("q", "ACME")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Acme Corp"]);

                let response = server
                    .get("/api/client/search")
                    .add_query_param("q", "zzz")
                    .await;
                response.assert_status(StatusCode::ACCEPTED);
            }

            #[tokio::test]
            async fn test_filter_endpoint() {
                let server = server().await;
                create(&server, "client", client_body("Acme", "FR")).await;
                create(&server, "client", client_body("Globex", "US")).await;

                let response = server
                    .get("/api/client/filter")
                    .add_query_param("filter", "country")
                    .await;
                response.assert_status(StatusCode::FORBIDDEN);
                let body: Value = response.json();
                assert_eq!(body["message"], "filter not provided correctly");

                let response = server
                    .get("/api/client/filter")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "US")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Globex"]);
            }

            #[tokio::test]
            async fn test_summary() {
                let server = server().await;
                create(&server, "client", client_body("Acme", "FR")).await;
                create(&server, "client", client_body("Globex", "US")).await;
                create(&server, "client", client_body("Initech", "FR")).await;

                let response = server
                    .get("/api/client/summary")
                    .add_query_param("filter", "country")
                    .add_query_param("equal", "FR")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "Successfully count all documents");
                assert_eq!(body["result"], json!({"countFilter": 2, "countAllDocs": 3}));

                let response = server.get("/api/client/summary").await;
                let body: Value = response.json();
                assert_eq!(body["result"], json!({"countFilter": 3, "countAllDocs": 3}));
            }

            #[tokio::test]
            async fn test_operator_field_names_are_ignored() {
                let server = server().await;
                create(&server, "client", client_body("Acme", "FR")).await;
                create(&server, "client", client_body("Globex", "US")).await;

                let response = server
                    .get("/api/client/list")
                    .add_query_param("filter", "$where")
                    .add_query_param("equal", "1")
                    .add_query_param("sortBy", "$natural")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["pagination"]["count"], 2);

                let response = server
                    .get("/api/client/list")
                    .add_query_param("fields", "$or,name..first")
                    .add_query_param("q", "zzz")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["pagination"]["count"], 2);

                let response = server
                    .get("/api/client/search")
                    .add_query_param("fields", "$where")
                    .add_query_param("q", "acme")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(result_names(&body["result"]), vec!["Acme"]);

                let response = server
                    .get("/api/client/filter")
                    .add_query_param("filter", "$where")
                    .add_query_param("equal", "1")
                    .await;
                response.assert_status(StatusCode::FORBIDDEN);

                let response = server
                    .get("/api/client/summary")
                    .add_query_param("filter", "$where")
                    .add_query_param("equal", "1")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["result"], json!({"countFilter": 2, "countAllDocs": 2}));
            }

            // ==================================================================
            // Business rules
            // ==================================================================

            #[tokio::test]
            async fn test_invoice_totals_computed() {
                let server = server().await;
                let invoice = seed_invoice(&server).await;

                assert_eq!(number(&invoice, "subTotal"), 100.0);
                assert_eq!(number(&invoice, "taxTotal"), 20.0);
                assert_eq!(number(&invoice, "total"), 120.0);
                assert_eq!(number(&invoice["items"][0], "total"), 100.0);
                assert_eq!(invoice["paymentStatus"], "unpaid");
                assert_eq!(invoice["status"], "draft");
                assert_eq!(invoice["pdf"], format!("invoice-{}.pdf", id_of(&invoice)));

                let response = server
                    .patch(&format!("/api/invoice/update/{}", id_of(&invoice)))
                    .json(&json!({
                        "items": [{"itemName": "Consulting", "quantity": 3, "price": 50}],
                        "taxRate": 10,
                    }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(number(&body["result"], "subTotal"), 150.0);
                assert_eq!(number(&body["result"], "total"), 165.0);
            }

            #[tokio::test]
            async fn test_invoice_references_populated() {
                let server = server().await;
                let invoice = seed_invoice(&server).await;

                let response = server
                    .get(&format!("/api/invoice/read/{}", id_of(&invoice)))
                    .await;
                let body: Value = response.json();
                assert_eq!(body["result"]["client"]["name"], "Acme");

                let orphan = create(
                    &server,
                    "invoice",
                    invoice_body(
                        2,
                        &erp::core::document::DocumentId::new().to_string(),
                        json!([{"itemName": "Support", "quantity": 1, "price": 10}]),
                        0.0,
                    ),
                )
                .await;
                let response = server
                    .get(&format!("/api/invoice/read/{}", id_of(&orphan)))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert!(body["result"]["client"].is_null());
            }

            #[tokio::test]
            async fn test_payment_credit_flow() {
                let server = server().await;
                let invoice = seed_invoice(&server).await;
                let invoice_path = format!("/api/invoice/read/{}", id_of(&invoice));

                let first = create(&server, "payment", payment_body(1, &invoice, 50.0)).await;
                let body: Value = server.get(&invoice_path).await.json();
                assert_eq!(number(&body["result"], "credit"), 50.0);
                assert_eq!(body["result"]["paymentStatus"], "partially");
                assert_eq!(body["result"]["payment"], json!([id_of(&first)]));

                let response = server
                    .post("/api/payment/create")
                    .json(&payment_body(2, &invoice, 80.0))
                    .await;
                response.assert_status(StatusCode::ACCEPTED);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["message"], "The Max Amount you can add is 70");

                let response = server
                    .post("/api/payment/create")
                    .json(&payment_body(2, &invoice, 0.0))
                    .await;
                response.assert_status(StatusCode::ACCEPTED);
                let body: Value = response.json();
                assert_eq!(body["message"], "The Minimum Amount couldn't be 0");

                let second = create(&server, "payment", payment_body(2, &invoice, 70.0)).await;
                let body: Value = server.get(&invoice_path).await.json();
                assert_eq!(number(&body["result"], "credit"), 120.0);
                assert_eq!(body["result"]["paymentStatus"], "paid");

                server
                    .delete(&format!("/api/payment/delete/{}", id_of(&second)))
                    .await
                    .assert_status_ok();
                let body: Value = server.get(&invoice_path).await.json();
                assert_eq!(number(&body["result"], "credit"), 50.0);
                assert_eq!(body["result"]["paymentStatus"], "partially");
                assert_eq!(body["result"]["payment"], json!([id_of(&first)]));
            }

            #[tokio::test]
            async fn test_concurrent_payments_keep_credit_consistent() {
                let server = server().await;
                let invoice = seed_invoice(&server).await;

                let responses = futures::future::join_all((0..20).map(|n| {
                    server
                        .post("/api/payment/create")
                        .json(&payment_body(n, &invoice, 10.0))
                        .into_future()
                }))
                .await;
                let accepted = responses
                    .iter()
                    .filter(|r| r.status_code() == StatusCode::OK)
                    .count();

                let body: Value = server
                    .get(&format!("/api/invoice/read/{}", id_of(&invoice)))
                    .await
                    .json();
                let credit = number(&body["result"], "credit");
                assert!(accepted <= 12, "accepted {}", accepted);
                assert_eq!(credit, accepted as f64 * 10.0);
                assert_eq!(body["result"]["payment"].as_array().map(Vec::len), Some(accepted));
                let expected = if credit == 120.0 { "paid" } else { "partially" };
                assert_eq!(body["result"]["paymentStatus"], expected);
            }

            // ==================================================================
            // Routing
            // ==================================================================

            #[tokio::test]
            async fn test_unknown_route_returns_404() {
                let server = server().await;
                let response = server.get("/api/warehouse/list").await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "UNKNOWN_ENTITY");
            }
        }
    };
}
