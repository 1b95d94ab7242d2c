//! REST API exposure
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`:
//!
//! - `GET /health`, `GET /healthz`
//! - every entity's CRUD routes nested under the API prefix (`/api` by default)
//! - custom routes merged at the top level
//!
//! Unknown paths answer with the usual error envelope.

use super::super::host::ServerHost;
use crate::core::error::CrudError;
use anyhow::Result;
use axum::http::Uri;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing all framework state
    /// * `custom_routes` - Additional custom routes to merge
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let prefix = host.config.server.api_prefix.trim_end_matches('/').to_string();
        let entity_routes = host.entity_registry.build_routes();

        let mut app = Self::health_routes();
        app = if prefix.is_empty() {
            app.merge(entity_routes)
        } else {
            app.nest(&prefix, entity_routes)
        };

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        tracing::debug!(
            prefix = %prefix,
            entities = ?host.entity_types(),
            "REST routes built"
        );

        Ok(app.fallback(Self::fallback).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "erp-rs"
        }))
    }

    /// Answer unmatched paths with the error envelope
    async fn fallback(uri: Uri) -> CrudError {
        CrudError::UnknownEntity(uri.path().to_string())
    }
}
