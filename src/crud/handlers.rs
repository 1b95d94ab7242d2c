//! HTTP handlers for the CRUD routes
//!
//! Every registered model gets the same set of routes under its entity name:
//!
//! ```text
//! POST   /{entity}/create
//! GET    /{entity}/read/{id}
//! PATCH  /{entity}/update/{id}
//! DELETE /{entity}/delete/{id}
//! GET    /{entity}/search
//! GET    /{entity}/list
//! GET    /{entity}/listAll
//! GET    /{entity}/filter
//! GET    /{entity}/summary
//! ```

use crate::core::error::CrudError;
use crate::core::query::RawQuery;
use crate::core::response::ApiResponse;
use crate::crud::controller::CrudController;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

type Controller = State<Arc<CrudController>>;

/// Turn a body rejection into the usual validation envelope
fn body_of(
    controller: &CrudController,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Value, CrudError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| CrudError::field(&controller.schema().entity, "body", e.body_text()))
}

pub async fn create(
    State(controller): Controller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, CrudError> {
    let body = body_of(&controller, payload)?;
    controller.create(body).await
}

pub async fn read(
    State(controller): Controller,
    Path(id): Path<String>,
) -> Result<ApiResponse, CrudError> {
    controller.read(&id).await
}

pub async fn update(
    State(controller): Controller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, CrudError> {
    let body = body_of(&controller, payload)?;
    controller.update(&id, body).await
}

pub async fn remove(
    State(controller): Controller,
    Path(id): Path<String>,
) -> Result<ApiResponse, CrudError> {
    controller.remove(&id).await
}

pub async fn search(
    State(controller): Controller,
    Query(raw): Query<RawQuery>,
) -> Result<ApiResponse, CrudError> {
    controller.search(&raw).await
}

pub async fn list(
    State(controller): Controller,
    Query(raw): Query<RawQuery>,
) -> Result<ApiResponse, CrudError> {
    controller.paginated_list(&raw).await
}

pub async fn list_all(
    State(controller): Controller,
    Query(raw): Query<RawQuery>,
) -> Result<ApiResponse, CrudError> {
    controller.list_all(&raw).await
}

pub async fn filter(
    State(controller): Controller,
    Query(raw): Query<RawQuery>,
) -> Result<ApiResponse, CrudError> {
    controller.filter(&raw).await
}

pub async fn summary(
    State(controller): Controller,
    Query(raw): Query<RawQuery>,
) -> Result<ApiResponse, CrudError> {
    controller.summary(&raw).await
}

/// Build the routes of one model
pub fn routes(controller: CrudController) -> Router {
    let entity = controller.schema().entity.clone();
    Router::new()
        .route(&format!("/{}/create", entity), post(create))
        .route(&format!("/{}/read/{{id}}", entity), get(read))
        .route(&format!("/{}/update/{{id}}", entity), patch(update))
        .route(&format!("/{}/delete/{{id}}", entity), delete(remove))
        .route(&format!("/{}/search", entity), get(search))
        .route(&format!("/{}/list", entity), get(list))
        .route(&format!("/{}/listAll", entity), get(list_all))
        .route(&format!("/{}/filter", entity), get(filter))
        .route(&format!("/{}/summary", entity), get(summary))
        .with_state(Arc::new(controller))
}
