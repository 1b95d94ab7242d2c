//! Response envelope shared by every CRUD endpoint

use crate::core::query::Pagination;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Body of a CRUD response
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub result: Value,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// A CRUD response: HTTP status plus envelope
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Envelope,
}

impl ApiResponse {
    pub fn new(status: StatusCode, success: bool, result: Value, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope {
                success,
                result,
                message: message.into(),
                pagination: None,
            },
        }
    }

    /// 200 with `success: true`
    pub fn ok(result: Value, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, true, result, message)
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.body.pagination = Some(pagination);
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
