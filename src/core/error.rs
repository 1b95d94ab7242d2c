//! Typed error handling for the CRUD layer
//!
//! Every controller operation returns `Result<ApiResponse, CrudError>`. The
//! error side renders the same envelope as successful responses so that
//! clients only ever deal with one shape:
//!
//! ```json
//! { "success": false, "result": null, "message": "No document found " }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.read("not-a-uuid").await {
//!     Err(CrudError::InvalidId { raw, .. }) => println!("bad id {raw}"),
//!     Err(CrudError::NotFound { .. }) => println!("gone"),
//!     Err(e) => eprintln!("other error: {e}"),
//!     Ok(response) => println!("{:?}", response.body),
//! }
//! ```

use crate::core::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

/// Message returned when a document does not exist or is soft-deleted
pub const NOT_FOUND_MESSAGE: &str = "No document found ";

/// Message returned when a payload fails schema validation
pub const VALIDATION_MESSAGE: &str = "Required fields are not supplied";

/// One failed field check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The error type of every controller operation
#[derive(Debug)]
pub enum CrudError {
    /// No live document matches the identifier
    NotFound { entity: String, id: String },

    /// The identifier could not be parsed
    InvalidId { raw: String, reason: String },

    /// The payload does not satisfy the model schema
    Validation {
        entity: String,
        errors: Vec<FieldError>,
    },

    /// `filter` / `equal` missing on the filter endpoint
    FilterNotProvided,

    /// A business rule refused the operation (answered with 202)
    Rejected(String),

    /// No model is registered under this name
    UnknownEntity(String),

    /// Persistence failure
    Store(StoreError),
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrudError::NotFound { .. } => write!(f, "{}", NOT_FOUND_MESSAGE),
            CrudError::InvalidId { raw, reason } => {
                write!(f, "Invalid document id '{}': {}", raw, reason)
            }
            CrudError::Validation { .. } => write!(f, "{}", VALIDATION_MESSAGE),
            CrudError::FilterNotProvided => write!(f, "filter not provided correctly"),
            CrudError::Rejected(message) => write!(f, "{}", message),
            CrudError::UnknownEntity(entity) => write!(f, "Unknown entity: {}", entity),
            CrudError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrudError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CrudError {
    fn from(err: StoreError) -> Self {
        CrudError::Store(err)
    }
}

impl CrudError {
    /// Shorthand for a single-field validation failure
    pub fn field(entity: &str, field: &str, message: impl Into<String>) -> Self {
        CrudError::Validation {
            entity: entity.to_string(),
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::NotFound { .. } => StatusCode::NOT_FOUND,
            CrudError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            CrudError::Validation { .. } => StatusCode::BAD_REQUEST,
            CrudError::FilterNotProvided => StatusCode::FORBIDDEN,
            CrudError::Rejected(_) => StatusCode::ACCEPTED,
            CrudError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            CrudError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::NotFound { .. } => "DOCUMENT_NOT_FOUND",
            CrudError::InvalidId { .. } => "INVALID_ID",
            CrudError::Validation { .. } => "VALIDATION_ERROR",
            CrudError::FilterNotProvided => "FILTER_NOT_PROVIDED",
            CrudError::Rejected(_) => "REJECTED",
            CrudError::UnknownEntity(_) => "UNKNOWN_ENTITY",
            CrudError::Store(_) => "STORE_ERROR",
        }
    }

    /// Additional details for the error
    fn details(&self) -> Option<Value> {
        match self {
            CrudError::InvalidId { raw, reason } => Some(json!({
                "id": raw,
                "reason": reason,
            })),
            CrudError::Validation { entity, errors } => Some(json!({
                "entity": entity,
                "fields": errors,
            })),
            _ => None,
        }
    }

    /// Render the error envelope
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "success": false,
            "result": Value::Null,
            "message": self.to_string(),
            "code": self.error_code(),
        });
        if let Some(details) = self.details() {
            body["error"] = details;
        }
        body
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request refused");
        }
        (status, Json(self.to_body())).into_response()
    }
}
