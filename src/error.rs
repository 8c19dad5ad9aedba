//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every variant renders as the standard response envelope (`{message, data, status_code}`)
//! through `actix_web::error::ResponseError`, so handlers can simply return
//! `Result<HttpResponse, AppError>` and use the `?` operator.
//!
//! Internal errors carry an optional `detail` with the underlying error text. It is only
//! filled in when the service runs in debug mode, in which case it replaces the generic
//! message sent to the client.

use actix_web::{
    error::{JsonPayloadError, PathError, ResponseError},
    http::StatusCode,
    web, HttpRequest, HttpResponse,
};
use serde_json::{json, Map, Value};
use std::fmt;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication is missing or failed (HTTP 401).
    Unauthorized(String),
    /// The requested resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// The request is well-formed but cannot be processed, e.g. a duplicate username
    /// or a body that fails to deserialize (HTTP 422).
    Unprocessable(String),
    /// Field-level validation failures (HTTP 422). The field errors are returned
    /// in the envelope's `data`.
    Validation(ValidationErrors),
    /// An unexpected server-side failure (HTTP 500).
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl AppError {
    /// Builds an internal error, keeping the underlying error text only in debug mode.
    pub fn internal(message: impl Into<String>, err: impl fmt::Display, debug: bool) -> Self {
        AppError::Internal {
            message: message.into(),
            detail: debug.then(|| err.to_string()),
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) | AppError::NotFound(msg) | AppError::Unprocessable(msg) => {
                msg.clone()
            }
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::Internal { message, detail } => {
                detail.clone().unwrap_or_else(|| message.clone())
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Unprocessable(msg) => write!(f, "Unprocessable Entity: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation Error: {}", errors),
            AppError::Internal { message, detail: Some(detail) } => {
                write!(f, "Internal Server Error: {} ({})", message, detail)
            }
            AppError::Internal { message, detail: None } => {
                write!(f, "Internal Server Error: {}", message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) | AppError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the envelope. Client errors are logged here at warn; server
    /// errors were already logged where they happened.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.client_message();
        let data = match self {
            AppError::Validation(errors) => Some(field_errors(errors)),
            _ => None,
        };

        if status.is_client_error() {
            match &data {
                Some(fields) => log::warn!(
                    status_code = status.as_u16(),
                    message = message.as_str(),
                    fields:% = fields;
                    "Request rejected"
                ),
                None => log::warn!(
                    status_code = status.as_u16(),
                    message = message.as_str();
                    "Request rejected"
                ),
            }
        }

        ApiResponse::new(status, message, data).into_response()
    }
}

/// Flattens validator output into `{field: [message, ...]}`.
///
/// A rule without a custom message is reported by its code (e.g. `"length"`).
pub fn field_errors(errors: &ValidationErrors) -> Value {
    let mut fields = Map::new();
    for (field, errs) in errors.field_errors() {
        let messages: Vec<Value> = errs
            .iter()
            .map(|e| {
                let text = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                Value::String(text)
            })
            .collect();
        fields.insert(field.to_string(), Value::Array(messages));
    }
    json!(fields)
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::Validation(errors)
    }
}

/// JSON extractor configuration: undecodable bodies become a 422 envelope.
pub fn json_config(debug: bool) -> web::JsonConfig {
    web::JsonConfig::default().error_handler(move |err: JsonPayloadError, req: &HttpRequest| {
        log::debug!(path = req.path(), error:% = err; "Invalid request body");
        let message = if debug {
            err.to_string()
        } else {
            "Invalid request body".to_string()
        };
        AppError::Unprocessable(message).into()
    })
}

/// Path extractor configuration: unparsable ids become a 422 envelope.
pub fn path_config(debug: bool) -> web::PathConfig {
    web::PathConfig::default().error_handler(move |err: PathError, req: &HttpRequest| {
        log::debug!(path = req.path(), error:% = err; "Invalid path parameter");
        let message = if debug {
            err.to_string()
        } else {
            "Invalid todo ID".to_string()
        };
        AppError::Unprocessable(message).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture;
    use actix_web::body::to_bytes;
    use log::Level;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "title is required"))]
        title: String,
        #[validate(length(max = 3))]
        tag: String,
    }

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            AppError::Unauthorized("Invalid token".into()).error_response().status(),
            401
        );
        assert_eq!(
            AppError::NotFound("Todo not found".into()).error_response().status(),
            404
        );
        assert_eq!(
            AppError::Unprocessable("Username already exists".into())
                .error_response()
                .status(),
            422
        );
        assert_eq!(
            AppError::internal("Failed", "boom", false).error_response().status(),
            500
        );
    }

    #[actix_rt::test]
    async fn test_internal_error_hides_detail_outside_debug() {
        let body = body_json(AppError::internal("Failed to create todo", "disk full", false).error_response()).await;
        assert_eq!(body["message"], "Failed to create todo");
        assert_eq!(body["status_code"], 500);
        assert!(body["data"].is_null());

        let body = body_json(AppError::internal("Failed to create todo", "disk full", true).error_response()).await;
        assert_eq!(body["message"], "disk full");
    }

    #[actix_rt::test]
    async fn test_validation_error_lists_fields() {
        let sample = Sample {
            title: String::new(),
            tag: "toolong".into(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        let body = body_json(err.error_response()).await;

        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["status_code"], 422);
        assert_eq!(body["data"]["title"], json!(["title is required"]));
        assert_eq!(body["data"]["tag"], json!(["length"]));
    }

    #[actix_rt::test]
    async fn test_client_errors_are_logged_at_warn() {
        capture::install();

        let _ = AppError::Unprocessable("Username already exists (logged)".into()).error_response();
        let records = capture::with_field("message", "Username already exists (logged)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].field("status_code"), Some("422"));

        let err: AppError = Sample {
            title: String::new(),
            tag: "logged-tag".into(),
        }
        .validate()
        .unwrap_err()
        .into();
        let _ = err.error_response();
        let records: Vec<_> = capture::with_field("message", "Validation failed")
            .into_iter()
            .filter(|r| r.field("fields").map_or(false, |f| f.contains("title is required")))
            .collect();
        assert!(!records.is_empty());
        assert_eq!(records[0].level, Level::Warn);
    }

    #[test]
    fn test_server_errors_are_not_logged_again() {
        capture::install();
        let _ = AppError::internal("Failed to list (not relogged)", "boom", false).error_response();
        assert!(capture::with_field("message", "Failed to list (not relogged)").is_empty());
    }
}
