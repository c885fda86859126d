//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, RepositoryError, SaleError};
use serde_json::{Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, Value) {
    match &err {
        DomainError::Sale(sale_err) => {
            let code = sale_err.kind();
            match sale_err {
                SaleError::InvalidArgument { field, reason } => (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": reason, "code": code, "field": field }),
                ),
                SaleError::ItemNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    json!({ "error": sale_err.to_string(), "code": code }),
                ),
                _ => (
                    StatusCode::CONFLICT,
                    json!({ "error": sale_err.to_string(), "code": code }),
                ),
            }
        }
        DomainError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": errors.to_string(), "errors": errors.violations() }),
        ),
        DomainError::SaleNotFound { .. } | DomainError::Repository(RepositoryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
        }
        DomainError::Repository(
            RepositoryError::DuplicateSaleNumber(_)
            | RepositoryError::AlreadyExists(_)
            | RepositoryError::ConcurrencyConflict { .. },
        ) => (StatusCode::CONFLICT, json!({ "error": err.to_string() })),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
