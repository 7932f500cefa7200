//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::{DomainError, OrderError};
use event_store::EventStoreError;
use reporting::ReportingError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The session is not allowed to perform the action.
    Forbidden(String),
    /// Checkout path error.
    Checkout(CheckoutError),
    /// Domain logic error.
    Domain(DomainError),
    /// Reporting error.
    Reporting(ReportingError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Reporting(err) => reporting_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        CheckoutError::UnknownProduct(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::PaymentDeclined(_) => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
        CheckoutError::Domain(domain_err) => (domain_error_status(domain_err), err.to_string()),
        CheckoutError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    (domain_error_status(&err), err.to_string())
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Order(order_err) => match order_err {
            OrderError::InvalidTransition { .. } | OrderError::AlreadyPlaced => {
                StatusCode::CONFLICT
            }
            OrderError::NotPermitted { .. } => StatusCode::FORBIDDEN,
            OrderError::NotPlaced => StatusCode::NOT_FOUND,
            OrderError::NoLines
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidPrice { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::AggregateNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reporting_error_to_response(err: ReportingError) -> (StatusCode, String) {
    match &err {
        ReportingError::InvalidExpense(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        ApiError::Reporting(err)
    }
}
