//! Checkout error types.

use domain::DomainError;
use event_store::EventStoreError;
use thiserror::Error;

/// Errors that can occur on the cart-to-order path.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed checkout input: empty cart, missing location, and so on.
    /// Surfaced to the user with no state change.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A line's requested quantity exceeds availability. The whole
    /// placement is rejected and prior reservations are rolled back.
    #[error(
        "Insufficient stock for {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    /// A cart line references a product the catalog no longer knows.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// The payment gateway declined the authorization.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// The delivery-cost collaborator could not produce a quote. Recovered
    /// locally by the estimator's flat fallback, never surfaced from
    /// checkout itself.
    #[error("Delivery estimate unavailable: {0}")]
    EstimationUnavailable(String),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Event store error.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
