//! Order aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod state;
mod value_objects;

pub use aggregate::{Order, StatusEntry};
pub use commands::{CancelOrder, PlaceOrder, TransitionOrder};
pub use events::{OrderCancelledData, OrderEvent, OrderPlacedData, StatusChangeData};
pub use service::OrderService;
pub use state::OrderStatus;
pub use value_objects::{
    Actor, CustomerId, DeliveryLocation, Money, OrderLine, PaymentMethod, ProductId,
};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has already been placed.
    #[error("Order has already been placed")]
    AlreadyPlaced,

    /// Order does not exist yet.
    #[error("Order has not been placed")]
    NotPlaced,

    /// Placement requires at least one line.
    #[error("Order has no lines")]
    NoLines,

    /// A line carried an invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// A line carried a negative unit price.
    #[error("Invalid unit price: {price} (must not be negative)")]
    InvalidPrice { price: i64 },

    /// Requested status is not the direct successor of the current one.
    #[error("Invalid transition: {current} -> {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The actor is not allowed to request this transition.
    #[error("Actor '{actor}' is not permitted to request {requested}")]
    NotPermitted {
        actor: String,
        requested: OrderStatus,
    },
}
