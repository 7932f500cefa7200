//! Domain layer for the selfdrop order lifecycle.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for event-sourced entities
//! - Command trait and CommandHandler for command processing
//! - The Order aggregate: an immutable snapshot captured at placement,
//!   plus the status state machine that governs everything afterwards

pub mod aggregate;
pub mod command;
pub mod error;
pub mod order;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use order::{
    Actor, CancelOrder, CustomerId, DeliveryLocation, Money, Order, OrderError, OrderEvent,
    OrderLine, OrderService, OrderStatus, PaymentMethod, PlaceOrder, ProductId, StatusEntry,
    TransitionOrder,
};
