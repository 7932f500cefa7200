//! Order commands.

use common::AggregateId;

use crate::command::Command;

use super::{Actor, CustomerId, DeliveryLocation, Money, Order, OrderLine, OrderStatus, PaymentMethod};

/// Command to place a new order from a validated checkout snapshot.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The order ID to create.
    pub order_id: AggregateId,

    /// The customer placing the order.
    pub customer_id: CustomerId,

    /// Lines with prices already captured from the catalog.
    pub lines: Vec<OrderLine>,

    /// Destination snapshot.
    pub location: DeliveryLocation,

    /// Payment rail selected at checkout.
    pub payment_method: PaymentMethod,

    /// Authorization reference from the payment gateway.
    pub payment_ref: String,

    /// Delivery charge locked in at checkout.
    pub delivery_charge: Money,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder command with a generated order ID.
    pub fn new(
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
        location: DeliveryLocation,
        payment_method: PaymentMethod,
        payment_ref: impl Into<String>,
        delivery_charge: Money,
    ) -> Self {
        Self {
            order_id: AggregateId::new(),
            customer_id,
            lines,
            location,
            payment_method,
            payment_ref: payment_ref.into(),
            delivery_charge,
        }
    }
}

impl Command for PlaceOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to move an order to the next lifecycle status.
#[derive(Debug, Clone)]
pub struct TransitionOrder {
    /// The order to transition.
    pub order_id: AggregateId,

    /// The requested target status.
    pub target: OrderStatus,

    /// Who is requesting the transition.
    pub actor: Actor,
}

impl TransitionOrder {
    /// Creates a new TransitionOrder command.
    pub fn new(order_id: AggregateId, target: OrderStatus, actor: Actor) -> Self {
        Self {
            order_id,
            target,
            actor,
        }
    }
}

impl Command for TransitionOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to cancel an order with an explicit reason.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    /// The order to cancel.
    pub order_id: AggregateId,

    /// Who is cancelling.
    pub actor: Actor,

    /// Reason for cancellation.
    pub reason: String,
}

impl CancelOrder {
    /// Creates a new CancelOrder command.
    pub fn new(order_id: AggregateId, actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            actor,
            reason: reason.into(),
        }
    }
}

impl Command for CancelOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}
