//! Order domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{Actor, CustomerId, DeliveryLocation, Money, OrderLine, PaymentMethod};

/// Events that can occur on an order aggregate.
///
/// `OrderPlaced` carries the full immutable snapshot; everything after it
/// is a pure status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed with its complete line/location/payment snapshot.
    OrderPlaced(OrderPlacedData),

    /// An operator confirmed the order.
    OrderConfirmed(StatusChangeData),

    /// The order left the fulfillment origin.
    OrderDispatched(StatusChangeData),

    /// The order reached the customer.
    OrderDelivered(StatusChangeData),

    /// The order was finalized.
    OrderCompleted(StatusChangeData),

    /// The order was cancelled.
    OrderCancelled(OrderCancelledData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::OrderConfirmed(_) => "OrderConfirmed",
            OrderEvent::OrderDispatched(_) => "OrderDispatched",
            OrderEvent::OrderDelivered(_) => "OrderDelivered",
            OrderEvent::OrderCompleted(_) => "OrderCompleted",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
        }
    }
}

/// Data for the OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    /// The unique order ID.
    pub order_id: AggregateId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// Lines with the unit price captured at placement time.
    pub lines: Vec<OrderLine>,

    /// Destination snapshot.
    pub location: DeliveryLocation,

    /// Payment rail selected at checkout.
    pub payment_method: PaymentMethod,

    /// Opaque authorization reference from the payment gateway.
    pub payment_ref: String,

    /// Sum of line totals at placement.
    pub subtotal: Money,

    /// Delivery charge locked in at placement.
    pub delivery_charge: Money,

    /// subtotal + delivery_charge, derived once here.
    pub grand_total: Money,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Data shared by the plain status transition events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeData {
    /// When the transition happened.
    pub at: DateTime<Utc>,

    /// Who triggered it.
    pub actor: Actor,
}

/// Data for the OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    /// When the order was cancelled.
    pub at: DateTime<Utc>,

    /// Who cancelled it.
    pub actor: Actor,

    /// Reason for cancellation.
    pub reason: String,
}

// Convenience constructors
impl OrderEvent {
    /// Creates an OrderPlaced event.
    ///
    /// `grand_total` is derived here from the subtotal and delivery
    /// charge; it is never supplied by callers.
    #[allow(clippy::too_many_arguments)]
    pub fn order_placed(
        order_id: AggregateId,
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
        location: DeliveryLocation,
        payment_method: PaymentMethod,
        payment_ref: impl Into<String>,
        delivery_charge: Money,
    ) -> Self {
        let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();
        OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            customer_id,
            lines,
            location,
            payment_method,
            payment_ref: payment_ref.into(),
            subtotal,
            delivery_charge,
            grand_total: subtotal + delivery_charge,
            placed_at: Utc::now(),
        })
    }

    /// Creates an OrderConfirmed event.
    pub fn order_confirmed(actor: Actor) -> Self {
        OrderEvent::OrderConfirmed(StatusChangeData {
            at: Utc::now(),
            actor,
        })
    }

    /// Creates an OrderDispatched event.
    pub fn order_dispatched(actor: Actor) -> Self {
        OrderEvent::OrderDispatched(StatusChangeData {
            at: Utc::now(),
            actor,
        })
    }

    /// Creates an OrderDelivered event.
    pub fn order_delivered(actor: Actor) -> Self {
        OrderEvent::OrderDelivered(StatusChangeData {
            at: Utc::now(),
            actor,
        })
    }

    /// Creates an OrderCompleted event.
    pub fn order_completed(actor: Actor) -> Self {
        OrderEvent::OrderCompleted(StatusChangeData {
            at: Utc::now(),
            actor,
        })
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled(actor: Actor, reason: impl Into<String>) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            at: Utc::now(),
            actor,
            reason: reason.into(),
        })
    }
}
