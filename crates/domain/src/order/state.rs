//! Order status state machine.

use serde::{Deserialize, Serialize};

use super::Actor;

/// The status of an order in its lifecycle.
///
/// Transitions form a straight line with a single cancellation branch:
/// ```text
/// Created ──► Confirmed ──► OutForDelivery ──► Delivered ──► Completed
///    │            │
///    └────────────┴──► Cancelled
/// ```
/// There are no skips and no back-edges. Customers may only request
/// `Cancelled`, and only from `Created`; operators drive everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order was placed and is awaiting confirmation.
    #[default]
    Created,

    /// An operator accepted the order.
    Confirmed,

    /// The order left the fulfillment origin.
    OutForDelivery,

    /// The order reached the customer.
    Delivered,

    /// The order is finalized and revenue-recognizable (terminal).
    Completed,

    /// The order was cancelled (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns the single legal successor along the fulfillment line,
    /// or None for terminal states. Cancellation is not a successor;
    /// it is gated separately by [`OrderStatus::can_cancel`].
    pub fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Returns true if the given actor may cancel an order in this status.
    ///
    /// The customer window is narrower than the operator window: customers
    /// only until confirmation, operators until dispatch.
    pub fn can_cancel(&self, actor: &Actor) -> bool {
        match actor {
            Actor::Customer(_) => matches!(self, OrderStatus::Created),
            Actor::Operator(_) => {
                matches!(self, OrderStatus::Created | OrderStatus::Confirmed)
            }
        }
    }

    /// Returns true if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the status name as its wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
