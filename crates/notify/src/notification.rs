//! Notification wire type.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::OrderStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a notification.
///
/// Redelivery of the same id must be a no-op for any receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderCreated,
    OrderConfirmed,
    OrderOutForDelivery,
    OrderDelivered,
    OrderCompleted,
    OrderCancelled,
    /// Anything that is not a status transition.
    Generic,
}

impl NotificationKind {
    /// Maps an order status to the kind announcing it.
    pub fn for_status(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Created => NotificationKind::OrderCreated,
            OrderStatus::Confirmed => NotificationKind::OrderConfirmed,
            OrderStatus::OutForDelivery => NotificationKind::OrderOutForDelivery,
            OrderStatus::Delivered => NotificationKind::OrderDelivered,
            OrderStatus::Completed => NotificationKind::OrderCompleted,
            OrderStatus::Cancelled => NotificationKind::OrderCancelled,
        }
    }
}

/// A single notification, shaped for the wire.
///
/// Field names are camelCase to match what the storefront client applies
/// on socket receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identity; the receiver's dedup key.
    pub id: NotificationId,

    /// What happened.
    pub kind: NotificationKind,

    /// The order this notification is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<AggregateId>,

    /// Short headline.
    pub title: String,

    /// Human-readable detail.
    pub message: String,

    /// When the notification was created.
    pub timestamp: DateTime<Utc>,

    /// Whether the recipient has read it. Mutable only by the recipient.
    pub read: bool,
}

impl Notification {
    /// Creates a notification announcing an order status change.
    pub fn for_order_status(order_id: AggregateId, status: OrderStatus) -> Self {
        let id_str = order_id.to_string();
        let short_id = &id_str[..8];
        let (title, message) = match status {
            OrderStatus::Created => (
                "Order placed".to_string(),
                format!("Order {short_id} has been placed and is awaiting confirmation"),
            ),
            OrderStatus::Confirmed => (
                "Order confirmed".to_string(),
                format!("Order {short_id} has been confirmed"),
            ),
            OrderStatus::OutForDelivery => (
                "Out for delivery".to_string(),
                format!("Order {short_id} is on its way"),
            ),
            OrderStatus::Delivered => (
                "Order delivered".to_string(),
                format!("Order {short_id} has been delivered"),
            ),
            OrderStatus::Completed => (
                "Order completed".to_string(),
                format!("Order {short_id} is complete"),
            ),
            OrderStatus::Cancelled => (
                "Order cancelled".to_string(),
                format!("Order {short_id} has been cancelled"),
            ),
        };

        Self {
            id: NotificationId::new(),
            kind: NotificationKind::for_status(status),
            order_id: Some(order_id),
            title,
            message,
            timestamp: Utc::now(),
            read: false,
        }
    }

    /// Creates a generic notification not tied to a status transition.
    pub fn generic(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            kind: NotificationKind::Generic,
            order_id: None,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
        }
    }
}
