//! Notification dispatcher with per-channel broadcast fan-out.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::AggregateId;
use tokio::sync::broadcast;

use crate::notification::Notification;

/// Broadcast channel capacity per channel.
///
/// A receiver lagging behind this many notifications starts losing the
/// oldest ones; the at-least-once contract is then restored by the client
/// re-fetching state, not by the dispatcher.
const CHANNEL_CAPACITY: usize = 64;

/// A fan-out channel a session can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Scoped to one order: the owning customer's session.
    Order(AggregateId),

    /// The shared operator console channel.
    Operators,
}

/// Fans lifecycle notifications out to subscribed sessions.
///
/// Every publish targets the order-scoped channel (when the notification
/// references an order) and the operator channel. The dispatcher makes no
/// exactly-once promise: a session holding both subscriptions receives the
/// same notification id twice, and receivers are required to apply
/// idempotently (see [`crate::NotificationInbox`]).
///
/// Unsubscribing is dropping the receiver.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    channels: Arc<RwLock<HashMap<Channel, broadcast::Sender<Notification>>>>,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a channel, creating it if needed.
    pub fn subscribe(&self, channel: Channel) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Returns the number of live subscribers on a channel.
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.channels
            .read()
            .unwrap()
            .get(&channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Publishes a notification to every interested channel.
    ///
    /// Returns the number of receivers the notification reached. A publish
    /// with no live subscribers is not an error: delivery failure never
    /// propagates back into the order path.
    pub fn publish(&self, notification: Notification) -> usize {
        let mut delivered = 0;

        if let Some(order_id) = notification.order_id {
            delivered += self.send_to(Channel::Order(order_id), notification.clone());
        }
        delivered += self.send_to(Channel::Operators, notification.clone());

        metrics::counter!("notifications_published_total").increment(1);
        if delivered == 0 {
            tracing::debug!(
                notification_id = %notification.id,
                kind = ?notification.kind,
                "published notification reached no live subscribers"
            );
        }

        delivered
    }

    fn send_to(&self, channel: Channel, notification: Notification) -> usize {
        let channels = self.channels.read().unwrap();
        match channels.get(&channel) {
            Some(tx) => tx.send(notification).unwrap_or(0),
            None => 0,
        }
    }
}
