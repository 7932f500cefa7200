//! Order ledger read model — every order, terminal ones included.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{
    Actor, CustomerId, DeliveryLocation, Money, OrderEvent, OrderLine, OrderStatus, PaymentMethod,
    StatusEntry,
};
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// The persisted order shape: one row per order, kept current with its
/// status and history. This is what customer order lists and the
/// financial aggregator read.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub location: DeliveryLocation,
    pub payment_method: PaymentMethod,
    pub subtotal: Money,
    pub delivery_charge: Money,
    pub grand_total: Money,
    pub placed_at: DateTime<Utc>,
    pub history: Vec<StatusEntry>,
}

/// Read model over every order the system has seen.
#[derive(Clone)]
pub struct OrderLedgerView {
    state: Arc<RwLock<LedgerState>>,
}

struct LedgerState {
    orders: HashMap<AggregateId, OrderRecord>,
    position: ProjectionPosition,
}

impl OrderLedgerView {
    /// Creates a new empty ledger view.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState {
                orders: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Gets one order record.
    pub async fn get_order(&self, order_id: AggregateId) -> Option<OrderRecord> {
        self.state.read().await.orders.get(&order_id).cloned()
    }

    /// Gets every order record.
    pub async fn all_orders(&self) -> Vec<OrderRecord> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.placed_at);
        orders
    }

    /// Gets orders for one customer, oldest first.
    pub async fn orders_for_customer(&self, customer_id: CustomerId) -> Vec<OrderRecord> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.placed_at);
        orders
    }

    /// Gets orders currently in a given status.
    pub async fn orders_by_status(&self, status: OrderStatus) -> Vec<OrderRecord> {
        self.state
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }

    /// Gets all completed orders — the revenue-recognizable set.
    pub async fn completed_orders(&self) -> Vec<OrderRecord> {
        self.orders_by_status(OrderStatus::Completed).await
    }
}

impl Default for OrderLedgerView {
    fn default() -> Self {
        Self::new()
    }
}

fn status_entry(status: OrderStatus, at: DateTime<Utc>, actor: Actor) -> StatusEntry {
    StatusEntry { status, at, actor }
}

#[async_trait]
impl Projection for OrderLedgerView {
    fn name(&self) -> &'static str {
        "OrderLedgerView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;

        if event.aggregate_type != "Order" {
            state.position = state.position.advance();
            return Ok(());
        }

        let order_event: OrderEvent = serde_json::from_value(event.payload.clone())?;
        let order_id = event.aggregate_id;

        match order_event {
            OrderEvent::OrderPlaced(data) => {
                state.orders.insert(
                    order_id,
                    OrderRecord {
                        order_id,
                        customer_id: data.customer_id,
                        status: OrderStatus::Created,
                        lines: data.lines,
                        location: data.location,
                        payment_method: data.payment_method,
                        subtotal: data.subtotal,
                        delivery_charge: data.delivery_charge,
                        grand_total: data.grand_total,
                        placed_at: data.placed_at,
                        history: vec![status_entry(
                            OrderStatus::Created,
                            data.placed_at,
                            Actor::Customer(data.customer_id),
                        )],
                    },
                );
            }
            OrderEvent::OrderConfirmed(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Confirmed;
                    order
                        .history
                        .push(status_entry(OrderStatus::Confirmed, data.at, data.actor));
                }
            }
            OrderEvent::OrderDispatched(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::OutForDelivery;
                    order.history.push(status_entry(
                        OrderStatus::OutForDelivery,
                        data.at,
                        data.actor,
                    ));
                }
            }
            OrderEvent::OrderDelivered(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Delivered;
                    order
                        .history
                        .push(status_entry(OrderStatus::Delivered, data.at, data.actor));
                }
            }
            OrderEvent::OrderCompleted(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Completed;
                    order
                        .history
                        .push(status_entry(OrderStatus::Completed, data.at, data.actor));
                }
            }
            OrderEvent::OrderCancelled(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Cancelled;
                    order
                        .history
                        .push(status_entry(OrderStatus::Cancelled, data.at, data.actor));
                }
            }
        }

        state.position = state.position.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for OrderLedgerView {
    fn name(&self) -> &'static str {
        "OrderLedgerView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.orders.len()).unwrap_or(0)
    }
}
