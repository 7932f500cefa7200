//! Operator order board — active (non-terminal) orders only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{CustomerId, Money, OrderEvent, OrderStatus};
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// One row on the operator board.
#[derive(Debug, Clone)]
pub struct OrderBoardEntry {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub line_count: usize,
    pub total_units: u32,
    pub grand_total: Money,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model for the operator fulfillment queue.
///
/// Orders drop off the board when they reach a terminal state; the full
/// record lives on in the order ledger.
#[derive(Clone)]
pub struct OrderBoardView {
    state: Arc<RwLock<BoardState>>,
}

struct BoardState {
    orders: HashMap<AggregateId, OrderBoardEntry>,
    position: ProjectionPosition,
}

impl OrderBoardView {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(BoardState {
                orders: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Gets one board entry.
    pub async fn get_order(&self, order_id: AggregateId) -> Option<OrderBoardEntry> {
        self.state.read().await.orders.get(&order_id).cloned()
    }

    /// Gets every active order, oldest placement first.
    pub async fn all_orders(&self) -> Vec<OrderBoardEntry> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.placed_at);
        orders
    }

    /// Gets active orders filtered by status.
    pub async fn orders_by_status(&self, status: OrderStatus) -> Vec<OrderBoardEntry> {
        self.state
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }
}

impl Default for OrderBoardView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for OrderBoardView {
    fn name(&self) -> &'static str {
        "OrderBoardView"
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
                    OrderBoardEntry {
                        order_id,
                        customer_id: data.customer_id,
                        status: OrderStatus::Created,
                        line_count: data.lines.len(),
                        total_units: data.lines.iter().map(|l| l.quantity).sum(),
                        grand_total: data.grand_total,
                        placed_at: data.placed_at,
                        updated_at: data.placed_at,
                    },
                );
            }
            OrderEvent::OrderConfirmed(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Confirmed;
                    order.updated_at = data.at;
                }
            }
            OrderEvent::OrderDispatched(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::OutForDelivery;
                    order.updated_at = data.at;
                }
            }
            OrderEvent::OrderDelivered(data) => {
                if let Some(order) = state.orders.get_mut(&order_id) {
                    order.status = OrderStatus::Delivered;
                    order.updated_at = data.at;
                }
            }
            OrderEvent::OrderCompleted(_) | OrderEvent::OrderCancelled(_) => {
                state.orders.remove(&order_id);
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

impl ReadModel for OrderBoardView {
    fn name(&self) -> &'static str {
        "OrderBoardView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.orders.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Actor, DeliveryLocation, DomainEvent, OrderLine, PaymentMethod};
    use event_store::Version;

    fn make_envelope(aggregate_id: AggregateId, version: i64, event: &OrderEvent) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Order")
            .event_type(event.event_type())
            .version(Version::new(version))
            .payload(event)
            .unwrap()
            .build()
    }

    fn placed(order_id: AggregateId) -> OrderEvent {
        OrderEvent::order_placed(
            order_id,
            CustomerId::new(),
            vec![
                OrderLine::new("SKU-001", "Masala Tea", "beverages", 2, Money::from_rupees(500)),
                OrderLine::new("SKU-002", "Sel Roti", "snacks", 1, Money::from_rupees(1200)),
            ],
            DeliveryLocation::new("Thamel", 27.7154, 85.3123),
            PaymentMethod::Khalti,
            "AUTH-0001",
            Money::from_rupees(150),
        )
    }

    #[tokio::test]
    async fn placed_order_lands_on_the_board() {
        let view = OrderBoardView::new();
        let order_id = AggregateId::new();

        view.handle(&make_envelope(order_id, 1, &placed(order_id)))
            .await
            .unwrap();

        let entry = view.get_order(order_id).await.unwrap();
        assert_eq!(entry.status, OrderStatus::Created);
        assert_eq!(entry.line_count, 2);
        assert_eq!(entry.total_units, 3);
        assert_eq!(entry.grand_total, Money::from_rupees(2350));
    }

    #[tokio::test]
    async fn status_updates_keep_the_entry_current() {
        let view = OrderBoardView::new();
        let order_id = AggregateId::new();
        let operator = Actor::operator("meena");

        view.handle(&make_envelope(order_id, 1, &placed(order_id)))
            .await
            .unwrap();
        view.handle(&make_envelope(
            order_id,
            2,
            &OrderEvent::order_confirmed(operator),
        ))
        .await
        .unwrap();

        let entry = view.get_order(order_id).await.unwrap();
        assert_eq!(entry.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn terminal_orders_leave_the_board() {
        let view = OrderBoardView::new();
        let operator = Actor::operator("meena");

        let completed_id = AggregateId::new();
        view.handle(&make_envelope(completed_id, 1, &placed(completed_id)))
            .await
            .unwrap();
        view.handle(&make_envelope(
            completed_id,
            2,
            &OrderEvent::order_completed(operator.clone()),
        ))
        .await
        .unwrap();

        let cancelled_id = AggregateId::new();
        view.handle(&make_envelope(cancelled_id, 1, &placed(cancelled_id)))
            .await
            .unwrap();
        view.handle(&make_envelope(
            cancelled_id,
            2,
            &OrderEvent::order_cancelled(operator, "out of stock"),
        ))
        .await
        .unwrap();

        assert!(view.get_order(completed_id).await.is_none());
        assert!(view.get_order(cancelled_id).await.is_none());
        assert_eq!(view.all_orders().await.len(), 0);
    }

    #[tokio::test]
    async fn filter_by_status() {
        let view = OrderBoardView::new();
        let order1 = AggregateId::new();
        let order2 = AggregateId::new();

        view.handle(&make_envelope(order1, 1, &placed(order1)))
            .await
            .unwrap();
        view.handle(&make_envelope(order2, 1, &placed(order2)))
            .await
            .unwrap();
        view.handle(&make_envelope(
            order2,
            2,
            &OrderEvent::order_confirmed(Actor::operator("meena")),
        ))
        .await
        .unwrap();

        let created = view.orders_by_status(OrderStatus::Created).await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].order_id, order1);

        let confirmed = view.orders_by_status(OrderStatus::Confirmed).await;
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].order_id, order2);
    }

    #[tokio::test]
    async fn reset_empties_the_board() {
        let view = OrderBoardView::new();
        let order_id = AggregateId::new();

        view.handle(&make_envelope(order_id, 1, &placed(order_id)))
            .await
            .unwrap();
        assert_eq!(view.all_orders().await.len(), 1);

        view.reset().await.unwrap();
        assert_eq!(view.all_orders().await.len(), 0);
        assert_eq!(view.position().await.events_processed, 0);
    }
}
