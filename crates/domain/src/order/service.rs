//! Order service providing a simplified API for order operations.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{CancelOrder, Order, PlaceOrder, TransitionOrder};

impl From<super::OrderError> for DomainError {
    fn from(e: super::OrderError) -> Self {
        DomainError::Order(e)
    }
}

/// Service for order lifecycle operations.
///
/// Wraps the command handler: every call loads the order by replay,
/// runs the aggregate command, and appends the resulting events with an
/// expected-version check, so racing requests on one order serialize.
pub struct OrderService<S: EventStore> {
    handler: CommandHandler<S, Order>,
}

impl<S: EventStore> OrderService<S> {
    /// Creates a new order service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Order> {
        &self.handler
    }

    /// Places a new order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<CommandResult<Order>, DomainError> {
        let result = self
            .handler
            .execute(cmd.order_id, |order| {
                order.place(
                    cmd.order_id,
                    cmd.customer_id,
                    cmd.lines.clone(),
                    cmd.location.clone(),
                    cmd.payment_method,
                    cmd.payment_ref.clone(),
                    cmd.delivery_charge,
                )
            })
            .await?;

        metrics::counter!("orders_placed_total").increment(1);
        Ok(result)
    }

    /// Transitions an order to a target status.
    #[tracing::instrument(
        skip(self, cmd),
        fields(order_id = %cmd.order_id, target = %cmd.target)
    )]
    pub async fn transition_order(
        &self,
        cmd: TransitionOrder,
    ) -> Result<CommandResult<Order>, DomainError> {
        let actor = cmd.actor.clone();
        self.handler
            .execute(cmd.order_id, |order| order.transition(cmd.target, actor))
            .await
    }

    /// Cancels an order with an explicit reason.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn cancel_order(
        &self,
        cmd: CancelOrder,
    ) -> Result<CommandResult<Order>, DomainError> {
        let actor = cmd.actor.clone();
        let reason = cmd.reason.clone();
        self.handler
            .execute(cmd.order_id, |order| order.cancel(actor, reason))
            .await
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: AggregateId) -> Result<Option<Order>, DomainError> {
        self.handler.load_existing(order_id).await
    }
}
