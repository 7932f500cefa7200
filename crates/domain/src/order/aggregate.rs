//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    Actor, CustomerId, DeliveryLocation, Money, OrderError, OrderEvent, OrderLine, OrderStatus,
    PaymentMethod,
    events::{OrderCancelledData, OrderPlacedData, StatusChangeData},
};

/// One entry of the order's audit history, appended on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The status the order entered.
    pub status: OrderStatus,

    /// When it entered the status.
    pub at: DateTime<Utc>,

    /// Who triggered the transition.
    pub actor: Actor,
}

/// Order aggregate root.
///
/// Created whole at placement — lines, captured prices, location, and
/// payment method never change afterwards. Every subsequent command is a
/// status transition along the lifecycle graph, recorded in `history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// Customer who placed the order.
    customer_id: Option<CustomerId>,

    /// Current lifecycle status.
    status: OrderStatus,

    /// Immutable line snapshot with prices captured at placement.
    lines: Vec<OrderLine>,

    /// Destination snapshot.
    location: Option<DeliveryLocation>,

    /// Payment rail selected at checkout.
    payment_method: Option<PaymentMethod>,

    /// Authorization reference from the payment gateway.
    payment_ref: Option<String>,

    /// Sum of line totals at placement.
    subtotal: Money,

    /// Delivery charge locked in at placement.
    delivery_charge: Money,

    /// subtotal + delivery_charge, derived at placement only.
    grand_total: Money,

    /// When the order was placed.
    placed_at: Option<DateTime<Utc>>,

    /// Time-ordered status history, one entry per transition.
    history: Vec<StatusEntry>,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::OrderPlaced(data) => self.apply_placed(data),
            OrderEvent::OrderConfirmed(data) => {
                self.apply_status_change(OrderStatus::Confirmed, data);
            }
            OrderEvent::OrderDispatched(data) => {
                self.apply_status_change(OrderStatus::OutForDelivery, data);
            }
            OrderEvent::OrderDelivered(data) => {
                self.apply_status_change(OrderStatus::Delivered, data);
            }
            OrderEvent::OrderCompleted(data) => {
                self.apply_status_change(OrderStatus::Completed, data);
            }
            OrderEvent::OrderCancelled(data) => self.apply_cancelled(data),
        }
    }
}

// Query methods
impl Order {
    /// Returns the customer ID.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Returns the subtotal captured at placement.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Returns the delivery charge captured at placement.
    pub fn delivery_charge(&self) -> Money {
        self.delivery_charge
    }

    /// Returns the grand total (subtotal + delivery charge).
    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    /// Returns the destination snapshot.
    pub fn location(&self) -> Option<&DeliveryLocation> {
        self.location.as_ref()
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Returns the payment authorization reference.
    pub fn payment_ref(&self) -> Option<&str> {
        self.payment_ref.as_deref()
    }

    /// Returns when the order was placed.
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    /// Returns the status history, oldest first.
    pub fn history(&self) -> &[StatusEntry] {
        &self.history
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Order {
    /// Places a new order from a validated checkout snapshot.
    ///
    /// The grand total is derived inside the event constructor; callers
    /// never pass it in.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &self,
        order_id: AggregateId,
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
        location: DeliveryLocation,
        payment_method: PaymentMethod,
        payment_ref: impl Into<String>,
        delivery_charge: Money,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }

        if lines.is_empty() {
            return Err(OrderError::NoLines);
        }

        for line in &lines {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: line.quantity,
                });
            }
            if line.unit_price_at_order.is_negative() {
                return Err(OrderError::InvalidPrice {
                    price: line.unit_price_at_order.minor(),
                });
            }
        }

        if delivery_charge.is_negative() {
            return Err(OrderError::InvalidPrice {
                price: delivery_charge.minor(),
            });
        }

        Ok(vec![OrderEvent::order_placed(
            order_id,
            customer_id,
            lines,
            location,
            payment_method,
            payment_ref,
            delivery_charge,
        )])
    }

    /// Requests a transition to `target` on behalf of `actor`.
    ///
    /// Requesting the current status again is a successful no-op — the
    /// retried-request path — and produces no event and no history entry.
    /// A `Cancelled` target is routed through [`Order::cancel`]; every
    /// other target must be the direct successor of the current status
    /// and may only be requested by an operator.
    pub fn transition(
        &self,
        target: OrderStatus,
        actor: Actor,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }

        if self.status == target {
            return Ok(vec![]);
        }

        if target == OrderStatus::Cancelled {
            let reason = match &actor {
                Actor::Customer(_) => "cancelled by customer",
                Actor::Operator(_) => "cancelled by operator",
            };
            return self.cancel(actor, reason);
        }

        if !actor.is_operator() {
            return Err(OrderError::NotPermitted {
                actor: actor.to_string(),
                requested: target,
            });
        }

        if self.status.successor() != Some(target) {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                requested: target,
            });
        }

        let event = match target {
            OrderStatus::Confirmed => OrderEvent::order_confirmed(actor),
            OrderStatus::OutForDelivery => OrderEvent::order_dispatched(actor),
            OrderStatus::Delivered => OrderEvent::order_delivered(actor),
            OrderStatus::Completed => OrderEvent::order_completed(actor),
            // Created is never a successor and Cancelled was handled above
            OrderStatus::Created | OrderStatus::Cancelled => {
                return Err(OrderError::InvalidTransition {
                    current: self.status,
                    requested: target,
                });
            }
        };

        Ok(vec![event])
    }

    /// Cancels the order with an explicit reason.
    ///
    /// Customers may only cancel their own order and only while it is
    /// `Created`; operators may cancel until dispatch. Cancelling an
    /// already-cancelled order is an idempotent no-op.
    pub fn cancel(
        &self,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }

        if self.status == OrderStatus::Cancelled {
            return Ok(vec![]);
        }

        if let Actor::Customer(customer_id) = &actor
            && self.customer_id != Some(*customer_id)
        {
            return Err(OrderError::NotPermitted {
                actor: actor.to_string(),
                requested: OrderStatus::Cancelled,
            });
        }

        if !self.status.can_cancel(&actor) {
            // Inside the operator window the actor lacks permission;
            // outside it the transition itself is illegal.
            let within_operator_window =
                matches!(self.status, OrderStatus::Created | OrderStatus::Confirmed);
            return Err(if within_operator_window {
                OrderError::NotPermitted {
                    actor: actor.to_string(),
                    requested: OrderStatus::Cancelled,
                }
            } else {
                OrderError::InvalidTransition {
                    current: self.status,
                    requested: OrderStatus::Cancelled,
                }
            });
        }

        Ok(vec![OrderEvent::order_cancelled(actor, reason)])
    }
}

// Apply event helpers
impl Order {
    fn apply_placed(&mut self, data: OrderPlacedData) {
        self.id = Some(data.order_id);
        self.customer_id = Some(data.customer_id);
        self.status = OrderStatus::Created;
        self.lines = data.lines;
        self.location = Some(data.location);
        self.payment_method = Some(data.payment_method);
        self.payment_ref = Some(data.payment_ref);
        self.subtotal = data.subtotal;
        self.delivery_charge = data.delivery_charge;
        self.grand_total = data.grand_total;
        self.placed_at = Some(data.placed_at);
        self.history.push(StatusEntry {
            status: OrderStatus::Created,
            at: data.placed_at,
            actor: Actor::Customer(data.customer_id),
        });
    }

    fn apply_status_change(&mut self, status: OrderStatus, data: StatusChangeData) {
        self.status = status;
        self.history.push(StatusEntry {
            status,
            at: data.at,
            actor: data.actor,
        });
    }

    fn apply_cancelled(&mut self, data: OrderCancelledData) {
        self.status = OrderStatus::Cancelled;
        self.history.push(StatusEntry {
            status: OrderStatus::Cancelled,
            at: data.at,
            actor: data.actor,
        });
    }
}
