//! Checkout coordinator: turns a cart into an order, with compensation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::{AggregateId, RequestId};
use domain::{
    Actor, CancelOrder, CustomerId, Money, Order, OrderLine, OrderService, OrderStatus,
    PaymentMethod, PlaceOrder, ProductId, TransitionOrder,
};
use event_store::EventStore;
use notify::{Notification, NotificationDispatcher};

use crate::cart::Cart;
use crate::error::CheckoutError;
use crate::estimator::DeliveryEstimator;
use crate::services::{Catalog, DeliveryRates, PaymentGateway};

/// The checkout request a client submits alongside its cart.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Client-generated idempotency key: a lost-ack retry carries the same
    /// key and gets the original order back instead of a duplicate.
    pub request_id: RequestId,

    /// The customer checking out.
    pub customer_id: CustomerId,

    /// Payment rail chosen at checkout.
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    /// Creates a request with a fresh idempotency key.
    pub fn new(customer_id: CustomerId, payment_method: PaymentMethod) -> Self {
        Self {
            request_id: RequestId::new(),
            customer_id,
            payment_method,
        }
    }
}

/// Orchestrates the cart-to-order conversion and subsequent transitions.
///
/// Placement runs validation → price capture → stock reservation →
/// payment authorization → order persistence → notification fan-out.
/// Any failure of a money- or inventory-affecting step unwinds the
/// external effects already made (reservations released in reverse order,
/// authorization voided) and leaves no partial order behind; the cart is
/// untouched so the shopper can adjust and retry. Notification failures
/// are logged and never roll anything back.
pub struct CheckoutCoordinator<S, C, P, R>
where
    S: EventStore,
    C: Catalog,
    P: PaymentGateway,
    R: DeliveryRates,
{
    orders: OrderService<S>,
    catalog: C,
    payments: P,
    estimator: DeliveryEstimator<R>,
    dispatcher: NotificationDispatcher,
    processed: Arc<RwLock<HashMap<RequestId, AggregateId>>>,
}

impl<S, C, P, R> CheckoutCoordinator<S, C, P, R>
where
    S: EventStore,
    C: Catalog,
    P: PaymentGateway,
    R: DeliveryRates,
{
    /// Creates a new coordinator over the given collaborators.
    pub fn new(
        store: S,
        catalog: C,
        payments: P,
        estimator: DeliveryEstimator<R>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            orders: OrderService::new(store),
            catalog,
            payments,
            estimator,
            dispatcher,
            processed: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the order service.
    pub fn orders(&self) -> &OrderService<S> {
        &self.orders
    }

    /// Returns the notification dispatcher.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Returns the delivery estimator.
    pub fn estimator(&self) -> &DeliveryEstimator<R> {
        &self.estimator
    }

    /// Converts a cart into a placed order.
    ///
    /// On success the caller clears the cart; on failure the cart is left
    /// intact and nothing has been persisted.
    #[tracing::instrument(skip(self, cart, request), fields(request_id = %request.request_id))]
    pub async fn place_order(
        &self,
        cart: &Cart,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        metrics::counter!("checkouts_total").increment(1);
        let started = std::time::Instant::now();

        // Retried request: hand back the order the first attempt created.
        let existing = self
            .processed
            .read()
            .unwrap()
            .get(&request.request_id)
            .copied();
        if let Some(order_id) = existing {
            tracing::info!(%order_id, "duplicate checkout request, returning original order");
            let order = self
                .orders
                .get_order(order_id)
                .await?
                .ok_or(CheckoutError::EventStore(
                    event_store::EventStoreError::AggregateNotFound(order_id),
                ))?;
            return Ok(order);
        }

        // Validation: no state change on failure.
        if cart.is_empty() {
            return Err(CheckoutError::Validation("cart is empty".to_string()));
        }
        let location = cart
            .location()
            .cloned()
            .ok_or_else(|| CheckoutError::Validation("delivery location is required".to_string()))?;

        // Capture live prices into the immutable line snapshot.
        let mut lines = Vec::new();
        for cart_line in cart.lines() {
            let product = self
                .catalog
                .get_product(&cart_line.product_id)
                .await?
                .ok_or_else(|| CheckoutError::UnknownProduct(cart_line.product_id.to_string()))?;
            lines.push(OrderLine::new(
                product.id,
                product.name,
                product.category,
                cart_line.quantity,
                product.unit_price,
            ));
        }
        let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();

        // Estimation never blocks checkout; it degrades to the flat rate.
        let delivery_charge = self.estimator.estimate(&location, subtotal).await;

        // Reserve stock line by line; the first failure unwinds the rest.
        let mut reserved: Vec<(ProductId, u32)> = Vec::new();
        for line in &lines {
            match self
                .catalog
                .reserve_stock(&line.product_id, line.quantity)
                .await
            {
                Ok(()) => reserved.push((line.product_id.clone(), line.quantity)),
                Err(err) => {
                    tracing::warn!(
                        product_id = %line.product_id,
                        error = %err,
                        "stock reservation failed, rolling back"
                    );
                    self.release_reserved(&reserved).await;
                    metrics::counter!("checkouts_failed_total").increment(1);
                    return Err(err);
                }
            }
        }

        // Authorize the grand total; a decline releases every reservation.
        let order_id = AggregateId::new();
        let auth = match self
            .payments
            .authorize(order_id, request.payment_method, subtotal + delivery_charge)
            .await
        {
            Ok(auth) => auth,
            Err(err) => {
                tracing::warn!(error = %err, "payment authorization failed, rolling back");
                self.release_reserved(&reserved).await;
                metrics::counter!("checkouts_failed_total").increment(1);
                return Err(err);
            }
        };

        // Persist the order. Nothing before this point was persisted, so a
        // failure here still leaves no partial order.
        let cmd = PlaceOrder {
            order_id,
            customer_id: request.customer_id,
            lines,
            location,
            payment_method: request.payment_method,
            payment_ref: auth.auth_ref.clone(),
            delivery_charge,
        };
        let result = match self.orders.place_order(cmd).await {
            Ok(result) => result,
            Err(err) => {
                self.release_reserved(&reserved).await;
                if let Err(void_err) = self.payments.void(&auth.auth_ref).await {
                    tracing::warn!(error = %void_err, "failed to void authorization");
                }
                metrics::counter!("checkouts_failed_total").increment(1);
                return Err(err.into());
            }
        };

        self.processed
            .write()
            .unwrap()
            .insert(request.request_id, order_id);

        self.dispatcher
            .publish(Notification::for_order_status(order_id, OrderStatus::Created));

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            %order_id,
            subtotal = %result.aggregate.subtotal(),
            grand_total = %result.aggregate.grand_total(),
            "order placed"
        );

        Ok(result.aggregate)
    }

    /// Requests a status transition and performs its side effects.
    ///
    /// A transition to `Cancelled` releases the reserved stock back to the
    /// catalog. The idempotent same-status retry produces no side effects
    /// and no duplicate notification.
    #[tracing::instrument(skip(self, actor))]
    pub async fn transition(
        &self,
        order_id: AggregateId,
        target: OrderStatus,
        actor: Actor,
    ) -> Result<Order, CheckoutError> {
        let result = self
            .orders
            .transition_order(TransitionOrder::new(order_id, target, actor))
            .await?;

        self.after_transition(order_id, &result.aggregate, result.events.is_empty())
            .await;
        Ok(result.aggregate)
    }

    /// Cancels an order with an explicit reason and releases its stock.
    #[tracing::instrument(skip(self, actor, reason))]
    pub async fn cancel(
        &self,
        order_id: AggregateId,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<Order, CheckoutError> {
        let result = self
            .orders
            .cancel_order(CancelOrder::new(order_id, actor, reason))
            .await?;

        self.after_transition(order_id, &result.aggregate, result.events.is_empty())
            .await;
        Ok(result.aggregate)
    }

    async fn after_transition(&self, order_id: AggregateId, order: &Order, was_noop: bool) {
        if was_noop {
            return;
        }

        if order.status() == OrderStatus::Cancelled {
            for line in order.lines() {
                if let Err(err) = self
                    .catalog
                    .release_stock(&line.product_id, line.quantity)
                    .await
                {
                    tracing::warn!(
                        product_id = %line.product_id,
                        error = %err,
                        "failed to release stock on cancellation"
                    );
                }
            }
            metrics::counter!("orders_cancelled_total").increment(1);
        }

        self.dispatcher
            .publish(Notification::for_order_status(order_id, order.status()));
    }

    async fn release_reserved(&self, reserved: &[(ProductId, u32)]) {
        for (product_id, quantity) in reserved.iter().rev() {
            if let Err(err) = self.catalog.release_stock(product_id, *quantity).await {
                tracing::warn!(
                    %product_id,
                    error = %err,
                    "failed to release reserved stock during rollback"
                );
            }
        }
    }
}
