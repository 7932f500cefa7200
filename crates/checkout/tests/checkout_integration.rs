//! End-to-end checkout tests: cart in, placed order out, compensation on
//! failure.

use checkout::{
    Cart, CheckoutCoordinator, CheckoutError, CheckoutRequest, DeliveryEstimator, DeliveryPolicy,
    InMemoryCatalog, InMemoryDeliveryRates, InMemoryPaymentGateway, Product,
};
use domain::{
    Actor, Aggregate, CustomerId, DeliveryLocation, Money, OrderStatus, PaymentMethod, ProductId,
};
use event_store::InMemoryEventStore;
use notify::{Channel, NotificationDispatcher, NotificationInbox};

type Coordinator = CheckoutCoordinator<
    InMemoryEventStore,
    InMemoryCatalog,
    InMemoryPaymentGateway,
    InMemoryDeliveryRates,
>;

struct Fixture {
    coordinator: Coordinator,
    catalog: InMemoryCatalog,
    payments: InMemoryPaymentGateway,
    dispatcher: NotificationDispatcher,
}

fn setup(policy: DeliveryPolicy) -> Fixture {
    let store = InMemoryEventStore::new();
    let catalog = InMemoryCatalog::new();
    catalog.upsert(Product::new(
        "SKU-001",
        "Masala Tea",
        Money::from_rupees(500),
        "beverages",
        10,
    ));
    catalog.upsert(Product::new(
        "SKU-002",
        "Sel Roti",
        Money::from_rupees(1200),
        "snacks",
        5,
    ));

    let payments = InMemoryPaymentGateway::new();
    let rates = InMemoryDeliveryRates::new(Money::from_rupees(150));
    let estimator = DeliveryEstimator::new(
        rates,
        DeliveryLocation::new("Selfdrop Depot", 27.7000, 85.3333),
        policy,
    );
    let dispatcher = NotificationDispatcher::new();

    let coordinator = CheckoutCoordinator::new(
        store,
        catalog.clone(),
        payments.clone(),
        estimator,
        dispatcher.clone(),
    );

    Fixture {
        coordinator,
        catalog,
        payments,
        dispatcher,
    }
}

/// High threshold so the charge is never waived unless a test wants it.
fn paid_delivery_policy() -> DeliveryPolicy {
    DeliveryPolicy {
        free_threshold: Money::from_rupees(5000),
        fallback_charge: Money::from_rupees(100),
    }
}

fn filled_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_item(&Product::new(
        "SKU-001",
        "Masala Tea",
        Money::from_rupees(500),
        "beverages",
        10,
    ));
    cart.update_quantity(&ProductId::new("SKU-001"), 2);
    cart.add_item(&Product::new(
        "SKU-002",
        "Sel Roti",
        Money::from_rupees(1200),
        "snacks",
        5,
    ));
    cart.set_location(DeliveryLocation::new("Thamel, Kathmandu", 27.7154, 85.3123));
    cart
}

#[tokio::test]
async fn cart_to_completed_order() {
    let fx = setup(paid_delivery_policy());
    let customer_id = CustomerId::new();
    let cart = filled_cart();

    // Subtotal 2200 + charge 150 = 2350.
    let order = fx
        .coordinator
        .place_order(&cart, CheckoutRequest::new(customer_id, PaymentMethod::Khalti))
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::Created);
    assert_eq!(order.subtotal(), Money::from_rupees(2200));
    assert_eq!(order.delivery_charge(), Money::from_rupees(150));
    assert_eq!(order.grand_total(), Money::from_rupees(2350));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(8));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-002")), Some(4));
    assert_eq!(fx.payments.authorization_count(), 1);

    let order_id = order.id().unwrap();
    let operator = Actor::operator("meena");
    for target in [
        OrderStatus::Confirmed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ] {
        let order = fx
            .coordinator
            .transition(order_id, target, operator.clone())
            .await
            .unwrap();
        assert_eq!(order.status(), target);
    }

    let order = fx
        .coordinator
        .orders()
        .get_order(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status(), OrderStatus::Completed);
    assert_eq!(order.history().len(), 5);
}

#[tokio::test]
async fn subtotal_at_threshold_ships_free() {
    let fx = setup(DeliveryPolicy {
        free_threshold: Money::from_rupees(2000),
        fallback_charge: Money::from_rupees(100),
    });
    let cart = filled_cart();

    // 2200 >= 2000, so the charge is waived and grand total == subtotal.
    let order = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Esewa),
        )
        .await
        .unwrap();

    assert_eq!(order.delivery_charge(), Money::zero());
    assert_eq!(order.grand_total(), Money::from_rupees(2200));
}

#[tokio::test]
async fn empty_cart_is_rejected_without_state_change() {
    let fx = setup(paid_delivery_policy());
    let mut cart = Cart::new();
    cart.set_location(DeliveryLocation::new("Thamel", 27.7154, 85.3123));

    let result = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Card),
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::Validation(_))));
    assert_eq!(fx.payments.authorization_count(), 0);
}

#[tokio::test]
async fn missing_location_is_rejected() {
    let fx = setup(paid_delivery_policy());
    let mut cart = filled_cart();
    cart.clear();
    cart.add_item(&Product::new(
        "SKU-001",
        "Masala Tea",
        Money::from_rupees(500),
        "beverages",
        10,
    ));

    let result = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Card),
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::Validation(_))));
}

#[tokio::test]
async fn insufficient_stock_rolls_back_prior_reservations() {
    let fx = setup(paid_delivery_policy());
    let mut cart = filled_cart();
    // More Sel Roti than the catalog has.
    cart.update_quantity(&ProductId::new("SKU-002"), 6);

    let result = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Esewa),
        )
        .await;

    assert!(matches!(
        result,
        Err(CheckoutError::InsufficientStock { .. })
    ));
    // Every reservation made before the failing line was released.
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(10));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-002")), Some(5));
    assert_eq!(fx.payments.authorization_count(), 0);
    // The cart is untouched so the shopper can adjust quantities.
    assert_eq!(cart.item_count(), 8);
}

#[tokio::test]
async fn payment_decline_releases_every_reservation() {
    let fx = setup(paid_delivery_policy());
    fx.payments.set_fail_on_authorize(true);
    let cart = filled_cart();

    let result = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Card),
        )
        .await;

    assert!(matches!(result, Err(CheckoutError::PaymentDeclined(_))));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(10));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-002")), Some(5));
}

#[tokio::test]
async fn retried_checkout_returns_the_original_order() {
    let fx = setup(paid_delivery_policy());
    let cart = filled_cart();
    let request = CheckoutRequest::new(CustomerId::new(), PaymentMethod::Khalti);

    let first = fx.coordinator.place_order(&cart, request.clone()).await.unwrap();
    // Lost-ack retry: same request id resubmitted.
    let second = fx.coordinator.place_order(&cart, request).await.unwrap();

    assert_eq!(first.id(), second.id());
    // Stock moved once, one authorization, one order.
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(8));
    assert_eq!(fx.payments.authorization_count(), 1);
}

#[tokio::test]
async fn cancellation_releases_stock() {
    let fx = setup(paid_delivery_policy());
    let customer_id = CustomerId::new();
    let cart = filled_cart();

    let order = fx
        .coordinator
        .place_order(&cart, CheckoutRequest::new(customer_id, PaymentMethod::Esewa))
        .await
        .unwrap();
    let order_id = order.id().unwrap();
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(8));

    let order = fx
        .coordinator
        .cancel(order_id, Actor::Customer(customer_id), "changed mind")
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::Cancelled);
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-001")), Some(10));
    assert_eq!(fx.catalog.stock(&ProductId::new("SKU-002")), Some(5));
}

#[tokio::test]
async fn lifecycle_notifications_reach_customer_and_operators() {
    let fx = setup(paid_delivery_policy());
    let customer_id = CustomerId::new();
    let cart = filled_cart();

    let mut operator_rx = fx.dispatcher.subscribe(Channel::Operators);

    let order = fx
        .coordinator
        .place_order(&cart, CheckoutRequest::new(customer_id, PaymentMethod::Khalti))
        .await
        .unwrap();
    let order_id = order.id().unwrap();

    let mut customer_rx = fx.dispatcher.subscribe(Channel::Order(order_id));

    fx.coordinator
        .transition(order_id, OrderStatus::Confirmed, Actor::operator("meena"))
        .await
        .unwrap();

    let placed = operator_rx.recv().await.unwrap();
    assert_eq!(placed.order_id, Some(order_id));
    let confirmed = operator_rx.recv().await.unwrap();
    assert_eq!(confirmed.kind, notify::NotificationKind::OrderConfirmed);

    let customer_seen = customer_rx.recv().await.unwrap();
    assert_eq!(customer_seen.kind, notify::NotificationKind::OrderConfirmed);
}

#[tokio::test]
async fn retried_transition_publishes_no_duplicate() {
    let fx = setup(paid_delivery_policy());
    let cart = filled_cart();

    let order = fx
        .coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Esewa),
        )
        .await
        .unwrap();
    let order_id = order.id().unwrap();

    let mut inbox = NotificationInbox::new();
    let mut rx = fx.dispatcher.subscribe(Channel::Order(order_id));

    let operator = Actor::operator("meena");
    fx.coordinator
        .transition(order_id, OrderStatus::Confirmed, operator.clone())
        .await
        .unwrap();
    fx.coordinator
        .transition(order_id, OrderStatus::Confirmed, operator)
        .await
        .unwrap();

    // Exactly one confirmation notification was published.
    let n = rx.recv().await.unwrap();
    assert!(inbox.apply(n));
    assert!(rx.try_recv().is_err());
    assert_eq!(inbox.unread_count(), 1);
}

#[tokio::test]
async fn estimation_failure_degrades_to_flat_charge() {
    let store = InMemoryEventStore::new();
    let catalog = InMemoryCatalog::new();
    catalog.upsert(Product::new(
        "SKU-001",
        "Masala Tea",
        Money::from_rupees(500),
        "beverages",
        10,
    ));

    let rates = InMemoryDeliveryRates::new(Money::from_rupees(150));
    rates.set_fail_on_quote(true);
    let estimator = DeliveryEstimator::new(
        rates,
        DeliveryLocation::new("Selfdrop Depot", 27.7000, 85.3333),
        DeliveryPolicy {
            free_threshold: Money::from_rupees(5000),
            fallback_charge: Money::from_rupees(100),
        },
    );
    let coordinator: Coordinator = CheckoutCoordinator::new(
        store,
        catalog.clone(),
        InMemoryPaymentGateway::new(),
        estimator,
        NotificationDispatcher::new(),
    );

    let mut cart = Cart::new();
    cart.add_item(&Product::new(
        "SKU-001",
        "Masala Tea",
        Money::from_rupees(500),
        "beverages",
        10,
    ));
    cart.set_location(DeliveryLocation::new("Thamel", 27.7154, 85.3123));

    // Checkout still succeeds with the flat fallback charge.
    let order = coordinator
        .place_order(
            &cart,
            CheckoutRequest::new(CustomerId::new(), PaymentMethod::Card),
        )
        .await
        .unwrap();

    assert_eq!(order.delivery_charge(), Money::from_rupees(100));
    assert_eq!(order.grand_total(), Money::from_rupees(600));
}
