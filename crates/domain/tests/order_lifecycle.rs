//! Integration tests for the order lifecycle against the event store.

use common::AggregateId;
use domain::{
    Actor, Aggregate, CancelOrder, CustomerId, DeliveryLocation, DomainError, Money, OrderError,
    OrderLine, OrderService, OrderStatus, PaymentMethod, PlaceOrder, TransitionOrder,
};
use event_store::{EventStore, InMemoryEventStore};

fn sample_lines() -> Vec<OrderLine> {
    vec![
        OrderLine::new("SKU-001", "Masala Tea", "beverages", 2, Money::from_rupees(500)),
        OrderLine::new("SKU-002", "Sel Roti", "snacks", 1, Money::from_rupees(1200)),
    ]
}

fn sample_location() -> DeliveryLocation {
    DeliveryLocation::new("Thamel, Kathmandu", 27.7154, 85.3123).with_area("kathmandu")
}

fn place_cmd(customer_id: CustomerId) -> PlaceOrder {
    PlaceOrder::new(
        customer_id,
        sample_lines(),
        sample_location(),
        PaymentMethod::Khalti,
        "AUTH-1000",
        Money::from_rupees(150),
    )
}

fn operator() -> Actor {
    Actor::operator("meena")
}

#[tokio::test]
async fn placed_order_replays_from_its_events() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store.clone());

    let customer_id = CustomerId::new();
    let cmd = place_cmd(customer_id);
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    // Fresh service over the same store: state comes purely from replay.
    let service2 = OrderService::new(store);
    let order = service2.get_order(order_id).await.unwrap().unwrap();

    assert_eq!(order.customer_id(), Some(customer_id));
    assert_eq!(order.subtotal(), Money::from_rupees(2200));
    assert_eq!(order.grand_total(), Money::from_rupees(2350));
    assert_eq!(order.status(), OrderStatus::Created);
}

#[tokio::test]
async fn event_stream_matches_history() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store.clone());

    let cmd = place_cmd(CustomerId::new());
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    let op = operator();
    for target in [
        OrderStatus::Confirmed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ] {
        service
            .transition_order(TransitionOrder::new(order_id, target, op.clone()))
            .await
            .unwrap();
    }

    let envelopes = store.events_for_aggregate(order_id).await.unwrap();
    let types: Vec<_> = envelopes.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "OrderPlaced",
            "OrderConfirmed",
            "OrderDispatched",
            "OrderDelivered",
            "OrderCompleted",
        ]
    );

    let order = service.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(order.history().len(), envelopes.len());
    for (entry, envelope) in order.history().iter().zip(&envelopes) {
        // History entries stay strictly version-ordered and time-ordered.
        assert!(entry.at <= chrono::Utc::now());
        assert_eq!(order.id(), Some(envelope.aggregate_id));
    }
}

#[tokio::test]
async fn rejected_transition_leaves_no_trace_in_the_store() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store.clone());

    let cmd = place_cmd(CustomerId::new());
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    let result = service
        .transition_order(TransitionOrder::new(
            order_id,
            OrderStatus::Delivered,
            operator(),
        ))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Order(OrderError::InvalidTransition { .. }))
    ));
    assert_eq!(store.events_for_aggregate(order_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn retried_transition_appends_nothing() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store.clone());

    let cmd = place_cmd(CustomerId::new());
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    let op = operator();
    service
        .transition_order(TransitionOrder::new(
            order_id,
            OrderStatus::Confirmed,
            op.clone(),
        ))
        .await
        .unwrap();
    service
        .transition_order(TransitionOrder::new(order_id, OrderStatus::Confirmed, op))
        .await
        .unwrap();

    assert_eq!(store.events_for_aggregate(order_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn customer_cancel_window_enforced_end_to_end() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store);

    let customer_id = CustomerId::new();
    let cmd = place_cmd(customer_id);
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    service
        .transition_order(TransitionOrder::new(
            order_id,
            OrderStatus::Confirmed,
            operator(),
        ))
        .await
        .unwrap();

    // Customer window closed at confirmation.
    let result = service
        .cancel_order(CancelOrder::new(
            order_id,
            Actor::Customer(customer_id),
            "changed mind",
        ))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Order(OrderError::NotPermitted { .. }))
    ));

    // The operator window is still open.
    let result = service
        .cancel_order(CancelOrder::new(order_id, operator(), "out of stock"))
        .await
        .unwrap();
    assert_eq!(result.aggregate.status(), OrderStatus::Cancelled);
}

#[tokio::test]
async fn captured_prices_survive_unrelated_catalog_changes() {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store);

    let cmd = place_cmd(CustomerId::new());
    let order_id = cmd.order_id;
    service.place_order(cmd).await.unwrap();

    // Whatever happens to the live catalog afterwards, the replayed order
    // reports the price captured at placement.
    let order = service.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(
        order.lines()[0].unit_price_at_order,
        Money::from_rupees(500)
    );
    assert_eq!(order.subtotal(), Money::from_rupees(2200));
}
