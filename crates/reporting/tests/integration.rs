//! Reporting integration: live order streams replayed into views and
//! aggregated into dashboard stats.

use domain::{
    Actor, CustomerId, DeliveryLocation, Money, OrderLine, OrderService, OrderStatus,
    PaymentMethod, PlaceOrder, TransitionOrder,
};
use event_store::InMemoryEventStore;
use reporting::{
    ExpenseCategory, ExpenseLedger, OrderBoardView, OrderLedgerView, Projection,
    ProjectionProcessor, compute_stats,
};

fn place_cmd(customer_id: CustomerId, payment_method: PaymentMethod) -> PlaceOrder {
    PlaceOrder::new(
        customer_id,
        vec![
            OrderLine::new("SKU-001", "Masala Tea", "beverages", 2, Money::from_rupees(500)),
            OrderLine::new("SKU-002", "Sel Roti", "snacks", 1, Money::from_rupees(1200)),
        ],
        DeliveryLocation::new("Thamel, Kathmandu", 27.7154, 85.3123),
        payment_method,
        "AUTH-2000",
        Money::from_rupees(150),
    )
}

struct Fixture {
    store: InMemoryEventStore,
    service: OrderService<InMemoryEventStore>,
    board: OrderBoardView,
    ledger: OrderLedgerView,
    processor: ProjectionProcessor<InMemoryEventStore>,
}

fn setup() -> Fixture {
    let store = InMemoryEventStore::new();
    let service = OrderService::new(store.clone());
    let board = OrderBoardView::new();
    let ledger = OrderLedgerView::new();

    let mut processor = ProjectionProcessor::new(store.clone());
    processor.register(Box::new(board.clone()) as Box<dyn Projection>);
    processor.register(Box::new(ledger.clone()) as Box<dyn Projection>);

    Fixture {
        store,
        service,
        board,
        ledger,
        processor,
    }
}

async fn run_lifecycle_to(
    fx: &Fixture,
    customer_id: CustomerId,
    payment_method: PaymentMethod,
    stop_at: OrderStatus,
) -> common::AggregateId {
    let cmd = place_cmd(customer_id, payment_method);
    let order_id = cmd.order_id;
    fx.service.place_order(cmd).await.unwrap();

    let operator = Actor::operator("meena");
    for target in [
        OrderStatus::Confirmed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ] {
        if stop_at == OrderStatus::Created {
            break;
        }
        fx.service
            .transition_order(TransitionOrder::new(order_id, target, operator.clone()))
            .await
            .unwrap();
        if target == stop_at {
            break;
        }
    }

    order_id
}

#[tokio::test]
async fn active_order_sits_on_board_and_in_ledger() {
    let fx = setup();
    let order_id =
        run_lifecycle_to(&fx, CustomerId::new(), PaymentMethod::Esewa, OrderStatus::Created).await;

    fx.processor.run_catch_up().await.unwrap();

    let entry = fx.board.get_order(order_id).await.unwrap();
    assert_eq!(entry.status, OrderStatus::Created);
    assert_eq!(entry.grand_total, Money::from_rupees(2350));

    let record = fx.ledger.get_order(order_id).await.unwrap();
    assert_eq!(record.status, OrderStatus::Created);
    assert_eq!(record.history.len(), 1);
}

#[tokio::test]
async fn completed_order_moves_revenue_by_its_grand_total() {
    let fx = setup();
    let expenses = ExpenseLedger::new();

    // Baseline: nothing completed, nothing recognized.
    fx.processor.run_catch_up().await.unwrap();
    let before = compute_stats(&fx.ledger.all_orders().await, &expenses.list().await);
    assert_eq!(before.total_revenue, Money::zero());

    // Subtotal 2200 + delivery 150, driven to Completed.
    run_lifecycle_to(
        &fx,
        CustomerId::new(),
        PaymentMethod::Khalti,
        OrderStatus::Completed,
    )
    .await;
    fx.processor.run_catch_up().await.unwrap();

    let after = compute_stats(&fx.ledger.all_orders().await, &expenses.list().await);
    assert_eq!(after.total_revenue, Money::from_rupees(2350));
    assert_eq!(after.delivery_revenue, Money::from_rupees(150));
    assert_eq!(after.completed_orders, 1);

    // Completed orders are off the operator board but in the ledger.
    assert_eq!(fx.board.all_orders().await.len(), 0);
    assert_eq!(fx.ledger.completed_orders().await.len(), 1);
}

#[tokio::test]
async fn cancelled_order_contributes_nothing() {
    let fx = setup();
    let customer_id = CustomerId::new();

    let cmd = place_cmd(customer_id, PaymentMethod::Card);
    let order_id = cmd.order_id;
    fx.service.place_order(cmd).await.unwrap();
    fx.service
        .transition_order(TransitionOrder::new(
            order_id,
            OrderStatus::Cancelled,
            Actor::Customer(customer_id),
        ))
        .await
        .unwrap();

    fx.processor.run_catch_up().await.unwrap();

    let stats = compute_stats(&fx.ledger.all_orders().await, &[]);
    assert_eq!(stats.total_revenue, Money::zero());
    assert_eq!(stats.cancelled_orders, 1);
    assert!(stats.payment_breakdown.is_empty());
}

#[tokio::test]
async fn stats_combine_orders_and_expense_ledger() {
    let fx = setup();
    let expenses = ExpenseLedger::new();

    run_lifecycle_to(
        &fx,
        CustomerId::new(),
        PaymentMethod::Esewa,
        OrderStatus::Completed,
    )
    .await;
    expenses
        .record("Diesel top-up", Money::from_rupees(350), ExpenseCategory::Fuel)
        .await
        .unwrap();
    expenses
        .record("Boxes", Money::from_rupees(150), ExpenseCategory::Packaging)
        .await
        .unwrap();

    fx.processor.run_catch_up().await.unwrap();
    let stats = compute_stats(&fx.ledger.all_orders().await, &expenses.list().await);

    assert_eq!(stats.total_revenue, Money::from_rupees(2350));
    assert_eq!(stats.total_expenses, Money::from_rupees(500));
    assert_eq!(stats.net_profit, Money::from_rupees(1850));
    assert_eq!(stats.category_breakdown.len(), 2);
    assert_eq!(stats.payment_breakdown[0].label, "esewa");
}

#[tokio::test]
async fn catch_up_is_incremental_across_new_events() {
    let fx = setup();

    run_lifecycle_to(&fx, CustomerId::new(), PaymentMethod::Esewa, OrderStatus::Created).await;
    fx.processor.run_catch_up().await.unwrap();
    assert_eq!(fx.ledger.all_orders().await.len(), 1);

    run_lifecycle_to(&fx, CustomerId::new(), PaymentMethod::Khalti, OrderStatus::Created).await;
    fx.processor.run_catch_up().await.unwrap();
    assert_eq!(fx.ledger.all_orders().await.len(), 2);

    // Positions advanced exactly once per stored event.
    let total_events = fx.store.event_count().await as u64;
    assert_eq!(
        fx.ledger.position().await.events_processed,
        total_events
    );
}

#[tokio::test]
async fn rebuild_reproduces_the_same_views() {
    let fx = setup();
    run_lifecycle_to(
        &fx,
        CustomerId::new(),
        PaymentMethod::Khalti,
        OrderStatus::Confirmed,
    )
    .await;

    fx.processor.run_catch_up().await.unwrap();
    let before: Vec<_> = fx
        .ledger
        .all_orders()
        .await
        .iter()
        .map(|o| (o.order_id, o.status))
        .collect();

    fx.processor.rebuild_all().await.unwrap();
    let after: Vec<_> = fx
        .ledger
        .all_orders()
        .await
        .iter()
        .map(|o| (o.order_id, o.status))
        .collect();

    assert_eq!(before, after);
}
