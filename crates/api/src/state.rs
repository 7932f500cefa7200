//! Shared application state and default wiring.

use std::sync::Arc;

use checkout::{
    CheckoutCoordinator, DeliveryEstimator, DeliveryPolicy, InMemoryCatalog, InMemoryDeliveryRates,
    InMemoryPaymentGateway,
};
use domain::DeliveryLocation;
use event_store::EventStore;
use notify::{Channel, NotificationDispatcher, NotificationInbox};
use reporting::{
    ExpenseLedger, OrderBoardView, OrderLedgerView, Projection, ProjectionProcessor,
};
use tokio::sync::RwLock;

/// Coordinator wired to the in-memory collaborator implementations.
pub type Coordinator<S> = CheckoutCoordinator<
    S,
    InMemoryCatalog,
    InMemoryPaymentGateway,
    InMemoryDeliveryRates,
>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub coordinator: Coordinator<S>,
    pub catalog: InMemoryCatalog,
    pub dispatcher: NotificationDispatcher,
    pub board: OrderBoardView,
    pub ledger: OrderLedgerView,
    pub expenses: ExpenseLedger,
    pub operator_inbox: Arc<RwLock<NotificationInbox>>,
    pub event_store: S,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

/// Creates the default application state: in-memory collaborators, read
/// models registered on a projection processor, and a background task
/// applying operator-channel notifications into the operator inbox.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    policy: DeliveryPolicy,
) -> Arc<AppState<S>> {
    let catalog = InMemoryCatalog::new();
    let payments = InMemoryPaymentGateway::new();
    let rates = InMemoryDeliveryRates::default();
    let origin = DeliveryLocation::new("Selfdrop Depot, Kathmandu", 27.7000, 85.3333);
    let estimator = DeliveryEstimator::new(rates, origin, policy);
    let dispatcher = NotificationDispatcher::new();

    let coordinator = CheckoutCoordinator::new(
        event_store.clone(),
        catalog.clone(),
        payments,
        estimator,
        dispatcher.clone(),
    );

    let board = OrderBoardView::new();
    let ledger = OrderLedgerView::new();
    let mut processor = ProjectionProcessor::new(event_store.clone());
    processor.register(Box::new(board.clone()) as Box<dyn Projection>);
    processor.register(Box::new(ledger.clone()) as Box<dyn Projection>);

    let operator_inbox = Arc::new(RwLock::new(NotificationInbox::new()));
    spawn_inbox_feeder(&dispatcher, operator_inbox.clone());

    Arc::new(AppState {
        coordinator,
        catalog,
        dispatcher,
        board,
        ledger,
        expenses: ExpenseLedger::new(),
        operator_inbox,
        event_store,
        projection_processor: Arc::new(processor),
    })
}

/// Feeds operator-channel notifications into the shared operator inbox.
///
/// The inbox's idempotent apply absorbs the dispatcher's at-least-once
/// redeliveries; a lagged receiver just keeps going and the client
/// re-fetches whatever the channel dropped.
fn spawn_inbox_feeder(
    dispatcher: &NotificationDispatcher,
    inbox: Arc<RwLock<NotificationInbox>>,
) {
    let mut rx = dispatcher.subscribe(Channel::Operators);
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    inbox.write().await.apply(notification);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "operator inbox feeder lagged behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
