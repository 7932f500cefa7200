//! Checkout, order queries, and lifecycle transition endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use checkout::{Cart, Catalog, CheckoutRequest};
use common::{AggregateId, RequestId};
use domain::{Aggregate, DeliveryLocation, Order, OrderStatus, PaymentMethod};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub location: LocationRequest,
    pub payment_method: PaymentMethod,
    /// Client-generated idempotency key; omit to get a fresh one.
    pub request_id: Option<uuid::Uuid>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct LocationRequest {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area: Option<String>,
}

impl From<LocationRequest> for DeliveryLocation {
    fn from(req: LocationRequest) -> Self {
        DeliveryLocation {
            address: req.address,
            latitude: req.latitude,
            longitude: req.longitude,
            area: req.area,
        }
    }
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub target: OrderStatus,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub payment_method: PaymentMethod,
    pub subtotal_paisa: i64,
    pub delivery_charge_paisa: i64,
    pub grand_total_paisa: i64,
    pub placed_at: Option<String>,
    pub history: Vec<HistoryEntryResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price_paisa: i64,
}

#[derive(Serialize)]
pub struct HistoryEntryResponse {
    pub status: String,
    pub at: String,
    pub actor: String,
}

#[derive(Serialize)]
pub struct BoardEntryResponse {
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
    pub line_count: usize,
    pub total_units: u32,
    pub grand_total_paisa: i64,
    pub placed_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
}

fn order_response(order: &Order) -> OrderResponse {
    OrderResponse {
        id: order
            .id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        customer_id: order
            .customer_id()
            .map(|c| c.to_string())
            .unwrap_or_default(),
        status: order.status().to_string(),
        items: order
            .lines()
            .iter()
            .map(|line| OrderItemResponse {
                product_id: line.product_id.to_string(),
                product_name: line.product_name.clone(),
                category: line.category.clone(),
                quantity: line.quantity,
                unit_price_paisa: line.unit_price_at_order.minor(),
            })
            .collect(),
        payment_method: order.payment_method().unwrap_or(PaymentMethod::Card),
        subtotal_paisa: order.subtotal().minor(),
        delivery_charge_paisa: order.delivery_charge().minor(),
        grand_total_paisa: order.grand_total().minor(),
        placed_at: order.placed_at().map(|t| t.to_rfc3339()),
        history: order
            .history()
            .iter()
            .map(|entry| HistoryEntryResponse {
                status: entry.status.to_string(),
                at: entry.at.to_rfc3339(),
                actor: entry.actor.to_string(),
            })
            .collect(),
    }
}

// -- Handlers --

/// POST /orders — checkout: convert the submitted cart into an order.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let session = Session::from_headers(&headers)?;

    let mut cart = Cart::new();
    for item in &req.items {
        if item.quantity == 0 {
            return Err(ApiError::BadRequest(format!(
                "quantity for {} must be at least 1",
                item.product_id
            )));
        }
        let product_id = domain::ProductId::new(item.product_id.as_str());
        let product = state
            .catalog
            .get_product(&product_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", item.product_id)))?;
        cart.add_item(&product);
        cart.update_quantity(&product.id, item.quantity);
    }
    cart.set_location(req.location.into());

    let checkout_request = CheckoutRequest {
        request_id: req
            .request_id
            .map(RequestId::from_uuid)
            .unwrap_or_default(),
        customer_id: session.customer_id(),
        payment_method: req.payment_method,
    };

    let order = state
        .coordinator
        .place_order(&cart, checkout_request)
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(order_response(&order))))
}

/// GET /orders — the operator fulfillment board (active orders only).
#[tracing::instrument(skip(state, headers))]
pub async fn board<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BoardEntryResponse>>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    state
        .projection_processor
        .run_catch_up()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let entries = state
        .board
        .all_orders()
        .await
        .into_iter()
        .map(|e| BoardEntryResponse {
            order_id: e.order_id.to_string(),
            customer_id: e.customer_id.to_string(),
            status: e.status.to_string(),
            line_count: e.line_count,
            total_units: e.total_units,
            grand_total_paisa: e.grand_total.minor(),
            placed_at: e.placed_at.to_rfc3339(),
            updated_at: e.updated_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(entries))
}

/// GET /orders/mine — the calling customer's orders, terminal included.
#[tracing::instrument(skip(state, headers))]
pub async fn mine<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let session = Session::from_headers(&headers)?;

    state
        .projection_processor
        .run_catch_up()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut responses = Vec::new();
    for record in state
        .ledger
        .orders_for_customer(session.customer_id())
        .await
    {
        // The ledger row mirrors the aggregate; reload the aggregate for a
        // single authoritative response shape.
        if let Some(order) = state.coordinator.orders().get_order(record.order_id).await? {
            responses.push(order_response(&order));
        }
    }

    Ok(Json(responses))
}

/// GET /orders/:id — one order, visible to operators and its owner.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = Session::from_headers(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state
        .coordinator
        .orders()
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    if !session.is_operator() && order.customer_id() != Some(session.customer_id()) {
        return Err(ApiError::Forbidden(
            "order belongs to another customer".to_string(),
        ));
    }

    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/transition — request the next lifecycle status.
#[tracing::instrument(skip(state, headers, req))]
pub async fn transition<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = Session::from_headers(&headers)?;
    let order_id = parse_order_id(&id)?;

    let order = state
        .coordinator
        .transition(order_id, req.target, session.actor())
        .await?;

    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/cancel — cancel with an optional reason.
#[tracing::instrument(skip(state, headers, req))]
pub async fn cancel<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = Session::from_headers(&headers)?;
    let order_id = parse_order_id(&id)?;

    let reason = req.reason.unwrap_or_else(|| {
        if session.is_operator() {
            "cancelled by operator".to_string()
        } else {
            "cancelled by customer".to_string()
        }
    });

    let order = state
        .coordinator
        .cancel(order_id, session.actor(), reason)
        .await?;

    Ok(Json(order_response(&order)))
}

/// GET /orders/:id/events — the order's audit trail.
#[tracing::instrument(skip(state, headers))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;
    let order_id = parse_order_id(&id)?;

    let envelopes = state
        .event_store
        .query_events(event_store::EventQuery::for_aggregate(order_id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let responses = envelopes
        .into_iter()
        .map(|e| EventEnvelopeResponse {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            aggregate_id: e.aggregate_id.to_string(),
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
            payload: e.payload,
        })
        .collect();

    Ok(Json(responses))
}

fn parse_order_id(id: &str) -> Result<AggregateId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(AggregateId::from(uuid))
}
