//! Financial dashboard endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use event_store::EventStore;
use reporting::{FinancialStats, compute_stats};

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /stats — revenue, expenses, profit, and distributions.
///
/// Recomputed from the order ledger and expense ledger on every call; the
/// aggregator itself holds no cache.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<FinancialStats>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    state
        .projection_processor
        .run_catch_up()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let orders = state.ledger.all_orders().await;
    let expenses = state.expenses.list().await;

    Ok(Json(compute_stats(&orders, &expenses)))
}
