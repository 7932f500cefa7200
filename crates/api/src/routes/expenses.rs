//! Expense recording endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use domain::Money;
use event_store::EventStore;
use reporting::{Expense, ExpenseCategory};
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecordExpenseRequest {
    pub title: String,
    pub amount_paisa: i64,
    pub category: ExpenseCategory,
}

#[derive(Serialize)]
pub struct ExpenseResponse {
    pub id: String,
    pub title: String,
    pub amount_paisa: i64,
    pub category: ExpenseCategory,
    pub recorded_at: String,
}

fn expense_response(expense: Expense) -> ExpenseResponse {
    ExpenseResponse {
        id: expense.id.to_string(),
        title: expense.title,
        amount_paisa: expense.amount.minor(),
        category: expense.category,
        recorded_at: expense.recorded_at.to_rfc3339(),
    }
}

/// POST /expenses — append an expense to the ledger.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<RecordExpenseRequest>,
) -> Result<(axum::http::StatusCode, Json<ExpenseResponse>), ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    let expense = state
        .expenses
        .record(req.title, Money::from_minor(req.amount_paisa), req.category)
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(expense_response(expense)),
    ))
}

/// GET /expenses — the full expense ledger, oldest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    let expenses = state
        .expenses
        .list()
        .await
        .into_iter()
        .map(expense_response)
        .collect();

    Ok(Json(expenses))
}
