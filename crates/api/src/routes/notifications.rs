//! Operator notification inbox endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use event_store::EventStore;
use notify::{Notification, NotificationId};
use serde::Serialize;

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct InboxResponse {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

/// GET /notifications — the operator inbox, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<InboxResponse>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    let inbox = state.operator_inbox.read().await;
    Ok(Json(InboxResponse {
        unread: inbox.unread_count(),
        notifications: inbox.list().into_iter().cloned().collect(),
    }))
}

/// POST /notifications/:id/read — mark one notification read.
#[tracing::instrument(skip(state, headers))]
pub async fn mark_read<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;
    let id = parse_notification_id(&id)?;

    let mut inbox = state.operator_inbox.write().await;
    if !inbox.mark_read(id) {
        return Err(ApiError::NotFound(format!("Notification {id} not found")));
    }

    Ok(Json(serde_json::json!({ "unread": inbox.unread_count() })))
}

/// POST /notifications/read-all — mark everything read.
#[tracing::instrument(skip(state, headers))]
pub async fn mark_all_read<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    let mut inbox = state.operator_inbox.write().await;
    inbox.mark_all_read();

    Ok(Json(serde_json::json!({ "unread": 0 })))
}

/// DELETE /notifications/:id — remove one notification.
#[tracing::instrument(skip(state, headers))]
pub async fn clear<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;
    let id = parse_notification_id(&id)?;

    let mut inbox = state.operator_inbox.write().await;
    if !inbox.clear(id) {
        return Err(ApiError::NotFound(format!("Notification {id} not found")));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// DELETE /notifications — clear the whole inbox.
#[tracing::instrument(skip(state, headers))]
pub async fn clear_all<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<axum::http::StatusCode, ApiError> {
    let session = Session::from_headers(&headers)?;
    session.require_operator()?;

    state.operator_inbox.write().await.clear_all();

    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn parse_notification_id(id: &str) -> Result<NotificationId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid notification ID: {e}")))?;
    Ok(NotificationId::from_uuid(uuid))
}
