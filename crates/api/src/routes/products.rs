//! Catalog read endpoint for cart building.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub unit_price_paisa: i64,
    pub category: String,
    pub stock: u32,
}

/// GET /products — everything currently in the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let mut products: Vec<_> = state
        .catalog
        .all()
        .into_iter()
        .map(|p| ProductResponse {
            id: p.id.to_string(),
            name: p.name,
            unit_price_paisa: p.unit_price.minor(),
            category: p.category,
            stock: p.stock,
        })
        .collect();
    products.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Json(products))
}
