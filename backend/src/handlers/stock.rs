//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{LedgerWrite, RecordMovementInput, StockMovement};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::LedgerService;
use crate::AppState;

#[derive(Deserialize)]
pub struct MovementQuery {
    pub plant_id: Option<Uuid>,
}

/// List movements, optionally for one plant
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = LedgerService::new(state.stores.movements);
    let movements = service.list_movements(query.plant_id).await?;
    Ok(Json(movements))
}

/// Record a manual stock movement. A retried request with an already
/// recorded reference answers 200 instead of 201.
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<LedgerWrite>)> {
    let service = LedgerService::new(state.stores.movements);
    let write = service.record_movement(input).await?;
    let status = if write.is_duplicate() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(write)))
}

/// Delete a movement, reversing its balance effect
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.stores.movements);
    let movement = service.delete_movement(movement_id).await?;
    Ok(Json(movement))
}
