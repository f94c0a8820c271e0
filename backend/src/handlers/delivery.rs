//! HTTP handlers for cement delivery endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{CementDelivery, DeliveryPatch, DeliverySummary, NewDelivery};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::DeliveryService;
use crate::AppState;

/// Record a delivery
pub async fn create_delivery(
    State(state): State<AppState>,
    Json(input): Json<NewDelivery>,
) -> AppResult<(StatusCode, Json<CementDelivery>)> {
    let service = DeliveryService::new(state.stores.deliveries);
    let delivery = service.create_delivery(input).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// List all deliveries
pub async fn list_deliveries(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CementDelivery>>> {
    let service = DeliveryService::new(state.stores.deliveries);
    let deliveries = service.list_deliveries().await?;
    Ok(Json(deliveries))
}

/// Totals across all deliveries
pub async fn get_delivery_summary(
    State(state): State<AppState>,
) -> AppResult<Json<DeliverySummary>> {
    let service = DeliveryService::new(state.stores.deliveries);
    let summary = service.get_summary().await?;
    Ok(Json(summary))
}

pub async fn get_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<Json<CementDelivery>> {
    let service = DeliveryService::new(state.stores.deliveries);
    let delivery = service.get_delivery(delivery_id).await?;
    Ok(Json(delivery))
}

/// Update a delivery; totals are recomputed
pub async fn update_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    Json(patch): Json<DeliveryPatch>,
) -> AppResult<Json<CementDelivery>> {
    let service = DeliveryService::new(state.stores.deliveries);
    let delivery = service.update_delivery(delivery_id, patch).await?;
    Ok(Json(delivery))
}

pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = DeliveryService::new(state.stores.deliveries);
    service.delete_delivery(delivery_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
