//! HTTP handlers for plant endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{NewPlant, Plant, PlantPatch};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::PlantService;
use crate::AppState;

/// Register a plant
pub async fn create_plant(
    State(state): State<AppState>,
    Json(input): Json<NewPlant>,
) -> AppResult<(StatusCode, Json<Plant>)> {
    let service = PlantService::new(state.stores.plants);
    let plant = service.create_plant(input).await?;
    Ok((StatusCode::CREATED, Json(plant)))
}

/// List active plants
pub async fn list_plants(State(state): State<AppState>) -> AppResult<Json<Vec<Plant>>> {
    let service = PlantService::new(state.stores.plants);
    let plants = service.list_plants().await?;
    Ok(Json(plants))
}

pub async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<Json<Plant>> {
    let service = PlantService::new(state.stores.plants);
    let plant = service.get_plant(plant_id).await?;
    Ok(Json(plant))
}

pub async fn update_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    Json(patch): Json<PlantPatch>,
) -> AppResult<Json<Plant>> {
    let service = PlantService::new(state.stores.plants);
    let plant = service.update_plant(plant_id, patch).await?;
    Ok(Json(plant))
}

/// Delete a plant and all its movements
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PlantService::new(state.stores.plants);
    service.delete_plant(plant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
