//! Plant registry

use std::sync::Arc;

use shared::{validate_new_plant, validate_plant_patch, NewPlant, Plant, PlantPatch};
use uuid::Uuid;

use super::{timestamp, today};
use crate::error::{AppError, AppResult};
use crate::repositories::PlantStore;

#[derive(Clone)]
pub struct PlantService {
    store: Arc<dyn PlantStore>,
}

impl PlantService {
    pub fn new(store: Arc<dyn PlantStore>) -> Self {
        Self { store }
    }

    /// Register a plant. A positive opening stock is also written to the
    /// ledger as an `opening` entry, in the same transaction.
    pub async fn create_plant(&self, input: NewPlant) -> AppResult<Plant> {
        validate_new_plant(&input)?;
        self.ensure_name_free(&input.name, None).await?;

        let (plant, opening) = Plant::register(input, today(), timestamp());
        self.store.insert(&plant, opening.as_ref()).await?;

        tracing::info!(
            plant_id = %plant.id,
            name = %plant.name,
            opening_stock_kg = %plant.opening_stock_kg,
            "Plant registered"
        );

        Ok(plant)
    }

    /// Active plants
    pub async fn list_plants(&self) -> AppResult<Vec<Plant>> {
        self.store.list_active().await
    }

    pub async fn get_plant(&self, id: Uuid) -> AppResult<Plant> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plant".to_string()))
    }

    /// Apply a patch. Changing `opening_stock_kg` shifts the cached balance
    /// by the delta and writes no ledger entry.
    pub async fn update_plant(&self, id: Uuid, patch: PlantPatch) -> AppResult<Plant> {
        validate_plant_patch(&patch)?;

        let current = self.get_plant(id).await?;
        let mut preview = current.clone();
        preview.apply_patch(&patch, timestamp());

        let renamed = !current.matches_name(&preview.name);
        let reactivated = preview.active && !current.active;
        if preview.active && (renamed || reactivated) {
            self.ensure_name_free(&preview.name, Some(id)).await?;
        }

        let plant = self
            .store
            .update(id, &patch, timestamp())
            .await?
            .ok_or_else(|| AppError::NotFound("Plant".to_string()))?;

        if patch.opening_stock_kg.is_some() {
            tracing::info!(
                plant_id = %id,
                opening_stock_kg = %plant.opening_stock_kg,
                current_stock_kg = %plant.current_stock_kg,
                "Opening stock edited without a ledger entry"
            );
        } else {
            tracing::info!(plant_id = %id, "Plant updated");
        }

        Ok(plant)
    }

    /// Hard delete, removing the plant's movements with it
    pub async fn delete_plant(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Plant".to_string()));
        }

        tracing::info!(plant_id = %id, "Plant deleted with its movements");
        Ok(())
    }

    /// Names join deliveries and consumption to plants, so two active
    /// plants may not share one.
    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.store.find_active_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::Conflict {
                resource: "plant".to_string(),
                message: format!("An active plant named '{}' already exists", existing.name),
                message_tr: format!("'{}' adında aktif bir santral zaten var", existing.name),
            }),
            _ => Ok(()),
        }
    }
}
