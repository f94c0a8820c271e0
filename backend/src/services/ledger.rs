//! Plant stock ledger

use std::sync::Arc;

use shared::{validate_movement, LedgerWrite, RecordMovementInput, StockMovement};
use uuid::Uuid;

use super::{timestamp, today};
use crate::error::{AppError, AppResult};
use crate::repositories::MovementStore;

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn MovementStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn MovementStore>) -> Self {
        Self { store }
    }

    /// Append a movement and move the plant balance with it.
    ///
    /// Retrying with the same `reference_id` returns the entry recorded the
    /// first time as `LedgerWrite::Duplicate` and leaves the balance alone.
    pub async fn record_movement(&self, input: RecordMovementInput) -> AppResult<LedgerWrite> {
        validate_movement(&input)?;

        let movement = input.into_movement(today(), timestamp());
        let write = self.store.append(movement).await?;

        let m = write.movement();
        if write.is_duplicate() {
            tracing::warn!(
                plant_id = %m.plant_id,
                movement_id = %m.id,
                reference_id = ?m.reference_id,
                "Movement already recorded for this reference"
            );
        } else {
            tracing::info!(
                plant_id = %m.plant_id,
                movement_id = %m.id,
                movement_type = %m.movement_type,
                quantity_kg = %m.quantity_kg,
                "Stock movement recorded"
            );
        }

        Ok(write)
    }

    /// Delete a movement after reversing its balance effect
    pub async fn delete_movement(&self, id: Uuid) -> AppResult<StockMovement> {
        let movement = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock movement".to_string()))?;

        tracing::info!(
            plant_id = %movement.plant_id,
            movement_id = %id,
            reversed_kg = %movement.reversal_effect(),
            "Stock movement deleted"
        );

        Ok(movement)
    }

    pub async fn list_movements(&self, plant_id: Option<Uuid>) -> AppResult<Vec<StockMovement>> {
        tracing::debug!(plant_id = ?plant_id, "Listing stock movements");
        self.store.list(plant_id).await
    }
}
