//! Cement delivery intake and revision

use std::sync::Arc;

use shared::{
    validate_delivery_fields, CementDelivery, DateWindow, DeliveryPatch, DeliverySummary,
    NewDelivery,
};
use uuid::Uuid;

use super::timestamp;
use crate::error::{AppError, AppResult};
use crate::repositories::DeliveryStore;

/// Delivery service. Totals are always computed in memory from the full
/// input set and written together with the inputs.
#[derive(Clone)]
pub struct DeliveryService {
    store: Arc<dyn DeliveryStore>,
}

impl DeliveryService {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }

    /// Record a delivery and its derived totals
    pub async fn create_delivery(&self, input: NewDelivery) -> AppResult<CementDelivery> {
        let fields = input.into_fields();
        validate_delivery_fields(&fields)?;

        let delivery = CementDelivery::new(Uuid::new_v4(), fields, timestamp())?;
        self.store.insert(&delivery).await?;

        tracing::info!(
            delivery_id = %delivery.id,
            plant = %delivery.fields.destination_plant_name,
            tons = %delivery.fields.delivered_quantity_tons,
            "Delivery recorded"
        );

        Ok(delivery)
    }

    pub async fn list_deliveries(&self) -> AppResult<Vec<CementDelivery>> {
        self.store.list(DateWindow::unbounded()).await
    }

    pub async fn get_delivery(&self, id: Uuid) -> AppResult<CementDelivery> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery".to_string()))
    }

    /// Merge a patch and recompute every derived field from the merged inputs
    pub async fn update_delivery(
        &self,
        id: Uuid,
        patch: DeliveryPatch,
    ) -> AppResult<CementDelivery> {
        let current = self.get_delivery(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let fields = current.merged_fields(&patch);
        validate_delivery_fields(&fields)?;
        let revised = current.revise(fields, timestamp())?;

        self.store.replace(&revised, current.updated_at).await?;

        tracing::info!(delivery_id = %id, "Delivery updated");

        Ok(revised)
    }

    /// Remove a delivery. The stock ledger is not touched.
    pub async fn delete_delivery(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Delivery".to_string()));
        }

        tracing::info!(delivery_id = %id, "Delivery deleted");
        Ok(())
    }

    /// Totals across every recorded delivery
    pub async fn get_summary(&self) -> AppResult<DeliverySummary> {
        let deliveries = self.store.list(DateWindow::unbounded()).await?;
        Ok(DeliverySummary::from_deliveries(&deliveries)?)
    }
}
