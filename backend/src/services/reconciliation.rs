//! Stock reconciliation reporting

use std::sync::Arc;

use serde::Serialize;
use shared::{validate_date_window, DateWindow, ReconciliationReport};

use crate::error::{AppError, AppResult};
use crate::repositories::{ConsumptionSource, DeliveryStore, PlantStore};

/// Combines the plant registry, delivery history and the production
/// consumption feed into a reconciliation report. Read-only.
#[derive(Clone)]
pub struct ReconciliationService {
    plants: Arc<dyn PlantStore>,
    deliveries: Arc<dyn DeliveryStore>,
    consumption: Arc<dyn ConsumptionSource>,
}

impl ReconciliationService {
    pub fn new(
        plants: Arc<dyn PlantStore>,
        deliveries: Arc<dyn DeliveryStore>,
        consumption: Arc<dyn ConsumptionSource>,
    ) -> Self {
        Self {
            plants,
            deliveries,
            consumption,
        }
    }

    /// Reconcile every active plant over `window`.
    ///
    /// If the consumption feed cannot be read the report is still produced,
    /// with zero consumption.
    pub async fn compute_report(&self, window: DateWindow) -> AppResult<ReconciliationReport> {
        validate_date_window(&window).map_err(|message| {
            AppError::validation(
                "date_from",
                message,
                "Başlangıç tarihi bitiş tarihinden sonra olamaz",
            )
        })?;

        let plants = self.plants.list_active().await?;
        let deliveries = self.deliveries.list(window).await?;

        let consumption = match self
            .consumption
            .query(None, window.date_from, window.date_to)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Consumption feed unavailable, reporting zero consumption"
                );
                Vec::new()
            }
        };

        tracing::debug!(
            plants = plants.len(),
            deliveries = deliveries.len(),
            consumption_records = consumption.len(),
            "Computing reconciliation report"
        );

        Ok(ReconciliationReport::build(
            &plants,
            &deliveries,
            &consumption,
            window,
        ))
    }

    /// Export report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
