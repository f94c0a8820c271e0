//! Persistence interfaces for deliveries, plants, the stock ledger and the
//! production consumption feed.
//!
//! Services only see these traits; `Stores::postgres` wires the PostgreSQL
//! implementations once at startup and the result travels in `AppState`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    CementDelivery, ConsumptionRecord, DateWindow, LedgerWrite, Plant, PlantPatch, StockMovement,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;

mod consumption;
mod delivery;
mod movement;
mod plant;

pub use consumption::PgConsumptionSource;
pub use delivery::PgDeliveryStore;
pub use movement::PgMovementStore;
pub use plant::PgPlantStore;

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert(&self, delivery: &CementDelivery) -> AppResult<()>;

    /// Deliveries discharged inside `window`, newest discharge first. An
    /// unbounded window also returns deliveries with no discharge date.
    async fn list(&self, window: DateWindow) -> AppResult<Vec<CementDelivery>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<CementDelivery>>;

    /// Overwrite a delivery, inputs and derived totals together. Fails with
    /// `Conflict` when the stored row no longer carries `expected_updated_at`.
    async fn replace(
        &self,
        delivery: &CementDelivery,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Returns false when no delivery had this id
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait PlantStore: Send + Sync {
    /// Persist a plant and its opening ledger entry in one transaction
    async fn insert(&self, plant: &Plant, opening: Option<&StockMovement>) -> AppResult<()>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Plant>>;

    async fn find_active_by_name(&self, name: &str) -> AppResult<Option<Plant>>;

    async fn list_active(&self) -> AppResult<Vec<Plant>>;

    /// Merge `patch` into the locked plant row, shifting the cached balance
    /// by any opening-stock delta. `None` when the plant does not exist.
    async fn update(
        &self,
        id: Uuid,
        patch: &PlantPatch,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Plant>>;

    /// Hard delete; the plant's movements go with it
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait MovementStore: Send + Sync {
    /// Append a ledger entry and apply its balance effect atomically, with
    /// the plant row locked. An entry with the same reference on the same
    /// plant short-circuits to `LedgerWrite::Duplicate`.
    async fn append(&self, movement: StockMovement) -> AppResult<LedgerWrite>;

    /// Reverse an entry's balance effect and delete it atomically.
    /// `None` when the entry does not exist.
    async fn remove(&self, id: Uuid) -> AppResult<Option<StockMovement>>;

    async fn list(&self, plant_id: Option<Uuid>) -> AppResult<Vec<StockMovement>>;
}

/// Cement consumption reported by the production tracking module
#[async_trait]
pub trait ConsumptionSource: Send + Sync {
    async fn query(
        &self,
        department_name: Option<&str>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<Vec<ConsumptionRecord>>;
}

/// Store handles shared by every request
#[derive(Clone)]
pub struct Stores {
    pub deliveries: Arc<dyn DeliveryStore>,
    pub plants: Arc<dyn PlantStore>,
    pub movements: Arc<dyn MovementStore>,
    pub consumption: Arc<dyn ConsumptionSource>,
}

impl Stores {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            deliveries: Arc::new(PgDeliveryStore::new(db.clone())),
            plants: Arc::new(PgPlantStore::new(db.clone())),
            movements: Arc::new(PgMovementStore::new(db.clone())),
            consumption: Arc::new(PgConsumptionSource::new(db)),
        }
    }
}

/// Map a unique violation on a plant name to `Conflict`
pub(crate) fn plant_name_conflict(err: sqlx::Error, name: &str) -> crate::error::AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return crate::error::AppError::Conflict {
                resource: "plant".to_string(),
                message: format!("An active plant named '{}' already exists", name),
                message_tr: format!("'{}' adında aktif bir santral zaten var", name),
            };
        }
    }
    err.into()
}
