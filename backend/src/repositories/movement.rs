//! PostgreSQL stock ledger

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{LedgerWrite, MovementType, StockMovement};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{plant::lock_plant, MovementStore};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgMovementStore {
    db: PgPool,
}

impl PgMovementStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    plant_id: Uuid,
    movement_type: String,
    quantity_kg: Decimal,
    movement_date: NaiveDate,
    reference_id: Option<String>,
    reference_type: Option<String>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = MovementType::from_str(&row.movement_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown movement type '{}'", row.movement_type))
        })?;

        Ok(StockMovement {
            id: row.id,
            plant_id: row.plant_id,
            movement_type,
            quantity_kg: row.quantity_kg,
            movement_date: row.movement_date,
            reference_id: row.reference_id,
            reference_type: row.reference_type,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Insert a ledger row inside an open transaction. Balance updates are the
/// caller's job.
pub(super) async fn insert_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: &StockMovement,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, plant_id, movement_type, quantity_kg, movement_date,
            reference_id, reference_type, note, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(movement.id)
    .bind(movement.plant_id)
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity_kg)
    .bind(movement.movement_date)
    .bind(&movement.reference_id)
    .bind(&movement.reference_type)
    .bind(&movement.note)
    .bind(movement.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn shift_balance(
    tx: &mut Transaction<'_, Postgres>,
    plant_id: Uuid,
    delta: Decimal,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE plants SET current_stock_kg = current_stock_kg + $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(plant_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl MovementStore for PgMovementStore {
    async fn append(&self, movement: StockMovement) -> AppResult<LedgerWrite> {
        let mut tx = self.db.begin().await?;

        // Serializes every writer of this plant's balance
        if lock_plant(&mut tx, movement.plant_id).await?.is_none() {
            return Err(AppError::NotFound("Plant".to_string()));
        }

        if let Some(reference_id) = &movement.reference_id {
            let existing = sqlx::query_as::<_, MovementRow>(
                r#"
                SELECT id, plant_id, movement_type, quantity_kg, movement_date,
                       reference_id, reference_type, note, created_at
                FROM stock_movements
                WHERE plant_id = $1
                  AND reference_id = $2
                  AND COALESCE(reference_type, '') = COALESCE($3, '')
                "#,
            )
            .bind(movement.plant_id)
            .bind(reference_id)
            .bind(&movement.reference_type)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = existing {
                tx.rollback().await?;
                return Ok(LedgerWrite::Duplicate(row.try_into()?));
            }
        }

        insert_movement(&mut tx, &movement).await?;
        shift_balance(&mut tx, movement.plant_id, movement.balance_effect()).await?;

        tx.commit().await?;

        Ok(LedgerWrite::Recorded(movement))
    }

    async fn remove(&self, id: Uuid) -> AppResult<Option<StockMovement>> {
        let mut tx = self.db.begin().await?;

        let plant_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT plant_id FROM stock_movements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(plant_id) = plant_id else {
            return Ok(None);
        };

        // Plant first, same lock order as append
        lock_plant(&mut tx, plant_id).await?;

        let row = sqlx::query_as::<_, MovementRow>(
            r#"
            DELETE FROM stock_movements
            WHERE id = $1
            RETURNING id, plant_id, movement_type, quantity_kg, movement_date,
                      reference_id, reference_type, note, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // Removed by a concurrent request while we waited for the lock
            return Ok(None);
        };
        let movement = StockMovement::try_from(row)?;

        shift_balance(&mut tx, movement.plant_id, movement.reversal_effect()).await?;

        tx.commit().await?;

        Ok(Some(movement))
    }

    async fn list(&self, plant_id: Option<Uuid>) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, plant_id, movement_type, quantity_kg, movement_date,
                   reference_id, reference_type, note, created_at
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR plant_id = $1)
            ORDER BY movement_date DESC, created_at DESC
            "#,
        )
        .bind(plant_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }
}
