//! PostgreSQL plant store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{Plant, PlantPatch, StockMovement};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{movement::insert_movement, plant_name_conflict, PlantStore};
use crate::error::AppResult;

#[derive(Clone)]
pub struct PgPlantStore {
    db: PgPool,
}

impl PgPlantStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct PlantRow {
    id: Uuid,
    name: String,
    opening_stock_kg: Decimal,
    opening_date: NaiveDate,
    current_stock_kg: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlantRow> for Plant {
    fn from(row: PlantRow) -> Self {
        Plant {
            id: row.id,
            name: row.name,
            opening_stock_kg: row.opening_stock_kg,
            opening_date: row.opening_date,
            current_stock_kg: row.current_stock_kg,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PlantStore for PgPlantStore {
    async fn insert(&self, plant: &Plant, opening: Option<&StockMovement>) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO plants (
                id, name, opening_stock_kg, opening_date, current_stock_kg, active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(plant.id)
        .bind(&plant.name)
        .bind(plant.opening_stock_kg)
        .bind(plant.opening_date)
        .bind(plant.current_stock_kg)
        .bind(plant.active)
        .bind(plant.created_at)
        .bind(plant.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| plant_name_conflict(e, &plant.name))?;

        // The cached balance already includes the opening stock
        if let Some(movement) = opening {
            insert_movement(&mut tx, movement).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Plant>> {
        let row = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, opening_stock_kg, opening_date, current_stock_kg, active,
                   created_at, updated_at
            FROM plants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Plant::from))
    }

    async fn find_active_by_name(&self, name: &str) -> AppResult<Option<Plant>> {
        let row = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, opening_stock_kg, opening_date, current_stock_kg, active,
                   created_at, updated_at
            FROM plants
            WHERE active AND name = $1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Plant::from))
    }

    async fn list_active(&self) -> AppResult<Vec<Plant>> {
        let rows = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, opening_stock_kg, opening_date, current_stock_kg, active,
                   created_at, updated_at
            FROM plants
            WHERE active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Plant::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &PlantPatch,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Plant>> {
        let mut tx = self.db.begin().await?;

        let Some(mut plant) = lock_plant(&mut tx, id).await? else {
            return Ok(None);
        };

        let balance_delta = plant.apply_patch(patch, now);

        sqlx::query(
            r#"
            UPDATE plants SET
                name = $2, opening_stock_kg = $3, opening_date = $4,
                current_stock_kg = current_stock_kg + $5, active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(plant.id)
        .bind(&plant.name)
        .bind(plant.opening_stock_kg)
        .bind(plant.opening_date)
        .bind(balance_delta)
        .bind(plant.active)
        .bind(plant.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| plant_name_conflict(e, &plant.name))?;

        tx.commit().await?;

        Ok(Some(plant))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // stock_movements.plant_id cascades
        let result = sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Load a plant with its row locked until the transaction ends
pub(super) async fn lock_plant(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: Uuid,
) -> AppResult<Option<Plant>> {
    let row = sqlx::query_as::<_, PlantRow>(
        r#"
        SELECT id, name, opening_stock_kg, opening_date, current_stock_kg, active,
               created_at, updated_at
        FROM plants
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Plant::from))
}
