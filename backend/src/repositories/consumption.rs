//! Reads cement consumption from the production tracking tables

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{ConsumptionRecord, Kilograms};
use sqlx::{FromRow, PgPool};

use super::ConsumptionSource;
use crate::error::AppResult;

#[derive(Clone)]
pub struct PgConsumptionSource {
    db: PgPool,
}

impl PgConsumptionSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ConsumptionRow {
    date: NaiveDate,
    department_name: String,
    machine_cement_kg: Decimal,
}

#[async_trait]
impl ConsumptionSource for PgConsumptionSource {
    async fn query(
        &self,
        department_name: Option<&str>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<Vec<ConsumptionRecord>> {
        // Records without a production date fall back to their entry date
        let rows = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT date, department_name, machine_cement_kg
            FROM (
                SELECT COALESCE(production_date, created_at::date) AS date,
                       TRIM(department_name) AS department_name,
                       COALESCE(machine_cement_kg, 0) AS machine_cement_kg
                FROM production_records
                WHERE department_name IS NOT NULL
            ) p
            WHERE ($1::text IS NULL OR department_name = $1)
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date
            "#,
        )
        .bind(department_name.map(str::trim))
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ConsumptionRecord {
                date: row.date,
                department_name: row.department_name,
                machine_cement_kg: Kilograms::new(row.machine_cement_kg),
            })
            .collect())
    }
}
