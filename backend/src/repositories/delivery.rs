//! PostgreSQL delivery store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{CementDelivery, DateWindow, DeliveryFields, DeliveryTotals};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DeliveryStore;
use crate::error::{AppError, AppResult};

const DELIVERY_COLUMNS: &str = r#"
    id, load_date, discharge_date, waybill_no, invoice_no, due_date,
    delivered_quantity_tons, scale_weight_tons, unit_price, vat_rate_pct,
    transport_unit_price, transport_vat_rate_pct, withholding_rate_pct,
    destination_plant_name, plate_number, carrier_name, driver_name, city, supplier_name,
    weight_discrepancy, goods_amount, goods_vat_amount, goods_amount_incl_vat,
    transport_base, transport_vat_amount, transport_subtotal_before_withholding,
    withholding_amount, transport_net_amount, combined_base, combined_vat,
    combined_withholding, combined_total, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgDeliveryStore {
    db: PgPool,
}

impl PgDeliveryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for delivery queries
#[derive(Debug, FromRow)]
struct DeliveryRow {
    id: Uuid,
    load_date: Option<NaiveDate>,
    discharge_date: Option<NaiveDate>,
    waybill_no: String,
    invoice_no: String,
    due_date: Option<NaiveDate>,
    delivered_quantity_tons: Decimal,
    scale_weight_tons: Decimal,
    unit_price: Decimal,
    vat_rate_pct: Decimal,
    transport_unit_price: Decimal,
    transport_vat_rate_pct: Decimal,
    withholding_rate_pct: Decimal,
    destination_plant_name: String,
    plate_number: String,
    carrier_name: String,
    driver_name: String,
    city: String,
    supplier_name: String,
    weight_discrepancy: Decimal,
    goods_amount: Decimal,
    goods_vat_amount: Decimal,
    goods_amount_incl_vat: Decimal,
    transport_base: Decimal,
    transport_vat_amount: Decimal,
    transport_subtotal_before_withholding: Decimal,
    withholding_amount: Decimal,
    transport_net_amount: Decimal,
    combined_base: Decimal,
    combined_vat: Decimal,
    combined_withholding: Decimal,
    combined_total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DeliveryRow> for CementDelivery {
    fn from(row: DeliveryRow) -> Self {
        CementDelivery {
            id: row.id,
            fields: DeliveryFields {
                load_date: row.load_date,
                discharge_date: row.discharge_date,
                waybill_no: row.waybill_no,
                invoice_no: row.invoice_no,
                due_date: row.due_date,
                delivered_quantity_tons: row.delivered_quantity_tons,
                scale_weight_tons: row.scale_weight_tons,
                unit_price: row.unit_price,
                vat_rate_pct: row.vat_rate_pct,
                transport_unit_price: row.transport_unit_price,
                transport_vat_rate_pct: row.transport_vat_rate_pct,
                withholding_rate_pct: row.withholding_rate_pct,
                destination_plant_name: row.destination_plant_name,
                plate_number: row.plate_number,
                carrier_name: row.carrier_name,
                driver_name: row.driver_name,
                city: row.city,
                supplier_name: row.supplier_name,
            },
            totals: DeliveryTotals {
                weight_discrepancy: row.weight_discrepancy,
                goods_amount: row.goods_amount,
                goods_vat_amount: row.goods_vat_amount,
                goods_amount_incl_vat: row.goods_amount_incl_vat,
                transport_base: row.transport_base,
                transport_vat_amount: row.transport_vat_amount,
                transport_subtotal_before_withholding: row.transport_subtotal_before_withholding,
                withholding_amount: row.withholding_amount,
                transport_net_amount: row.transport_net_amount,
                combined_base: row.combined_base,
                combined_vat: row.combined_vat,
                combined_withholding: row.combined_withholding,
                combined_total: row.combined_total,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DeliveryStore for PgDeliveryStore {
    async fn insert(&self, delivery: &CementDelivery) -> AppResult<()> {
        let f = &delivery.fields;
        let t = &delivery.totals;

        sqlx::query(
            r#"
            INSERT INTO cement_deliveries (
                id, load_date, discharge_date, waybill_no, invoice_no, due_date,
                delivered_quantity_tons, scale_weight_tons, unit_price, vat_rate_pct,
                transport_unit_price, transport_vat_rate_pct, withholding_rate_pct,
                destination_plant_name, plate_number, carrier_name, driver_name, city, supplier_name,
                weight_discrepancy, goods_amount, goods_vat_amount, goods_amount_incl_vat,
                transport_base, transport_vat_amount, transport_subtotal_before_withholding,
                withholding_amount, transport_net_amount, combined_base, combined_vat,
                combined_withholding, combined_total, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32,
                    $33, $34)
            "#,
        )
        .bind(delivery.id)
        .bind(f.load_date)
        .bind(f.discharge_date)
        .bind(&f.waybill_no)
        .bind(&f.invoice_no)
        .bind(f.due_date)
        .bind(f.delivered_quantity_tons)
        .bind(f.scale_weight_tons)
        .bind(f.unit_price)
        .bind(f.vat_rate_pct)
        .bind(f.transport_unit_price)
        .bind(f.transport_vat_rate_pct)
        .bind(f.withholding_rate_pct)
        .bind(&f.destination_plant_name)
        .bind(&f.plate_number)
        .bind(&f.carrier_name)
        .bind(&f.driver_name)
        .bind(&f.city)
        .bind(&f.supplier_name)
        .bind(t.weight_discrepancy)
        .bind(t.goods_amount)
        .bind(t.goods_vat_amount)
        .bind(t.goods_amount_incl_vat)
        .bind(t.transport_base)
        .bind(t.transport_vat_amount)
        .bind(t.transport_subtotal_before_withholding)
        .bind(t.withholding_amount)
        .bind(t.transport_net_amount)
        .bind(t.combined_base)
        .bind(t.combined_vat)
        .bind(t.combined_withholding)
        .bind(t.combined_total)
        .bind(delivery.created_at)
        .bind(delivery.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn list(&self, window: DateWindow) -> AppResult<Vec<CementDelivery>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            SELECT {} FROM cement_deliveries
            WHERE $1 OR discharge_date BETWEEN COALESCE($2, '-infinity'::date)
                                           AND COALESCE($3, 'infinity'::date)
            ORDER BY discharge_date DESC NULLS LAST, created_at DESC
            "#,
            DELIVERY_COLUMNS
        ))
        .bind(window.is_unbounded())
        .bind(window.date_from)
        .bind(window.date_to)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CementDelivery::from).collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CementDelivery>> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {} FROM cement_deliveries WHERE id = $1",
            DELIVERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(CementDelivery::from))
    }

    async fn replace(
        &self,
        delivery: &CementDelivery,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let f = &delivery.fields;
        let t = &delivery.totals;

        let result = sqlx::query(
            r#"
            UPDATE cement_deliveries SET
                load_date = $3, discharge_date = $4, waybill_no = $5, invoice_no = $6,
                due_date = $7, delivered_quantity_tons = $8, scale_weight_tons = $9,
                unit_price = $10, vat_rate_pct = $11, transport_unit_price = $12,
                transport_vat_rate_pct = $13, withholding_rate_pct = $14,
                destination_plant_name = $15, plate_number = $16, carrier_name = $17,
                driver_name = $18, city = $19, supplier_name = $20,
                weight_discrepancy = $21, goods_amount = $22, goods_vat_amount = $23,
                goods_amount_incl_vat = $24, transport_base = $25, transport_vat_amount = $26,
                transport_subtotal_before_withholding = $27, withholding_amount = $28,
                transport_net_amount = $29, combined_base = $30, combined_vat = $31,
                combined_withholding = $32, combined_total = $33, updated_at = $34
            WHERE id = $1 AND updated_at = $2
            "#,
        )
        .bind(delivery.id)
        .bind(expected_updated_at)
        .bind(f.load_date)
        .bind(f.discharge_date)
        .bind(&f.waybill_no)
        .bind(&f.invoice_no)
        .bind(f.due_date)
        .bind(f.delivered_quantity_tons)
        .bind(f.scale_weight_tons)
        .bind(f.unit_price)
        .bind(f.vat_rate_pct)
        .bind(f.transport_unit_price)
        .bind(f.transport_vat_rate_pct)
        .bind(f.withholding_rate_pct)
        .bind(&f.destination_plant_name)
        .bind(&f.plate_number)
        .bind(&f.carrier_name)
        .bind(&f.driver_name)
        .bind(&f.city)
        .bind(&f.supplier_name)
        .bind(t.weight_discrepancy)
        .bind(t.goods_amount)
        .bind(t.goods_vat_amount)
        .bind(t.goods_amount_incl_vat)
        .bind(t.transport_base)
        .bind(t.transport_vat_amount)
        .bind(t.transport_subtotal_before_withholding)
        .bind(t.withholding_amount)
        .bind(t.transport_net_amount)
        .bind(t.combined_base)
        .bind(t.combined_vat)
        .bind(t.combined_withholding)
        .bind(t.combined_total)
        .bind(delivery.updated_at)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict {
                resource: "delivery".to_string(),
                message: "Delivery was changed by another request".to_string(),
                message_tr: "Sevkiyat başka bir istek tarafından değiştirildi".to_string(),
            });
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cement_deliveries WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
