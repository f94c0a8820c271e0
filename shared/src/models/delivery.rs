//! Cement delivery models and the delivery financial calculation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Kilograms, Tonnes};

/// VAT rate applied at intake when the operator leaves the rate empty
pub const DEFAULT_VAT_RATE_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Inputs of a delivery as entered by the operator.
///
/// Everything in [`DeliveryTotals`] is derived from these fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFields {
    pub load_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub waybill_no: String,
    pub invoice_no: String,
    pub due_date: Option<NaiveDate>,
    pub delivered_quantity_tons: Decimal,
    pub scale_weight_tons: Decimal,
    pub unit_price: Decimal,
    pub vat_rate_pct: Decimal,
    pub transport_unit_price: Decimal,
    pub transport_vat_rate_pct: Decimal,
    pub withholding_rate_pct: Decimal,
    /// Joins the delivery to a plant by name
    pub destination_plant_name: String,
    pub plate_number: String,
    /// Transport company
    pub carrier_name: String,
    pub driver_name: String,
    pub city: String,
    /// Company the cement was bought from
    pub supplier_name: String,
}

/// Derived financial fields of a delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTotals {
    pub weight_discrepancy: Decimal,
    pub goods_amount: Decimal,
    pub goods_vat_amount: Decimal,
    pub goods_amount_incl_vat: Decimal,
    pub transport_base: Decimal,
    pub transport_vat_amount: Decimal,
    /// Transport base plus VAT ("T1")
    pub transport_subtotal_before_withholding: Decimal,
    /// Share of the transport VAT withheld at source ("T2")
    pub withholding_amount: Decimal,
    pub transport_net_amount: Decimal,
    pub combined_base: Decimal,
    pub combined_vat: Decimal,
    pub combined_withholding: Decimal,
    pub combined_total: Decimal,
}

/// A derived amount fell outside the range of `Decimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} is too large to compute")]
pub struct CalculationOverflow {
    pub field: &'static str,
}

fn mul(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, CalculationOverflow> {
    a.checked_mul(b).ok_or(CalculationOverflow { field })
}

fn add(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, CalculationOverflow> {
    a.checked_add(b).ok_or(CalculationOverflow { field })
}

fn sub(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, CalculationOverflow> {
    a.checked_sub(b).ok_or(CalculationOverflow { field })
}

/// `amount × rate / 100`
fn percent_of(
    field: &'static str,
    amount: Decimal,
    rate_pct: Decimal,
) -> Result<Decimal, CalculationOverflow> {
    Ok(mul(field, amount, rate_pct)? / Decimal::ONE_HUNDRED)
}

impl DeliveryTotals {
    /// Compute every derived field from the delivery inputs.
    ///
    /// Pure and deterministic. Rates are not range checked: a negative or
    /// >100 percentage flows through the arithmetic unchanged. Inputs whose
    /// products leave the range of `Decimal` yield [`CalculationOverflow`]
    /// naming the first derived field that could not be represented.
    pub fn compute(fields: &DeliveryFields) -> Result<Self, CalculationOverflow> {
        let quantity = fields.delivered_quantity_tons;

        let weight_discrepancy = sub("weight_discrepancy", quantity, fields.scale_weight_tons)?;

        let goods_amount = mul("goods_amount", quantity, fields.unit_price)?;
        let goods_vat_amount = percent_of("goods_vat_amount", goods_amount, fields.vat_rate_pct)?;
        let goods_amount_incl_vat = add("goods_amount_incl_vat", goods_amount, goods_vat_amount)?;

        let transport_base = mul("transport_base", quantity, fields.transport_unit_price)?;
        let transport_vat_amount = percent_of(
            "transport_vat_amount",
            transport_base,
            fields.transport_vat_rate_pct,
        )?;
        let transport_subtotal_before_withholding = add(
            "transport_subtotal_before_withholding",
            transport_base,
            transport_vat_amount,
        )?;
        // Withholding applies to the transport VAT only, never to the base
        let withholding_amount = percent_of(
            "withholding_amount",
            transport_vat_amount,
            fields.withholding_rate_pct,
        )?;
        let transport_net_amount = sub(
            "transport_net_amount",
            transport_subtotal_before_withholding,
            withholding_amount,
        )?;

        Ok(Self {
            weight_discrepancy,
            goods_amount,
            goods_vat_amount,
            goods_amount_incl_vat,
            transport_base,
            transport_vat_amount,
            transport_subtotal_before_withholding,
            withholding_amount,
            transport_net_amount,
            combined_base: add("combined_base", goods_amount, transport_base)?,
            combined_vat: add("combined_vat", goods_vat_amount, transport_vat_amount)?,
            combined_withholding: withholding_amount,
            combined_total: add("combined_total", goods_amount_incl_vat, transport_net_amount)?,
        })
    }
}

/// A single truck-load of cement received at a plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CementDelivery {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: DeliveryFields,
    #[serde(flatten)]
    pub totals: DeliveryTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CementDelivery {
    /// Build a new delivery, deriving all totals from `fields`
    pub fn new(
        id: Uuid,
        fields: DeliveryFields,
        now: DateTime<Utc>,
    ) -> Result<Self, CalculationOverflow> {
        let totals = DeliveryTotals::compute(&fields)?;
        Ok(Self {
            id,
            fields,
            totals,
            created_at: now,
            updated_at: now,
        })
    }

    /// Inputs of this delivery with `patch` merged in. Nothing is computed.
    pub fn merged_fields(&self, patch: &DeliveryPatch) -> DeliveryFields {
        let mut fields = self.fields.clone();
        patch.apply_to(&mut fields);
        fields
    }

    /// Replace the inputs and recompute every derived field from them
    pub fn revise(
        &self,
        fields: DeliveryFields,
        now: DateTime<Utc>,
    ) -> Result<Self, CalculationOverflow> {
        let totals = DeliveryTotals::compute(&fields)?;
        Ok(Self {
            id: self.id,
            fields,
            totals,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    pub fn delivered_tonnes(&self) -> Tonnes {
        Tonnes::new(self.fields.delivered_quantity_tons)
    }

    /// Delivered quantity normalized to kilograms
    pub fn inbound_kg(&self) -> Kilograms {
        self.delivered_tonnes().to_kilograms()
    }
}

/// Request body for recording a delivery. Absent numbers count as zero,
/// except the two VAT rates which fall back to [`DEFAULT_VAT_RATE_PCT`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDelivery {
    pub load_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub waybill_no: Option<String>,
    pub invoice_no: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub delivered_quantity_tons: Option<Decimal>,
    pub scale_weight_tons: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub vat_rate_pct: Option<Decimal>,
    pub transport_unit_price: Option<Decimal>,
    pub transport_vat_rate_pct: Option<Decimal>,
    pub withholding_rate_pct: Option<Decimal>,
    pub destination_plant_name: Option<String>,
    pub plate_number: Option<String>,
    pub carrier_name: Option<String>,
    pub driver_name: Option<String>,
    pub city: Option<String>,
    pub supplier_name: Option<String>,
}

impl NewDelivery {
    pub fn into_fields(self) -> DeliveryFields {
        DeliveryFields {
            load_date: self.load_date,
            discharge_date: self.discharge_date,
            waybill_no: self.waybill_no.unwrap_or_default(),
            invoice_no: self.invoice_no.unwrap_or_default(),
            due_date: self.due_date,
            delivered_quantity_tons: self.delivered_quantity_tons.unwrap_or_default(),
            scale_weight_tons: self.scale_weight_tons.unwrap_or_default(),
            unit_price: self.unit_price.unwrap_or_default(),
            vat_rate_pct: self.vat_rate_pct.unwrap_or(DEFAULT_VAT_RATE_PCT),
            transport_unit_price: self.transport_unit_price.unwrap_or_default(),
            transport_vat_rate_pct: self.transport_vat_rate_pct.unwrap_or(DEFAULT_VAT_RATE_PCT),
            withholding_rate_pct: self.withholding_rate_pct.unwrap_or_default(),
            destination_plant_name: trimmed(self.destination_plant_name),
            plate_number: trimmed(self.plate_number),
            carrier_name: trimmed(self.carrier_name),
            driver_name: trimmed(self.driver_name),
            city: trimmed(self.city),
            supplier_name: trimmed(self.supplier_name),
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Partial update of a delivery. Only fields that are present change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryPatch {
    pub load_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub waybill_no: Option<String>,
    pub invoice_no: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub delivered_quantity_tons: Option<Decimal>,
    pub scale_weight_tons: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub vat_rate_pct: Option<Decimal>,
    pub transport_unit_price: Option<Decimal>,
    pub transport_vat_rate_pct: Option<Decimal>,
    pub withholding_rate_pct: Option<Decimal>,
    pub destination_plant_name: Option<String>,
    pub plate_number: Option<String>,
    pub carrier_name: Option<String>,
    pub driver_name: Option<String>,
    pub city: Option<String>,
    pub supplier_name: Option<String>,
}

impl DeliveryPatch {
    /// Overwrite the inputs named in the patch. Derived totals are not
    /// touched here; callers go through [`CementDelivery::revise`].
    pub fn apply_to(&self, fields: &mut DeliveryFields) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_text(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.trim().to_string();
            }
        }

        if self.load_date.is_some() {
            fields.load_date = self.load_date;
        }
        if self.discharge_date.is_some() {
            fields.discharge_date = self.discharge_date;
        }
        if self.due_date.is_some() {
            fields.due_date = self.due_date;
        }
        set(&mut fields.waybill_no, &self.waybill_no);
        set(&mut fields.invoice_no, &self.invoice_no);
        set(&mut fields.delivered_quantity_tons, &self.delivered_quantity_tons);
        set(&mut fields.scale_weight_tons, &self.scale_weight_tons);
        set(&mut fields.unit_price, &self.unit_price);
        set(&mut fields.vat_rate_pct, &self.vat_rate_pct);
        set(&mut fields.transport_unit_price, &self.transport_unit_price);
        set(&mut fields.transport_vat_rate_pct, &self.transport_vat_rate_pct);
        set(&mut fields.withholding_rate_pct, &self.withholding_rate_pct);
        set_text(&mut fields.destination_plant_name, &self.destination_plant_name);
        set_text(&mut fields.plate_number, &self.plate_number);
        set_text(&mut fields.carrier_name, &self.carrier_name);
        set_text(&mut fields.driver_name, &self.driver_name);
        set_text(&mut fields.city, &self.city);
        set_text(&mut fields.supplier_name, &self.supplier_name);
    }

    pub fn is_empty(&self) -> bool {
        self.load_date.is_none()
            && self.discharge_date.is_none()
            && self.waybill_no.is_none()
            && self.invoice_no.is_none()
            && self.due_date.is_none()
            && self.delivered_quantity_tons.is_none()
            && self.scale_weight_tons.is_none()
            && self.unit_price.is_none()
            && self.vat_rate_pct.is_none()
            && self.transport_unit_price.is_none()
            && self.transport_vat_rate_pct.is_none()
            && self.withholding_rate_pct.is_none()
            && self.destination_plant_name.is_none()
            && self.plate_number.is_none()
            && self.carrier_name.is_none()
            && self.driver_name.is_none()
            && self.city.is_none()
            && self.supplier_name.is_none()
    }
}

/// Totals across a set of deliveries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub record_count: usize,
    pub total_delivered_tons: Decimal,
    pub total_scale_weight_tons: Decimal,
    pub total_weight_discrepancy: Decimal,
    pub total_goods_amount: Decimal,
    pub total_goods_vat: Decimal,
    pub total_goods_incl_vat: Decimal,
    pub total_transport_base: Decimal,
    pub total_transport_vat: Decimal,
    pub total_transport_net: Decimal,
    pub total_combined_base: Decimal,
    pub total_combined_vat: Decimal,
    pub total_combined_withholding: Decimal,
    pub total_combined: Decimal,
}

impl DeliverySummary {
    pub fn from_deliveries(deliveries: &[CementDelivery]) -> Result<Self, CalculationOverflow> {
        deliveries.iter().try_fold(Self::default(), |acc, d| {
            let (f, t) = (&d.fields, &d.totals);
            Ok(Self {
                record_count: acc.record_count + 1,
                total_delivered_tons: add(
                    "total_delivered_tons",
                    acc.total_delivered_tons,
                    f.delivered_quantity_tons,
                )?,
                total_scale_weight_tons: add(
                    "total_scale_weight_tons",
                    acc.total_scale_weight_tons,
                    f.scale_weight_tons,
                )?,
                total_weight_discrepancy: add(
                    "total_weight_discrepancy",
                    acc.total_weight_discrepancy,
                    t.weight_discrepancy,
                )?,
                total_goods_amount: add("total_goods_amount", acc.total_goods_amount, t.goods_amount)?,
                total_goods_vat: add("total_goods_vat", acc.total_goods_vat, t.goods_vat_amount)?,
                total_goods_incl_vat: add(
                    "total_goods_incl_vat",
                    acc.total_goods_incl_vat,
                    t.goods_amount_incl_vat,
                )?,
                total_transport_base: add(
                    "total_transport_base",
                    acc.total_transport_base,
                    t.transport_base,
                )?,
                total_transport_vat: add(
                    "total_transport_vat",
                    acc.total_transport_vat,
                    t.transport_vat_amount,
                )?,
                total_transport_net: add(
                    "total_transport_net",
                    acc.total_transport_net,
                    t.transport_net_amount,
                )?,
                total_combined_base: add(
                    "total_combined_base",
                    acc.total_combined_base,
                    t.combined_base,
                )?,
                total_combined_vat: add("total_combined_vat", acc.total_combined_vat, t.combined_vat)?,
                total_combined_withholding: add(
                    "total_combined_withholding",
                    acc.total_combined_withholding,
                    t.combined_withholding,
                )?,
                total_combined: add("total_combined", acc.total_combined, t.combined_total)?,
            })
        })
    }
}
