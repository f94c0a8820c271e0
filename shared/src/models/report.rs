//! Stock reconciliation report models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{CementDelivery, Plant};
use crate::types::{DateWindow, Kilograms};

/// Cement consumed by one department (plant) on one day, as reported by the
/// production tracking module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub date: NaiveDate,
    pub department_name: String,
    pub machine_cement_kg: Kilograms,
}

/// Stock position of one plant over a report window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantReconciliation {
    pub plant_id: Uuid,
    pub plant_name: String,
    pub opening_kg: Kilograms,
    pub inbound_kg: Kilograms,
    pub consumed_kg: Kilograms,
    pub closing_kg: Kilograms,
    /// Ledger balance cached on the plant, for comparison
    pub current_stock_kg: Kilograms,
}

/// Quantity for one plant on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuantity {
    pub date: NaiveDate,
    pub plant_name: String,
    pub quantity_kg: Kilograms,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    pub opening_kg: Kilograms,
    pub inbound_kg: Kilograms,
    pub consumed_kg: Kilograms,
    pub closing_kg: Kilograms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub per_plant: Vec<PlantReconciliation>,
    pub daily_inbound: Vec<DailyQuantity>,
    pub daily_consumed: Vec<DailyQuantity>,
    pub grand_totals: ReconciliationTotals,
}

impl ReconciliationReport {
    /// Reconcile every active plant over `window`.
    ///
    /// Opening stock is never date filtered. Deliveries count by discharge
    /// date and consumption by production date; both join to plants by name.
    /// Inputs outside the window or pointing at no active plant are ignored,
    /// so the daily breakdowns always add up to the per-plant rows.
    pub fn build(
        plants: &[Plant],
        deliveries: &[CementDelivery],
        consumption: &[ConsumptionRecord],
        window: DateWindow,
    ) -> Self {
        let active: Vec<&Plant> = plants.iter().filter(|p| p.active).collect();
        let plant_for = |name: &str| active.iter().copied().find(|p| p.matches_name(name));

        let mut inbound_by_plant: BTreeMap<Uuid, Kilograms> = BTreeMap::new();
        let mut daily_inbound: BTreeMap<(NaiveDate, String), Kilograms> = BTreeMap::new();
        for delivery in deliveries {
            let Some(date) = delivery.fields.discharge_date else {
                continue;
            };
            if !window.contains(date) {
                continue;
            }
            let Some(plant) = plant_for(&delivery.fields.destination_plant_name) else {
                continue;
            };
            let kg = delivery.inbound_kg();
            *inbound_by_plant.entry(plant.id).or_default() += kg;
            *daily_inbound.entry((date, plant.name.clone())).or_default() += kg;
        }

        let mut consumed_by_plant: BTreeMap<Uuid, Kilograms> = BTreeMap::new();
        let mut daily_consumed: BTreeMap<(NaiveDate, String), Kilograms> = BTreeMap::new();
        for record in consumption {
            if !window.contains(record.date) {
                continue;
            }
            let Some(plant) = plant_for(&record.department_name) else {
                continue;
            };
            *consumed_by_plant.entry(plant.id).or_default() += record.machine_cement_kg;
            *daily_consumed.entry((record.date, plant.name.clone())).or_default() +=
                record.machine_cement_kg;
        }

        let per_plant: Vec<PlantReconciliation> = active
            .iter()
            .map(|plant| {
                let opening_kg = Kilograms::new(plant.opening_stock_kg);
                let inbound_kg = inbound_by_plant.get(&plant.id).copied().unwrap_or_default();
                let consumed_kg = consumed_by_plant.get(&plant.id).copied().unwrap_or_default();
                PlantReconciliation {
                    plant_id: plant.id,
                    plant_name: plant.name.clone(),
                    opening_kg,
                    inbound_kg,
                    consumed_kg,
                    closing_kg: closing_stock(opening_kg, inbound_kg, consumed_kg),
                    current_stock_kg: Kilograms::new(plant.current_stock_kg),
                }
            })
            .collect();

        let grand_totals = ReconciliationTotals {
            opening_kg: per_plant.iter().map(|r| r.opening_kg).sum(),
            inbound_kg: per_plant.iter().map(|r| r.inbound_kg).sum(),
            consumed_kg: per_plant.iter().map(|r| r.consumed_kg).sum(),
            closing_kg: per_plant.iter().map(|r| r.closing_kg).sum(),
        };

        Self {
            date_from: window.date_from,
            date_to: window.date_to,
            per_plant,
            daily_inbound: flatten_daily(daily_inbound),
            daily_consumed: flatten_daily(daily_consumed),
            grand_totals,
        }
    }
}

/// Closing stock = opening + inbound - consumed
pub fn closing_stock(opening: Kilograms, inbound: Kilograms, consumed: Kilograms) -> Kilograms {
    opening + inbound - consumed
}

fn flatten_daily(map: BTreeMap<(NaiveDate, String), Kilograms>) -> Vec<DailyQuantity> {
    map.into_iter()
        .map(|((date, plant_name), quantity_kg)| DailyQuantity {
            date,
            plant_name,
            quantity_kg,
        })
        .collect()
}
