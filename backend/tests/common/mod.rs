//! In-memory store implementations for service tests
//!
//! One mutex guards plants and movements together, so every ledger write
//! and its balance change happen atomically, as they do inside a database
//! transaction.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use cement_server::error::{AppError, AppResult};
use cement_server::repositories::{
    ConsumptionSource, DeliveryStore, MovementStore, PlantStore, Stores,
};
use cement_server::services::{
    DeliveryService, LedgerService, PlantService, ReconciliationService,
};
use shared::{
    CementDelivery, ConsumptionRecord, DateWindow, Kilograms, LedgerWrite, Plant, PlantPatch,
    StockMovement,
};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct Data {
    deliveries: Vec<CementDelivery>,
    plants: HashMap<Uuid, Plant>,
    movements: Vec<StockMovement>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
}

impl MemoryStore {
    pub fn balance(&self, plant_id: Uuid) -> Option<Decimal> {
        let data = self.data.lock().unwrap();
        data.plants.get(&plant_id).map(|p| p.current_stock_kg)
    }

    pub fn movements_for(&self, plant_id: Uuid) -> Vec<StockMovement> {
        let data = self.data.lock().unwrap();
        data.movements
            .iter()
            .filter(|m| m.plant_id == plant_id)
            .cloned()
            .collect()
    }

    pub fn movement_count(&self) -> usize {
        self.data.lock().unwrap().movements.len()
    }
}

fn name_conflict(name: &str) -> AppError {
    AppError::Conflict {
        resource: "plant".to_string(),
        message: format!("An active plant named '{}' already exists", name),
        message_tr: format!("'{}' adında aktif bir santral zaten var", name),
    }
}

fn active_name_in_use(plants: &HashMap<Uuid, Plant>, name: &str, except: Uuid) -> bool {
    plants
        .values()
        .any(|p| p.active && p.id != except && p.matches_name(name))
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn insert(&self, delivery: &CementDelivery) -> AppResult<()> {
        self.data.lock().unwrap().deliveries.push(delivery.clone());
        Ok(())
    }

    async fn list(&self, window: DateWindow) -> AppResult<Vec<CementDelivery>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .deliveries
            .iter()
            .filter(|d| {
                window.is_unbounded()
                    || d.fields.discharge_date.map_or(false, |date| window.contains(date))
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<CementDelivery>> {
        let data = self.data.lock().unwrap();
        Ok(data.deliveries.iter().find(|d| d.id == id).cloned())
    }

    async fn replace(
        &self,
        delivery: &CementDelivery,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        match data
            .deliveries
            .iter_mut()
            .find(|d| d.id == delivery.id && d.updated_at == expected_updated_at)
        {
            Some(stored) => {
                *stored = delivery.clone();
                Ok(())
            }
            None => Err(AppError::Conflict {
                resource: "delivery".to_string(),
                message: "Delivery was changed by another request".to_string(),
                message_tr: "Sevkiyat başka bir istek tarafından değiştirildi".to_string(),
            }),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.lock().unwrap();
        let before = data.deliveries.len();
        data.deliveries.retain(|d| d.id != id);
        Ok(data.deliveries.len() < before)
    }
}

#[async_trait]
impl PlantStore for MemoryStore {
    async fn insert(&self, plant: &Plant, opening: Option<&StockMovement>) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        if plant.active && active_name_in_use(&data.plants, &plant.name, plant.id) {
            return Err(name_conflict(&plant.name));
        }
        data.plants.insert(plant.id, plant.clone());
        if let Some(movement) = opening {
            data.movements.push(movement.clone());
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Plant>> {
        Ok(self.data.lock().unwrap().plants.get(&id).cloned())
    }

    async fn find_active_by_name(&self, name: &str) -> AppResult<Option<Plant>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .plants
            .values()
            .find(|p| p.active && p.matches_name(name))
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Plant>> {
        let data = self.data.lock().unwrap();
        let mut plants: Vec<Plant> = data.plants.values().filter(|p| p.active).cloned().collect();
        plants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plants)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &PlantPatch,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Plant>> {
        let mut data = self.data.lock().unwrap();
        let Some(mut plant) = data.plants.get(&id).cloned() else {
            return Ok(None);
        };
        plant.apply_patch(patch, now);
        if plant.active && active_name_in_use(&data.plants, &plant.name, id) {
            return Err(name_conflict(&plant.name));
        }
        data.plants.insert(id, plant.clone());
        Ok(Some(plant))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.lock().unwrap();
        let removed = data.plants.remove(&id).is_some();
        if removed {
            data.movements.retain(|m| m.plant_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MovementStore for MemoryStore {
    async fn append(&self, movement: StockMovement) -> AppResult<LedgerWrite> {
        let mut data = self.data.lock().unwrap();
        if !data.plants.contains_key(&movement.plant_id) {
            return Err(AppError::NotFound("Plant".to_string()));
        }
        if let Some(existing) = data.movements.iter().find(|m| m.same_reference(&movement)) {
            return Ok(LedgerWrite::Duplicate(existing.clone()));
        }
        if let Some(plant) = data.plants.get_mut(&movement.plant_id) {
            plant.current_stock_kg += movement.balance_effect();
        }
        data.movements.push(movement.clone());
        Ok(LedgerWrite::Recorded(movement))
    }

    async fn remove(&self, id: Uuid) -> AppResult<Option<StockMovement>> {
        let mut data = self.data.lock().unwrap();
        let Some(index) = data.movements.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        let movement = data.movements.remove(index);
        if let Some(plant) = data.plants.get_mut(&movement.plant_id) {
            plant.current_stock_kg += movement.reversal_effect();
        }
        Ok(Some(movement))
    }

    async fn list(&self, plant_id: Option<Uuid>) -> AppResult<Vec<StockMovement>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .movements
            .iter()
            .filter(|m| plant_id.map_or(true, |id| m.plant_id == id))
            .cloned()
            .collect())
    }
}

/// Consumption feed returning fixed records, filtered like the real query
#[derive(Clone, Default)]
pub struct FixedConsumption {
    pub records: Vec<ConsumptionRecord>,
}

impl FixedConsumption {
    pub fn new(records: Vec<(NaiveDate, &str, &str)>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|(date, department, kg)| ConsumptionRecord {
                    date,
                    department_name: department.to_string(),
                    machine_cement_kg: Kilograms::new(dec(kg)),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ConsumptionSource for FixedConsumption {
    async fn query(
        &self,
        department_name: Option<&str>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<Vec<ConsumptionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| department_name.map_or(true, |d| r.department_name == d))
            .filter(|r| date_from.map_or(true, |from| r.date >= from))
            .filter(|r| date_to.map_or(true, |to| r.date <= to))
            .cloned()
            .collect())
    }
}

/// Consumption feed that is always down
pub struct FailingConsumption;

#[async_trait]
impl ConsumptionSource for FailingConsumption {
    async fn query(
        &self,
        _department_name: Option<&str>,
        _date_from: Option<NaiveDate>,
        _date_to: Option<NaiveDate>,
    ) -> AppResult<Vec<ConsumptionRecord>> {
        Err(AppError::Internal("production module unavailable".to_string()))
    }
}

/// Services wired to one shared in-memory store
pub struct TestApp {
    pub memory: MemoryStore,
    pub stores: Stores,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_consumption(Arc::new(FixedConsumption::default()))
    }

    pub fn with_consumption(consumption: Arc<dyn ConsumptionSource>) -> Self {
        let memory = MemoryStore::default();
        let stores = Stores {
            deliveries: Arc::new(memory.clone()),
            plants: Arc::new(memory.clone()),
            movements: Arc::new(memory.clone()),
            consumption,
        };
        Self { memory, stores }
    }

    pub fn deliveries(&self) -> DeliveryService {
        DeliveryService::new(self.stores.deliveries.clone())
    }

    pub fn plants(&self) -> PlantService {
        PlantService::new(self.stores.plants.clone())
    }

    pub fn ledger(&self) -> LedgerService {
        LedgerService::new(self.stores.movements.clone())
    }

    pub fn reports(&self) -> ReconciliationService {
        ReconciliationService::new(
            self.stores.plants.clone(),
            self.stores.deliveries.clone(),
            self.stores.consumption.clone(),
        )
    }
}
