//! Plant (cost center) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MovementType, StockMovement};

/// Note attached to the ledger entry created at registration
pub const OPENING_BALANCE_NOTE: &str = "opening balance";

/// A production plant that receives cement and consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub opening_stock_kg: Decimal,
    pub opening_date: NaiveDate,
    /// Cached ledger balance. Only ledger writes and opening-balance edits
    /// move it.
    pub current_stock_kg: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a plant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    #[serde(default)]
    pub opening_stock_kg: Decimal,
    pub opening_date: Option<NaiveDate>,
}

/// Partial update of a plant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantPatch {
    pub name: Option<String>,
    pub opening_stock_kg: Option<Decimal>,
    pub opening_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl Plant {
    /// Register a plant. The cached balance starts at the opening stock, and
    /// a positive opening stock also yields the `opening` ledger entry that
    /// must be persisted together with the plant.
    pub fn register(
        input: NewPlant,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> (Plant, Option<StockMovement>) {
        let opening_date = input.opening_date.unwrap_or(today);
        let plant = Plant {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            opening_stock_kg: input.opening_stock_kg,
            opening_date,
            current_stock_kg: input.opening_stock_kg,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let opening = (input.opening_stock_kg > Decimal::ZERO).then(|| StockMovement {
            id: Uuid::new_v4(),
            plant_id: plant.id,
            movement_type: MovementType::Opening,
            quantity_kg: input.opening_stock_kg,
            movement_date: opening_date,
            reference_id: None,
            reference_type: None,
            note: Some(OPENING_BALANCE_NOTE.to_string()),
            created_at: now,
        });

        (plant, opening)
    }

    /// Apply a patch in place and return the change applied to the cached
    /// balance.
    ///
    /// Editing `opening_stock_kg` shifts `current_stock_kg` by the same
    /// delta without writing a ledger entry, so the balance may no longer
    /// equal a replay of the movement log.
    pub fn apply_patch(&mut self, patch: &PlantPatch, now: DateTime<Utc>) -> Decimal {
        let mut balance_delta = Decimal::ZERO;

        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(opening) = patch.opening_stock_kg {
            balance_delta = opening - self.opening_stock_kg;
            self.opening_stock_kg = opening;
            self.current_stock_kg += balance_delta;
        }
        if let Some(date) = patch.opening_date {
            self.opening_date = date;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = now;

        balance_delta
    }

    /// Name comparison used for delivery and consumption joins
    pub fn matches_name(&self, other: &str) -> bool {
        names_match(&self.name, other)
    }
}

/// Plant names join deliveries and consumption to plants. Only surrounding
/// whitespace is ignored; case must match.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_register_with_opening_stock() {
        let (plant, opening) = Plant::register(
            NewPlant {
                name: " Merkez ".to_string(),
                opening_stock_kg: Decimal::from(5000),
                opening_date: None,
            },
            today(),
            Utc::now(),
        );

        assert_eq!(plant.name, "Merkez");
        assert_eq!(plant.current_stock_kg, Decimal::from(5000));
        assert!(plant.active);

        let opening = opening.expect("opening movement");
        assert_eq!(opening.plant_id, plant.id);
        assert_eq!(opening.movement_type, MovementType::Opening);
        assert_eq!(opening.quantity_kg, Decimal::from(5000));
        assert_eq!(opening.movement_date, today());
        assert_eq!(opening.note.as_deref(), Some(OPENING_BALANCE_NOTE));
    }

    #[test]
    fn test_register_without_opening_stock() {
        let (plant, opening) = Plant::register(
            NewPlant {
                name: "Depo".to_string(),
                opening_stock_kg: Decimal::ZERO,
                opening_date: Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
            },
            today(),
            Utc::now(),
        );

        assert!(opening.is_none());
        assert_eq!(plant.current_stock_kg, Decimal::ZERO);
        assert_eq!(plant.opening_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_opening_edit_shifts_balance_by_delta() {
        let (mut plant, _) = Plant::register(
            NewPlant {
                name: "Merkez".to_string(),
                opening_stock_kg: Decimal::from(5000),
                opening_date: None,
            },
            today(),
            Utc::now(),
        );
        // Simulate consumption recorded through the ledger
        plant.current_stock_kg = Decimal::from(3200);

        let delta = plant.apply_patch(
            &PlantPatch {
                opening_stock_kg: Some(Decimal::from(6000)),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(delta, Decimal::from(1000));
        assert_eq!(plant.opening_stock_kg, Decimal::from(6000));
        assert_eq!(plant.current_stock_kg, Decimal::from(4200));
    }

    #[test]
    fn test_patch_without_opening_keeps_balance() {
        let (mut plant, _) = Plant::register(
            NewPlant {
                name: "Merkez".to_string(),
                opening_stock_kg: Decimal::from(100),
                opening_date: None,
            },
            today(),
            Utc::now(),
        );

        let delta = plant.apply_patch(
            &PlantPatch {
                name: Some("Merkez 2".to_string()),
                active: Some(false),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(delta, Decimal::ZERO);
        assert_eq!(plant.current_stock_kg, Decimal::from(100));
        assert_eq!(plant.name, "Merkez 2");
        assert!(!plant.active);
    }

    #[test]
    fn test_name_matching() {
        assert!(names_match("Merkez Santral", " Merkez Santral "));
        assert!(!names_match("Merkez Santral", "merkez santral"));
        assert!(!names_match("Merkez", "Merkez 2"));
    }
}
