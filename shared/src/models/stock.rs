//! Stock ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger entry. The quantity is always a magnitude; the type
/// decides the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Opening,
    Inbound,
    Outbound,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Opening => "opening",
            MovementType::Inbound => "inbound",
            MovementType::Outbound => "outbound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "opening" => Some(MovementType::Opening),
            "inbound" => Some(MovementType::Inbound),
            "outbound" => Some(MovementType::Outbound),
            _ => None,
        }
    }

    /// Signed change to the plant balance for a movement of `quantity_kg`
    pub fn signed(&self, quantity_kg: Decimal) -> Decimal {
        match self {
            MovementType::Opening | MovementType::Inbound => quantity_kg,
            MovementType::Outbound => -quantity_kg,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub plant_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity_kg: Decimal,
    #[serde(rename = "date")]
    pub movement_date: NaiveDate,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Change this entry applies to `current_stock_kg` when recorded
    pub fn balance_effect(&self) -> Decimal {
        self.movement_type.signed(self.quantity_kg)
    }

    /// Change that undoes this entry on delete
    pub fn reversal_effect(&self) -> Decimal {
        -self.balance_effect()
    }

    /// Whether `other` carries the same external reference for the same plant
    pub fn same_reference(&self, other: &StockMovement) -> bool {
        self.plant_id == other.plant_id
            && self.reference_id.is_some()
            && self.reference_id == other.reference_id
            && self.reference_type == other.reference_type
    }
}

/// Request body for a manual stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMovementInput {
    pub plant_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity_kg: Decimal,
    #[serde(rename = "date")]
    pub movement_date: Option<NaiveDate>,
    /// Idempotency key: a second movement with the same reference on the
    /// same plant is not recorded again
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub note: Option<String>,
}

impl RecordMovementInput {
    pub fn into_movement(self, today: NaiveDate, now: DateTime<Utc>) -> StockMovement {
        StockMovement {
            id: Uuid::new_v4(),
            plant_id: self.plant_id,
            movement_type: self.movement_type,
            quantity_kg: self.quantity_kg,
            movement_date: self.movement_date.unwrap_or(today),
            reference_id: non_blank(self.reference_id),
            reference_type: non_blank(self.reference_type),
            note: non_blank(self.note),
            created_at: now,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Result of appending to the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "movement", rename_all = "snake_case")]
pub enum LedgerWrite {
    /// Entry appended and balance updated
    Recorded(StockMovement),
    /// An entry with the same reference already existed; nothing changed
    Duplicate(StockMovement),
}

impl LedgerWrite {
    pub fn movement(&self) -> &StockMovement {
        match self {
            LedgerWrite::Recorded(m) | LedgerWrite::Duplicate(m) => m,
        }
    }

    pub fn into_movement(self) -> StockMovement {
        match self {
            LedgerWrite::Recorded(m) | LedgerWrite::Duplicate(m) => m,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, LedgerWrite::Duplicate(_))
    }
}

/// Replay a movement log into a balance
pub fn replay_balance<'a, I>(movements: I) -> Decimal
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    movements.into_iter().map(StockMovement::balance_effect).sum()
}
