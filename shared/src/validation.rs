//! Validation utilities for the cement tracking platform
//!
//! Rates and prices are not range checked: a negative or
//! over-100 percentage is accepted and flows through the calculation as
//! entered. Numeric inputs are only bounded by [`MAX_NUMERIC_INPUT`] and
//! [`MAX_QUANTITY_KG`]. Those bounds keep single values and running balances
//! far from the limits of `Decimal`; products of several inputs can still
//! leave its range, which the delivery calculation reports as
//! `CalculationOverflow`.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DeliveryFields, NewPlant, PlantPatch, RecordMovementInput};
use crate::types::DateWindow;

/// Largest magnitude accepted for any numeric delivery input
pub const MAX_NUMERIC_INPUT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest stock quantity accepted in kilograms: the inbound weight of the
/// largest accepted delivery
pub const MAX_QUANTITY_KG: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

pub const MAX_PLANT_NAME_LEN: usize = 120;

pub const MAX_TEXT_FIELD_LEN: usize = 200;

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn check(field: &'static str, result: Result<(), &'static str>) -> Result<(), FieldError> {
        result.map_err(|message| FieldError { field, message })
    }
}

// ============================================================================
// Field Validations
// ============================================================================

/// Validate a plant name (non-blank, bounded length)
pub fn validate_plant_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Plant name is required");
    }
    if trimmed.chars().count() > MAX_PLANT_NAME_LEN {
        return Err("Plant name must be at most 120 characters");
    }
    Ok(())
}

/// Validate a stock quantity in kilograms (non-negative, bounded magnitude)
pub fn validate_quantity_kg(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    if quantity > MAX_QUANTITY_KG {
        return Err("Quantity exceeds the supported range");
    }
    Ok(())
}

/// Validate a numeric delivery input stays within the supported range
pub fn validate_numeric_input(value: Decimal) -> Result<(), &'static str> {
    if value.abs() > MAX_NUMERIC_INPUT {
        return Err("Value exceeds the supported numeric range");
    }
    Ok(())
}

/// Validate a free-text field length
pub fn validate_text_field(value: &str) -> Result<(), &'static str> {
    if value.chars().count() > MAX_TEXT_FIELD_LEN {
        return Err("Text must be at most 200 characters");
    }
    Ok(())
}

/// Validate a report window is ordered
pub fn validate_date_window(window: &DateWindow) -> Result<(), &'static str> {
    match (window.date_from, window.date_to) {
        (Some(from), Some(to)) if from > to => Err("date_from must not be after date_to"),
        _ => Ok(()),
    }
}

// ============================================================================
// Entity Validations
// ============================================================================

/// Validate the inputs of a delivery before its totals are computed
pub fn validate_delivery_fields(fields: &DeliveryFields) -> Result<(), FieldError> {
    let numbers = [
        ("delivered_quantity_tons", fields.delivered_quantity_tons),
        ("scale_weight_tons", fields.scale_weight_tons),
        ("unit_price", fields.unit_price),
        ("vat_rate_pct", fields.vat_rate_pct),
        ("transport_unit_price", fields.transport_unit_price),
        ("transport_vat_rate_pct", fields.transport_vat_rate_pct),
        ("withholding_rate_pct", fields.withholding_rate_pct),
    ];
    for (field, value) in numbers {
        FieldError::check(field, validate_numeric_input(value))?;
    }

    let texts = [
        ("waybill_no", &fields.waybill_no),
        ("invoice_no", &fields.invoice_no),
        ("destination_plant_name", &fields.destination_plant_name),
        ("plate_number", &fields.plate_number),
        ("carrier_name", &fields.carrier_name),
        ("driver_name", &fields.driver_name),
        ("city", &fields.city),
        ("supplier_name", &fields.supplier_name),
    ];
    for (field, value) in texts {
        FieldError::check(field, validate_text_field(value))?;
    }

    Ok(())
}

pub fn validate_new_plant(input: &NewPlant) -> Result<(), FieldError> {
    FieldError::check("name", validate_plant_name(&input.name))?;
    FieldError::check("opening_stock_kg", validate_quantity_kg(input.opening_stock_kg))?;
    Ok(())
}

pub fn validate_plant_patch(patch: &PlantPatch) -> Result<(), FieldError> {
    if let Some(name) = &patch.name {
        FieldError::check("name", validate_plant_name(name))?;
    }
    if let Some(opening) = patch.opening_stock_kg {
        FieldError::check("opening_stock_kg", validate_quantity_kg(opening))?;
    }
    Ok(())
}

pub fn validate_movement(input: &RecordMovementInput) -> Result<(), FieldError> {
    FieldError::check("quantity_kg", validate_quantity_kg(input.quantity_kg))?;
    for (field, value) in [
        ("reference_id", &input.reference_id),
        ("reference_type", &input.reference_type),
        ("note", &input.note),
    ] {
        if let Some(text) = value {
            FieldError::check(field, validate_text_field(text))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovementType;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_validate_plant_name() {
        assert!(validate_plant_name("Merkez Santral").is_ok());
        assert!(validate_plant_name("").is_err());
        assert!(validate_plant_name("   ").is_err());
        assert!(validate_plant_name(&"x".repeat(121)).is_err());
        assert!(validate_plant_name(&"ş".repeat(120)).is_ok());
    }

    #[test]
    fn test_validate_quantity_kg() {
        assert!(validate_quantity_kg(Decimal::ZERO).is_ok());
        assert!(validate_quantity_kg(Decimal::from(1500)).is_ok());
        assert!(validate_quantity_kg(Decimal::from(-1)).is_err());
        assert_eq!(MAX_QUANTITY_KG, Decimal::from(1_000_000_000_000i64));
        assert!(validate_quantity_kg(MAX_QUANTITY_KG).is_ok());
        assert!(validate_quantity_kg(MAX_QUANTITY_KG + Decimal::ONE).is_err());
        assert!(validate_quantity_kg(Decimal::MAX).is_err());
    }

    #[test]
    fn test_validate_numeric_input() {
        assert!(validate_numeric_input(MAX_NUMERIC_INPUT).is_ok());
        assert!(validate_numeric_input(-MAX_NUMERIC_INPUT).is_ok());
        assert!(validate_numeric_input(MAX_NUMERIC_INPUT + Decimal::ONE).is_err());
    }

    #[test]
    fn test_rates_are_not_range_checked() {
        let fields = DeliveryFields {
            vat_rate_pct: Decimal::from(-20),
            withholding_rate_pct: Decimal::from(250),
            ..Default::default()
        };
        assert!(validate_delivery_fields(&fields).is_ok());
    }

    #[test]
    fn test_delivery_field_errors_name_the_field() {
        let fields = DeliveryFields {
            unit_price: Decimal::from(2_000_000_000i64),
            ..Default::default()
        };
        assert_eq!(validate_delivery_fields(&fields).unwrap_err().field, "unit_price");

        let fields = DeliveryFields {
            waybill_no: "9".repeat(201),
            ..Default::default()
        };
        assert_eq!(validate_delivery_fields(&fields).unwrap_err().field, "waybill_no");
    }

    #[test]
    fn test_validate_date_window() {
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert!(validate_date_window(&DateWindow::new(Some(d1), Some(d2))).is_ok());
        assert!(validate_date_window(&DateWindow::new(Some(d1), Some(d1))).is_ok());
        assert!(validate_date_window(&DateWindow::new(None, Some(d1))).is_ok());
        assert!(validate_date_window(&DateWindow::new(Some(d2), Some(d1))).is_err());
    }

    #[test]
    fn test_validate_new_plant() {
        let ok = NewPlant {
            name: "Depo".to_string(),
            opening_stock_kg: Decimal::from(10),
            opening_date: None,
        };
        assert!(validate_new_plant(&ok).is_ok());

        let negative = NewPlant {
            opening_stock_kg: Decimal::from(-10),
            ..ok.clone()
        };
        assert_eq!(validate_new_plant(&negative).unwrap_err().field, "opening_stock_kg");
    }

    #[test]
    fn test_validate_plant_patch() {
        assert!(validate_plant_patch(&PlantPatch::default()).is_ok());
        let blank = PlantPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_plant_patch(&blank).unwrap_err().field, "name");
    }

    #[test]
    fn test_validate_movement() {
        let input = RecordMovementInput {
            plant_id: Uuid::new_v4(),
            movement_type: MovementType::Outbound,
            quantity_kg: Decimal::from(-5),
            movement_date: None,
            reference_id: None,
            reference_type: None,
            note: None,
        };
        let err = validate_movement(&input).unwrap_err();
        assert_eq!(err.field, "quantity_kg");
        assert_eq!(err.to_string(), "quantity_kg: Quantity cannot be negative");

        let huge = RecordMovementInput {
            quantity_kg: Decimal::MAX,
            ..input
        };
        assert_eq!(validate_movement(&huge).unwrap_err().field, "quantity_kg");
    }
}
