//! WebAssembly module for the Cement Tracking Platform
//!
//! Provides client-side computation for:
//! - Live delivery totals while the intake form is filled in
//! - Tonne to kilogram conversion
//! - Closing stock previews
//!
//! Everything goes through the `shared` crate, so the browser shows exactly
//! what the server will store.

use rust_decimal::Decimal;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

use shared::{
    validate_delivery_fields, validate_plant_name, DeliveryTotals, Kilograms, NewDelivery, Tonnes,
};

/// Compute delivery totals from the intake form.
///
/// Takes the same JSON body the create endpoint accepts and returns the
/// derived fields as JSON.
#[wasm_bindgen]
pub fn calculate_delivery_totals(input_json: &str) -> Result<String, JsValue> {
    delivery_totals_json(input_json).map_err(|e| JsValue::from_str(&e))
}

/// Convert a tonnage to kilograms
#[wasm_bindgen]
pub fn tons_to_kg(tons: &str) -> Result<String, JsValue> {
    convert_tons(tons).map_err(|e| JsValue::from_str(&e))
}

/// Closing stock = opening + inbound - consumed, all in kilograms
#[wasm_bindgen]
pub fn closing_stock_kg(opening: &str, inbound: &str, consumed: &str) -> Result<String, JsValue> {
    closing_preview(opening, inbound, consumed).map_err(|e| JsValue::from_str(&e))
}

/// Validation message for a plant name, if it is not acceptable
#[wasm_bindgen]
pub fn plant_name_error(name: &str) -> Option<String> {
    validate_plant_name(name).err().map(String::from)
}

fn delivery_totals_json(input_json: &str) -> Result<String, String> {
    let input: NewDelivery = serde_json::from_str(input_json)
        .map_err(|e| format!("Invalid delivery JSON: {}", e))?;

    let fields = input.into_fields();
    validate_delivery_fields(&fields).map_err(|e| e.to_string())?;

    let totals = DeliveryTotals::compute(&fields).map_err(|e| e.to_string())?;
    serde_json::to_string(&totals)
        .map_err(|e| format!("Failed to serialize totals: {}", e))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(value).map_err(|e| format!("Invalid {}: {}", field, e))
}

fn convert_tons(tons: &str) -> Result<String, String> {
    let tons = Tonnes::new(parse_decimal("tons", tons)?);
    let kg = tons
        .checked_to_kilograms()
        .ok_or_else(|| "Tonnage is too large to convert".to_string())?;
    Ok(kg.value().to_string())
}

fn closing_preview(opening: &str, inbound: &str, consumed: &str) -> Result<String, String> {
    let opening = Kilograms::new(parse_decimal("opening", opening)?);
    let inbound = Kilograms::new(parse_decimal("inbound", inbound)?);
    let consumed = Kilograms::new(parse_decimal("consumed", consumed)?);

    let closing = opening
        .checked_add(inbound)
        .and_then(|kg| kg.checked_sub(consumed))
        .ok_or_else(|| "Closing stock is too large to compute".to_string())?;
    Ok(closing.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_totals_preview() {
        let json = r#"{
            "delivered_quantity_tons": "100",
            "unit_price": "10",
            "transport_unit_price": "5",
            "withholding_rate_pct": "10"
        }"#;

        let totals: DeliveryTotals =
            serde_json::from_str(&delivery_totals_json(json).unwrap()).unwrap();

        // Both VAT rates fall back to 20%
        assert_eq!(totals.goods_amount_incl_vat, Decimal::from(1200));
        assert_eq!(totals.transport_net_amount, Decimal::from(590));
        assert_eq!(totals.combined_total, Decimal::from(1790));
    }

    #[test]
    fn test_delivery_totals_rejects_bad_json() {
        assert!(delivery_totals_json("{ not json").is_err());
        assert!(delivery_totals_json(r#"{"unit_price": "9999999999"}"#).is_err());
    }

    #[test]
    fn test_tons_to_kg() {
        assert_eq!(convert_tons("2.5").unwrap(), "2500.0");
        assert_eq!(convert_tons("").unwrap(), "0");
        assert!(convert_tons("two").is_err());
        assert!(convert_tons("79228162514264337593543950335").is_err());
    }

    #[test]
    fn test_closing_stock_preview() {
        assert_eq!(closing_preview("5000", "2000", "1500").unwrap(), "5500");
        assert_eq!(closing_preview("0", "", "250").unwrap(), "-250");

        let max = "79228162514264337593543950335";
        assert!(closing_preview(max, max, "0").is_err());
        assert!(closing_preview("0", "", max).unwrap().starts_with('-'));
        assert!(closing_preview(&format!("-{}", max), "0", "1").is_err());
    }

    #[test]
    fn test_totals_at_the_input_cap_are_an_error() {
        let json = r#"{
            "delivered_quantity_tons": "1000000000",
            "transport_unit_price": "1000000000",
            "transport_vat_rate_pct": "1000000000",
            "withholding_rate_pct": "1000000000"
        }"#;

        let err = delivery_totals_json(json).unwrap_err();
        assert!(err.contains("withholding_amount"));
    }

    #[test]
    fn test_plant_name_error() {
        assert_eq!(plant_name_error("Merkez"), None);
        assert!(plant_name_error("   ").is_some());
    }
}
