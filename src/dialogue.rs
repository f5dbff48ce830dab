//! Conversation state for multi-step inventory flows and the parsers for
//! each step's input.

use thiserror::Error;

use crate::input_patterns::FILTER_PAIR_REGEX;
use crate::warehouse_model::{
    NewThermocup, Product, ProductFilters, ThermocupAttributes, THERMOCUP_CATEGORY_ID,
};

/// Number of pipe-separated fields in a thermocup create line
pub const THERMOCUP_FIELD_COUNT: usize = 11;
/// A thermocup update line is the product id followed by a create line
pub const THERMOCUP_UPDATE_FIELD_COUNT: usize = THERMOCUP_FIELD_COUNT + 1;

/// Free-text input a chat is currently expected to supply.
///
/// Multi-step variants carry the values collected by earlier steps, so a
/// later step can never run with a missing field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingInput {
    AwaitingProductId,
    AwaitingThermocupId,
    AwaitingProductFilter,
    AwaitingThermocupCreate,
    AwaitingThermocupUpdate,
    AwaitingStockProductId,
    AwaitingStockWarehouseId {
        product_id: i64,
    },
    AwaitingStockQuantity {
        product_id: i64,
        warehouse_id: i64,
    },
    AwaitingReservedProductId,
    AwaitingReservedQuantity {
        product_id: i64,
    },
}

/// Why a piece of user input was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("not a whole number")]
    InvalidNumber,
    #[error("quantity change must not be zero")]
    ZeroQuantity,
    #[error("expected {expected} fields")]
    InvalidFormat { expected: usize },
    #[error("malformed filter")]
    InvalidFilter,
}

/// Parses an integer identifier (product or warehouse id)
pub fn parse_id(input: &str) -> Result<i64, InputError> {
    input.trim().parse().map_err(|_| InputError::InvalidNumber)
}

/// Parses a signed quantity delta; zero is rejected because an update must change something
pub fn parse_quantity_change(input: &str) -> Result<i32, InputError> {
    let change: i32 = input.trim().parse().map_err(|_| InputError::InvalidNumber)?;
    if change == 0 {
        return Err(InputError::ZeroQuantity);
    }
    Ok(change)
}

/// Parses a thermocup create line:
/// `name|sku|base_price|is_active|path_to_photo|volume_ml|color|brand|model|is_hermetic|material`
pub fn parse_thermocup_payload(input: &str) -> Result<NewThermocup, InputError> {
    let invalid = InputError::InvalidFormat {
        expected: THERMOCUP_FIELD_COUNT,
    };

    let parts: Vec<&str> = input.trim().split('|').map(str::trim).collect();
    if parts.len() != THERMOCUP_FIELD_COUNT {
        return Err(invalid);
    }

    let base_price: f64 = parts[2].parse().map_err(|_| invalid.clone())?;
    if !base_price.is_finite() {
        return Err(invalid);
    }
    let is_active = parse_bool(parts[3]).ok_or_else(|| invalid.clone())?;
    let volume_ml: i32 = parts[5].parse().map_err(|_| invalid.clone())?;
    let is_hermetic = parse_bool(parts[9]).ok_or_else(|| invalid.clone())?;

    let product = Product {
        name: parts[0].to_string(),
        category_id: Some(THERMOCUP_CATEGORY_ID),
        sku: non_empty(parts[1]),
        base_price,
        is_active,
        path_to_photo: non_empty(parts[4]),
        ..Default::default()
    };

    let attributes = ThermocupAttributes {
        product_id: None,
        volume_ml,
        color: parts[6].to_string(),
        brand: parts[7].to_string(),
        model: parts[8].to_string(),
        is_hermetic,
        material: parts[10].to_string(),
    };

    Ok(NewThermocup {
        product,
        attributes,
    })
}

/// Parses a thermocup update line: `id|` followed by a create line
pub fn parse_thermocup_update(input: &str) -> Result<(i64, NewThermocup), InputError> {
    let invalid = InputError::InvalidFormat {
        expected: THERMOCUP_UPDATE_FIELD_COUNT,
    };

    let (id, payload) = input.trim().split_once('|').ok_or_else(|| invalid.clone())?;
    let product_id = parse_id(id).map_err(|_| invalid.clone())?;
    let draft = parse_thermocup_payload(payload).map_err(|_| invalid)?;
    Ok((product_id, draft))
}

/// Parses listing filters: `key=value` pairs separated by `|`
pub fn parse_product_filters(input: &str) -> Result<ProductFilters, InputError> {
    if input.trim().is_empty() {
        return Err(InputError::InvalidFilter);
    }

    input
        .split('|')
        .map(|pair| {
            FILTER_PAIR_REGEX
                .captures(pair)
                .map(|caps| (caps[1].to_string(), caps[2].to_string()))
                .ok_or(InputError::InvalidFilter)
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    value.to_lowercase().parse().ok()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_LINE: &str =
        "Premium Thermo|TH-500-BL|29.99|true|/photos/thermo1.jpg|500|Blue|ThermoBrand|PremiumX|true|Stainless Steel";

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 42 "), Ok(42));
        assert_eq!(parse_id("abc"), Err(InputError::InvalidNumber));
        assert_eq!(parse_id(""), Err(InputError::InvalidNumber));
    }

    #[test]
    fn test_parse_quantity_change() {
        assert_eq!(parse_quantity_change("+33"), Ok(33));
        assert_eq!(parse_quantity_change("-5"), Ok(-5));
        assert_eq!(parse_quantity_change("0"), Err(InputError::ZeroQuantity));
        assert_eq!(parse_quantity_change("-0"), Err(InputError::ZeroQuantity));
        assert_eq!(parse_quantity_change("1.5"), Err(InputError::InvalidNumber));
    }

    #[test]
    fn test_parse_thermocup_payload() {
        let draft = parse_thermocup_payload(VALID_LINE).unwrap();
        assert_eq!(draft.product.name, "Premium Thermo");
        assert_eq!(draft.product.sku.as_deref(), Some("TH-500-BL"));
        assert_eq!(draft.product.category_id, Some(THERMOCUP_CATEGORY_ID));
        assert!(draft.product.is_active);
        assert_eq!(draft.attributes.volume_ml, 500);
        assert_eq!(draft.attributes.material, "Stainless Steel");
        assert!(draft.attributes.is_hermetic);
    }

    #[test]
    fn test_parse_thermocup_payload_rejects_bad_lines() {
        let expected = Err(InputError::InvalidFormat {
            expected: THERMOCUP_FIELD_COUNT,
        });

        // Too few fields
        assert_eq!(parse_thermocup_payload("Mug|SKU|9.99"), expected);
        // Price is not a number
        let bad_price = VALID_LINE.replace("29.99", "cheap");
        assert_eq!(parse_thermocup_payload(&bad_price), expected);
        // Hermetic flag is not a boolean
        let bad_flag = VALID_LINE.replacen("|true|Stainless", "|maybe|Stainless", 1);
        assert_eq!(parse_thermocup_payload(&bad_flag), expected);
    }

    #[test]
    fn test_parse_product_filters() {
        let filters = parse_product_filters("category_id=1|is_active=true").unwrap();
        assert_eq!(
            filters,
            vec![
                ("category_id".to_string(), "1".to_string()),
                ("is_active".to_string(), "true".to_string()),
            ]
        );

        assert_eq!(parse_product_filters(""), Err(InputError::InvalidFilter));
        assert_eq!(parse_product_filters("category_id"), Err(InputError::InvalidFilter));
        assert_eq!(parse_product_filters("a=1|"), Err(InputError::InvalidFilter));
    }

    #[test]
    fn test_parse_thermocup_update() {
        let (product_id, draft) = parse_thermocup_update(&format!("42|{VALID_LINE}")).unwrap();
        assert_eq!(product_id, 42);
        assert_eq!(draft.product.name, "Premium Thermo");
        assert_eq!(draft.attributes.brand, "ThermoBrand");

        let expected = Err(InputError::InvalidFormat {
            expected: THERMOCUP_UPDATE_FIELD_COUNT,
        });
        // Missing id
        assert_eq!(parse_thermocup_update(VALID_LINE), expected);
        // Non-numeric id
        assert_eq!(parse_thermocup_update(&format!("abc|{VALID_LINE}")), expected);
        // Id only
        assert_eq!(parse_thermocup_update("42"), expected);
    }
}
