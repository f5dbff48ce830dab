use anyhow::Result;

use warehouse_bot::dialogue::{
    parse_product_filters, parse_quantity_change, parse_thermocup_payload,
    parse_thermocup_update, InputError, THERMOCUP_FIELD_COUNT, THERMOCUP_UPDATE_FIELD_COUNT,
};
use warehouse_bot::warehouse_model::ProductCategory;

/// Lines typed on a phone often carry spaces around the separators
#[test]
fn test_thermocup_payload_with_padded_fields() -> Result<()> {
    let draft = parse_thermocup_payload(
        " Premium Thermo | TH-500-BL | 29.99 | TRUE | /photos/thermo1.jpg | 500 | Blue | ThermoBrand | PremiumX | False | Stainless Steel ",
    )?;

    assert_eq!(draft.product.name, "Premium Thermo");
    assert_eq!(draft.product.category(), ProductCategory::Thermocups);
    assert!(draft.product.is_active);
    assert!(!draft.attributes.is_hermetic);
    assert_eq!(draft.attributes.color, "Blue");

    Ok(())
}

#[test]
fn test_thermocup_payload_edge_cases() {
    let invalid = Err(InputError::InvalidFormat {
        expected: THERMOCUP_FIELD_COUNT,
    });

    // One field too many
    assert_eq!(
        parse_thermocup_payload("a|b|1|true|p|500|c|d|e|true|f|extra"),
        invalid
    );
    // Volume is not a whole number
    assert_eq!(parse_thermocup_payload("a|b|1|true|p|big|c|d|e|true|f"), invalid);
    // Infinite price
    assert_eq!(parse_thermocup_payload("a|b|inf|true|p|500|c|d|e|true|f"), invalid);

    // Empty optional text fields are dropped rather than sent as ""
    let draft = parse_thermocup_payload("Mug||1|true||500|c|d|e|true|f").unwrap();
    assert!(draft.product.sku.is_none());
    assert!(draft.product.path_to_photo.is_none());
}

/// The update line reuses the create line's field rules after the id
#[test]
fn test_update_line_follows_create_rules() {
    let invalid = Err(InputError::InvalidFormat {
        expected: THERMOCUP_UPDATE_FIELD_COUNT,
    });

    assert_eq!(
        parse_thermocup_update("7|a|b|cheap|true|p|500|c|d|e|true|f"),
        invalid
    );
    assert_eq!(parse_thermocup_update(""), invalid);

    let (product_id, update) =
        parse_thermocup_update(" 7 | Mug | SKU | 5.50 | false | /p.jpg | 250 | Red | B | M | true | Glass ")
            .unwrap();
    assert_eq!(product_id, 7);
    assert!(!update.product.is_active);
    assert_eq!(update.attributes.volume_ml, 250);
}

#[test]
fn test_quantity_change_bounds() {
    assert_eq!(parse_quantity_change(" 15 "), Ok(15));
    assert_eq!(parse_quantity_change(""), Err(InputError::InvalidNumber));
    assert_eq!(
        parse_quantity_change("99999999999"),
        Err(InputError::InvalidNumber)
    );
}

#[test]
fn test_filters_keep_typed_order_and_trim() -> Result<()> {
    let filters = parse_product_filters("is_active = true | category_id=1")?;
    assert_eq!(
        filters,
        vec![
            ("is_active".to_string(), "true".to_string()),
            ("category_id".to_string(), "1".to_string()),
        ]
    );

    // Keys must look like query parameter names
    assert_eq!(
        parse_product_filters("1st=2"),
        Err(InputError::InvalidFilter)
    );

    Ok(())
}
