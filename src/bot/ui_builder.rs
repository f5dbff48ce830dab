//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup};

// Import localization
use crate::localization::{t, t_args};

use crate::pagination::ProductListCache;
use crate::warehouse_model::{CategoryAttributes, Product, ServerAttributes, ThermocupAttributes};

use super::dialogue_manager::KeyboardHint;

pub const BTN_GET_PRODUCTS: &str = "📦 Get products";
pub const BTN_ADD_PRODUCTS: &str = "➕ Add new products";
pub const BTN_UPDATE_PRODUCTS: &str = "✏️ Update products";
pub const BTN_ALL_PRODUCTS: &str = "All products";
pub const BTN_PRODUCTS_BY_ID: &str = "Products by ID";
pub const BTN_THERMOCUPS_BY_ID: &str = "Thermocups by ID";
pub const BTN_SEARCH_BY_FILTER: &str = "Search by filter";
pub const BTN_ADD_THERMAL_MUG: &str = "Add new Thermal mug";
pub const BTN_UPDATE_THERMAL_MUG: &str = "Update thermal mug by ID";
pub const BTN_UPDATE_RESERVED: &str = "Update quantity of reserved product";
pub const BTN_UPDATE_STOCK: &str = "Update product quantity in stock";
pub const BTN_BACK_TO_MAIN: &str = "🔙 Back to Main Menu";
pub const BTN_NEXT_PAGE: &str = "➡️ Next page";
pub const BTN_PREVIOUS_PAGE: &str = "⬅️ Previous page";
pub const BTN_CANCEL: &str = "❌ Cancel";

/// Format a product card with its category attributes
///
/// Every product field is rendered. Thermocup and server attributes get their
/// own block; any other category shows only its label on the category line.
pub fn format_product(product: &Product, attributes: Option<&CategoryAttributes>) -> String {
    let category = match attributes {
        Some(CategoryAttributes::Unknown(label)) => label.clone(),
        _ => product.category().label().to_string(),
    };
    let id = product.id.map(|id| id.to_string()).unwrap_or_else(|| t("value-none"));
    let price = format!("{:.2}", product.base_price);
    let quantity = product.quantity.to_string();
    let reserved = product.num_reserved_goods.to_string();

    let mut lines = vec![
        t_args("product-id", &[("id", &id)]),
        t_args("product-name", &[("name", &product.name)]),
        t_args("product-category", &[("category", &category)]),
        t_args("product-sku", &[("sku", &or_none(product.sku.as_deref()))]),
        t_args("product-price", &[("price", &price)]),
        t_args("product-stock", &[("quantity", &quantity)]),
        t_args("product-reserved", &[("reserved", &reserved)]),
        t_args("product-active", &[("active", &yes_no(product.is_active))]),
        t_args("product-photo", &[("photo", &or_none(product.path_to_photo.as_deref()))]),
    ];

    if let Some(created_at) = product.created_at {
        let timestamp = created_at.format("%Y-%m-%d %H:%M").to_string();
        lines.push(t_args("product-created", &[("timestamp", &timestamp)]));
    }
    if let Some(updated_at) = product.updated_at {
        let timestamp = updated_at.format("%Y-%m-%d %H:%M").to_string();
        lines.push(t_args("product-updated", &[("timestamp", &timestamp)]));
    }

    let mut card = lines.join("\n");
    match attributes {
        Some(CategoryAttributes::Thermocup(thermocup)) => {
            card.push_str("\n\n");
            card.push_str(&format_thermocup_attributes(thermocup));
        }
        Some(CategoryAttributes::Server(server)) => {
            card.push_str("\n\n");
            card.push_str(&format_server_attributes(server));
        }
        Some(CategoryAttributes::Unknown(_)) | None => {}
    }
    card
}

/// Format the thermocup attribute block
pub fn format_thermocup_attributes(attributes: &ThermocupAttributes) -> String {
    let volume = attributes.volume_ml.to_string();
    [
        t("thermocup-attributes-title"),
        t_args("thermocup-volume", &[("volume", &volume)]),
        t_args("thermocup-color", &[("color", &attributes.color)]),
        t_args("thermocup-brand", &[("brand", &attributes.brand)]),
        t_args("thermocup-model", &[("model", &attributes.model)]),
        t_args("thermocup-hermetic", &[("hermetic", &yes_no(attributes.is_hermetic))]),
        t_args("thermocup-material", &[("material", &attributes.material)]),
    ]
    .join("\n")
}

/// Format the server attribute block
pub fn format_server_attributes(attributes: &ServerAttributes) -> String {
    let ram = attributes.ram_gb.to_string();
    let cores = attributes.cpu_cores.to_string();
    let hdd = attributes.hdd_size_gb.to_string();
    let ssd = attributes.ssd_size_gb.to_string();
    [
        t("server-attributes-title"),
        t_args("server-ram", &[("ram", &ram)]),
        t_args("server-cpu", &[("cpu", &attributes.cpu_model), ("cores", &cores)]),
        t_args("server-hdd", &[("hdd", &hdd)]),
        t_args("server-ssd", &[("ssd", &ssd)]),
        t_args("server-form-factor", &[("form", &attributes.form_factor)]),
        t_args("server-manufacturer", &[("manufacturer", &attributes.manufacturer)]),
    ]
    .join("\n")
}

/// One-line product summary used in listings
pub fn format_product_short(product: &Product) -> String {
    let id = product.id.map(|id| id.to_string()).unwrap_or_else(|| t("value-none"));
    let price = format!("{:.2}", product.base_price);
    let quantity = product.quantity.to_string();
    t_args(
        "product-short",
        &[
            ("id", &id),
            ("name", &product.name),
            ("price", &price),
            ("quantity", &quantity),
        ],
    )
}

/// Format the current page of a cached listing
pub fn format_product_page(listing: &ProductListCache) -> String {
    let page = (listing.page() + 1).to_string();
    let pages = listing.total_pages().to_string();
    let total = listing.total_products().to_string();

    let items: Vec<String> = listing.page_items().iter().map(format_product_short).collect();

    format!(
        "{}\n\n{}\n\n{}",
        t_args("products-page-title", &[("page", &page), ("pages", &pages)]),
        items.join("\n\n"),
        t_args("products-total", &[("total", &total)])
    )
}

pub fn welcome_message() -> String {
    format!(
        "{}\n\n{}\n\n{}\n{}\n{}",
        t("welcome-title"),
        t("welcome-choose"),
        BTN_GET_PRODUCTS,
        BTN_ADD_PRODUCTS,
        BTN_UPDATE_PRODUCTS
    )
}

pub fn help_message() -> String {
    [
        t("help-title"),
        t("help-get"),
        t("help-add"),
        t("help-update"),
        t("help-cancel"),
    ]
    .join("\n\n")
}

pub fn products_menu_message() -> String {
    format!(
        "{}\n\n• {}\n• {}\n• {}\n• {}",
        t("menu-products-title"),
        BTN_ALL_PRODUCTS,
        BTN_PRODUCTS_BY_ID,
        BTN_THERMOCUPS_BY_ID,
        BTN_SEARCH_BY_FILTER
    )
}

pub fn add_products_menu_message() -> String {
    format!("{}\n\n• {}", t("menu-add-title"), BTN_ADD_THERMAL_MUG)
}

pub fn update_products_menu_message() -> String {
    format!(
        "{}\n\n• {}\n• {}\n• {}",
        t("menu-update-title"),
        BTN_UPDATE_THERMAL_MUG,
        BTN_UPDATE_RESERVED,
        BTN_UPDATE_STOCK
    )
}

pub fn thermocup_create_instructions() -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}",
        t("prompt-thermocup-create"),
        t("prompt-thermocup-create-fields"),
        t("prompt-thermocup-create-example"),
        t("prompt-thermocup-create-stock-note")
    )
}

pub fn thermocup_update_instructions() -> String {
    format!(
        "{}\n\n{}\n\n{}",
        t("prompt-thermocup-update"),
        t("prompt-thermocup-update-fields"),
        t("prompt-thermocup-update-example")
    )
}

/// Create the reply keyboard for a hint
pub fn create_keyboard(hint: KeyboardHint) -> KeyboardMarkup {
    let rows: Vec<Vec<&str>> = match hint {
        KeyboardHint::MainMenu => vec![
            vec![BTN_GET_PRODUCTS],
            vec![BTN_ADD_PRODUCTS],
            vec![BTN_UPDATE_PRODUCTS],
        ],
        KeyboardHint::ProductsMenu => vec![
            vec![BTN_ALL_PRODUCTS, BTN_PRODUCTS_BY_ID],
            vec![BTN_THERMOCUPS_BY_ID, BTN_SEARCH_BY_FILTER],
            vec![BTN_BACK_TO_MAIN],
        ],
        KeyboardHint::AddProductsMenu => vec![vec![BTN_ADD_THERMAL_MUG], vec![BTN_BACK_TO_MAIN]],
        KeyboardHint::UpdateProductsMenu => vec![
            vec![BTN_UPDATE_THERMAL_MUG],
            vec![BTN_UPDATE_RESERVED],
            vec![BTN_UPDATE_STOCK],
            vec![BTN_BACK_TO_MAIN],
        ],
        KeyboardHint::Pagination => vec![
            vec![BTN_PREVIOUS_PAGE, BTN_NEXT_PAGE],
            vec![BTN_BACK_TO_MAIN, BTN_GET_PRODUCTS],
        ],
        KeyboardHint::Cancel => vec![vec![BTN_CANCEL]],
    };

    let buttons = rows
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    KeyboardMarkup::new(buttons).resize_keyboard()
}

fn yes_no(value: bool) -> String {
    if value {
        t("value-yes")
    } else {
        t("value-no")
    }
}

fn or_none(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => t("value-none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse_model::THERMOCUP_CATEGORY_ID;

    fn thermocup_product() -> Product {
        Product {
            id: Some(42),
            name: "Premium Thermo".to_string(),
            category: Some("Thermocups".to_string()),
            category_id: Some(THERMOCUP_CATEGORY_ID),
            sku: Some("TH-500-BL".to_string()),
            base_price: 29.9,
            is_active: true,
            quantity: 100,
            num_reserved_goods: 7,
            path_to_photo: Some("/photos/thermo1.jpg".to_string()),
            ..Default::default()
        }
    }

    fn thermocup_attributes() -> ThermocupAttributes {
        ThermocupAttributes {
            product_id: Some(42),
            volume_ml: 500,
            color: "Blue".to_string(),
            brand: "ThermoBrand".to_string(),
            model: "PremiumX".to_string(),
            is_hermetic: true,
            material: "Stainless Steel".to_string(),
        }
    }

    #[test]
    fn test_thermocup_card_lists_every_field() {
        let attributes = CategoryAttributes::Thermocup(thermocup_attributes());
        let card = format_product(&thermocup_product(), Some(&attributes));

        for expected in [
            "ID: 42",
            "Name: Premium Thermo",
            "Category: Thermocups",
            "SKU: TH-500-BL",
            "Price: $29.90",
            "In stock: 100",
            "Reserved: 7",
            "Active: Yes",
            "Photo: /photos/thermo1.jpg",
            "Volume: 500 ml",
            "Color: Blue",
            "Brand: ThermoBrand",
            "Model: PremiumX",
            "Hermetic: Yes",
            "Material: Stainless Steel",
        ] {
            assert!(card.contains(expected), "missing {expected:?} in:\n{card}");
        }
    }

    #[test]
    fn test_server_card_uses_units() {
        let product = Product {
            id: Some(7),
            name: "R740".to_string(),
            category_id: Some(2),
            ..Default::default()
        };
        let attributes = CategoryAttributes::Server(ServerAttributes {
            product_id: Some(7),
            ram_gb: 64,
            cpu_model: "Xeon Gold".to_string(),
            cpu_cores: 16,
            hdd_size_gb: 2000,
            ssd_size_gb: 512,
            form_factor: "Rack".to_string(),
            manufacturer: "Dell".to_string(),
        });

        let card = format_product(&product, Some(&attributes));
        assert!(card.contains("Category: Servers"));
        assert!(card.contains("RAM: 64 GB"));
        assert!(card.contains("CPU: Xeon Gold (16 cores)"));
        assert!(card.contains("HDD: 2000 GB"));
        assert!(card.contains("SSD: 512 GB"));
        assert!(card.contains("Form factor: Rack"));
        assert!(card.contains("Manufacturer: Dell"));
    }

    #[test]
    fn test_unknown_category_shows_raw_label_only() {
        let product = Product {
            id: Some(9),
            name: "Cable".to_string(),
            category: Some("Accessories".to_string()),
            ..Default::default()
        };
        let attributes = CategoryAttributes::Unknown("Accessories".to_string());

        let card = format_product(&product, Some(&attributes));
        assert!(card.contains("Category: Accessories"));
        assert!(!card.contains("Attributes:"));
        assert!(!card.contains(" ml"));
        assert!(!card.contains(" GB"));
    }

    #[test]
    fn test_missing_optional_fields_render_placeholder() {
        let product = Product {
            name: "Draft".to_string(),
            ..Default::default()
        };
        let card = format_product(&product, None);
        assert!(card.contains("ID: -"));
        assert!(card.contains("SKU: -"));
        assert!(card.contains("Active: No"));
    }

    #[test]
    fn test_product_page() {
        let products = (1..=3)
            .map(|i| Product {
                id: Some(i),
                name: format!("Mug {i}"),
                base_price: 10.0,
                quantity: i * 10,
                ..Default::default()
            })
            .collect();
        let listing = ProductListCache::new(products, 2).unwrap();

        let page = format_product_page(&listing);
        assert!(page.contains("page 1 of 2"));
        assert!(page.contains("🆔 1 | 📛 Mug 1 | 💰 $10.00 | 📦 10"));
        assert!(page.contains("Mug 2"));
        assert!(!page.contains("Mug 3"));
        assert!(page.contains("Total products: 3"));
    }

    #[test]
    fn test_create_instructions_explain_starting_stock() {
        let instructions = thermocup_create_instructions();
        assert!(instructions.contains("name|sku|base_price"));
        assert!(instructions.contains("zero stock"));
        assert!(instructions.contains(BTN_UPDATE_STOCK));
    }

    #[test]
    fn test_keyboards() {
        let pagination = create_keyboard(KeyboardHint::Pagination);
        assert_eq!(pagination.keyboard.len(), 2);
        assert_eq!(pagination.keyboard[0][0].text, BTN_PREVIOUS_PAGE);

        let update = create_keyboard(KeyboardHint::UpdateProductsMenu);
        assert_eq!(update.keyboard[0][0].text, BTN_UPDATE_THERMAL_MUG);
        assert!(update_products_menu_message().contains(BTN_UPDATE_THERMAL_MUG));

        let cancel = create_keyboard(KeyboardHint::Cancel);
        assert_eq!(cancel.keyboard, vec![vec![KeyboardButton::new(BTN_CANCEL)]]);
    }
}
