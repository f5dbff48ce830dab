//! # Localization Tests
//!
//! This module contains unit tests for the localization functionality,
//! testing message retrieval and formatting with various edge cases.

use warehouse_bot::localization::{init_localization, t, t_args, LocalizationManager};

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        // Create a new localization manager for each test
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message("unknown-command", None);
        assert_eq!(
            message,
            "Unknown command. Please use the menu buttons or type /start to see available options."
        );
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message("nonexistent-key", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let message = manager.get_message_with_args(
            "stock-updated",
            &[("product", "42"), ("warehouse", "1"), ("change", "+33")],
        );
        assert!(message.contains("Product 42"));
        assert!(message.contains("warehouse 1"));
        assert!(message.contains("change +33"));
        // Isolation marks would show up as stray characters in Telegram
        assert!(!message.contains('\u{2068}'));
    }

    #[test]
    fn test_missing_argument_keeps_placeholder_name() {
        let manager = setup_localization();

        let message = manager.get_message_with_args("thermocup-created", &[]);
        assert!(message.starts_with("✅ Thermocup created successfully"));
        assert!(message.contains("product"));
    }

    #[test]
    fn test_global_helpers() {
        init_localization().expect("Bundled messages should load");

        assert_eq!(t("value-yes"), "Yes");
        assert_eq!(
            t_args("products-page-title", &[("page", "2"), ("pages", "3")]),
            "📦 Products (page 2 of 3):"
        );
    }

    #[test]
    fn test_every_prompt_is_defined() {
        let manager = setup_localization();

        for key in [
            "prompt-product-id",
            "prompt-thermocup-id",
            "prompt-filter",
            "prompt-thermocup-create",
            "prompt-stock-product-id",
            "prompt-stock-warehouse-id",
            "prompt-stock-quantity",
            "prompt-reserved-product-id",
            "prompt-reserved-quantity",
            "error-session-expired",
            "error-upstream",
        ] {
            let message = manager.get_message(key, None);
            assert!(!message.starts_with("Missing"), "{key} is not defined");
        }
    }
}
