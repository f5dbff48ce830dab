//! Menu commands recognized from reply-keyboard buttons and slash commands

use crate::input_patterns::MENU_PREFIX_REGEX;

/// A top-level menu action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Start,
    Help,
    BackToMainMenu,
    Cancel,
    NextPage,
    PreviousPage,
    GetProducts,
    AllProducts,
    ProductsById,
    ThermocupsById,
    SearchByFilter,
    AddNewProducts,
    AddThermalMug,
    UpdateProducts,
    UpdateThermalMug,
    UpdateReservedQuantity,
    UpdateStockQuantity,
}

impl MenuCommand {
    /// Recognizes a command from a button label or slash command.
    ///
    /// Leading emoji are ignored and matching is case-insensitive, so both
    /// "📦 Get products" and "get products" resolve to `GetProducts`.
    /// `/start@warehouse_bot` resolves like `/start`.
    pub fn parse(text: &str) -> Option<Self> {
        let label = MENU_PREFIX_REGEX.replace(text.trim(), "");
        let mut label = label.trim().to_lowercase();
        if label.starts_with('/') {
            if let Some(at) = label.find('@') {
                label.truncate(at);
            }
        }

        let command = match label.as_str() {
            "/start" => MenuCommand::Start,
            "/help" | "help" => MenuCommand::Help,
            "back to main menu" => MenuCommand::BackToMainMenu,
            "/cancel" | "cancel" => MenuCommand::Cancel,
            "next page" => MenuCommand::NextPage,
            "previous page" => MenuCommand::PreviousPage,
            "get products" => MenuCommand::GetProducts,
            "all products" => MenuCommand::AllProducts,
            "products by id" => MenuCommand::ProductsById,
            "thermocups by id" => MenuCommand::ThermocupsById,
            "search by filter" => MenuCommand::SearchByFilter,
            "add new products" => MenuCommand::AddNewProducts,
            "add new thermal mug" => MenuCommand::AddThermalMug,
            "update products" => MenuCommand::UpdateProducts,
            "update thermal mug by id" => MenuCommand::UpdateThermalMug,
            "update quantity of reserved product" => MenuCommand::UpdateReservedQuantity,
            "update product quantity in stock" => MenuCommand::UpdateStockQuantity,
            _ => return None,
        };
        Some(command)
    }
}
