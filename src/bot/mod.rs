//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: Recognizes menu buttons and slash commands
//! - `dialogue_manager`: The per-chat conversation state machine
//! - `message_handler`: Handles incoming messages and sends the reply
//! - `ui_builder`: Creates keyboards and formats messages

pub mod commands;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use message_handler::message_handler;

pub use commands::MenuCommand;
pub use dialogue_manager::{BotReply, DialogueManager, KeyboardHint};
pub use ui_builder::{create_keyboard, format_product, format_product_page};
