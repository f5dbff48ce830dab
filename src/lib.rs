//! # Warehouse Telegram Bot
//!
//! A Telegram bot front end for a warehouse inventory service: browse and
//! search products, register new thermal mugs, and adjust stock and
//! reserved quantities through guided multi-step conversations.

pub mod bot;
pub mod bot_config;
pub mod dialogue;
pub mod input_patterns;
pub mod localization;
pub mod pagination;
pub mod session_store;
pub mod warehouse_client;
pub mod warehouse_errors;
pub mod warehouse_model;
