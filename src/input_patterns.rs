//! # Input Patterns Module
//!
//! This module contains regex patterns used to read free-text chat input.

use lazy_static::lazy_static;
use regex::Regex;

/// A single `key=value` listing filter; keys are query-parameter names
pub const FILTER_PAIR_PATTERN: &str = r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(\S(?:.*\S)?)\s*$";

/// Emoji and punctuation decorating a menu button label (e.g. "📦 ", "➡️ ")
pub const MENU_PREFIX_PATTERN: &str = r"^[^\p{L}\p{N}/]+";

lazy_static! {
    pub static ref FILTER_PAIR_REGEX: Regex =
        Regex::new(FILTER_PAIR_PATTERN).expect("Filter pair pattern should be valid");
    pub static ref MENU_PREFIX_REGEX: Regex =
        Regex::new(MENU_PREFIX_PATTERN).expect("Menu prefix pattern should be valid");
}
