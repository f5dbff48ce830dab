//! # Bot Configuration Module
//!
//! This module defines the startup configuration of the bot: Telegram
//! credentials, the warehouse service location, and session tuning.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// Constants for bot configuration
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60; // 30 minutes
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

/// Per-chat session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of products shown per page of a listing
    pub page_size: usize,
    /// Idle time after which a chat's flow and listing are discarded
    pub idle_timeout_secs: u64,
    /// How often idle sessions are swept
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            idle_timeout_secs: DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
            sweep_interval_secs: DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Complete bot configuration
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub bot_username: String,
    /// Base URL of the warehouse REST service, without trailing slash
    pub warehouse_service_url: String,
    /// Connect and request timeout for warehouse calls in seconds
    pub request_timeout_secs: u64,
    pub session: SessionConfig,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("bot_username", &self.bot_username)
            .field("warehouse_service_url", &self.warehouse_service_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("session", &self.session)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Required: `TELEGRAM_BOT_TOKEN`, `TELEGRAM_BOT_USERNAME`, `WAREHOUSE_SERVICE_URL`.
    /// Optional: `WAREHOUSE_TIMEOUT_SECS`, `PRODUCTS_PAGE_SIZE`,
    /// `SESSION_IDLE_TIMEOUT_SECS`, `SESSION_SWEEP_INTERVAL_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let defaults = SessionConfig::default();
        let page_size: usize = optional(&lookup, "PRODUCTS_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            return Err(anyhow!("PRODUCTS_PAGE_SIZE must be greater than zero"));
        }
        let sweep_interval_secs: u64 = optional(
            &lookup,
            "SESSION_SWEEP_INTERVAL_SECS",
            defaults.sweep_interval_secs,
        )?;
        if sweep_interval_secs == 0 {
            return Err(anyhow!("SESSION_SWEEP_INTERVAL_SECS must be greater than zero"));
        }

        Ok(Self {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            bot_username: required("TELEGRAM_BOT_USERNAME")?,
            warehouse_service_url: required("WAREHOUSE_SERVICE_URL")?
                .trim_end_matches('/')
                .to_string(),
            request_timeout_secs: optional(
                &lookup,
                "WAREHOUSE_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            session: SessionConfig {
                page_size,
                idle_timeout_secs: optional(
                    &lookup,
                    "SESSION_IDLE_TIMEOUT_SECS",
                    defaults.idle_timeout_secs,
                )?,
                sweep_interval_secs,
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn optional<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => value
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TELEGRAM_BOT_USERNAME", "warehouse_bot"),
        ("WAREHOUSE_SERVICE_URL", "http://localhost:8080/"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = BotConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.warehouse_service_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.session.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_missing_required_value() {
        let err = BotConfig::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("WAREHOUSE_SERVICE_URL"));
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PRODUCTS_PAGE_SIZE", "5"));
        pairs.push(("WAREHOUSE_TIMEOUT_SECS", "2"));
        let config = BotConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.session.page_size, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(2));

        let mut bad = REQUIRED.to_vec();
        bad.push(("PRODUCTS_PAGE_SIZE", "zero"));
        assert!(BotConfig::from_lookup(lookup_from(&bad)).is_err());

        let mut zero = REQUIRED.to_vec();
        zero.push(("PRODUCTS_PAGE_SIZE", "0"));
        assert!(BotConfig::from_lookup(lookup_from(&zero)).is_err());

        let mut no_sweep = REQUIRED.to_vec();
        no_sweep.push(("SESSION_SWEEP_INTERVAL_SECS", "0"));
        assert!(BotConfig::from_lookup(lookup_from(&no_sweep)).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("123:abc"));
        assert!(debug.contains("<redacted>"));
    }
}
