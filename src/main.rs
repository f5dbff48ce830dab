use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warehouse_bot::bot::{self, DialogueManager};
use warehouse_bot::bot_config::BotConfig;
use warehouse_bot::localization::init_localization;
use warehouse_bot::session_store::InMemorySessionStore;
use warehouse_bot::warehouse_client::WarehouseClient;

/// Initialize tracing; `LOG_FORMAT=json` switches to structured JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,warehouse_bot=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Warehouse Telegram Bot");

    let config = BotConfig::from_env()?;
    info!(config = ?config, "Configuration loaded");

    init_localization()?;

    let warehouse = Arc::new(WarehouseClient::new(
        &config.warehouse_service_url,
        config.request_timeout(),
    )?);
    let sessions = Arc::new(InMemorySessionStore::new(config.session.idle_timeout()));
    let manager = Arc::new(DialogueManager::new(
        warehouse,
        sessions,
        config.session.page_size,
    ));

    // Sweep idle sessions in the background
    {
        let manager = Arc::clone(&manager);
        let sweep_interval = config.session.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                manager.sweep_idle();
            }
        });
    }

    let bot = Bot::new(config.bot_token.clone());

    info!(bot_username = %config.bot_username, "Bot initialized, starting dispatcher");

    let handler = dptree::entry().branch(Update::filter_message().endpoint({
        let manager = Arc::clone(&manager);
        move |bot: Bot, msg: Message| {
            let manager = Arc::clone(&manager);
            async move { bot::message_handler(bot, msg, manager).await }
        }
    }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
