use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::Bot;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use common::config::Config;
use common::logger;
use common::models::Signal;
use storage::Database;
use strategy::SignalGenerator;

use crate::bot::BotState;
use crate::error::BotError;
use crate::services::{AutoSignalService, SignalPipeline, TelegramService};

mod bot;
mod error;
mod services;

#[tokio::main]
async fn main() -> Result<(), BotError> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = Config::from_env()?;

    let db = Database::open(&config.db_path).await?;

    let generator = Arc::new(SignalGenerator::new(config.pre_entry_delay));
    let pipeline = SignalPipeline::new(generator, Arc::new(db.clone()));

    let bot = Bot::new(&config.bot_token);
    let shutdown = CancellationToken::new();
    let mut tasks = Vec::new();

    if config.auto_signals {
        let (notify_tx, _) = broadcast::channel::<Signal>(64);

        if let Some(chat_id) = config.signal_chat_id {
            let feed = TelegramService::new(bot.clone(), chat_id);
            tasks.push(tokio::spawn(feed.start(notify_tx.subscribe())));
        }

        let auto = AutoSignalService::new(pipeline.clone(), &config).with_notifier(notify_tx);
        tasks.push(tokio::spawn(auto.start(shutdown.clone())));
    } else {
        warn!("Automatic signal generation disabled");
    }

    let state = Arc::new(BotState::new(config, db, pipeline));
    bot::run(bot, state).await;

    shutdown.cancel();
    for task in tasks {
        let _ = task.await;
    }

    info!("Shutdown complete");
    Ok(())
}
