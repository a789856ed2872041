use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use common::config::Config;
use storage::Database;

use crate::services::{AdminAuth, SignalPipeline};

pub mod handlers;
pub mod keyboards;
pub mod messages;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start your free trial")]
    Start,
    #[command(description = "admin login with a token")]
    Login(String),
    #[command(description = "admin dashboard")]
    Admin,
    #[command(description = "generate a signal: [pair] [quick]")]
    Signal(String),
    #[command(description = "upgrade your account")]
    Upgrade,
    #[command(description = "contact the admin")]
    Contact,
    #[command(description = "subscription plans")]
    Plans,
    #[command(description = "account stats")]
    Stats,
    #[command(description = "current market session")]
    Session,
    #[command(description = "recent signals")]
    Signals,
}

/// Shared by every update handler.
pub struct BotState {
    pub config: Config,
    pub db: Database,
    pub auth: AdminAuth,
    pub pipeline: SignalPipeline,
}

impl BotState {
    pub fn new(config: Config, db: Database, pipeline: SignalPipeline) -> Self {
        let auth = AdminAuth::new(db.clone(), &config);
        Self {
            config,
            db,
            auth,
            pipeline,
        }
    }
}

/// Polls for updates until Ctrl-C.
pub async fn run(bot: Bot, state: Arc<BotState>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        error!("Failed to register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handlers::handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

    info!("Bot dispatcher started");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/login s3cret", "bot").unwrap(),
            Command::Login("s3cret".to_string())
        );
        assert_eq!(
            Command::parse("/signal EUR/USD quick", "bot").unwrap(),
            Command::Signal("EUR/USD quick".to_string())
        );
        assert_eq!(Command::parse("/signals", "bot").unwrap(), Command::Signals);
    }
}
