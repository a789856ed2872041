use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::broadcast;
use tracing::{error, info};

use common::models::Signal;

use crate::bot::messages;

/// Forwards generated signals to a fixed chat.
pub struct TelegramService {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramService {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }

    pub async fn start(self, mut rx: broadcast::Receiver<Signal>) {
        info!("Starting Telegram signal feed for chat {}", self.chat_id);

        loop {
            match rx.recv().await {
                Ok(signal) => {
                    let text = messages::signal_alert(&signal);
                    if let Err(e) = self
                        .bot
                        .send_message(self.chat_id, text)
                        .parse_mode(ParseMode::Html)
                        .await
                    {
                        error!("Failed to send signal {}: {}", signal.signal_id, e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    error!("Signal feed lagged behind. Missed {} signals.", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Signal channel closed. Stopping feed.");
                    break;
                }
            }
        }
    }
}
