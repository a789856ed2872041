use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, User};
use tokio::time;
use tracing::{error, info, warn};

use common::models::{RequestedBy, SignalStyle};
use storage::repositories::{SignalRepository, SubscriptionRepository};
use strategy::pairs::random_pair;
use strategy::session_clock::current_session;
use strategy::SignalRequest;

use crate::bot::keyboards::{self, Action};
use crate::bot::messages;
use crate::bot::{BotState, Command};
use crate::error::{BotError, HandlerResult};

const RECENT_SIGNALS_LIMIT: i64 = 6;

fn user_id(user: &User) -> i64 {
    user.id.0 as i64
}

async fn send_html(bot: &Bot, chat_id: ChatId, text: String) -> HandlerResult {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> HandlerResult {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    if let Err(e) = dispatch_command(&bot, msg.chat.id, &user, cmd, &state).await {
        error!("Command from {} failed: {}", user.id, e);
        let _ = send_html(&bot, msg.chat.id, messages::request_failed()).await;
    }
    Ok(())
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> HandlerResult {
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id));

    let Some(action) = q.data.as_deref().and_then(Action::parse) else {
        warn!("Unknown callback data {:?}", q.data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let answer = match action {
        Action::TradeDone => bot
            .answer_callback_query(q.id.clone())
            .text(messages::trade_recorded()),
        _ => bot.answer_callback_query(q.id.clone()),
    };
    if let Err(e) = answer.await {
        warn!("Failed to answer callback: {}", e);
    }

    if let Err(e) = dispatch_action(&bot, chat_id, &q.from, action, &state).await {
        error!("Callback {} from {} failed: {}", action.as_str(), q.from.id, e);
        let _ = send_html(&bot, chat_id, messages::request_failed()).await;
    }
    Ok(())
}

async fn dispatch_command(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    cmd: Command,
    state: &Arc<BotState>,
) -> HandlerResult {
    match cmd {
        Command::Start => start(bot, chat_id, user, state).await,
        Command::Login(token) => login(bot, chat_id, user, &token, state).await,
        Command::Admin => admin_dashboard(bot, chat_id, user, state).await,
        Command::Signal(args) => signal(bot, chat_id, user, &args, state).await,
        Command::Upgrade => {
            send_html(bot, chat_id, messages::upgrade(&state.config.admin_contact)).await
        }
        Command::Contact => contact(bot, chat_id, state).await,
        Command::Plans => {
            send_html(bot, chat_id, messages::plans(&state.config.admin_contact)).await
        }
        Command::Stats => stats(bot, chat_id, user, state).await,
        Command::Session => {
            send_html(bot, chat_id, messages::session_report(current_session())).await
        }
        Command::Signals => recent_signals(bot, chat_id, state).await,
    }
}

async fn dispatch_action(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    action: Action,
    state: &Arc<BotState>,
) -> HandlerResult {
    match action {
        Action::Session => {
            send_html(bot, chat_id, messages::session_report(current_session())).await
        }
        Action::Signals => recent_signals(bot, chat_id, state).await,
        Action::Stats => stats(bot, chat_id, user, state).await,
        Action::Plans => {
            send_html(bot, chat_id, messages::plans(&state.config.admin_contact)).await
        }
        Action::Contact => contact(bot, chat_id, state).await,
        Action::SignalQuick => signal(bot, chat_id, user, "quick", state).await,
        Action::SignalNormal | Action::AdminSignal => {
            signal(bot, chat_id, user, "", state).await
        }
        Action::AdminRefresh => admin_dashboard(bot, chat_id, user, state).await,
        Action::TradeDone => Ok(()),
    }
}

async fn start(bot: &Bot, chat_id: ChatId, user: &User, state: &BotState) -> HandlerResult {
    let created =
        SubscriptionRepository::start_trial(state.db.pool(), user_id(user), Utc::now()).await?;
    if created {
        info!("Trial started for user {}", user.id);
    }

    let text = messages::welcome(
        &user.first_name,
        current_session(),
        state.pipeline.time_to_entry(),
    );
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

async fn login(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    token: &str,
    state: &BotState,
) -> HandlerResult {
    if token.trim().is_empty() {
        return send_html(bot, chat_id, messages::login_usage()).await;
    }

    let granted = state
        .auth
        .login(user_id(user), user.username.clone(), token, Utc::now())
        .await?;

    let text = if granted {
        messages::login_granted(state.pipeline.time_to_entry())
    } else {
        messages::login_rejected()
    };
    send_html(bot, chat_id, text).await
}

/// Sends the admin-required notice when the user holds no live session.
async fn ensure_admin(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    state: &BotState,
) -> Result<bool, BotError> {
    if state.auth.is_admin(user_id(user), Utc::now()).await? {
        return Ok(true);
    }
    send_html(bot, chat_id, messages::admin_required()).await?;
    Ok(false)
}

async fn admin_dashboard(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    state: &BotState,
) -> HandlerResult {
    if !ensure_admin(bot, chat_id, user, state).await? {
        return Ok(());
    }

    let counts = SignalRepository::counts(state.db.pool()).await?;
    bot.send_message(chat_id, messages::admin_dashboard(&counts, current_session()))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::admin_menu())
        .await?;
    Ok(())
}

async fn signal(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    args: &str,
    state: &Arc<BotState>,
) -> HandlerResult {
    if !ensure_admin(bot, chat_id, user, state).await? {
        return Ok(());
    }

    let request = match SignalRequest::parse(args) {
        Ok(request) => request,
        Err(e) => return send_html(bot, chat_id, messages::invalid_pair(&e)).await,
    };
    let symbol = request
        .symbol
        .unwrap_or_else(|| random_pair(&mut rand::thread_rng()));

    send_html(bot, chat_id, messages::generating(request.style)).await?;

    let pre = match state
        .pipeline
        .announce(symbol, request.style, RequestedBy::Admin)
        .await
    {
        Ok(pre) => pre,
        Err(e) => {
            error!("Admin pre-entry for {} failed: {:#}", symbol, e);
            return send_html(bot, chat_id, messages::pre_entry_failed()).await;
        }
    };
    send_html(bot, chat_id, messages::pre_entry(&pre)).await?;

    let bot = bot.clone();
    let state = state.clone();
    tokio::spawn(async move {
        time::sleep(state.config.pre_entry_delay).await;
        deliver_entry(&bot, chat_id, &pre.signal_id, request.style, &state).await;
    });
    Ok(())
}

async fn deliver_entry(
    bot: &Bot,
    chat_id: ChatId,
    pre_signal_id: &str,
    style: SignalStyle,
    state: &BotState,
) {
    let result = match state.pipeline.enter(pre_signal_id).await {
        Ok(Some(entry)) => bot
            .send_message(chat_id, messages::entry(&entry))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::entry_actions())
            .await
            .map(|_| ())
            .map_err(BotError::from),
        Ok(None) => send_html(bot, chat_id, messages::entry_failed()).await,
        Err(e) => {
            error!("Admin {} entry for {} failed: {:#}", style, pre_signal_id, e);
            send_html(bot, chat_id, messages::entry_failed()).await
        }
    };

    if let Err(e) = result {
        error!("Failed to deliver entry for {}: {}", pre_signal_id, e);
    }
}

async fn contact(bot: &Bot, chat_id: ChatId, state: &BotState) -> HandlerResult {
    let markup = keyboards::contact_menu(state.config.admin_contact_handle())?;
    bot.send_message(chat_id, messages::contact(&state.config.admin_contact))
        .parse_mode(ParseMode::Html)
        .reply_markup(markup)
        .await?;
    Ok(())
}

async fn stats(bot: &Bot, chat_id: ChatId, user: &User, state: &BotState) -> HandlerResult {
    let id = user_id(user);
    let now = Utc::now();
    let text = if state.auth.is_admin(id, now).await? {
        messages::admin_stats()
    } else {
        let subscription = SubscriptionRepository::find(state.db.pool(), id).await?;
        messages::user_stats(subscription.as_ref(), now)
    };
    send_html(bot, chat_id, text).await
}

async fn recent_signals(bot: &Bot, chat_id: ChatId, state: &BotState) -> HandlerResult {
    let signals = SignalRepository::recent(state.db.pool(), RECENT_SIGNALS_LIMIT).await?;
    send_html(bot, chat_id, messages::recent_signals(&signals)).await
}
