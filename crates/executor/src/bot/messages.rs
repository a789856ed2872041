//! HTML message bodies sent by the bot.

use chrono::{DateTime, Local, Utc};
use teloxide::utils::html::escape;

use common::models::{
    Direction, RequestedBy, Signal, SignalCounts, SignalStyle, SignalSummary, SignalType,
    Subscription,
};
use strategy::session_clock::SESSIONS;
use strategy::{InvalidPair, SessionStatus};

const RECENT_SIGNALS_HEADER: &str = "📡 <b>RECENT TRADING SIGNALS</b>\n\n";

fn direction_emoji(direction: Direction) -> &'static str {
    match direction {
        Direction::Buy => "🟢",
        Direction::Sell => "🔴",
    }
}

fn style_emoji(style: SignalStyle) -> &'static str {
    match style {
        SignalStyle::Quick => "⚡",
        SignalStyle::Normal => "📈",
    }
}

fn percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn welcome(first_name: &str, session: SessionStatus, delay_secs: u32) -> String {
    format!(
        "🎉 <b>Welcome to FX Signal Desk, {}!</b>\n\n\
Your 3-day free trial is active.\n\n\
🕒 <b>Current Market:</b> {}\n\n\
📊 <b>Signal System:</b>\n\
• ⚡ Quick Trade signals ({}s pre-entry)\n\
• 📈 Normal signals with detailed analysis\n\
• 🕯️ Candle-based entry confirmation\n\n\
💡 <b>Commands:</b>\n\
• /session - Market hours\n\
• /signals - Recent signals\n\
• /stats - Account status\n\
• /plans - Upgrade options\n\
• /contact - Admin support",
        escape(first_name),
        session.name(),
        delay_secs
    )
}

pub fn login_usage() -> String {
    "🔐 <b>Admin Login</b>\n\nUsage: <code>/login YOUR_ADMIN_TOKEN</code>".to_string()
}

pub fn login_granted(delay_secs: u32) -> String {
    format!(
        "✅ <b>Admin Access Granted!</b>\n\n\
🎯 <b>Admin Commands:</b>\n\
• <code>/signal</code> - Normal signal\n\
• <code>/signal quick</code> - Quick Trade signal\n\
• <code>/signal EUR/USD</code> - Specific pair\n\
• <code>/signal EUR/USD quick</code> - Quick trade on a pair\n\n\
<i>{}s pre-entry system active.</i>",
        delay_secs
    )
}

pub fn login_rejected() -> String {
    "❌ <b>Invalid admin token</b>".to_string()
}

pub fn admin_required() -> String {
    "❌ Admin access required. Use <code>/login YOUR_TOKEN</code>".to_string()
}

pub fn admin_dashboard(counts: &SignalCounts, session: SessionStatus) -> String {
    format!(
        "🏢 <b>ADMIN DASHBOARD</b>\n\n\
📊 <b>Statistics:</b>\n\
• Total Users: {}\n\
• Total Signals: {}\n\
• Quick Trades: {}\n\
• Current Session: {} ({})\n\n\
🎯 <b>Signal Commands:</b>\n\
• <code>/signal</code> - Normal trade\n\
• <code>/signal quick</code> - Quick Trade\n\
• <code>/signal EUR/USD</code> - Specific pair\n\
• <code>/signal EUR/USD quick</code> - Quick specific",
        counts.users,
        counts.signals,
        counts.quick_signals,
        session.name(),
        session.id()
    )
}

pub fn generating(style: SignalStyle) -> String {
    format!("🎯 <b>Generating {} signal...</b>", style)
}

pub fn invalid_pair(err: &InvalidPair) -> String {
    format!("❌ {}", escape(&err.to_string()))
}

pub fn signal_alert(signal: &Signal) -> String {
    if signal.is_entry() {
        entry(signal)
    } else {
        pre_entry(signal)
    }
}

pub fn pre_entry(signal: &Signal) -> String {
    let analysis = &signal.analysis;
    format!(
        "{} <b>PRE-ENTRY SIGNAL</b> - {}\n\
<i>Entry in {}s</i>\n\n\
{} <b>{}</b> | <b>{}</b>\n\
💵 <b>Expected Entry:</b> <code>{:.5}</code>\n\
🎯 <b>Confidence:</b> {}\n\n\
📊 <b>Candle Analysis:</b>\n\
{}\n\
• Timeframe: {}\n\
• Momentum: {}\n\
• Risk Rating: {}\n\n\
💡 <b>Market Condition:</b>\n\
{}\n\n\
⏰ <i>Entry signal coming in {} seconds...</i>",
        style_emoji(signal.signal_style),
        signal.signal_style,
        signal.time_to_entry,
        direction_emoji(signal.direction),
        signal.symbol,
        signal.direction,
        signal.entry_price,
        percent(signal.confidence),
        analysis.candle_pattern,
        analysis.timeframe,
        analysis.momentum,
        analysis.risk_rating,
        analysis.market_condition,
        signal.time_to_entry
    )
}

pub fn entry(signal: &Signal) -> String {
    format!(
        "🎯 <b>ENTRY SIGNAL</b> - {}\n\
<b>EXECUTE NOW</b>\n\n\
{} <b>{}</b> | <b>{}</b>\n\
💵 <b>Entry Price:</b> <code>{:.5}</code>\n\
✅ <b>Take Profit:</b> <code>{:.5}</code>\n\
❌ <b>Stop Loss:</b> <code>{:.5}</code>\n\n\
📈 <b>Trade Details:</b>\n\
• Confidence: <b>{}</b>\n\
• Risk/Reward: <b>1:{}</b>\n\
• Style: <b>{}</b> {}",
        signal.signal_style,
        direction_emoji(signal.direction),
        signal.symbol,
        signal.direction,
        signal.entry_price,
        signal.take_profit,
        signal.stop_loss,
        percent(signal.confidence),
        signal.risk_reward,
        signal.signal_style,
        style_emoji(signal.signal_style)
    )
}

pub fn entry_failed() -> String {
    "❌ Failed to generate entry signal".to_string()
}

pub fn pre_entry_failed() -> String {
    "❌ Failed to generate pre-entry signal".to_string()
}

pub fn session_report(status: SessionStatus) -> String {
    match status {
        SessionStatus::Open(session) => format!(
            "🕒 <b>{}</b> ✅ ACTIVE\n\n\
⏰ Hours: {:02}:00-{:02}:00\n\
📊 Volatility: {}\n\
🎯 Accuracy: {}%\n\
💎 Pairs: {}\n\n\
<i>Signals are live.</i>",
            session.name,
            session.start_hour,
            session.end_hour,
            session.volatility,
            session.accuracy,
            session.pairs.join(", ")
        ),
        SessionStatus::Closed => {
            let mut message =
                String::from("🕒 <b>MARKET CLOSED</b>\n\n<b>Next Trading Sessions:</b>\n\n");
            for session in SESSIONS.iter() {
                message.push_str(&format!(
                    "<b>{} SESSION</b> ({:02}:00-{:02}:00)\n\
• Volatility: {}\n\
• Accuracy: {}%\n\
• Pairs: {}\n\n",
                    session.id,
                    session.start_hour,
                    session.end_hour,
                    session.volatility,
                    session.accuracy,
                    session.pairs.join(", ")
                ));
            }
            message.push_str("<i>Signals auto-resume in session hours.</i>");
            message
        }
    }
}

pub fn recent_signals(signals: &[SignalSummary]) -> String {
    if signals.is_empty() {
        return "📭 No signals yet. Check during session hours!".to_string();
    }

    let mut message = String::from(RECENT_SIGNALS_HEADER);
    for s in signals {
        let type_emoji = match s.signal_type {
            SignalType::PreEntry => "📊",
            SignalType::Entry => "🎯",
        };
        let admin_badge = if s.requested_by == RequestedBy::Admin {
            " 👑"
        } else {
            ""
        };

        message.push_str(&format!(
            "{} {} {}{}\n{} {} | 💵 {} | {}\n⏰ {}\n\n",
            type_emoji,
            direction_emoji(s.direction),
            s.symbol,
            admin_badge,
            style_emoji(s.signal_style),
            s.signal_style,
            s.entry_price,
            percent(s.confidence),
            s.created_at.with_timezone(&Local).format("%H:%M")
        ));
    }
    message
}

pub fn upgrade(contact: &str) -> String {
    format!(
        "💎 <b>UPGRADE YOUR ACCOUNT</b>\n\n\
<b>Contact admin for premium features:</b>\n\
{}",
        escape(contact)
    )
}

pub fn contact(contact: &str) -> String {
    format!(
        "📞 <b>CONTACT ADMIN</b>\n\n\
<b>Direct Contact:</b> {}\n\n\
💡 <b>Premium Support:</b>\n\
• Quick Trade signals\n\
• All session access\n\
• Priority support",
        escape(contact)
    )
}

pub fn plans(contact: &str) -> String {
    format!(
        "💎 <b>PREMIUM PLANS</b>\n\n\
🌅 <b>BASIC</b> - $19/month\n\
• Morning Session\n\
• 10 signals/day\n\n\
🌇 <b>PRO</b> - $49/month\n\
• Morning + Evening\n\
• 25 signals/day\n\n\
🌃 <b>VIP</b> - $99/month\n\
• All Sessions\n\
• 50 signals/day\n\n\
🌟 <b>PREMIUM</b> - $199/month\n\
• 24/7 Access\n\
• Unlimited signals\n\n\
<i>Contact {} to upgrade.</i>",
        escape(contact)
    )
}

pub fn admin_stats() -> String {
    "📊 <b>ADMIN STATS</b> 👑\n\n\
• Full system access\n\
• Quick Trade signals\n\
• 24/7 generation"
        .to_string()
}

pub fn user_stats(subscription: Option<&Subscription>, now: DateTime<Utc>) -> String {
    let Some(sub) = subscription else {
        return "📊 <b>YOUR ACCOUNT STATS</b>\n\n\
No subscription yet. Send /start to activate your free trial."
            .to_string();
    };

    let status = if sub.is_active(now) {
        "✅ ACTIVE"
    } else {
        "⛔ EXPIRED"
    };

    format!(
        "📊 <b>YOUR ACCOUNT STATS</b>\n\n\
• Plan: {} ({})\n\
• Signals left today: {} of {}\n\
• Sessions: {}\n\
• Valid until: {}\n\n\
<i>Upgrade for more features.</i>",
        sub.plan_type,
        status,
        sub.signals_remaining(),
        sub.max_daily_signals,
        sub.allowed_sessions.join(", "),
        sub.end_date.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    )
}

pub fn trade_recorded() -> String {
    "✅ Trade marked as executed".to_string()
}

pub fn request_failed() -> String {
    "❌ Something went wrong, please try again later".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use strategy::services::signal_generator::{build_entry, build_pre_entry};
    use strategy::session_clock::session_at_hour;

    fn pre_signal() -> Signal {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 9, 15, 0).unwrap();
        build_pre_entry(
            &mut rng,
            "EUR/USD",
            SignalStyle::Quick,
            RequestedBy::Admin,
            40,
            now,
        )
    }

    #[test]
    fn test_pre_entry_mentions_countdown() {
        let signal = pre_signal();
        let text = signal_alert(&signal);

        assert!(text.contains("PRE-ENTRY SIGNAL"));
        assert!(text.contains("Entry in 40s"));
        assert!(text.contains("EUR/USD"));
        assert!(text.contains(&format!("{:.5}", signal.entry_price)));
        assert!(!text.contains("Take Profit"));
    }

    #[test]
    fn test_entry_lists_levels() {
        let pre = pre_signal();
        let entry = build_entry(&pre, pre.created_at);
        let text = signal_alert(&entry);

        assert!(text.contains("ENTRY SIGNAL"));
        assert!(text.contains(&format!("{:.5}", entry.take_profit)));
        assert!(text.contains(&format!("{:.5}", entry.stop_loss)));
        assert!(text.contains(&format!("1:{}", entry.risk_reward)));
    }

    #[test]
    fn test_session_report_open_and_closed() {
        let open = session_report(session_at_hour(9));
        assert!(open.contains("European Session"));
        assert!(open.contains("08:00-12:00"));

        let closed = session_report(session_at_hour(14));
        assert!(closed.contains("MARKET CLOSED"));
        for id in ["MORNING", "EVENING", "ASIAN"] {
            assert!(closed.contains(id));
        }
    }

    #[test]
    fn test_recent_signals_listing() {
        assert!(recent_signals(&[]).starts_with("📭"));

        let summary_time = Utc.with_ymd_and_hms(2025, 6, 3, 17, 5, 0).unwrap();

        let summary = SignalSummary {
            symbol: "GBP/USD".to_string(),
            signal_type: SignalType::Entry,
            direction: Direction::Sell,
            entry_price: 1.2612,
            confidence: 0.912,
            signal_style: SignalStyle::Normal,
            requested_by: RequestedBy::Admin,
            created_at: summary_time,
        };
        let text = recent_signals(&[summary]);
        assert!(text.starts_with(RECENT_SIGNALS_HEADER));
        assert!(text.contains("GBP/USD 👑"));
        assert!(text.contains("91.2%"));
        let local = summary_time.with_timezone(&Local).format("%H:%M").to_string();
        assert!(text.contains(&format!("⏰ {}", local)));
    }

    #[test]
    fn test_user_input_is_escaped() {
        let text = welcome("<script>", session_at_hour(14), 40);
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("Market Closed"));
    }

    #[test]
    fn test_invalid_pair_message() {
        let err = strategy::SignalRequest::parse("BTC/USD").unwrap_err();
        let text = invalid_pair(&err);
        assert!(text.contains("BTC/USD"));
        assert!(text.contains("XAU/USD"));
    }

    #[test]
    fn test_user_stats_reflect_subscription() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let mut sub = Subscription::trial(42, start);
        sub.signals_used = 2;

        let text = user_stats(Some(&sub), start + Duration::days(1));
        assert!(text.contains("TRIAL (✅ ACTIVE)"));
        assert!(text.contains("Signals left today: 3 of 5"));
        assert!(text.contains("Sessions: MORNING"));

        let expired = user_stats(Some(&sub), start + Duration::days(4));
        assert!(expired.contains("EXPIRED"));
    }

    #[test]
    fn test_user_stats_without_subscription() {
        let text = user_stats(None, Utc::now());
        assert!(text.contains("/start"));
    }

    #[test]
    fn test_signal_alert_picks_phase() {
        let pre = pre_signal();
        let entry = build_entry(&pre, pre.created_at);

        assert!(signal_alert(&pre).contains("PRE-ENTRY SIGNAL"));
        assert!(signal_alert(&entry).contains("EXECUTE NOW"));
    }

    #[test]
    fn test_dashboard_counts_and_session() {
        let counts = SignalCounts {
            users: 12,
            signals: 30,
            quick_signals: 9,
        };
        let text = admin_dashboard(&counts, session_at_hour(17));

        assert!(text.contains("Total Users: 12"));
        assert!(text.contains("Quick Trades: 9"));
        assert!(text.contains("Current Session: NY/London Overlap (EVENING)"));
    }
}
