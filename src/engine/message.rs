//! # engine::message
//!
//! Renders a processed signal for humans: the Telegram HTML message (Chinese,
//! English or both) and the spreadsheet row.  Times are shown in UTC+8, which
//! is also what the trading-session label is keyed on.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use crate::config::Language;
use crate::models::{Direction, PriceNote, ReconciledPrice, RiskPlan, Sentiment, TradingSignal};

/// Display timezone offset (UTC+8).
const DISPLAY_OFFSET_HOURS: i64 = 8;

// ─── Trading Session ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingSession {
    Asia,
    Europe,
    NewYork,
    Other,
}

impl TradingSession {
    /// First match wins, so the Asia/Europe overlap (15–16h) reads as Asia and
    /// the Europe/New York overlap (21–22h) as Europe.
    pub fn from_hour(hour: u32) -> Self {
        if (9..17).contains(&hour) {
            TradingSession::Asia
        } else if (15..23).contains(&hour) {
            TradingSession::Europe
        } else if hour >= 21 || hour < 5 {
            TradingSession::NewYork
        } else {
            TradingSession::Other
        }
    }

    fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (TradingSession::Asia, Language::Zh) => "亞洲盤",
            (TradingSession::Europe, Language::Zh) => "歐洲盤",
            (TradingSession::NewYork, Language::Zh) => "紐約盤",
            (TradingSession::Other, Language::Zh) => "其他",
            (TradingSession::Asia, _) => "Asia",
            (TradingSession::Europe, _) => "Europe",
            (TradingSession::NewYork, _) => "New York",
            (TradingSession::Other, _) => "Other",
        }
    }
}

/// Wall-clock time in the display timezone.
pub fn display_time(now: DateTime<Utc>) -> NaiveDateTime {
    now.naive_utc() + chrono::Duration::hours(DISPLAY_OFFSET_HOURS)
}

// ─── Message ──────────────────────────────────────────────────────────────────

/// Everything the formatters need about one broadcast-worthy signal.
pub struct MessageContext<'a> {
    pub signal:    &'a TradingSignal,
    pub price:     &'a ReconciledPrice,
    /// Already rounded for display.
    pub plan:      &'a RiskPlan,
    /// `None` when no sentiment source is configured.
    pub sentiment: Option<Sentiment>,
    pub now:       DateTime<Utc>,
    pub tag:       &'a str,
}

impl MessageContext<'_> {
    pub fn session(&self) -> TradingSession {
        TradingSession::from_hour(display_time(self.now).hour())
    }
}

pub fn format_message(ctx: &MessageContext<'_>, lang: Language) -> String {
    match lang {
        Language::Bilingual => format!(
            "{}\n{}",
            render(ctx, Language::Zh),
            render(ctx, Language::En)
        ),
        single => render(ctx, single),
    }
}

fn render(ctx: &MessageContext<'_>, lang: Language) -> String {
    let zh = lang == Language::Zh;
    let plan = ctx.plan;
    let [tp1, tp2, tp3, tp4] = plan.take_profit;
    let time = display_time(ctx.now).format("%Y-%m-%d %H:%M:%S");
    let session = ctx.session().label(lang);
    let symbol = escape_html(&ctx.signal.display_symbol);
    let note = price_note(ctx.price, lang);
    let side = ctx.signal.direction.side();

    let headline = match (ctx.signal.direction, zh) {
        (Direction::Long, true) => "多單",
        (Direction::Short, true) => "空單",
        (Direction::Long, false) => "LONG",
        (Direction::Short, false) => "SHORT",
    };

    let mut msg = if zh {
        format!(
            "🕒 <b>{time}（{session}）</b>\n\
             🚀 <b>{headline}</b>\n\
             📉 幣種：{symbol}\n\
             💰 進場價：{entry:.2}\n\
             {note}\n\
             🎯 止盈：TP1 {tp1:.2} / TP2 {tp2:.2} / TP3 {tp3:.2} / TP4 {tp4:.2}\n\
             🛑 止損：{sl:.2}\n\
             ⚖️ 盈虧比：{rr:.2}:1\n\
             📈 趨勢方向：{side}\n\
             📊 勝率條件：≥70%\n\
             🧠 技術依據：\n\
             - M5 實體穿越 MA12\n\
             - M5 MA12 斜率 ≥ ±2°\n\
             - M1 MA5 斜率 ≥ ±15°\n\
             - OB 觸發 + R = OB差 + 2×ATR\n\
             - H1 價格與 MA365 趨勢同向\n",
            entry = plan.entry,
            sl = plan.stop_loss,
            rr = plan.risk_reward_ratio,
        )
    } else {
        format!(
            "🕒 <b>{time} ({session} session)</b>\n\
             🚀 <b>{headline}</b>\n\
             📉 Symbol: {symbol}\n\
             💰 Entry: {entry:.2}\n\
             {note}\n\
             🎯 Take profit: TP1 {tp1:.2} / TP2 {tp2:.2} / TP3 {tp3:.2} / TP4 {tp4:.2}\n\
             🛑 Stop loss: {sl:.2}\n\
             ⚖️ Risk/reward: {rr:.2}:1\n\
             📈 Trend: {side}\n\
             📊 Win-rate condition: ≥70%\n\
             🧠 Basis:\n\
             - M5 body crosses MA12\n\
             - M5 MA12 slope ≥ ±2°\n\
             - M1 MA5 slope ≥ ±15°\n\
             - OB trigger + R = OB range + 2×ATR\n\
             - H1 price aligned with MA365 trend\n",
            entry = plan.entry,
            sl = plan.stop_loss,
            rr = plan.risk_reward_ratio,
        )
    };

    if let Some(sentiment) = ctx.sentiment {
        let label = sentiment_label(sentiment, lang);
        if zh {
            msg.push_str(&format!("📰 新聞情緒：{label}\n"));
        } else {
            msg.push_str(&format!("📰 News sentiment: {label}\n"));
        }
    }

    msg.push_str(&format!("🔖 {}\n", escape_html(ctx.tag)));
    msg
}

/// Human-readable reason for the chosen entry price.
pub fn price_note(price: &ReconciledPrice, lang: Language) -> String {
    let zh = lang == Language::Zh;
    match (price.note, zh) {
        (PriceNote::Fallback, true) => "❗現價來源錯誤，使用TV價格".to_string(),
        (PriceNote::Fallback, false) => "❗ Live price unavailable, using TradingView price".to_string(),
        (PriceNote::DeviationOverride { deviation }, true) => format!(
            "⚠️價格偏差 >0.5%（{:.2}%），改用現價（{}）",
            deviation * 100.0,
            price.origin
        ),
        (PriceNote::DeviationOverride { deviation }, false) => format!(
            "⚠️ Price deviation >0.5% ({:.2}%), using live price ({})",
            deviation * 100.0,
            price.origin
        ),
        (PriceNote::Live, true) => format!("📡 價格來源：{}", price.origin),
        (PriceNote::Live, false) => format!("📡 Price source: {}", price.origin),
    }
}

fn sentiment_label(sentiment: Sentiment, lang: Language) -> &'static str {
    match (sentiment, lang) {
        (Sentiment::Bearish, Language::Zh) => "偏空",
        (Sentiment::Bullish, Language::Zh) => "偏多",
        (Sentiment::Neutral, Language::Zh) => "中立",
        (Sentiment::Bearish, _) => "Bearish",
        (Sentiment::Bullish, _) => "Bullish",
        (Sentiment::Neutral, _) => "Neutral",
    }
}

/// Telegram HTML mode rejects stray `<`, `>` and `&`.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// ─── Sheet Row ────────────────────────────────────────────────────────────────

/// Column order: time, session, symbol, side, entry, origin, TP1..TP4, SL, RR,
/// sentiment, signal id.
pub fn sheet_row(ctx: &MessageContext<'_>, signal_id: &str) -> Vec<String> {
    let plan = ctx.plan;
    let mut row = vec![
        display_time(ctx.now).format("%Y-%m-%d %H:%M:%S").to_string(),
        ctx.session().label(Language::En).to_string(),
        ctx.signal.display_symbol.clone(),
        ctx.signal.direction.side().to_string(),
        format!("{:.2}", plan.entry),
        ctx.price.origin.label().to_string(),
    ];
    row.extend(plan.take_profit.iter().map(|tp| format!("{tp:.2}")));
    row.push(format!("{:.2}", plan.stop_loss));
    row.push(format!("{:.2}", plan.risk_reward_ratio));
    row.push(
        ctx.sentiment
            .map(|s| sentiment_label(s, Language::En).to_string())
            .unwrap_or_default(),
    );
    row.push(signal_id.to_string());
    row
}

// ─── Tests ────────────────────────────────────────────────────────────────────
