//! Notification text for position events, formatted for Telegram HTML mode.

use chrono::{DateTime, Utc};

use common::ClosedPosition;

use crate::position::EntryPlan;
use crate::snapshot::IndicatorSnapshot;

pub fn entry_message(pair: &str, plan: &EntryPlan, snapshot: &IndicatorSnapshot) -> String {
    let price = plan.entry_price;
    let rsi = or_na(snapshot.volume_rsi.map(|v| format!("{v:.1}")));
    let ema = or_na(snapshot.latest_volume_ema().map(|v| format!("{v:.0}")));
    let multiple = or_na(snapshot.volume_multiple().map(|v| format!("{v:.2}x")));

    format!(
        "🚀 SIGNAL {side} - {pair}\n\
         \n\
         💰 Entry price: {price:.8}\n\
         🎯 Take profit: {tp:.8} ({tp_pct:+.2}%)\n\
         🛡 Stop loss: {sl:.8} ({sl_pct:+.2}%)\n\
         \n\
         📊 Volume: {volume:.0}\n\
         📈 Volume EMA: {ema}\n\
         🔥 Multiple: {multiple}\n\
         \n\
         📉 Volume EMA growth: {growth:.2}%\n\
         📊 Volume RSI: {rsi}\n\
         🔄 Consecutive bars: {bars}\n\
         \n\
         ⏰ {time}",
        side = plan.side,
        pair = escape_html(pair),
        tp = plan.take_profit,
        tp_pct = percent_from(price, plan.take_profit),
        sl = plan.stop_loss,
        sl_pct = percent_from(price, plan.stop_loss),
        volume = snapshot.current_volume,
        growth = snapshot.volume_growth_percent,
        bars = snapshot.consecutive_volume_bars,
        time = format_time(snapshot.timestamp),
    )
}

pub fn close_message(pair: &str, closed: &ClosedPosition) -> String {
    format!(
        "✅ POSITION CLOSED - {pair}\n\
         \n\
         💵 PnL: {pnl:.2} ({pct:.2}%)\n\
         📊 Exit price: {exit:.8}\n\
         ⏰ {time}",
        pair = escape_html(pair),
        pnl = closed.pnl,
        pct = closed.pnl_percentage,
        exit = closed.exit_price,
        time = format_time(closed.timestamp),
    )
}

/// Signed distance of `level` from `price`, in percent.
fn percent_from(price: f64, level: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    (level - price) / price * 100.0
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "n/a".to_string())
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Telegram's HTML mode rejects messages with stray `<`, `>` or `&`.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
