//! # engine::normalizer
//!
//! **Signal Normalizer** — turns the raw webhook JSON into a [`TradingSignal`].
//!
//! The alerting tool can be configured with either canonical English keys or
//! the localized (Traditional Chinese) template.  Canonical keys always win;
//! localized keys are only consulted when the canonical one is absent.
//!
//! ```text
//! { "symbol": "BTCUSDT", "side": "BUY", "price": 100, ... }
//! { "幣種": "BTCUSDT",  "方向": "BUY", "價格": 100, ... }
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AppError;
use crate::models::{Direction, TradingSignal};

// ─── Field Aliases ────────────────────────────────────────────────────────────

/// One logical field: its name in errors, then every accepted key in lookup order.
struct Field {
    name: &'static str,
    keys: &'static [&'static str],
}

const SYMBOL:       Field = Field { name: "symbol",     keys: &["symbol", "幣種"] };
const SIDE:         Field = Field { name: "side",       keys: &["side", "direction", "方向"] };
const PRICE:        Field = Field { name: "price",      keys: &["price", "價格"] };
const OB_HIGH:      Field = Field { name: "ob_high",    keys: &["ob_high", "OB高點"] };
const OB_LOW:       Field = Field { name: "ob_low",     keys: &["ob_low", "OB低點"] };
const ATR:          Field = Field { name: "atr",        keys: &["atr", "ATR"] };
const FAST_SLOPE:   Field = Field { name: "m5_slope",   keys: &["m5_slope", "M5斜率"] };
const MEDIUM_SLOPE: Field = Field { name: "ma12_slope", keys: &["ma12_slope", "M5_MA12斜率"] };

/// Quote currency stripped from the end of the symbol.
const QUOTE_SUFFIX: &str = "USDT";

// ─── Normalize ────────────────────────────────────────────────────────────────

/// Parse a webhook payload into a [`TradingSignal`].
///
/// Absent / `null` / empty numeric fields default to `0.0`; anything present
/// that is not a number fails with [`AppError::MalformedSignal`].
pub fn normalize(payload: &Value) -> Result<TradingSignal, AppError> {
    let obj = payload
        .as_object()
        .ok_or(AppError::MalformedSignal { field: "body" })?;

    let display_symbol = text(obj, &SYMBOL)?.to_uppercase();
    let symbol = base_symbol(&display_symbol);
    if symbol.is_empty() {
        return Err(AppError::MalformedSignal { field: SYMBOL.name });
    }

    let direction = Direction::from_side(&text(obj, &SIDE)?);

    // Divisor of the deviation check — must be a real, positive price.
    let reported_price = number(obj, &PRICE)?;
    if !(reported_price.is_finite() && reported_price > 0.0) {
        return Err(AppError::MalformedSignal { field: PRICE.name });
    }

    let signal = TradingSignal {
        symbol,
        display_symbol,
        direction,
        reported_price,
        ob_high:      number(obj, &OB_HIGH)?,
        ob_low:       number(obj, &OB_LOW)?,
        atr:          number(obj, &ATR)?,
        fast_slope:   number(obj, &FAST_SLOPE)?,
        medium_slope: number(obj, &MEDIUM_SLOPE)?,
    };

    debug!(?signal, "Signal normalized");
    Ok(signal)
}

/// `"BINANCE:BTCUSDT"` → `"BTC"`, `"X:ETH"` → `"ETH"`, `"SOL"` → `"SOL"`.
pub fn base_symbol(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let unprefixed = match upper.rsplit_once(':') {
        Some((_, rest)) => rest,
        None => upper.as_str(),
    };
    unprefixed
        .strip_suffix(QUOTE_SUFFIX)
        .unwrap_or(unprefixed)
        .trim()
        .to_string()
}

// ─── Lookup & Coercion ────────────────────────────────────────────────────────

/// First key of `field` present with a non-null value.
fn lookup<'a>(obj: &'a Map<String, Value>, field: &Field) -> Option<&'a Value> {
    field
        .keys
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

fn text(obj: &Map<String, Value>, field: &Field) -> Result<String, AppError> {
    match lookup(obj, field) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(AppError::MalformedSignal { field: field.name }),
    }
}

fn number(obj: &Map<String, Value>, field: &Field) -> Result<f64, AppError> {
    match lookup(obj, field) {
        None => Ok(0.0),
        Some(value) => coerce_f64(value).ok_or(AppError::MalformedSignal { field: field.name }),
    }
}

/// JSON number or numeric string → finite `f64`.  An empty string counts as
/// `0.0`; `"NaN"`, `"inf"` and out-of-range literals are rejected.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
