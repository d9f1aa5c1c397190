//! # models::signal
//!
//! Defines [`TradingSignal`], the normalized form of one webhook alert.
//! Built by `engine::normalizer` and never mutated afterwards.

use serde::{Deserialize, Serialize};

// ─── Direction ────────────────────────────────────────────────────────────────

/// Trade direction.  Only `"BUY"` maps to `Long`; every other side string,
/// including garbage, is treated as `Short`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_side(side: &str) -> Self {
        if side.trim().eq_ignore_ascii_case("BUY") {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    /// `+1.0` for Long, `-1.0` for Short — target offsets are `sign * n * R`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Side as the alerting tool spells it.
    pub fn side(self) -> &'static str {
        match self {
            Direction::Long => "BUY",
            Direction::Short => "SELL",
        }
    }
}

// ─── TradingSignal ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSignal {
    /// Base asset, e.g. `"BTC"` — used to query price sources.
    pub symbol: String,

    /// The symbol exactly as received (uppercased), e.g. `"BTCUSDT"`.
    pub display_symbol: String,

    pub direction: Direction,

    /// Price at alert time according to the charting tool.  Always > 0.
    pub reported_price: f64,

    /// Order-block band.
    pub ob_high: f64,
    pub ob_low: f64,

    /// Average true range.
    pub atr: f64,

    /// M1 MA5 slope.
    pub fast_slope: f64,

    /// M5 MA12 slope.
    pub medium_slope: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_permissive() {
        assert_eq!(Direction::from_side("BUY"), Direction::Long);
        assert_eq!(Direction::from_side("buy"), Direction::Long);
        assert_eq!(Direction::from_side("SELL"), Direction::Short);
        assert_eq!(Direction::from_side(""), Direction::Short);
        assert_eq!(Direction::from_side("banana"), Direction::Short);
    }
}
