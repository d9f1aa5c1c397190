//! # engine::risk
//!
//! **Risk & Target Calculator** and the **slope gate**.
//!
//! ```text
//!   R  = |OB high − OB low| + 2 × ATR
//!
//!   LONG                      SHORT
//!   SL     = entry − R        SL     = entry + R
//!   TP(n)  = entry + n·R      TP(n)  = entry − n·R      n = 1..4
//!   RR     = (TP4 − entry)/R  RR     = (entry − TP4)/R
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::plan::TAKE_PROFIT_LEVELS;
use crate::models::{Direction, RiskPlan, TradingSignal};

// ─── Slope Gate ───────────────────────────────────────────────────────────────

/// Minimum |M1 MA5 slope|.
pub const MIN_FAST_SLOPE: f64 = 15.0;
/// Minimum |M5 MA12 slope|.
pub const MIN_MEDIUM_SLOPE: f64 = 2.0;

/// Result of the trend-strength filter, echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlopeCheck {
    pub fast_slope:   f64,
    pub medium_slope: f64,
    pub fast_ok:      bool,
    pub medium_ok:    bool,
}

impl SlopeCheck {
    #[inline]
    pub fn passed(&self) -> bool {
        self.fast_ok && self.medium_ok
    }

    pub fn reason(&self) -> &'static str {
        match (self.fast_ok, self.medium_ok) {
            (true, true) => "slope conditions met",
            (false, true) => "fast slope below threshold",
            (true, false) => "medium slope below threshold",
            (false, false) => "fast and medium slopes below threshold",
        }
    }
}

/// Signal is actionable only if `|fast| >= 15` and `|medium| >= 2`.
pub fn check_slopes(signal: &TradingSignal) -> SlopeCheck {
    SlopeCheck {
        fast_slope:   signal.fast_slope,
        medium_slope: signal.medium_slope,
        fast_ok:      signal.fast_slope.abs() >= MIN_FAST_SLOPE,
        medium_ok:    signal.medium_slope.abs() >= MIN_MEDIUM_SLOPE,
    }
}

// ─── Risk Unit ────────────────────────────────────────────────────────────────

#[inline]
pub fn risk_unit(signal: &TradingSignal) -> f64 {
    (signal.ob_high - signal.ob_low).abs() + 2.0 * signal.atr
}

// ─── Plan ─────────────────────────────────────────────────────────────────────

/// Build the (unrounded) [`RiskPlan`] for `signal` entered at `entry`.
///
/// Fails with [`AppError::ZeroRisk`] when `R` is exactly zero.
pub fn build_plan(signal: &TradingSignal, entry: f64) -> Result<RiskPlan, AppError> {
    let r = risk_unit(signal);
    if r == 0.0 {
        return Err(AppError::ZeroRisk);
    }

    let sign = signal.direction.sign();
    let mut take_profit = [0.0; TAKE_PROFIT_LEVELS];
    for (i, tp) in take_profit.iter_mut().enumerate() {
        *tp = entry + sign * (i + 1) as f64 * r;
    }
    let stop_loss = entry - sign * r;

    let tp4 = take_profit[TAKE_PROFIT_LEVELS - 1];
    let risk_reward_ratio = match signal.direction {
        Direction::Long => (tp4 - entry) / r,
        Direction::Short => (entry - tp4) / r,
    };

    debug!(
        symbol = %signal.symbol,
        direction = ?signal.direction,
        entry,
        risk_unit = r,
        stop_loss,
        "Risk plan computed"
    );

    Ok(RiskPlan {
        direction: signal.direction,
        entry,
        risk_unit: r,
        stop_loss,
        take_profit,
        risk_reward_ratio,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
