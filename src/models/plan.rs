//! # models::plan
//!
//! Defines [`RiskPlan`] — stop-loss, four take-profit levels and the
//! risk/reward ratio derived from one risk unit `R`.

use serde::Serialize;

use super::Direction;

/// Number of take-profit levels, `TP1..=TP4`.
pub const TAKE_PROFIT_LEVELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPlan {
    pub direction: Direction,

    /// Reconciled entry price.
    pub entry: f64,

    /// `R = |ob_high - ob_low| + 2 * atr`, always > 0.
    pub risk_unit: f64,

    pub stop_loss: f64,

    /// `TP1..TP4`, each one `R` further from entry in the trade direction.
    pub take_profit: [f64; TAKE_PROFIT_LEVELS],

    /// Reward at TP4 divided by `R`.
    pub risk_reward_ratio: f64,
}

impl RiskPlan {
    /// Last (furthest) target.
    #[inline]
    pub fn final_target(&self) -> f64 {
        self.take_profit[TAKE_PROFIT_LEVELS - 1]
    }

    /// Display copy with every price and the ratio rounded to 2 decimals.
    /// Call once, at the output boundary.
    pub fn rounded(&self) -> Self {
        Self {
            direction:         self.direction,
            entry:             round2(self.entry),
            risk_unit:         round2(self.risk_unit),
            stop_loss:         round2(self.stop_loss),
            take_profit:       self.take_profit.map(round2),
            risk_reward_ratio: round2(self.risk_reward_ratio),
        }
    }
}

/// Round half away from zero to 2 decimals (`f64::round` semantics).
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-7.006), -7.01);
        assert_eq!(round2(160.0), 160.0);
    }

    #[test]
    fn test_rounded_plan() {
        let plan = RiskPlan {
            direction:         Direction::Long,
            entry:             100.004,
            risk_unit:         1.111,
            stop_loss:         98.893,
            take_profit:       [101.116, 102.227, 103.338, 104.449],
            risk_reward_ratio: 4.000_000_1,
        };
        let shown = plan.rounded();
        assert_eq!(shown.entry, 100.0);
        assert_eq!(shown.stop_loss, 98.89);
        assert_eq!(shown.take_profit, [101.12, 102.23, 103.34, 104.45]);
        assert_eq!(shown.risk_reward_ratio, 4.0);
        assert_eq!(shown.final_target(), 104.45);
    }
}
