//! Risk model configuration and simulation result types.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Risk configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskModel {
    /// Starting capital.
    pub initial_capital: Decimal,
    /// Fraction of current capital committed per trade.
    pub risk_per_trade: Decimal,
    /// Stop-loss distance below the entry price (fraction).
    pub stop_loss_pct: Decimal,
    /// Take-profit distance above the entry price (fraction).
    pub take_profit_pct: Decimal,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            initial_capital: dec!(10_000),
            risk_per_trade: dec!(0.10),
            stop_loss_pct: dec!(0.02),
            take_profit_pct: dec!(0.05),
        }
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Strategy exit signal.
    Signal,
    /// Stop-loss level reached.
    StopLoss,
    /// Take-profit level reached.
    TakeProfit,
    /// Position still open at the final bar.
    EndOfData,
}

/// One closed trade from a simulation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    /// Bar index of the entry.
    pub entry_index: usize,
    /// Bar index of the exit.
    pub exit_index: usize,
    /// Entry price (close of the entry bar).
    pub entry_price: Decimal,
    /// Realized exit price after the tie-break rule.
    pub exit_price: Decimal,
    /// Realized profit or loss in capital units.
    pub pnl: Decimal,
    /// Why the trade was closed.
    pub exit_reason: ExitReason,
}

impl TradeLogEntry {
    /// Whether this trade was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Number of bars the position was held.
    #[must_use]
    pub const fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

/// Metrics from one simulation pass.
///
/// Every ratio is guarded: no-trade and no-loss cases read as zero, never as
/// a non-finite value, so downstream ranking needs no special cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Total return: `final_capital / initial_capital - 1`.
    pub rendement: Decimal,
    /// Number of closed trades.
    pub trade_count: u64,
    /// Winning trades over total trades (0 when no trades).
    pub win_rate: Decimal,
    /// Largest fractional decline of capital from its running peak.
    pub max_drawdown: Decimal,
    /// Mean per-trade PnL (0 when no trades).
    pub avg_pnl: Decimal,
    /// Summed gains over summed losses (0 when no losses).
    pub profit_factor: Decimal,
    /// Mean bars held per trade (0 when no trades).
    pub avg_trade_bars: Decimal,
    /// Largest single-trade gain (0 when no winning trade).
    pub max_trade_gain: Decimal,
    /// Most negative single-trade PnL (0 when no losing trade).
    pub max_trade_loss: Decimal,
    /// Swing-trade score from the configured scoring function.
    pub score_swing_trade: Decimal,
}

impl Default for RiskResult {
    fn default() -> Self {
        Self {
            rendement: Decimal::ZERO,
            trade_count: 0,
            win_rate: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            avg_pnl: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            avg_trade_bars: Decimal::ZERO,
            max_trade_gain: Decimal::ZERO,
            max_trade_loss: Decimal::ZERO,
            score_swing_trade: Decimal::ZERO,
        }
    }
}

/// Full output of a simulation pass: metrics plus the replayable trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Aggregate metrics.
    pub result: RiskResult,
    /// Closed trades in chronological order.
    pub trades: Vec<TradeLogEntry>,
}

/// Scoring function applied once per finalized result.
pub type ScoreFn = fn(&RiskResult) -> Decimal;

/// Default swing-trade score.
///
/// Weighted blend of return, win rate, drawdown penalty, and profit factor
/// capped at 10 so a loss-free run cannot dominate the blend.
#[must_use]
pub fn default_swing_score(result: &RiskResult) -> Decimal {
    let capped_pf = result.profit_factor.min(dec!(10));
    result.rendement * dec!(0.4) + result.win_rate * dec!(0.2)
        - result.max_drawdown * dec!(0.2)
        + capped_pf / dec!(10) * dec!(0.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_result_default_is_all_zero() {
        let result = RiskResult::default();
        assert_eq!(result.rendement, Decimal::ZERO);
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.profit_factor, Decimal::ZERO);
    }

    #[test]
    fn test_trade_log_entry_helpers() {
        let trade = TradeLogEntry {
            entry_index: 10,
            exit_index: 14,
            entry_price: dec!(100),
            exit_price: dec!(105),
            pnl: dec!(50),
            exit_reason: ExitReason::TakeProfit,
        };
        assert!(trade.is_winner());
        assert_eq!(trade.bars_held(), 4);
    }

    #[test]
    fn test_default_swing_score_caps_profit_factor() {
        let result = RiskResult {
            profit_factor: dec!(1_000),
            ..Default::default()
        };
        // Only the capped profit factor term contributes: 10/10 * 0.2
        assert_eq!(default_swing_score(&result), dec!(0.2));
    }

    #[test]
    fn test_default_swing_score_penalizes_drawdown() {
        let steady = RiskResult {
            rendement: dec!(0.10),
            ..Default::default()
        };
        let choppy = RiskResult {
            rendement: dec!(0.10),
            max_drawdown: dec!(0.30),
            ..Default::default()
        };
        assert!(default_swing_score(&steady) > default_swing_score(&choppy));
    }

    #[test]
    fn test_risk_model_serde_round_trip() {
        let model = RiskModel::default();
        let json = serde_json::to_string(&model).unwrap();
        let back: RiskModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
