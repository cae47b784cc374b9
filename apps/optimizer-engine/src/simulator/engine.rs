//! Deterministic single-pass strategy simulation.

use rust_decimal::Decimal;
use tracing::debug;

use crate::series::BarSeries;
use crate::strategy::Strategy;

use super::result::{
    ExitReason, RiskModel, RiskResult, ScoreFn, SimulationOutcome, TradeLogEntry,
    default_swing_score,
};

/// An open long position while the state machine is in the LONG state.
struct OpenPosition {
    entry_index: usize,
    entry_price: Decimal,
    position_size: Decimal,
}

/// Event-driven simulator: one deterministic left-to-right pass over a series.
///
/// A pure function of (series, strategy, risk model): no shared mutable
/// state, safe for concurrent invocation across symbols or windows.
#[derive(Debug, Clone)]
pub struct Simulator {
    model: RiskModel,
    scorer: ScoreFn,
}

impl Simulator {
    /// Create a simulator with the default swing-trade scorer.
    #[must_use]
    pub fn new(model: RiskModel) -> Self {
        Self {
            model,
            scorer: default_swing_score,
        }
    }

    /// Replace the scoring function.
    #[must_use]
    pub fn with_scorer(mut self, scorer: ScoreFn) -> Self {
        self.scorer = scorer;
        self
    }

    /// The configured risk model.
    #[must_use]
    pub const fn model(&self) -> &RiskModel {
        &self.model
    }

    /// Simulate a strategy over a series, returning aggregate metrics.
    #[must_use]
    pub fn run(&self, series: &BarSeries, strategy: &dyn Strategy) -> RiskResult {
        self.run_detailed(series, strategy).result
    }

    /// Simulate a strategy over a series, returning metrics plus the trade log.
    ///
    /// Two-state machine per bar index:
    /// - FLAT: an entry signal opens a long at the bar's close, sized at
    ///   `capital * risk_per_trade`.
    /// - LONG: the trade closes on stop-loss, take-profit, or exit signal.
    ///   The exit price defaults to the bar's close, is overridden to the
    ///   stop price on a stop hit, then overridden again to the take-profit
    ///   price, so take-profit wins when both trigger on the same bar.
    ///
    /// A position still open after the last bar is force-closed at the final
    /// close with no stop/take-profit check.
    #[must_use]
    pub fn run_detailed(&self, series: &BarSeries, strategy: &dyn Strategy) -> SimulationOutcome {
        let entry_signal = strategy.entry_rule(series);
        let exit_signal = strategy.exit_rule(series);
        let closes = series.closes();

        let mut capital = self.model.initial_capital;
        let mut open: Option<OpenPosition> = None;
        let mut trades: Vec<TradeLogEntry> = Vec::new();

        for (i, close) in closes.iter().copied().enumerate() {
            match open.take() {
                None => {
                    if entry_signal(i) && close > Decimal::ZERO {
                        debug!(bar = i, price = %close, "entry signal, opening long");
                        open = Some(OpenPosition {
                            entry_index: i,
                            entry_price: close,
                            position_size: capital * self.model.risk_per_trade,
                        });
                    }
                }
                Some(position) => {
                    let stop_price =
                        position.entry_price * (Decimal::ONE - self.model.stop_loss_pct);
                    let take_profit_price =
                        position.entry_price * (Decimal::ONE + self.model.take_profit_pct);

                    let stop_hit = close <= stop_price;
                    let profit_hit = close >= take_profit_price;
                    let signaled = exit_signal(i);

                    if stop_hit || profit_hit || signaled {
                        let mut exit_price = close;
                        let mut exit_reason = ExitReason::Signal;
                        if stop_hit {
                            exit_price = stop_price;
                            exit_reason = ExitReason::StopLoss;
                        }
                        if profit_hit {
                            exit_price = take_profit_price;
                            exit_reason = ExitReason::TakeProfit;
                        }

                        let trade = close_trade(&position, i, exit_price, exit_reason);
                        capital += trade.pnl;
                        debug!(
                            bar = i,
                            pnl = %trade.pnl,
                            reason = ?trade.exit_reason,
                            "trade closed"
                        );
                        trades.push(trade);
                    } else {
                        open = Some(position);
                    }
                }
            }
        }

        // Force-close at the final bar, no stop/take-profit check
        if let (Some(position), Some(last_close)) = (open, closes.last().copied()) {
            let trade = close_trade(
                &position,
                closes.len() - 1,
                last_close,
                ExitReason::EndOfData,
            );
            capital += trade.pnl;
            trades.push(trade);
        }

        let mut result = compute_metrics(&trades, &self.model);
        result.score_swing_trade = (self.scorer)(&result);

        SimulationOutcome { result, trades }
    }
}

fn close_trade(
    position: &OpenPosition,
    exit_index: usize,
    exit_price: Decimal,
    exit_reason: ExitReason,
) -> TradeLogEntry {
    let pnl = position.position_size * (exit_price - position.entry_price) / position.entry_price;
    TradeLogEntry {
        entry_index: position.entry_index,
        exit_index,
        entry_price: position.entry_price,
        exit_price,
        pnl,
        exit_reason,
    }
}

/// Fold the trade log into aggregate metrics.
///
/// Replays the per-trade PnL sequence from the initial capital, so the final
/// capital is reconstructible from the log by construction.
fn compute_metrics(trades: &[TradeLogEntry], model: &RiskModel) -> RiskResult {
    let mut capital = model.initial_capital;
    let mut peak = capital;
    let mut max_drawdown = Decimal::ZERO;

    let mut wins = 0u64;
    let mut sum_pnl = Decimal::ZERO;
    let mut total_gain = Decimal::ZERO;
    let mut total_loss = Decimal::ZERO;
    let mut total_bars = 0usize;
    let mut best_gain: Option<Decimal> = None;
    let mut worst_loss: Option<Decimal> = None;

    for trade in trades {
        capital += trade.pnl;
        peak = peak.max(capital);
        if peak > Decimal::ZERO {
            let drawdown = (peak - capital) / peak;
            max_drawdown = max_drawdown.max(drawdown);
        }

        sum_pnl += trade.pnl;
        total_bars += trade.bars_held();

        if trade.pnl > Decimal::ZERO {
            wins += 1;
            total_gain += trade.pnl;
            best_gain = Some(best_gain.map_or(trade.pnl, |b| b.max(trade.pnl)));
        } else if trade.pnl < Decimal::ZERO {
            total_loss += trade.pnl.abs();
            worst_loss = Some(worst_loss.map_or(trade.pnl, |w| w.min(trade.pnl)));
        }
    }

    let trade_count = trades.len() as u64;
    let count = Decimal::from(trade_count);

    let rendement = if model.initial_capital > Decimal::ZERO {
        capital / model.initial_capital - Decimal::ONE
    } else {
        Decimal::ZERO
    };

    let win_rate = if trade_count > 0 {
        Decimal::from(wins) / count
    } else {
        Decimal::ZERO
    };

    let avg_pnl = if trade_count > 0 {
        sum_pnl / count
    } else {
        Decimal::ZERO
    };

    let profit_factor = if total_loss > Decimal::ZERO {
        total_gain / total_loss
    } else {
        Decimal::ZERO
    };

    let avg_trade_bars = if trade_count > 0 {
        Decimal::from(total_bars as u64) / count
    } else {
        Decimal::ZERO
    };

    RiskResult {
        rendement,
        trade_count,
        win_rate,
        max_drawdown,
        avg_pnl,
        profit_factor,
        avg_trade_bars,
        max_trade_gain: best_gain.unwrap_or(Decimal::ZERO),
        max_trade_loss: worst_loss.unwrap_or(Decimal::ZERO),
        score_swing_trade: Decimal::ZERO,
    }
}
