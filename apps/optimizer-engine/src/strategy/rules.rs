//! Entry/exit rule construction for strategy families.

use rust_decimal::Decimal;

use crate::series::BarSeries;

use super::indicators::{ema, macd, rolling_high, rolling_low, rsi, sma};
use super::params::StrategyParams;

/// RSI level above which the improved trend-following filter blocks entries.
const RSI_FILTER_OVERBOUGHT: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// A boolean signal over bar indices, produced once per series.
pub type SignalFn = Box<dyn Fn(usize) -> bool + Send + Sync>;

/// A trading strategy: a named pair of entry and exit rules.
///
/// Each rule is built once for a series and then queried per bar index. The
/// simulator assumes nothing beyond this two-rule contract.
pub trait Strategy: Send + Sync {
    /// Display name.
    fn name(&self) -> String;

    /// Build the entry signal for a series.
    fn entry_rule(&self, series: &BarSeries) -> SignalFn;

    /// Build the exit signal for a series.
    fn exit_rule(&self, series: &BarSeries) -> SignalFn;
}

/// A strategy driven by one family's parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyStrategy {
    params: StrategyParams,
}

impl FamilyStrategy {
    /// Create a strategy from a parameter set.
    #[must_use]
    pub const fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// The underlying parameter set.
    #[must_use]
    pub const fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn entry_flags(&self, series: &BarSeries) -> Vec<bool> {
        let closes = series.closes();
        match &self.params {
            StrategyParams::SmaCrossover {
                short_period,
                long_period,
            } => cross_above(&sma(&closes, *short_period), &sma(&closes, *long_period)),

            StrategyParams::Rsi {
                period, oversold, ..
            } => level_below(&rsi(&closes, *period), *oversold),

            StrategyParams::Macd {
                short_period,
                long_period,
                signal_period,
            } => {
                let (macd_line, signal_line) =
                    macd(&closes, *short_period, *long_period, *signal_period);
                cross_above(&macd_line, &signal_line)
            }

            StrategyParams::Breakout { lookback } => {
                let highs: Vec<Decimal> = series.bars().iter().map(|b| b.high).collect();
                let channel = rolling_high(&highs, *lookback);
                compare(&closes, &channel, |close, level| close > level)
            }

            StrategyParams::MeanReversion {
                sma_period,
                threshold,
            } => {
                let average = sma(&closes, *sma_period);
                let margin = Decimal::ONE - *threshold;
                compare(&closes, &average, move |close, level| close < level * margin)
            }

            StrategyParams::TrendFollowing { period } => {
                cross_above(&to_defined(&closes), &sma(&closes, *period))
            }

            StrategyParams::ImprovedTrendFollowing {
                trend_period,
                short_ma_period,
                long_ma_period,
                breakout_threshold_pct,
                use_rsi_filter,
                rsi_period,
            } => {
                let trend = sma(&closes, *trend_period);
                let short_ma = ema(&closes, *short_ma_period);
                let long_ma = ema(&closes, *long_ma_period);
                let strength = rsi(&closes, *rsi_period);
                let margin = Decimal::ONE + *breakout_threshold_pct;
                let filtered = *use_rsi_filter;

                (0..closes.len())
                    .map(|i| {
                        let breakout = trend[i].is_some_and(|t| closes[i] > t * margin);
                        let aligned = matches!(
                            (short_ma[i], long_ma[i]),
                            (Some(s), Some(l)) if s > l
                        );
                        let calm = !filtered
                            || strength[i].is_some_and(|r| r < RSI_FILTER_OVERBOUGHT);
                        breakout && aligned && calm
                    })
                    .collect()
            }
        }
    }

    fn exit_flags(&self, series: &BarSeries) -> Vec<bool> {
        let closes = series.closes();
        match &self.params {
            StrategyParams::SmaCrossover {
                short_period,
                long_period,
            } => cross_below(&sma(&closes, *short_period), &sma(&closes, *long_period)),

            StrategyParams::Rsi {
                period, overbought, ..
            } => level_above(&rsi(&closes, *period), *overbought),

            StrategyParams::Macd {
                short_period,
                long_period,
                signal_period,
            } => {
                let (macd_line, signal_line) =
                    macd(&closes, *short_period, *long_period, *signal_period);
                cross_below(&macd_line, &signal_line)
            }

            StrategyParams::Breakout { lookback } => {
                let lows: Vec<Decimal> = series.bars().iter().map(|b| b.low).collect();
                let channel = rolling_low(&lows, *lookback);
                compare(&closes, &channel, |close, level| close < level)
            }

            StrategyParams::MeanReversion { sma_period, .. } => {
                let average = sma(&closes, *sma_period);
                compare(&closes, &average, |close, level| close >= level)
            }

            StrategyParams::TrendFollowing { period } => {
                cross_below(&to_defined(&closes), &sma(&closes, *period))
            }

            StrategyParams::ImprovedTrendFollowing {
                trend_period,
                short_ma_period,
                long_ma_period,
                ..
            } => {
                let trend = sma(&closes, *trend_period);
                let short_ma = ema(&closes, *short_ma_period);
                let long_ma = ema(&closes, *long_ma_period);

                (0..closes.len())
                    .map(|i| {
                        let misaligned = matches!(
                            (short_ma[i], long_ma[i]),
                            (Some(s), Some(l)) if s < l
                        );
                        let broken = trend[i].is_some_and(|t| closes[i] < t);
                        misaligned || broken
                    })
                    .collect()
            }
        }
    }
}

impl Strategy for FamilyStrategy {
    fn name(&self) -> String {
        self.params.family().name().to_string()
    }

    fn entry_rule(&self, series: &BarSeries) -> SignalFn {
        let flags = self.entry_flags(series);
        Box::new(move |i| flags.get(i).copied().unwrap_or(false))
    }

    fn exit_rule(&self, series: &BarSeries) -> SignalFn {
        let flags = self.exit_flags(series);
        Box::new(move |i| flags.get(i).copied().unwrap_or(false))
    }
}

/// An entry strategy paired with an independently chosen exit strategy.
///
/// The entry rule comes from `entry`, the exit rule from `exit`; the two may
/// belong to different families with unrelated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedStrategy {
    entry: FamilyStrategy,
    exit: FamilyStrategy,
}

impl CombinedStrategy {
    /// Create a combined strategy from entry and exit parameter sets.
    #[must_use]
    pub const fn new(entry: StrategyParams, exit: StrategyParams) -> Self {
        Self {
            entry: FamilyStrategy::new(entry),
            exit: FamilyStrategy::new(exit),
        }
    }

    /// The entry side's parameters.
    #[must_use]
    pub const fn entry_params(&self) -> &StrategyParams {
        self.entry.params()
    }

    /// The exit side's parameters.
    #[must_use]
    pub const fn exit_params(&self) -> &StrategyParams {
        self.exit.params()
    }
}

impl Strategy for CombinedStrategy {
    fn name(&self) -> String {
        format!("{}|{}", self.entry.name(), self.exit.name())
    }

    fn entry_rule(&self, series: &BarSeries) -> SignalFn {
        self.entry.entry_rule(series)
    }

    fn exit_rule(&self, series: &BarSeries) -> SignalFn {
        self.exit.exit_rule(series)
    }
}

fn to_defined(values: &[Decimal]) -> Vec<Option<Decimal>> {
    values.iter().map(|v| Some(*v)).collect()
}

fn is_above(a: &[Option<Decimal>], b: &[Option<Decimal>], i: usize) -> bool {
    matches!((a[i], b[i]), (Some(x), Some(y)) if x > y)
}

fn is_below(a: &[Option<Decimal>], b: &[Option<Decimal>], i: usize) -> bool {
    matches!((a[i], b[i]), (Some(x), Some(y)) if x < y)
}

/// True where `a` moves strictly above `b` after not being above it.
///
/// The first index where both sides are defined counts as a crossing if `a`
/// is already above `b` there.
fn cross_above(a: &[Option<Decimal>], b: &[Option<Decimal>]) -> Vec<bool> {
    (0..a.len())
        .map(|i| is_above(a, b, i) && (i == 0 || !is_above(a, b, i - 1)))
        .collect()
}

/// True where `a` moves strictly below `b` after not being below it.
fn cross_below(a: &[Option<Decimal>], b: &[Option<Decimal>]) -> Vec<bool> {
    (0..a.len())
        .map(|i| is_below(a, b, i) && (i == 0 || !is_below(a, b, i - 1)))
        .collect()
}

fn level_below(values: &[Option<Decimal>], threshold: Decimal) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x < threshold))
        .collect()
}

fn level_above(values: &[Option<Decimal>], threshold: Decimal) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x > threshold))
        .collect()
}

fn compare<F>(closes: &[Decimal], levels: &[Option<Decimal>], predicate: F) -> Vec<bool>
where
    F: Fn(Decimal, Decimal) -> bool,
{
    (0..closes.len())
        .map(|i| levels[i].is_some_and(|level| predicate(closes[i], level)))
        .collect()
}
