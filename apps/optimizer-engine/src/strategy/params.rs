//! Strategy families, parameter sets, and search-space ranges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parameter construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// Wrong number of axis values for a family.
    #[error("family '{family}' expects {expected} parameter values, got {got}")]
    AxisCountMismatch {
        /// Family name.
        family: &'static str,
        /// Expected axis count.
        expected: usize,
        /// Provided axis count.
        got: usize,
    },
}

/// The closed set of rule-based strategy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyFamily {
    /// Short/long simple moving average crossover.
    SmaCrossover,
    /// RSI oversold/overbought thresholds.
    Rsi,
    /// MACD line / signal line crossover.
    Macd,
    /// Channel breakout above the rolling high.
    Breakout,
    /// Buy below the SMA by a threshold, sell at reversion.
    MeanReversion,
    /// Close crossing its SMA.
    TrendFollowing,
    /// Trend following with MA alignment, breakout margin, and optional RSI filter.
    ImprovedTrendFollowing,
}

impl StrategyFamily {
    /// Every family, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::SmaCrossover,
        Self::Rsi,
        Self::Macd,
        Self::Breakout,
        Self::MeanReversion,
        Self::TrendFollowing,
        Self::ImprovedTrendFollowing,
    ];

    /// Stable display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SmaCrossover => "sma_crossover",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Breakout => "breakout",
            Self::MeanReversion => "mean_reversion",
            Self::TrendFollowing => "trend_following",
            Self::ImprovedTrendFollowing => "improved_trend_following",
        }
    }

    /// Number of tunable parameter axes.
    #[must_use]
    pub const fn axis_count(&self) -> usize {
        match self {
            Self::Breakout | Self::TrendFollowing => 1,
            Self::SmaCrossover | Self::MeanReversion => 2,
            Self::Rsi | Self::Macd => 3,
            Self::ImprovedTrendFollowing => 6,
        }
    }
}

impl std::fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Inclusive integer range for one parameter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRange {
    /// Minimum value (inclusive).
    pub min: i64,
    /// Maximum value (inclusive).
    pub max: i64,
}

impl ParamRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Width of the range; negative when the range is inverted.
    #[must_use]
    pub const fn span(&self) -> i64 {
        self.max - self.min
    }

    /// Whether `min <= max`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// A strategy family paired with one search range per parameter axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySpace {
    /// The strategy family.
    pub family: StrategyFamily,
    /// One range per axis, in declaration order of the family's parameters.
    pub axes: Vec<ParamRange>,
}

impl FamilySpace {
    /// Create a search space, validating the axis count.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::AxisCountMismatch`] if `axes.len()` does not
    /// match the family's parameter count.
    pub fn new(family: StrategyFamily, axes: Vec<ParamRange>) -> Result<Self, ParamsError> {
        if axes.len() != family.axis_count() {
            return Err(ParamsError::AxisCountMismatch {
                family: family.name(),
                expected: family.axis_count(),
                got: axes.len(),
            });
        }
        Ok(Self { family, axes })
    }

    /// Default search ranges for a family.
    ///
    /// Fractional axes (thresholds) are expressed in whole percent units.
    #[must_use]
    pub fn default_for(family: StrategyFamily) -> Self {
        let axes = match family {
            StrategyFamily::SmaCrossover => {
                vec![ParamRange::new(5, 20), ParamRange::new(20, 100)]
            }
            StrategyFamily::Rsi => vec![
                ParamRange::new(7, 21),
                ParamRange::new(20, 40),
                ParamRange::new(60, 80),
            ],
            StrategyFamily::Macd => vec![
                ParamRange::new(8, 16),
                ParamRange::new(20, 30),
                ParamRange::new(5, 12),
            ],
            StrategyFamily::Breakout => vec![ParamRange::new(10, 60)],
            StrategyFamily::MeanReversion => {
                vec![ParamRange::new(10, 50), ParamRange::new(1, 6)]
            }
            StrategyFamily::TrendFollowing => vec![ParamRange::new(10, 100)],
            StrategyFamily::ImprovedTrendFollowing => vec![
                ParamRange::new(20, 100),
                ParamRange::new(5, 20),
                ParamRange::new(20, 60),
                ParamRange::new(0, 4),
                ParamRange::new(0, 1),
                ParamRange::new(7, 21),
            ],
        };
        Self { family, axes }
    }

    /// The range-minimum axis values, used as the degenerate fallback.
    #[must_use]
    pub fn min_values(&self) -> Vec<i64> {
        self.axes.iter().map(|r| r.min).collect()
    }
}

/// Parameter set for one strategy family.
///
/// A closed tagged union: constructing a [`crate::strategy::FamilyStrategy`]
/// is exhaustive over these variants, so a family/parameter mismatch is
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum StrategyParams {
    /// Simple moving average crossover.
    SmaCrossover {
        /// Short SMA period (bars).
        short_period: usize,
        /// Long SMA period (bars).
        long_period: usize,
    },
    /// RSI thresholds.
    Rsi {
        /// RSI period (bars).
        period: usize,
        /// Entry threshold (RSI below this is oversold).
        oversold: Decimal,
        /// Exit threshold (RSI above this is overbought).
        overbought: Decimal,
    },
    /// MACD crossover.
    Macd {
        /// Fast EMA period.
        short_period: usize,
        /// Slow EMA period.
        long_period: usize,
        /// Signal EMA period.
        signal_period: usize,
    },
    /// Channel breakout.
    Breakout {
        /// Rolling-high lookback (bars).
        lookback: usize,
    },
    /// Mean reversion around an SMA.
    MeanReversion {
        /// SMA period (bars).
        sma_period: usize,
        /// Entry distance below the SMA (fraction, e.g. 0.03 = 3%).
        threshold: Decimal,
    },
    /// Close/SMA trend following.
    TrendFollowing {
        /// SMA period (bars).
        period: usize,
    },
    /// Trend following with MA alignment and optional RSI filter.
    ImprovedTrendFollowing {
        /// Trend SMA period (bars).
        trend_period: usize,
        /// Short alignment MA period.
        short_ma_period: usize,
        /// Long alignment MA period.
        long_ma_period: usize,
        /// Required margin above the trend SMA (fraction).
        breakout_threshold_pct: Decimal,
        /// Whether the RSI overbought filter gates entries.
        use_rsi_filter: bool,
        /// RSI period for the filter.
        rsi_period: usize,
    },
}

impl StrategyParams {
    /// The family this parameter set belongs to.
    #[must_use]
    pub const fn family(&self) -> StrategyFamily {
        match self {
            Self::SmaCrossover { .. } => StrategyFamily::SmaCrossover,
            Self::Rsi { .. } => StrategyFamily::Rsi,
            Self::Macd { .. } => StrategyFamily::Macd,
            Self::Breakout { .. } => StrategyFamily::Breakout,
            Self::MeanReversion { .. } => StrategyFamily::MeanReversion,
            Self::TrendFollowing { .. } => StrategyFamily::TrendFollowing,
            Self::ImprovedTrendFollowing { .. } => StrategyFamily::ImprovedTrendFollowing,
        }
    }

    /// Canonical default parameters for a family.
    #[must_use]
    pub fn defaults(family: StrategyFamily) -> Self {
        match family {
            StrategyFamily::SmaCrossover => Self::SmaCrossover {
                short_period: 10,
                long_period: 50,
            },
            StrategyFamily::Rsi => Self::Rsi {
                period: 14,
                oversold: Decimal::from(30),
                overbought: Decimal::from(70),
            },
            StrategyFamily::Macd => Self::Macd {
                short_period: 12,
                long_period: 26,
                signal_period: 9,
            },
            StrategyFamily::Breakout => Self::Breakout { lookback: 20 },
            StrategyFamily::MeanReversion => Self::MeanReversion {
                sma_period: 20,
                threshold: Decimal::new(3, 2),
            },
            StrategyFamily::TrendFollowing => Self::TrendFollowing { period: 50 },
            StrategyFamily::ImprovedTrendFollowing => Self::ImprovedTrendFollowing {
                trend_period: 50,
                short_ma_period: 10,
                long_ma_period: 30,
                breakout_threshold_pct: Decimal::new(1, 2),
                use_rsi_filter: true,
                rsi_period: 14,
            },
        }
    }

    /// Build a parameter set from integer axis values.
    ///
    /// Percent axes are scaled to fractions; the RSI filter axis maps
    /// `0 => false`, anything else `=> true`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::AxisCountMismatch`] if `values.len()` does not
    /// match the family's axis count.
    pub fn from_axis_values(family: StrategyFamily, values: &[i64]) -> Result<Self, ParamsError> {
        if values.len() != family.axis_count() {
            return Err(ParamsError::AxisCountMismatch {
                family: family.name(),
                expected: family.axis_count(),
                got: values.len(),
            });
        }

        let as_period = |v: i64| v.max(1).unsigned_abs() as usize;
        let as_pct = |v: i64| Decimal::new(v, 2);

        let params = match family {
            StrategyFamily::SmaCrossover => Self::SmaCrossover {
                short_period: as_period(values[0]),
                long_period: as_period(values[1]),
            },
            StrategyFamily::Rsi => Self::Rsi {
                period: as_period(values[0]),
                oversold: Decimal::from(values[1]),
                overbought: Decimal::from(values[2]),
            },
            StrategyFamily::Macd => Self::Macd {
                short_period: as_period(values[0]),
                long_period: as_period(values[1]),
                signal_period: as_period(values[2]),
            },
            StrategyFamily::Breakout => Self::Breakout {
                lookback: as_period(values[0]),
            },
            StrategyFamily::MeanReversion => Self::MeanReversion {
                sma_period: as_period(values[0]),
                threshold: as_pct(values[1]),
            },
            StrategyFamily::TrendFollowing => Self::TrendFollowing {
                period: as_period(values[0]),
            },
            StrategyFamily::ImprovedTrendFollowing => Self::ImprovedTrendFollowing {
                trend_period: as_period(values[0]),
                short_ma_period: as_period(values[1]),
                long_ma_period: as_period(values[2]),
                breakout_threshold_pct: as_pct(values[3]),
                use_rsi_filter: values[4] != 0,
                rsi_period: as_period(values[5]),
            },
        };

        Ok(params)
    }
}
