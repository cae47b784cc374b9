//! Walk-forward and rolling-window evaluation harnesses.
//!
//! Both harnesses slice a series into sequential (optimization-window,
//! test-window) pairs, optimize on the first window and simulate the result
//! on the second, so every test window is strictly out-of-sample relative to
//! the optimization that produced its parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::optimizer::Optimizer;
use crate::series::BarSeries;
use crate::simulator::{RiskResult, Simulator};
use crate::strategy::{FamilySpace, FamilyStrategy, StrategyParams};

/// Inclusive bar-index range of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRange {
    /// First bar index.
    pub start: usize,
    /// Last bar index, inclusive.
    pub end: usize,
}

impl WindowRange {
    /// Number of bars covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false: a range covers at least its start bar.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Outcome of one optimize-then-test window pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Bars the parameters were optimized on.
    pub opt_range: WindowRange,
    /// Out-of-sample bars the parameters were tested on.
    pub test_range: WindowRange,
    /// Parameters the optimization window produced.
    pub params: StrategyParams,
    /// Out-of-sample metrics over the test window.
    pub result: RiskResult,
}

/// Aggregate view over a harness run's out-of-sample results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HarnessSummary {
    /// Number of windows evaluated.
    pub windows: usize,
    /// Windows with a positive out-of-sample rendement.
    pub profitable_windows: usize,
    /// Out-of-sample rendements compounded across windows.
    pub compounded_rendement: Decimal,
    /// Mean out-of-sample win rate.
    pub avg_win_rate: Decimal,
    /// Worst out-of-sample drawdown seen in any window.
    pub worst_drawdown: Decimal,
    /// Total out-of-sample trades.
    pub total_trades: u64,
}

impl HarnessSummary {
    /// Export the summary as pretty-printed JSON for reporting surfaces.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Aggregate a harness run's window results.
#[must_use]
pub fn summarize(results: &[WindowResult]) -> HarnessSummary {
    if results.is_empty() {
        return HarnessSummary::default();
    }

    let mut compounded = Decimal::ONE;
    let mut win_rate_sum = Decimal::ZERO;
    let mut worst_drawdown = Decimal::ZERO;
    let mut total_trades = 0u64;
    let mut profitable = 0usize;

    for window in results {
        compounded *= Decimal::ONE + window.result.rendement;
        win_rate_sum += window.result.win_rate;
        worst_drawdown = worst_drawdown.max(window.result.max_drawdown);
        total_trades += window.result.trade_count;
        if window.result.rendement > Decimal::ZERO {
            profitable += 1;
        }
    }

    HarnessSummary {
        windows: results.len(),
        profitable_windows: profitable,
        compounded_rendement: compounded - Decimal::ONE,
        avg_win_rate: win_rate_sum / Decimal::from(results.len()),
        worst_drawdown,
        total_trades,
    }
}

/// Rolling-window harness: window starts advance by a fixed step, so
/// consecutive windows may overlap when `step_size < opt_size + test_size`.
#[derive(Debug, Clone)]
pub struct RollingWindowHarness {
    opt_size: usize,
    test_size: usize,
    step_size: usize,
    optimizer: Optimizer,
}

impl RollingWindowHarness {
    /// Create a harness with the given window geometry and a default
    /// optimizer.
    #[must_use]
    pub fn new(opt_size: usize, test_size: usize, step_size: usize) -> Self {
        Self {
            opt_size,
            test_size,
            step_size,
            optimizer: Optimizer::new(),
        }
    }

    /// Use a configured optimizer for the per-window searches. Its risk
    /// model also governs the out-of-sample simulations.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Run the harness over `series` for one family search space.
    ///
    /// Windows start at `0, step, 2*step, …` while a full
    /// optimization-plus-test pair still fits. A series too short for even
    /// one pair yields an empty result, not an error.
    #[must_use]
    pub fn run(&self, series: &BarSeries, space: &FamilySpace) -> Vec<WindowResult> {
        if self.step_size == 0 {
            warn!("rolling window step of zero, no windows generated");
            return Vec::new();
        }
        info!(
            bars = series.len(),
            opt_size = self.opt_size,
            test_size = self.test_size,
            step_size = self.step_size,
            family = %space.family,
            "starting rolling window run"
        );
        run_windows(
            series,
            space,
            &self.optimizer,
            self.opt_size,
            self.test_size,
            self.step_size,
        )
    }
}

/// Walk-forward harness: each optimization window starts exactly where the
/// previous test window ended, so test windows never overlap.
#[derive(Debug, Clone)]
pub struct WalkForwardHarness {
    opt_size: usize,
    test_size: usize,
    optimizer: Optimizer,
}

impl WalkForwardHarness {
    /// Create a harness with the given window geometry and a default
    /// optimizer.
    #[must_use]
    pub fn new(opt_size: usize, test_size: usize) -> Self {
        Self {
            opt_size,
            test_size,
            optimizer: Optimizer::new(),
        }
    }

    /// Use a configured optimizer for the per-window searches. Its risk
    /// model also governs the out-of-sample simulations.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Run the harness over `series` for one family search space.
    ///
    /// Consecutive results satisfy
    /// `opt_range[i + 1].start == test_range[i].end + 1`. A series too short
    /// for even one window pair yields an empty result, not an error.
    #[must_use]
    pub fn run(&self, series: &BarSeries, space: &FamilySpace) -> Vec<WindowResult> {
        info!(
            bars = series.len(),
            opt_size = self.opt_size,
            test_size = self.test_size,
            family = %space.family,
            "starting walk-forward run"
        );
        // Advancing by the full pair width makes the next optimization
        // window start right after the previous test window.
        run_windows(
            series,
            space,
            &self.optimizer,
            self.opt_size,
            self.test_size,
            self.opt_size + self.test_size,
        )
    }
}

/// Shared window loop for both harnesses.
fn run_windows(
    series: &BarSeries,
    space: &FamilySpace,
    optimizer: &Optimizer,
    opt_size: usize,
    test_size: usize,
    step_size: usize,
) -> Vec<WindowResult> {
    if opt_size == 0 || test_size == 0 {
        warn!(opt_size, test_size, "degenerate window sizes, no windows generated");
        return Vec::new();
    }

    let total = series.len();
    let simulator = Simulator::new(optimizer.model().clone());
    let mut results = Vec::new();
    let mut start = 0usize;

    while start + opt_size + test_size <= total {
        let test_start = start + opt_size;
        let test_end = test_start + test_size;

        let Ok(opt_series) = series.sub_series(start, test_start) else {
            break;
        };
        let Ok(test_series) = series.sub_series(test_start, test_end) else {
            break;
        };

        let optimized = optimizer.optimize(&opt_series, space);
        let strategy = FamilyStrategy::new(optimized.params.clone());
        let result = simulator.run(&test_series, &strategy);

        results.push(WindowResult {
            opt_range: WindowRange {
                start,
                end: test_start - 1,
            },
            test_range: WindowRange {
                start: test_start,
                end: test_end - 1,
            },
            params: optimized.params,
            result,
        });

        start += step_size;
    }

    if results.is_empty() {
        warn!(
            bars = total,
            opt_size, test_size, "series too short for one window pair"
        );
    }
    results
}
