//! Engine Integration Tests
//!
//! End-to-end checks across the evaluation pipeline: simulation over known
//! series shapes, optimizer search modes, pairing search, and harness window
//! accounting.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::unreadable_literal)]

use optimizer_engine::{
    Bar, BarSeries, CrossSearch, ExitReason, FamilySpace, FamilyStrategy, Optimizer,
    OptimizerConfig, RiskModel, RollingWindowHarness, Simulator, StrategyFamily, StrategyParams,
    WalkForwardHarness, summarize,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Build a series from integer closes, one bar per minute.
fn make_series(closes: &[i64]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let price = Decimal::from(close);
            Bar::new(
                format!("2024-01-01T{:02}:{:02}:00Z", i / 60, i % 60),
                price,
                price,
                price,
                price,
                Decimal::from(1000),
            )
        })
        .collect();
    BarSeries::new(bars).expect("fixture timestamps are monotonic")
}

/// Strictly increasing closes, 100 through 100 + len - 1.
fn make_rising_series(len: i64) -> BarSeries {
    let closes: Vec<i64> = (0..len).map(|i| 100 + i).collect();
    make_series(&closes)
}

/// A zigzag between 90 and 110 so every strategy family sees both rising
/// and falling stretches.
fn make_zigzag_series(len: usize) -> BarSeries {
    let closes: Vec<i64> = (0..len)
        .map(|i| {
            let phase = (i % 40) as i64;
            if phase < 20 { 90 + phase } else { 130 - phase }
        })
        .collect();
    make_series(&closes)
}

// ============================================
// Known-Series Simulations
// ============================================

#[test]
fn test_rising_series_sma_crossover_single_trade() {
    let series = make_rising_series(100);
    let params = StrategyParams::SmaCrossover {
        short_period: 5,
        long_period: 20,
    };
    let strategy = FamilyStrategy::new(params);

    // Wide stop and take-profit so neither trigger preempts the crossover
    // trade before the end of data.
    let model = RiskModel {
        stop_loss_pct: dec!(0.90),
        take_profit_pct: dec!(10),
        ..RiskModel::default()
    };
    let outcome = Simulator::new(model.clone()).run_detailed(&series, &strategy);

    // The long SMA first becomes defined at bar 19, where the short SMA
    // already leads it, so the one and only entry fires there.
    assert_eq!(outcome.result.trade_count, 1);
    let trade = &outcome.trades[0];
    assert_eq!(trade.entry_index, 19);
    assert_eq!(trade.entry_price, dec!(119));
    assert_eq!(trade.exit_index, 99);
    assert_eq!(trade.exit_price, dec!(199));
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);

    // Rendement is the single trade's PnL scaled by risk share and capital.
    let expected_pnl =
        model.initial_capital * model.risk_per_trade * (dec!(199) - dec!(119)) / dec!(119);
    assert_eq!(trade.pnl, expected_pnl);
    assert_eq!(
        outcome.result.rendement,
        (model.initial_capital + expected_pnl) / model.initial_capital - Decimal::ONE
    );
    assert!(outcome.result.rendement > Decimal::ZERO);
}

#[test]
fn test_flat_series_is_silent_for_every_family() {
    let series = make_series(&[100; 50]);
    let simulator = Simulator::new(RiskModel::default());

    for family in StrategyFamily::ALL {
        let strategy = FamilyStrategy::new(StrategyParams::defaults(family));
        let result = simulator.run(&series, &strategy);
        assert_eq!(result.trade_count, 0, "{family}");
        assert_eq!(result.rendement, Decimal::ZERO, "{family}");
        assert_eq!(result.win_rate, Decimal::ZERO, "{family}");
        assert_eq!(result.profit_factor, Decimal::ZERO, "{family}");
        assert_eq!(result.max_drawdown, Decimal::ZERO, "{family}");
    }
}

// ============================================
// Optimizer
// ============================================

#[test]
fn test_optimizer_performance_dominates_first_candidate() {
    let series = make_zigzag_series(120);
    let space = FamilySpace::default_for(StrategyFamily::SmaCrossover);

    // The first grid candidate is the range-minimum tuple.
    let first_params =
        StrategyParams::from_axis_values(space.family, &space.min_values()).expect("axis counts");
    let first = Simulator::new(RiskModel::default())
        .run(&series, &FamilyStrategy::new(first_params));

    let found = Optimizer::new().optimize(&series, &space);
    let performance = found.performance.expect("non-empty space");
    assert!(performance >= first.rendement);
}

#[test]
fn test_optimizer_early_stop_still_dominates_first_candidate() {
    let series = make_zigzag_series(120);
    let space = FamilySpace::default_for(StrategyFamily::SmaCrossover);

    let config = OptimizerConfig {
        early_stop_threshold: Some(optimizer_engine::DEFAULT_EARLY_STOP_THRESHOLD),
        ..OptimizerConfig::default()
    };
    let found = Optimizer::new().with_config(config).optimize(&series, &space);

    let first_params =
        StrategyParams::from_axis_values(space.family, &space.min_values()).expect("axis counts");
    let first = Simulator::new(RiskModel::default())
        .run(&series, &FamilyStrategy::new(first_params));

    assert!(found.performance.expect("non-empty space") >= first.rendement);
}

// ============================================
// Cross Search
// ============================================

#[test]
fn test_cross_search_over_all_families() {
    let series = make_zigzag_series(120);
    let spaces: Vec<FamilySpace> = [
        StrategyFamily::SmaCrossover,
        StrategyFamily::Breakout,
        StrategyFamily::MeanReversion,
        StrategyFamily::TrendFollowing,
    ]
    .into_iter()
    .map(FamilySpace::default_for)
    .collect();

    let found = CrossSearch::new()
        .best_pairing(&series, &spaces)
        .expect("non-empty spaces");

    // The winner must dominate every single-family diagonal.
    let search = CrossSearch::new();
    for space in &spaces {
        let diagonal = search
            .best_pairing(&series, std::slice::from_ref(space))
            .expect("single space");
        assert!(found.result.rendement >= diagonal.result.rendement);
    }
}

// ============================================
// Harnesses
// ============================================

#[test]
fn test_walk_forward_non_overlap_over_long_series() {
    let series = make_zigzag_series(200);
    let space = FamilySpace::default_for(StrategyFamily::TrendFollowing);
    let results = WalkForwardHarness::new(40, 20).run(&series, &space);

    assert_eq!(results.len(), 3);
    for pair in results.windows(2) {
        assert_eq!(pair[1].opt_range.start, pair[0].test_range.end + 1);
    }
    for window in &results {
        assert_eq!(window.opt_range.len(), 40);
        assert_eq!(window.test_range.len(), 20);
        assert_eq!(window.params.family(), StrategyFamily::TrendFollowing);
    }
}

#[test]
fn test_rolling_harness_summary_accounts_every_window() {
    let series = make_zigzag_series(160);
    let space = FamilySpace::default_for(StrategyFamily::Breakout);
    let results = RollingWindowHarness::new(40, 20, 20).run(&series, &space);
    assert!(!results.is_empty());

    let summary = summarize(&results);
    assert_eq!(summary.windows, results.len());
    assert_eq!(
        summary.total_trades,
        results.iter().map(|w| w.result.trade_count).sum::<u64>()
    );
    assert!(summary.profitable_windows <= summary.windows);
}

// ============================================
// Properties
// ============================================

proptest! {
    #[test]
    fn prop_simulation_is_pure(closes in proptest::collection::vec(1i64..10_000, 2..80)) {
        let series = make_series(&closes);
        let strategy =
            FamilyStrategy::new(StrategyParams::defaults(StrategyFamily::TrendFollowing));
        let simulator = Simulator::new(RiskModel::default());

        let first = simulator.run(&series, &strategy);
        let second = simulator.run(&series, &strategy);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_trade_log_replays_to_rendement(closes in proptest::collection::vec(1i64..10_000, 2..80)) {
        let series = make_series(&closes);
        let strategy =
            FamilyStrategy::new(StrategyParams::defaults(StrategyFamily::MeanReversion));
        let model = RiskModel::default();
        let outcome = Simulator::new(model.clone()).run_detailed(&series, &strategy);

        let mut capital = model.initial_capital;
        for trade in &outcome.trades {
            capital += trade.pnl;
        }
        prop_assert_eq!(
            outcome.result.rendement,
            capital / model.initial_capital - Decimal::ONE
        );
    }
}
