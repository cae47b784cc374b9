// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Optimizer Engine - Strategy Evaluation Core
//!
//! Deterministic evaluation and optimization of rule-based trading
//! strategies over historical OHLCV bar series.
//!
//! # Components
//!
//! - [`series`]: Immutable bar series and windowed sub-series
//! - [`strategy`]: Strategy families, parameter spaces, entry/exit rules
//! - [`simulator`]: Long-only trade simulation under a fixed risk model
//! - [`optimizer`]: Per-family parameter search (grid or seeded random)
//! - [`cross`]: Entry/exit family pairing search
//! - [`walkforward`]: Walk-forward and rolling-window harnesses
//!
//! Every component is a synchronous pure function of its inputs; callers
//! may parallelize across symbols, families, or windows externally.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod cross;
pub mod optimizer;
pub mod series;
pub mod simulator;
pub mod strategy;
pub mod walkforward;

pub use cross::{BestInOutStrategy, CrossSearch};
pub use optimizer::{
    DEFAULT_EARLY_STOP_THRESHOLD, OptimizedParams, Optimizer, OptimizerConfig, SearchGrid,
    XorShift64,
};
pub use series::{Bar, BarSeries, SeriesError};
pub use simulator::{
    ExitReason, RiskModel, RiskResult, ScoreFn, SimulationOutcome, Simulator, TradeLogEntry,
    default_swing_score,
};
pub use strategy::{
    CombinedStrategy, FamilySpace, FamilyStrategy, ParamRange, ParamsError, SignalFn, Strategy,
    StrategyFamily, StrategyParams,
};
pub use walkforward::{
    HarnessSummary, RollingWindowHarness, WalkForwardHarness, WindowRange, WindowResult, summarize,
};
