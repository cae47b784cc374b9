//! Long-only trade simulation over historical bar series.
//!
//! The [`Simulator`] replays a [`Strategy`](crate::strategy::Strategy)
//! against a [`BarSeries`](crate::series::BarSeries) under a fixed
//! [`RiskModel`] and produces a [`RiskResult`] plus an optional trade log.

pub mod engine;
pub mod result;

pub use engine::Simulator;
pub use result::{
    default_swing_score, ExitReason, RiskModel, RiskResult, ScoreFn, SimulationOutcome,
    TradeLogEntry,
};
