//! Strategy families, parameters, and signal rule construction.
//!
//! A strategy is a pair of boolean signal functions (entry, exit) built once
//! per series. Seven rule-based families are bundled; each is parameterized
//! by a closed tagged [`StrategyParams`] variant so that family/parameter
//! mismatches cannot be constructed.

mod indicators;
mod params;
mod rules;

pub use params::{FamilySpace, ParamRange, ParamsError, StrategyFamily, StrategyParams};
pub use rules::{CombinedStrategy, FamilyStrategy, SignalFn, Strategy};
