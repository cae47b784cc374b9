//! Entry/exit family pairing search.
//!
//! A family whose entry rule finds good trades is not necessarily the family
//! whose exit rule closes them best. [`CrossSearch`] optimizes every family
//! independently, then simulates the full entry/exit cross product and keeps
//! the pairing with the highest rendement.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::optimizer::{OptimizedParams, Optimizer};
use crate::series::BarSeries;
use crate::simulator::{RiskModel, RiskResult, Simulator};
use crate::strategy::{CombinedStrategy, FamilySpace, StrategyParams};

/// The winning entry/exit pairing from a cross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestInOutStrategy {
    /// Entry family name.
    pub entry_name: String,
    /// Parameters whose entry rule is used.
    pub entry_params: StrategyParams,
    /// Exit family name.
    pub exit_name: String,
    /// Parameters whose exit rule is used.
    pub exit_params: StrategyParams,
    /// Metrics of the winning pairing over the full series.
    pub result: RiskResult,
    /// Risk model the pairing was evaluated under.
    pub risk_model: RiskModel,
}

impl BestInOutStrategy {
    /// Export the record as pretty-printed JSON for reporting surfaces.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Cross-product search over entry/exit family pairings.
///
/// Cost is O(F) optimizations plus O(F²) simulations for F families.
#[derive(Debug, Clone, Default)]
pub struct CrossSearch {
    optimizer: Optimizer,
}

impl CrossSearch {
    /// Create a cross search with a default optimizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            optimizer: Optimizer::new(),
        }
    }

    /// Use a configured optimizer for the per-family searches. Its risk
    /// model also governs the pairing simulations.
    #[must_use]
    pub fn with_optimizer(optimizer: Optimizer) -> Self {
        Self { optimizer }
    }

    /// Find the best entry/exit pairing over `series`.
    ///
    /// Optimizes each family once against the full series, then simulates
    /// every (entry, exit) pairing of the optimized parameter sets, same
    /// family on both sides included. Returns `None` only when `spaces` is
    /// empty; degenerate families still participate with their fallback
    /// parameters.
    #[must_use]
    pub fn best_pairing(
        &self,
        series: &BarSeries,
        spaces: &[FamilySpace],
    ) -> Option<BestInOutStrategy> {
        if spaces.is_empty() {
            return None;
        }

        info!(
            families = spaces.len(),
            bars = series.len(),
            "starting cross search"
        );

        let optimized: Vec<OptimizedParams> = spaces
            .iter()
            .map(|space| self.optimizer.optimize(series, space))
            .collect();

        let model = self.optimizer.model().clone();
        let simulator = Simulator::new(model.clone());
        let mut best: Option<BestInOutStrategy> = None;

        for entry in &optimized {
            for exit in &optimized {
                let strategy = CombinedStrategy::new(entry.params.clone(), exit.params.clone());
                let result = simulator.run(series, &strategy);
                debug!(
                    entry = %entry.params.family(),
                    exit = %exit.params.family(),
                    rendement = %result.rendement,
                    trades = result.trade_count,
                    "evaluated pairing"
                );

                if best
                    .as_ref()
                    .is_none_or(|found| result.rendement > found.result.rendement)
                {
                    best = Some(BestInOutStrategy {
                        entry_name: entry.params.family().name().to_string(),
                        entry_params: entry.params.clone(),
                        exit_name: exit.params.family().name().to_string(),
                        exit_params: exit.params.clone(),
                        result,
                        risk_model: model.clone(),
                    });
                }
            }
        }

        if let Some(found) = &best {
            info!(
                entry = %found.entry_name,
                exit = %found.exit_name,
                rendement = %found.result.rendement,
                "cross search finished"
            );
        }
        best
    }
}
