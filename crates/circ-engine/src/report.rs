use circ_model::{ConsistencyWarning, WarningKind, World};
use circ_store::TimeStamp;

use crate::phase::Phase;

/// Outcome of one completed phase.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseReport {
    pub period: u32,
    pub phase: Phase,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Economy-wide figures read from a period's closing snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodTotals {
    pub total_value: f64,
    pub total_price: f64,
    pub melt: f64,
    /// NaN when no industry holds capital.
    pub economy_profit_rate: f64,
    pub rate_of_exploitation: f64,
}

impl PeriodTotals {
    pub fn from_world(world: &World) -> Self {
        Self {
            total_value: world.aggregate_value(),
            total_price: world.aggregate_price(),
            melt: world.global.melt,
            economy_profit_rate: world.economy_profit_rate(),
            rate_of_exploitation: world.global.rate_of_exploitation,
        }
    }
}

/// Outcome of one completed period.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodReport {
    pub period: u32,
    /// Time-stamp the period was committed under.
    pub time_stamp: TimeStamp,
    pub phases: Vec<PhaseReport>,
    pub totals: PeriodTotals,
}

impl PeriodReport {
    pub fn warnings(&self) -> impl Iterator<Item = &ConsistencyWarning> {
        self.phases.iter().flat_map(|p| p.warnings.iter())
    }

    pub fn warning_count(&self) -> usize {
        self.phases.iter().map(|p| p.warnings.len()).sum()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings().filter(|w| w.kind == kind).count()
    }
}
