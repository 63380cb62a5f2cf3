//! Phase state machine.
//!
//! ```text
//!   ┌──────────── PreTrade ────────────┐ ┌──────────────── ProduceAndDistribute ────────────────┐
//!   Supply ──► Demand ──► Constrain ──► Trade ──► Produce ──► Revenue ──► Prices ──► Accumulate ─┐
//!     ▲                                                                                          │
//!     └────────────────────────────────── period + 1 ────────────────────────────────────────────┘
//! ```
//!
//! Every transition is unconditional: the successor of each phase is fixed.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Supply,
    Demand,
    Constrain,
    Trade,
    Produce,
    Revenue,
    Prices,
    Accumulate,
}

impl Phase {
    /// All phases of one period, in execution order.
    pub const ALL: [Phase; 8] = [
        Phase::Supply,
        Phase::Demand,
        Phase::Constrain,
        Phase::Trade,
        Phase::Produce,
        Phase::Revenue,
        Phase::Prices,
        Phase::Accumulate,
    ];

    /// The phase that follows this one. `Accumulate` wraps to `Supply` of
    /// the next period.
    pub fn next(self) -> Phase {
        match self {
            Phase::Supply => Phase::Demand,
            Phase::Demand => Phase::Constrain,
            Phase::Constrain => Phase::Trade,
            Phase::Trade => Phase::Produce,
            Phase::Produce => Phase::Revenue,
            Phase::Revenue => Phase::Prices,
            Phase::Prices => Phase::Accumulate,
            Phase::Accumulate => Phase::Supply,
        }
    }

    /// `true` for the last phase of a period.
    pub fn ends_period(self) -> bool {
        self == Phase::Accumulate
    }

    pub fn stage(self) -> Stage {
        match self {
            Phase::Supply | Phase::Demand | Phase::Constrain => Stage::PreTrade,
            _ => Stage::ProduceAndDistribute,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Supply => "supply",
            Phase::Demand => "demand",
            Phase::Constrain => "constrain",
            Phase::Trade => "trade",
            Phase::Produce => "produce",
            Phase::Revenue => "revenue",
            Phase::Prices => "prices",
            Phase::Accumulate => "accumulate",
        }
    }

    pub fn parse(s: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two sub-machines that compose a period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Supply, Demand, Constrain.
    PreTrade,
    /// Trade, Produce, Revenue, Prices, Accumulate.
    ProduceAndDistribute,
}

impl Stage {
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Stage::PreTrade => &Phase::ALL[..3],
            Stage::ProduceAndDistribute => &Phase::ALL[3..],
        }
    }

    pub fn first(self) -> Phase {
        self.phases()[0]
    }
}
