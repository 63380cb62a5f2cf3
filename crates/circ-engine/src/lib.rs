//! circ-engine
//!
//! Phase engine of the monetary circuit.
//!
//! Each period runs a fixed sequence of phases over one open snapshot:
//!
//! Supply -> Demand -> Constrain -> Trade -> Produce -> Revenue -> Prices -> Accumulate
//!
//! - Deterministic: the same opening snapshot gives bit-identical periods
//! - Proportional rationing under scarcity, no buyer priority
//! - Dual bookkeeping of value (labour time at the MELT) and price
//! - Simple and Equalise price responses; Dynamic is rejected
//! - Profit-funded accumulation, Department I before Department II
//!
//! Fatal problems abort the period with a [`PhaseError`]; everything else is
//! reported as a warning in the [`PhaseReport`].

mod context;
mod error;
mod phase;
pub mod phases;
mod report;
mod simulation;

pub use context::PeriodContext;
pub use error::PhaseError;
pub use phase::{Phase, Stage};
pub use phases::accumulate::{allocate_investment, Department, Funding, InvestmentPlan};
pub use report::{PeriodReport, PeriodTotals, PhaseReport};
pub use simulation::Simulation;
