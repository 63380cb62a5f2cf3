//! circ-model
//!
//! Entity model of the monetary circuit: commodities, industries, social
//! classes, the stocks they hold, and the per-period global parameters.
//!
//! # Scope
//! - Arena-backed [`World`] with typed identifiers and name lookup
//! - Stock ledger operations (`modify_by`, `modify_to`, `transfer_stock`)
//! - Derived queries (totals per commodity, capital, profit, profit rate)
//! - [`StructuralError`] (fatal) and [`ConsistencyWarning`] (logged)
//!
//! Pure and deterministic: no IO, no clock, no randomness. All figures are
//! rounded through [`numeric`].

pub mod error;
mod ledger;
pub mod numeric;
mod types;
mod world;

pub use error::{
    ConsistencyWarning, Diagnostics, EntityKind, LedgerField, StructuralError, WarningKind,
};
pub use types::{
    ClassId, Commodity, CommodityId, Function, Global, Industry, IndustryId, LabourSupplyResponse,
    MeltResponse, Origin, Owner, PriceResponse, SocialClass, Stock, StockId, StockKind,
};
pub use world::World;
