use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Typed identifiers
// ---------------------------------------------------------------------------

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position in the owning [`World`](crate::World) arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a [`Commodity`]. Stable across period clones of one world.
    CommodityId
);
arena_id!(
    /// Index of an [`Industry`].
    IndustryId
);
arena_id!(
    /// Index of a [`SocialClass`].
    ClassId
);
arena_id!(
    /// Index of a [`Stock`].
    StockId
);

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Where a commodity comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    SociallyProduced,
    IndustriallyProduced,
    Money,
}

/// What a commodity is used for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Money,
    ProductiveInput,
    ConsumerGood,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Productive,
    Sales,
    Money,
    Consumption,
}

impl StockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockKind::Productive => "productive",
            StockKind::Sales => "sales",
            StockKind::Money => "money",
            StockKind::Consumption => "consumption",
        }
    }

    /// Productive and consumption stocks are the sources of demand.
    pub fn is_demand_source(&self) -> bool {
        matches!(self, StockKind::Productive | StockKind::Consumption)
    }
}

/// Who holds a stock.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Industry(IndustryId),
    Class(ClassId),
}

/// Whether labour supply stretches to meet demand.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabourSupplyResponse {
    #[default]
    Fixed,
    Flexible,
}

/// How unit prices are recalculated in the Prices phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceResponse {
    /// Unit prices unchanged.
    #[default]
    Simple,
    /// Prices equalise the rate of profit across industries.
    Equalise,
    /// Market-clearing adjustment. Not supported; selecting it aborts Prices.
    Dynamic,
}

impl PriceResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceResponse::Simple => "simple",
            PriceResponse::Equalise => "equalise",
            PriceResponse::Dynamic => "dynamic",
        }
    }
}

/// Whether the MELT tracks the observed price/value ratio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeltResponse {
    #[default]
    Fixed,
    Adjust,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A produced or natural kind of good.
///
/// `total_supply` and `total_demand` are registered by the Supply and Demand
/// phases; totals of quantity, value and price are always derived from stocks
/// (see [`World::total_quantity`](crate::World::total_quantity)).
#[derive(Clone, Debug, PartialEq)]
pub struct Commodity {
    pub name: String,
    pub origin: Origin,
    pub function: Function,
    /// Periods needed to fully use up one unit of stock.
    pub turnover_time: f64,
    pub unit_value: f64,
    pub unit_price: f64,
    pub total_supply: f64,
    pub total_demand: f64,
    /// Produced minus used up, this period.
    pub surplus_product: f64,
    /// Fraction of demand satisfiable from supply, in `[0, 1]`.
    pub allocation_share: f64,
    pub stock_used_up: f64,
    pub stock_produced: f64,
}

impl Commodity {
    pub fn new(name: impl Into<String>, origin: Origin, function: Function) -> Self {
        Self {
            name: name.into(),
            origin,
            function,
            turnover_time: 1.0,
            unit_value: 1.0,
            unit_price: 1.0,
            total_supply: 0.0,
            total_demand: 0.0,
            surplus_product: 0.0,
            allocation_share: 1.0,
            stock_used_up: 0.0,
            stock_produced: 0.0,
        }
    }

    pub fn with_turnover_time(mut self, turnover_time: f64) -> Self {
        self.turnover_time = turnover_time;
        self
    }

    pub fn with_unit_value(mut self, unit_value: f64) -> Self {
        self.unit_value = unit_value;
        self
    }

    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Labour power: the socially produced productive input.
    pub fn is_labour_power(&self) -> bool {
        self.origin == Origin::SociallyProduced && self.function == Function::ProductiveInput
    }

    pub fn is_money(&self) -> bool {
        self.function == Function::Money
    }
}

/// A single producer of exactly one commodity.
#[derive(Clone, Debug, PartialEq)]
pub struct Industry {
    pub name: String,
    pub commodity: CommodityId,
    /// Actual output of the current period.
    pub output: f64,
    /// Desired output for the next period, set during Accumulate.
    pub proposed_output: f64,
    /// Output after scarcity rationing; never above `proposed_output`.
    pub constrained_output: f64,
    /// Capital committed at the start of the period.
    pub initial_capital: f64,
    pub growth_rate: f64,
    /// Profit measured by the Revenue phase before it is distributed.
    pub profit_earned: f64,
    pub money_stock: StockId,
    pub sales_stock: StockId,
    pub productive_stocks: Vec<StockId>,
}

/// A group supplying labour and/or consuming goods.
#[derive(Clone, Debug, PartialEq)]
pub struct SocialClass {
    pub name: String,
    pub size: f64,
    /// Share of `size` offering labour.
    pub participation_ratio: f64,
    /// Disposable money this period.
    pub revenue: f64,
    pub money_stock: StockId,
    pub sales_stock: Option<StockId>,
    pub consumption_stocks: Vec<StockId>,
}

/// The only mutable ledger entity.
///
/// `value == quantity * unit_value` and `price == quantity * unit_price`
/// whenever the commodity's unit figures are current. Mutate only through
/// the ledger operations on [`World`](crate::World).
#[derive(Clone, Debug, PartialEq)]
pub struct Stock {
    pub owner: Owner,
    pub commodity: CommodityId,
    pub kind: StockKind,
    pub quantity: f64,
    pub value: f64,
    pub price: f64,
    /// Quantity demanded this period to replenish the stock.
    pub replenishment_demand: f64,
    /// Additional quantity funded by Accumulate for next period's expansion.
    pub expansion_demand: f64,
    /// Units needed per unit of owner output (productive stocks).
    pub production_coefficient: f64,
    /// Share of owner revenue spent on this stock (consumption stocks).
    pub consumption_coefficient: f64,
    pub stock_used_up: f64,
}

impl Stock {
    pub(crate) fn empty(owner: Owner, commodity: CommodityId, kind: StockKind) -> Self {
        Self {
            owner,
            commodity,
            kind,
            quantity: 0.0,
            value: 0.0,
            price: 0.0,
            replenishment_demand: 0.0,
            expansion_demand: 0.0,
            production_coefficient: 0.0,
            consumption_coefficient: 0.0,
            stock_used_up: 0.0,
        }
    }
}

/// Economy-wide parameters for one period.
#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    /// Monetary expression of labour time.
    pub melt: f64,
    pub rate_of_exploitation: f64,
    pub population_growth_rate: f64,
    /// Share of capitalist money that may be invested in one period.
    pub investment_ratio: f64,
    pub labour_supply_response: LabourSupplyResponse,
    pub price_response: PriceResponse,
    pub melt_response: MeltResponse,
}

impl Default for Global {
    fn default() -> Self {
        Self {
            melt: 1.0,
            rate_of_exploitation: 0.0,
            population_growth_rate: 0.0,
            investment_ratio: 1.0,
            labour_supply_response: LabourSupplyResponse::Fixed,
            price_response: PriceResponse::Simple,
            melt_response: MeltResponse::Fixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labour_power_is_socially_produced_input() {
        let lp = Commodity::new(
            "Labour Power",
            Origin::SociallyProduced,
            Function::ProductiveInput,
        );
        assert!(lp.is_labour_power());
        let iron = Commodity::new("Iron", Origin::IndustriallyProduced, Function::ProductiveInput);
        assert!(!iron.is_labour_power());
    }

    #[test]
    fn only_productive_and_consumption_stocks_demand() {
        assert!(StockKind::Productive.is_demand_source());
        assert!(StockKind::Consumption.is_demand_source());
        assert!(!StockKind::Sales.is_demand_source());
        assert!(!StockKind::Money.is_demand_source());
    }
}
