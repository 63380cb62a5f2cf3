//! The entity graph for one time-stamp.
//!
//! Entities live in per-kind arenas and refer to each other through typed
//! indices ([`CommodityId`], [`StockId`], ...). Names are resolved once, through
//! the lookup tables owned here, so a cloned world (the next period's
//! snapshot) keeps every reference valid without re-resolution.

use std::collections::BTreeMap;

use crate::error::{EntityKind, StructuralError};
use crate::numeric::{is_negligible, ratio, round_to_precision};
use crate::types::{
    ClassId, Commodity, CommodityId, Function, Global, Industry, IndustryId, Origin, Owner,
    SocialClass, Stock, StockId, StockKind,
};

#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub global: Global,
    commodities: Vec<Commodity>,
    industries: Vec<Industry>,
    classes: Vec<SocialClass>,
    stocks: Vec<Stock>,
    commodity_index: BTreeMap<String, CommodityId>,
    industry_index: BTreeMap<String, IndustryId>,
    class_index: BTreeMap<String, ClassId>,
    money: Option<CommodityId>,
    capitalists: Option<ClassId>,
}

impl World {
    pub fn new(global: Global) -> Self {
        Self {
            global,
            commodities: Vec::new(),
            industries: Vec::new(),
            classes: Vec::new(),
            stocks: Vec::new(),
            commodity_index: BTreeMap::new(),
            industry_index: BTreeMap::new(),
            class_index: BTreeMap::new(),
            money: None,
            capitalists: None,
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Register a commodity. At most one money commodity is allowed and its
    /// unit price and unit value must both be 1.
    pub fn add_commodity(&mut self, commodity: Commodity) -> Result<CommodityId, StructuralError> {
        if self.commodity_index.contains_key(&commodity.name) {
            return Err(StructuralError::DuplicateEntity {
                kind: EntityKind::Commodity,
                key: commodity.name,
            });
        }
        let is_money = commodity.is_money() || commodity.origin == Origin::Money;
        if is_money {
            if commodity.function != Function::Money || commodity.origin != Origin::Money {
                return Err(StructuralError::InvalidModel {
                    reason: format!(
                        "commodity '{}' mixes money and non-money classification",
                        commodity.name
                    ),
                });
            }
            if self.money.is_some() {
                return Err(StructuralError::InvalidModel {
                    reason: format!("second money commodity '{}'", commodity.name),
                });
            }
            if commodity.unit_price != 1.0 || commodity.unit_value != 1.0 {
                return Err(StructuralError::InvalidModel {
                    reason: format!(
                        "money commodity '{}' must have unit price and unit value 1",
                        commodity.name
                    ),
                });
            }
        }
        let id = CommodityId::from_index(self.commodities.len());
        self.commodity_index.insert(commodity.name.clone(), id);
        self.commodities.push(commodity);
        if is_money {
            self.money = Some(id);
        }
        Ok(id)
    }

    /// Register an industry producing `commodity`, creating its money and
    /// sales stocks (both empty).
    pub fn add_industry(
        &mut self,
        name: impl Into<String>,
        commodity: &str,
        output: f64,
        growth_rate: f64,
    ) -> Result<IndustryId, StructuralError> {
        let name = name.into();
        if self.industry_index.contains_key(&name) {
            return Err(StructuralError::DuplicateEntity {
                kind: EntityKind::Industry,
                key: name,
            });
        }
        let product = self.find_commodity(commodity)?;
        if self.commodity(product).is_money() {
            return Err(StructuralError::InvalidModel {
                reason: format!("industry '{name}' cannot produce money"),
            });
        }
        let money = self.money_commodity()?;

        let id = IndustryId::from_index(self.industries.len());
        let money_stock = self.push_stock(Stock::empty(Owner::Industry(id), money, StockKind::Money));
        let sales_stock =
            self.push_stock(Stock::empty(Owner::Industry(id), product, StockKind::Sales));

        self.industry_index.insert(name.clone(), id);
        self.industries.push(Industry {
            name,
            commodity: product,
            output,
            proposed_output: output,
            constrained_output: output,
            initial_capital: 0.0,
            growth_rate,
            profit_earned: 0.0,
            money_stock,
            sales_stock,
            productive_stocks: Vec::new(),
        });
        Ok(id)
    }

    /// Attach a productive input stock to an industry.
    pub fn add_productive_stock(
        &mut self,
        industry: IndustryId,
        commodity: &str,
        production_coefficient: f64,
    ) -> Result<StockId, StructuralError> {
        let c = self.find_commodity(commodity)?;
        if self.commodity(c).function != Function::ProductiveInput {
            return Err(StructuralError::InvalidModel {
                reason: format!(
                    "industry '{}' uses '{}', which is not a productive input",
                    self.industry(industry).name,
                    commodity
                ),
            });
        }
        let mut stock = Stock::empty(Owner::Industry(industry), c, StockKind::Productive);
        stock.production_coefficient = production_coefficient;
        let id = self.push_stock(stock);
        self.industries[industry.index()].productive_stocks.push(id);
        Ok(id)
    }

    /// Register a social class with an empty money stock.
    pub fn add_class(
        &mut self,
        name: impl Into<String>,
        size: f64,
        participation_ratio: f64,
    ) -> Result<ClassId, StructuralError> {
        let name = name.into();
        if self.class_index.contains_key(&name) {
            return Err(StructuralError::DuplicateEntity {
                kind: EntityKind::SocialClass,
                key: name,
            });
        }
        let money = self.money_commodity()?;
        let id = ClassId::from_index(self.classes.len());
        let money_stock = self.push_stock(Stock::empty(Owner::Class(id), money, StockKind::Money));
        self.class_index.insert(name.clone(), id);
        self.classes.push(SocialClass {
            name,
            size,
            participation_ratio,
            revenue: 0.0,
            money_stock,
            sales_stock: None,
            consumption_stocks: Vec::new(),
        });
        Ok(id)
    }

    /// Give a class its (single) sales stock, typically labour power.
    pub fn add_class_sales_stock(
        &mut self,
        class: ClassId,
        commodity: &str,
    ) -> Result<StockId, StructuralError> {
        let c = self.find_commodity(commodity)?;
        if self.classes[class.index()].sales_stock.is_some() {
            return Err(StructuralError::InvalidModel {
                reason: format!("class '{}' already has a sales stock", self.class(class).name),
            });
        }
        let id = self.push_stock(Stock::empty(Owner::Class(class), c, StockKind::Sales));
        self.classes[class.index()].sales_stock = Some(id);
        Ok(id)
    }

    pub fn add_consumption_stock(
        &mut self,
        class: ClassId,
        commodity: &str,
        consumption_coefficient: f64,
    ) -> Result<StockId, StructuralError> {
        let c = self.find_commodity(commodity)?;
        if self.commodity(c).function != Function::ConsumerGood {
            return Err(StructuralError::InvalidModel {
                reason: format!(
                    "class '{}' consumes '{}', which is not a consumer good",
                    self.class(class).name,
                    commodity
                ),
            });
        }
        let mut stock = Stock::empty(Owner::Class(class), c, StockKind::Consumption);
        stock.consumption_coefficient = consumption_coefficient;
        let id = self.push_stock(stock);
        self.classes[class.index()].consumption_stocks.push(id);
        Ok(id)
    }

    /// Name the class that receives profit and funds accumulation.
    pub fn set_capitalists(&mut self, name: &str) -> Result<ClassId, StructuralError> {
        let id = self.find_class(name)?;
        self.capitalists = Some(id);
        Ok(id)
    }

    fn push_stock(&mut self, stock: Stock) -> StockId {
        let id = StockId::from_index(self.stocks.len());
        self.stocks.push(stock);
        id
    }

    // -----------------------------------------------------------------------
    // Arena access
    // -----------------------------------------------------------------------

    pub fn commodity(&self, id: CommodityId) -> &Commodity {
        &self.commodities[id.index()]
    }

    pub fn commodity_mut(&mut self, id: CommodityId) -> &mut Commodity {
        &mut self.commodities[id.index()]
    }

    pub fn industry(&self, id: IndustryId) -> &Industry {
        &self.industries[id.index()]
    }

    pub fn industry_mut(&mut self, id: IndustryId) -> &mut Industry {
        &mut self.industries[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &SocialClass {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut SocialClass {
        &mut self.classes[id.index()]
    }

    pub fn stock(&self, id: StockId) -> &Stock {
        &self.stocks[id.index()]
    }

    /// Direct access to non-ledger fields (demand, coefficients, counters).
    /// Quantity, value and price must go through the ledger operations.
    pub fn stock_mut(&mut self, id: StockId) -> &mut Stock {
        &mut self.stocks[id.index()]
    }

    pub fn commodity_ids(&self) -> Vec<CommodityId> {
        (0..self.commodities.len()).map(CommodityId::from_index).collect()
    }

    pub fn industry_ids(&self) -> Vec<IndustryId> {
        (0..self.industries.len()).map(IndustryId::from_index).collect()
    }

    pub fn class_ids(&self) -> Vec<ClassId> {
        (0..self.classes.len()).map(ClassId::from_index).collect()
    }

    pub fn stock_ids(&self) -> Vec<StockId> {
        (0..self.stocks.len()).map(StockId::from_index).collect()
    }

    pub fn commodities(&self) -> impl Iterator<Item = (CommodityId, &Commodity)> {
        self.commodities
            .iter()
            .enumerate()
            .map(|(i, c)| (CommodityId::from_index(i), c))
    }

    pub fn industries(&self) -> impl Iterator<Item = (IndustryId, &Industry)> {
        self.industries
            .iter()
            .enumerate()
            .map(|(i, x)| (IndustryId::from_index(i), x))
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &SocialClass)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, x)| (ClassId::from_index(i), x))
    }

    pub fn stocks(&self) -> impl Iterator<Item = (StockId, &Stock)> {
        self.stocks
            .iter()
            .enumerate()
            .map(|(i, s)| (StockId::from_index(i), s))
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn find_commodity(&self, name: &str) -> Result<CommodityId, StructuralError> {
        self.commodity_index
            .get(name)
            .copied()
            .ok_or_else(|| missing(EntityKind::Commodity, name))
    }

    pub fn find_industry(&self, name: &str) -> Result<IndustryId, StructuralError> {
        self.industry_index
            .get(name)
            .copied()
            .ok_or_else(|| missing(EntityKind::Industry, name))
    }

    pub fn find_class(&self, name: &str) -> Result<ClassId, StructuralError> {
        self.class_index
            .get(name)
            .copied()
            .ok_or_else(|| missing(EntityKind::SocialClass, name))
    }

    pub fn money_commodity(&self) -> Result<CommodityId, StructuralError> {
        self.money.ok_or_else(|| missing(EntityKind::Commodity, "<money>"))
    }

    pub fn capitalists(&self) -> Result<ClassId, StructuralError> {
        self.capitalists
            .ok_or_else(|| missing(EntityKind::SocialClass, "<capitalists>"))
    }

    /// The labour-power commodity, if the economy has one.
    pub fn labour_power(&self) -> Option<CommodityId> {
        self.commodities().find(|(_, c)| c.is_labour_power()).map(|(id, _)| id)
    }

    /// Sales stocks of `commodity` in purchase order: the producing industry
    /// first, then classes in registration order.
    pub fn sellers_of(&self, commodity: CommodityId) -> Vec<StockId> {
        let mut out: Vec<StockId> = self
            .industries
            .iter()
            .filter(|i| i.commodity == commodity)
            .map(|i| i.sales_stock)
            .collect();
        out.extend(
            self.classes
                .iter()
                .filter_map(|c| c.sales_stock)
                .filter(|s| self.stock(*s).commodity == commodity),
        );
        out
    }

    /// Money stock of whoever owns `stock`.
    pub fn owner_money_stock(&self, stock: StockId) -> StockId {
        match self.stock(stock).owner {
            Owner::Industry(i) => self.industry(i).money_stock,
            Owner::Class(c) => self.class(c).money_stock,
        }
    }

    pub fn owner_name(&self, owner: Owner) -> &str {
        match owner {
            Owner::Industry(i) => &self.industry(i).name,
            Owner::Class(c) => &self.class(c).name,
        }
    }

    /// `owner/commodity/kind`, unique within a world.
    pub fn stock_key(&self, id: StockId) -> String {
        let s = self.stock(id);
        format!(
            "{}/{}/{}",
            self.owner_name(s.owner),
            self.commodity(s.commodity).name,
            s.kind.as_str()
        )
    }

    // -----------------------------------------------------------------------
    // Derived values
    // -----------------------------------------------------------------------

    pub fn total_quantity(&self, commodity: CommodityId) -> f64 {
        self.sum_stocks(commodity, |s| s.quantity)
    }

    pub fn total_value(&self, commodity: CommodityId) -> f64 {
        self.sum_stocks(commodity, |s| s.value)
    }

    pub fn total_price(&self, commodity: CommodityId) -> f64 {
        self.sum_stocks(commodity, |s| s.price)
    }

    fn sum_stocks(&self, commodity: CommodityId, f: impl Fn(&Stock) -> f64) -> f64 {
        round_to_precision(
            self.stocks
                .iter()
                .filter(|s| s.commodity == commodity)
                .map(f)
                .sum(),
        )
    }

    /// Total value of all non-money commodities.
    pub fn aggregate_value(&self) -> f64 {
        round_to_precision(
            self.commodities()
                .filter(|(_, c)| !c.is_money())
                .map(|(id, _)| self.total_value(id))
                .sum(),
        )
    }

    /// Total price of all non-money commodities.
    pub fn aggregate_price(&self) -> f64 {
        round_to_precision(
            self.commodities()
                .filter(|(_, c)| !c.is_money())
                .map(|(id, _)| self.total_price(id))
                .sum(),
        )
    }

    /// Money + sales stock + productive stocks, at current prices.
    pub fn current_capital(&self, industry: IndustryId) -> f64 {
        let ind = self.industry(industry);
        let productive: f64 = ind
            .productive_stocks
            .iter()
            .map(|s| self.stock(*s).price)
            .sum();
        round_to_precision(
            self.stock(ind.money_stock).price + self.stock(ind.sales_stock).price + productive,
        )
    }

    /// `current_capital - initial_capital`.
    pub fn profit(&self, industry: IndustryId) -> f64 {
        round_to_precision(self.current_capital(industry) - self.industry(industry).initial_capital)
    }

    /// NaN when initial capital is negligible.
    pub fn profit_rate(&self, industry: IndustryId) -> f64 {
        ratio(self.profit(industry), self.industry(industry).initial_capital)
    }

    /// Σ profit earned / Σ initial capital over all industries, using the
    /// profit recorded by the Revenue phase. NaN when there is no capital.
    pub fn economy_profit_rate(&self) -> f64 {
        let profit: f64 = self.industries.iter().map(|i| i.profit_earned).sum();
        let capital: f64 = self.industries.iter().map(|i| i.initial_capital).sum();
        ratio(profit, capital)
    }

    /// Money held by a class.
    pub fn class_money(&self, class: ClassId) -> f64 {
        self.stock(self.class(class).money_stock).quantity
    }

    /// Money held by an industry.
    pub fn industry_money(&self, industry: IndustryId) -> f64 {
        self.stock(self.industry(industry).money_stock).quantity
    }

    /// Sum of sales-stock quantities of `commodity`.
    pub fn sales_quantity(&self, commodity: CommodityId) -> f64 {
        round_to_precision(
            self.stocks
                .iter()
                .filter(|s| s.commodity == commodity && s.kind == StockKind::Sales)
                .map(|s| s.quantity)
                .sum(),
        )
    }

    /// `true` when the world holds no entities.
    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty() && self.industries.is_empty() && self.classes.is_empty()
    }

    /// Whether a commodity's stocks are all consistent with its unit figures.
    pub fn unit_figures_consistent(&self, commodity: CommodityId) -> bool {
        let c = self.commodity(commodity);
        self.stocks
            .iter()
            .filter(|s| s.commodity == commodity && !is_negligible(s.quantity))
            .all(|s| {
                crate::numeric::approx_eq(s.value, s.quantity * c.unit_value)
                    && crate::numeric::approx_eq(s.price, s.quantity * c.unit_price)
            })
    }
}

fn missing(kind: EntityKind, key: &str) -> StructuralError {
    StructuralError::MissingEntity {
        kind,
        key: key.to_string(),
    }
}
