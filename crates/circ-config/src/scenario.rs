//! Typed scenario definition and the opening [`World`] it describes.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Context, Result};
use circ_model::{
    Commodity, Function, Global, LabourSupplyResponse, MeltResponse, Origin, PriceResponse, World,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub global: GlobalConfig,
    /// Name of the class that receives profit and funds accumulation.
    pub capitalist_class: String,
    pub commodities: Vec<CommodityConfig>,
    #[serde(default)]
    pub industries: Vec<IndustryConfig>,
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub melt: f64,
    pub population_growth_rate: f64,
    pub investment_ratio: f64,
    pub labour_supply_response: LabourSupplyResponse,
    pub price_response: PriceResponse,
    pub melt_response: MeltResponse,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let g = Global::default();
        Self {
            melt: g.melt,
            population_growth_rate: g.population_growth_rate,
            investment_ratio: g.investment_ratio,
            labour_supply_response: g.labour_supply_response,
            price_response: g.price_response,
            melt_response: g.melt_response,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityConfig {
    pub name: String,
    pub origin: Origin,
    pub function: Function,
    #[serde(default = "one")]
    pub turnover_time: f64,
    #[serde(default = "one")]
    pub unit_value: f64,
    #[serde(default = "one")]
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryConfig {
    pub name: String,
    /// The commodity this industry produces.
    pub commodity: String,
    pub output: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub money: f64,
    /// Opening quantity of the industry's own product held for sale.
    #[serde(default)]
    pub sales: f64,
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub commodity: String,
    pub coefficient: f64,
    #[serde(default)]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    pub size: f64,
    #[serde(default)]
    pub participation_ratio: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub sells: Option<SalesConfig>,
    #[serde(default)]
    pub consumption: Vec<ConsumptionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesConfig {
    pub commodity: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionConfig {
    pub commodity: String,
    pub coefficient: f64,
    #[serde(default)]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

impl ScenarioConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        serde_json::from_value(config_json.clone()).context("config does not describe a scenario")
    }

    pub fn from_yaml_strings(yaml_docs: &[&str]) -> Result<Self> {
        let loaded = crate::load_layered_yaml_from_strings(yaml_docs)?;
        Self::from_json(&loaded.config_json)
    }

    /// Reject scenarios that cannot form a consistent opening world.
    pub fn validate(&self) -> Result<()> {
        let mut functions: BTreeMap<&str, Function> = BTreeMap::new();
        let mut money = Vec::new();
        for c in &self.commodities {
            if functions.insert(c.name.as_str(), c.function).is_some() {
                bail!("duplicate commodity '{}'", c.name);
            }
            let is_money = c.function == Function::Money || c.origin == Origin::Money;
            if is_money {
                if c.function != Function::Money || c.origin != Origin::Money {
                    bail!("commodity '{}' mixes money and non-money classification", c.name);
                }
                money.push(c.name.as_str());
            }
            positive(&format!("commodity '{}' turnover_time", c.name), c.turnover_time)?;
            non_negative(&format!("commodity '{}' unit_value", c.name), c.unit_value)?;
            non_negative(&format!("commodity '{}' unit_price", c.name), c.unit_price)?;
        }
        match money.as_slice() {
            [] => bail!("scenario has no money commodity"),
            [_] => {}
            many => bail!("scenario has more than one money commodity: {}", many.join(", ")),
        }

        let lookup = |owner: &str, name: &str| -> Result<Function> {
            functions
                .get(name)
                .copied()
                .with_context(|| format!("{owner} refers to unknown commodity '{name}'"))
        };

        let mut industries = BTreeSet::new();
        for ind in &self.industries {
            if !industries.insert(ind.name.as_str()) {
                bail!("duplicate industry '{}'", ind.name);
            }
            let owner = format!("industry '{}'", ind.name);
            if lookup(&owner, &ind.commodity)? == Function::Money {
                bail!("{owner} cannot produce money commodity '{}'", ind.commodity);
            }
            non_negative(&format!("{owner} output"), ind.output)?;
            non_negative(&format!("{owner} growth_rate"), ind.growth_rate)?;
            non_negative(&format!("{owner} money"), ind.money)?;
            non_negative(&format!("{owner} sales"), ind.sales)?;
            for input in &ind.inputs {
                if lookup(&owner, &input.commodity)? != Function::ProductiveInput {
                    bail!("{owner} uses '{}', which is not a productive input", input.commodity);
                }
                non_negative(&format!("{owner} coefficient of '{}'", input.commodity), input.coefficient)?;
                non_negative(&format!("{owner} stock of '{}'", input.commodity), input.quantity)?;
            }
        }

        let mut classes = BTreeSet::new();
        for class in &self.classes {
            if !classes.insert(class.name.as_str()) {
                bail!("duplicate class '{}'", class.name);
            }
            let owner = format!("class '{}'", class.name);
            non_negative(&format!("{owner} size"), class.size)?;
            non_negative(&format!("{owner} participation_ratio"), class.participation_ratio)?;
            non_negative(&format!("{owner} revenue"), class.revenue)?;
            non_negative(&format!("{owner} money"), class.money)?;
            if let Some(sells) = &class.sells {
                lookup(&owner, &sells.commodity)?;
                non_negative(&format!("{owner} sales"), sells.quantity)?;
            }
            let mut total = 0.0;
            for c in &class.consumption {
                if lookup(&owner, &c.commodity)? != Function::ConsumerGood {
                    bail!("{owner} consumes '{}', which is not a consumer good", c.commodity);
                }
                non_negative(&format!("{owner} coefficient of '{}'", c.commodity), c.coefficient)?;
                non_negative(&format!("{owner} stock of '{}'", c.commodity), c.quantity)?;
                total += c.coefficient;
            }
            if total > 1.0 + circ_model::numeric::EPSILON {
                bail!("{owner} consumption coefficients sum to {total}, above 1");
            }
        }

        if !classes.contains(self.capitalist_class.as_str()) {
            bail!("capitalist class '{}' is not defined", self.capitalist_class);
        }
        Ok(())
    }

    /// Build the opening world (time-stamp 0). Every stock's value and price
    /// follow from its quantity and the commodity's unit figures.
    pub fn build_world(&self) -> Result<World> {
        self.validate()?;

        let g = &self.global;
        let mut world = World::new(Global {
            melt: g.melt,
            population_growth_rate: g.population_growth_rate,
            investment_ratio: g.investment_ratio,
            labour_supply_response: g.labour_supply_response,
            price_response: g.price_response,
            melt_response: g.melt_response,
            ..Global::default()
        });

        for c in &self.commodities {
            world.add_commodity(
                Commodity::new(c.name.clone(), c.origin, c.function)
                    .with_turnover_time(c.turnover_time)
                    .with_unit_value(c.unit_value)
                    .with_unit_price(c.unit_price),
            )?;
        }

        for ind in &self.industries {
            let id = world.add_industry(ind.name.clone(), &ind.commodity, ind.output, ind.growth_rate)?;
            for input in &ind.inputs {
                let s = world.add_productive_stock(id, &input.commodity, input.coefficient)?;
                world.modify_by(s, input.quantity)?;
            }
            let (money, sales) = {
                let i = world.industry(id);
                (i.money_stock, i.sales_stock)
            };
            world.modify_by(money, ind.money)?;
            world.modify_by(sales, ind.sales)?;
        }

        for class in &self.classes {
            let id = world.add_class(class.name.clone(), class.size, class.participation_ratio)?;
            world.class_mut(id).revenue = class.revenue;
            let money = world.class(id).money_stock;
            world.modify_by(money, class.money)?;
            if let Some(sells) = &class.sells {
                let s = world.add_class_sales_stock(id, &sells.commodity)?;
                world.modify_by(s, sells.quantity)?;
            }
            for c in &class.consumption {
                let s = world.add_consumption_stock(id, &c.commodity, c.coefficient)?;
                world.modify_by(s, c.quantity)?;
            }
        }

        world.set_capitalists(&self.capitalist_class)?;
        Ok(world)
    }

    pub fn entity_counts(&self) -> (usize, usize, usize) {
        (self.commodities.len(), self.industries.len(), self.classes.len())
    }
}

fn non_negative(what: &str, x: f64) -> Result<()> {
    if !x.is_finite() || x < 0.0 {
        bail!("{what} must be a non-negative number, got {x}");
    }
    Ok(())
}

// Turnover times divide stocks into per-period flows.
fn positive(what: &str, x: f64) -> Result<()> {
    if !x.is_finite() || x <= 0.0 {
        bail!("{what} must be a positive number, got {x}");
    }
    Ok(())
}
