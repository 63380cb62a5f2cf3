//! Canonical scenario fixtures shared by the scenario tests of every crate.
//!
//! Fixtures are written as YAML scenarios and built through `circ-config`,
//! so every test world goes through the same validation a real run does.
//! [`WorldBuilder`] covers the small ad-hoc economies a single test needs.

use anyhow::{Context, Result};
use circ_config::ScenarioConfig;
use circ_model::{Commodity, Function, Global, IndustryId, Origin, World};

/// Two departments and two classes in simple reproduction balance.
///
/// Department I turns means of production and labour power into means of
/// production; Department II produces consumption goods. At the opening
/// prices labour supply (500) exactly meets demand and every industry can
/// afford its inputs.
pub const TWO_DEPARTMENT_YAML: &str = r#"
project:
  id: 1
  name: two departments
capitalist_class: Capitalists
commodities:
  - { name: Money, origin: money, function: money }
  - { name: Means of Production, origin: industrially_produced, function: productive_input }
  - { name: Consumption Goods, origin: industrially_produced, function: consumer_good }
  - name: Labour Power
    origin: socially_produced
    function: productive_input
    unit_value: 0.5
    unit_price: 0.5
industries:
  - name: Department I
    commodity: Means of Production
    output: 1000
    growth_rate: 0.1
    money: 1000
    sales: 1000
    inputs:
      - { commodity: Means of Production, coefficient: 0.5 }
      - { commodity: Labour Power, coefficient: 0.25 }
  - name: Department II
    commodity: Consumption Goods
    output: 500
    growth_rate: 0.1
    money: 600
    sales: 500
    inputs:
      - { commodity: Means of Production, coefficient: 0.5 }
      - { commodity: Labour Power, coefficient: 0.5 }
classes:
  - name: Workers
    size: 500
    participation_ratio: 1
    sells: { commodity: Labour Power, quantity: 500 }
    consumption:
      - { commodity: Consumption Goods, coefficient: 1 }
  - name: Capitalists
    size: 10
    money: 500
    revenue: 200
    consumption:
      - { commodity: Consumption Goods, coefficient: 1 }
"#;

/// Farming needs half a unit of iron per unit of corn; iron costs 2.
pub const CORN_IRON_YAML: &str = r#"
project:
  id: 2
  name: corn and iron
capitalist_class: Capitalists
commodities:
  - { name: Money, origin: money, function: money }
  - name: Iron
    origin: industrially_produced
    function: productive_input
    unit_value: 2
    unit_price: 2
  - { name: Corn, origin: industrially_produced, function: consumer_good }
industries:
  - { name: Smithing, commodity: Iron, output: 0, sales: 100 }
  - name: Farming
    commodity: Corn
    output: 100
    money: 1000
    inputs:
      - { commodity: Iron, coefficient: 0.5 }
classes:
  - { name: Capitalists, size: 1 }
"#;

pub fn world_from_yaml(yaml: &str) -> Result<World> {
    let scenario = ScenarioConfig::from_yaml_strings(&[yaml])?;
    scenario.build_world()
}

pub fn two_department_economy() -> Result<World> {
    world_from_yaml(TWO_DEPARTMENT_YAML).context("two department fixture")
}

pub fn corn_iron_economy() -> Result<World> {
    world_from_yaml(CORN_IRON_YAML).context("corn and iron fixture")
}

/// Mining holds 80 coal for sale; two industries each want 50 of it.
pub fn competing_buyers() -> Result<World> {
    let mut b = WorldBuilder::new()?
        .productive_input("Coal", 1.0)?
        .consumer_good("Bread", 1.0)?
        .consumer_good("Cloth", 1.0)?;
    b.industry("Mining", "Coal", 0.0, 0.0, 80.0)?;
    let bakery = b.industry("Bakery", "Bread", 50.0, 500.0, 0.0)?;
    b.input(bakery, "Coal", 1.0)?;
    let mill = b.industry("Mill", "Cloth", 50.0, 500.0, 0.0)?;
    b.input(mill, "Coal", 1.0)?;
    b.capitalists("Capitalists", 0.0)?;
    Ok(b.build())
}

// ---------------------------------------------------------------------------
// WorldBuilder
// ---------------------------------------------------------------------------

/// Builds small worlds in code. A money commodity named `Money` is always
/// present.
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    pub fn new() -> Result<Self> {
        Self::with_global(Global::default())
    }

    pub fn with_global(global: Global) -> Result<Self> {
        let mut world = World::new(global);
        world.add_commodity(Commodity::new("Money", Origin::Money, Function::Money))?;
        Ok(Self { world })
    }

    /// Industrially produced productive input at `unit` value and price.
    pub fn productive_input(mut self, name: &str, unit: f64) -> Result<Self> {
        self.world.add_commodity(
            Commodity::new(name, Origin::IndustriallyProduced, Function::ProductiveInput)
                .with_unit_value(unit)
                .with_unit_price(unit),
        )?;
        Ok(self)
    }

    pub fn consumer_good(mut self, name: &str, unit: f64) -> Result<Self> {
        self.world.add_commodity(
            Commodity::new(name, Origin::IndustriallyProduced, Function::ConsumerGood)
                .with_unit_value(unit)
                .with_unit_price(unit),
        )?;
        Ok(self)
    }

    pub fn labour_power(mut self, unit: f64) -> Result<Self> {
        self.world.add_commodity(
            Commodity::new("Labour Power", Origin::SociallyProduced, Function::ProductiveInput)
                .with_unit_value(unit)
                .with_unit_price(unit),
        )?;
        Ok(self)
    }

    /// Add an industry with opening money and product held for sale.
    pub fn industry(
        &mut self,
        name: &str,
        commodity: &str,
        output: f64,
        money: f64,
        sales: f64,
    ) -> Result<IndustryId> {
        let id = self.world.add_industry(name, commodity, output, 0.0)?;
        let (m, s) = {
            let ind = self.world.industry(id);
            (ind.money_stock, ind.sales_stock)
        };
        self.world.modify_by(m, money)?;
        self.world.modify_by(s, sales)?;
        Ok(id)
    }

    pub fn input(&mut self, industry: IndustryId, commodity: &str, coefficient: f64) -> Result<()> {
        self.world.add_productive_stock(industry, commodity, coefficient)?;
        Ok(())
    }

    /// Add the capitalist class with `money` and no labour to sell.
    pub fn capitalists(&mut self, name: &str, money: f64) -> Result<()> {
        let id = self.world.add_class(name, 1.0, 0.0)?;
        let m = self.world.class(id).money_stock;
        self.world.modify_by(m, money)?;
        self.world.set_capitalists(name)?;
        Ok(())
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn build(self) -> World {
        self.world
    }
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

/// Read a CSV file into its header and string records.
pub fn load_csv_records(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open csv: {path}"))?;
    let header = rdr
        .headers()
        .with_context(|| format!("read csv header: {path}"))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.with_context(|| format!("read csv record: {path}"))?;
        out.push(rec.iter().map(str::to_string).collect());
    }
    Ok((header, out))
}
