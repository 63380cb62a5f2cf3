//! Accumulation: fund next period's expansion out of the surplus product.
//!
//! Department I (producers of means of production) is funded first, at its
//! growth rate. Department II grows with whatever surplus means of
//! production remain. Funding comes out of capitalist money, capped at
//! `investment_ratio` of it; the means-of-production portion of each
//! expansion draws down the surplus.

use circ_model::numeric::{exceeds, is_negligible, round_to_precision, EPSILON};
use circ_model::{Function, IndustryId, Origin, StructuralError, WarningKind, World};

use crate::context::PeriodContext;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Department {
    /// Producers of productive inputs.
    One,
    /// Producers of consumer goods.
    Two,
}

/// Expansion granted to one industry.
#[derive(Clone, Debug, PartialEq)]
pub struct Funding {
    pub industry: IndustryId,
    pub department: Department,
    pub proposed_output: f64,
    pub means_of_production: f64,
    pub labour_power: f64,
}

impl Funding {
    pub fn total(&self) -> f64 {
        round_to_precision(self.means_of_production + self.labour_power)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvestmentPlan {
    pub surplus_at_start: f64,
    pub surplus_remaining: f64,
    pub budget_at_start: f64,
    pub funded: Vec<Funding>,
}

impl InvestmentPlan {
    pub fn funding_for(&self, industry: IndustryId) -> Option<&Funding> {
        self.funded.iter().find(|f| f.industry == industry)
    }

    pub fn department_total(&self, department: Department) -> f64 {
        round_to_precision(
            self.funded
                .iter()
                .filter(|f| f.department == department)
                .map(Funding::total)
                .sum(),
        )
    }
}

pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    let plan = allocate_investment(world, ctx)?;
    for i in world.industry_ids() {
        let capital = world.current_capital(i);
        world.industry_mut(i).initial_capital = capital;
    }
    tracing::debug!(
        period = ctx.period,
        surplus = plan.surplus_at_start,
        remaining = plan.surplus_remaining,
        dept_one = plan.department_total(Department::One),
        dept_two = plan.department_total(Department::Two),
        "investment allocated"
    );
    Ok(())
}

/// Split `delta` extra output into the money needed for means of production
/// and for labour power.
pub fn expansion_cost(world: &World, industry: IndustryId, delta: f64) -> (f64, f64) {
    let mut mp = 0.0;
    let mut lp = 0.0;
    for s in &world.industry(industry).productive_stocks {
        let stock = world.stock(*s);
        let c = world.commodity(stock.commodity);
        let cost = delta * stock.production_coefficient * c.turnover_time * c.unit_price;
        if c.is_labour_power() {
            lp += cost;
        } else {
            mp += cost;
        }
    }
    (round_to_precision(mp), round_to_precision(lp))
}

/// Surplus means of production (at price) available for expansion.
pub fn surplus_means_of_production(world: &World) -> f64 {
    let total: f64 = world
        .commodities()
        .filter(|(_, c)| {
            c.origin == Origin::IndustriallyProduced && c.function == Function::ProductiveInput
        })
        .map(|(_, c)| c.surplus_product * c.unit_price)
        .sum();
    round_to_precision(total.max(0.0))
}

/// Decide and fund every industry's proposed output for the next period.
pub fn allocate_investment(
    world: &mut World,
    ctx: &mut PeriodContext,
) -> Result<InvestmentPlan, StructuralError> {
    for s in world.stock_ids() {
        world.stock_mut(s).expansion_demand = 0.0;
    }

    let capitalists = world.capitalists()?;
    let surplus = surplus_means_of_production(world);
    let budget = round_to_precision(world.global.investment_ratio * world.class_money(capitalists));
    let mut plan = InvestmentPlan {
        surplus_at_start: surplus,
        surplus_remaining: surplus,
        budget_at_start: budget,
        funded: Vec::new(),
    };
    let mut budget = budget;

    for department in [Department::One, Department::Two] {
        for i in world.industry_ids() {
            if department_of(world, i) != Some(department) {
                continue;
            }
            let ind = world.industry(i);
            let base = ind.constrained_output;
            let wanted = match department {
                Department::One => base * ind.growth_rate,
                // Everything the remaining surplus can equip. An industry
                // using no means of production is not bound by the surplus
                // and grows at its own rate.
                Department::Two => {
                    let (unit_mp, _) = expansion_cost(world, i, 1.0);
                    if is_negligible(unit_mp) {
                        base * ind.growth_rate
                    } else {
                        plan.surplus_remaining / unit_mp
                    }
                }
            };
            let funding = fund(world, i, department, wanted.max(0.0), &mut plan, &mut budget, ctx)?;
            plan.funded.push(funding);
        }
    }
    Ok(plan)
}

fn department_of(world: &World, industry: IndustryId) -> Option<Department> {
    match world.commodity(world.industry(industry).commodity).function {
        Function::ProductiveInput => Some(Department::One),
        Function::ConsumerGood => Some(Department::Two),
        Function::Money => None,
    }
}

fn fund(
    world: &mut World,
    industry: IndustryId,
    department: Department,
    wanted: f64,
    plan: &mut InvestmentPlan,
    budget: &mut f64,
    ctx: &mut PeriodContext,
) -> Result<Funding, StructuralError> {
    let name = world.industry(industry).name.clone();
    let (mp, lp) = expansion_cost(world, industry, wanted);

    let mut scale = 1.0;
    if exceeds(mp, plan.surplus_remaining) {
        scale = plan.surplus_remaining / mp;
        ctx.diagnostics.warn(
            WarningKind::FundingShortfall,
            name.clone(),
            format!(
                "expansion needs {mp} of means of production, surplus is {}",
                plan.surplus_remaining
            ),
        );
    }
    let total = (mp + lp) * scale;
    if exceeds(total, *budget) {
        scale *= *budget / total;
        ctx.diagnostics.warn(
            WarningKind::FundingShortfall,
            name.clone(),
            format!("expansion needs {total}, investment budget is {budget}"),
        );
    }

    let delta = round_to_precision(wanted * scale);
    let mp = round_to_precision(mp * scale);
    let lp = round_to_precision(lp * scale);
    let amount = round_to_precision(mp + lp);

    if amount > EPSILON {
        let capitalists = world.capitalists()?;
        let from = world.class(capitalists).money_stock;
        let to = world.industry(industry).money_stock;
        world.transfer_stock(from, to, amount, &mut ctx.diagnostics)?;
        let class = world.class_mut(capitalists);
        class.revenue = round_to_precision((class.revenue - amount).max(0.0));
        *budget = round_to_precision((*budget - amount).max(0.0));
    }
    plan.surplus_remaining = round_to_precision((plan.surplus_remaining - mp).max(0.0));

    for s in world.industry(industry).productive_stocks.clone() {
        let coefficient = world.stock(s).production_coefficient;
        let turnover = world.commodity(world.stock(s).commodity).turnover_time;
        world.stock_mut(s).expansion_demand = round_to_precision(delta * coefficient * turnover);
    }

    let ind = world.industry_mut(industry);
    ind.proposed_output = round_to_precision(ind.constrained_output + delta);
    tracing::debug!(industry = %name, delta, amount, "expansion funded");

    Ok(Funding {
        industry,
        department,
        proposed_output: ind.proposed_output,
        means_of_production: mp,
        labour_power: lp,
    })
}
