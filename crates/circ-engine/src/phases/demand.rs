//! Demand registration.
//!
//! Industries demand what they need to run at their proposed output;
//! labour-power sellers are credited with their anticipated wages; classes
//! demand consumer goods out of revenue.

use circ_model::numeric::{exceeds, is_negligible, round_to_precision};
use circ_model::{
    IndustryId, LabourSupplyResponse, Owner, StructuralError, WarningKind, World,
};

use crate::context::PeriodContext;
use crate::phases::supply::register_supply;

pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    for s in world.stock_ids() {
        world.stock_mut(s).replenishment_demand = 0.0;
    }
    for c in world.commodity_ids() {
        world.commodity_mut(c).total_demand = 0.0;
    }

    for i in world.industry_ids() {
        industry_demand(world, i, ctx);
    }
    labour_response(world, ctx)?;
    consumption_demand(world);

    tracing::debug!(period = ctx.period, "demand registered");
    Ok(())
}

/// Money needed to bring every productive stock up to the level required
/// for `output`.
pub fn input_cost(world: &World, industry: IndustryId, output: f64) -> f64 {
    let ind = world.industry(industry);
    let cost: f64 = ind
        .productive_stocks
        .iter()
        .map(|s| {
            let stock = world.stock(*s);
            let c = world.commodity(stock.commodity);
            let required = output * stock.production_coefficient * c.turnover_time;
            (required - stock.quantity).max(0.0) * c.unit_price
        })
        .sum();
    round_to_precision(cost)
}

fn industry_demand(world: &mut World, industry: IndustryId, ctx: &mut PeriodContext) {
    let mut proposed = world.industry(industry).proposed_output;
    let cost = input_cost(world, industry, proposed);
    let money = world.industry_money(industry);

    // Linear scaling: once some inputs are already held the true cost is not
    // proportional to output, so the scaled plan may still overshoot. Trade
    // clamps any remainder.
    if exceeds(cost, money) {
        let scaled = round_to_precision(proposed * money / cost);
        ctx.diagnostics.warn(
            WarningKind::FundingShortfall,
            world.industry(industry).name.clone(),
            format!("input cost {cost} exceeds money {money}; output {proposed} scaled to {scaled}"),
        );
        proposed = scaled;
    }

    let ind = world.industry_mut(industry);
    ind.proposed_output = proposed;
    ind.constrained_output = proposed;

    for s in world.industry(industry).productive_stocks.clone() {
        let stock = world.stock(s);
        let c = stock.commodity;
        let turnover = world.commodity(c).turnover_time;
        let required = proposed * stock.production_coefficient * turnover;
        let demand = round_to_precision((required - stock.quantity).max(0.0));
        world.stock_mut(s).replenishment_demand = demand;
        let commodity = world.commodity_mut(c);
        commodity.total_demand = round_to_precision(commodity.total_demand + demand);
    }
}

fn labour_response(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    let Some(lp) = world.labour_power() else {
        return Ok(());
    };
    let sellers: Vec<_> = world
        .sellers_of(lp)
        .into_iter()
        .filter(|s| matches!(world.stock(*s).owner, Owner::Class(_)))
        .collect();

    let demand = world.commodity(lp).total_demand;
    let supply = world.commodity(lp).total_supply;
    if world.global.labour_supply_response == LabourSupplyResponse::Flexible
        && exceeds(demand, supply)
        && !is_negligible(supply)
    {
        let factor = demand / supply;
        for s in &sellers {
            let stretched = round_to_precision(world.stock(*s).quantity * factor);
            world.modify_to(*s, stretched)?;
        }
        register_supply(world, lp);
        tracing::debug!(period = ctx.period, factor, "labour supply stretched to demand");
    }

    // Wages are anticipated here and spent in this period's Trade. Sellers
    // are credited in the same order Trade buys from them.
    let price = world.commodity(lp).unit_price;
    let mut remaining = demand;
    for s in sellers {
        let sale = world.stock(s).quantity.min(remaining).max(0.0);
        remaining -= sale;
        if let Owner::Class(class) = world.stock(s).owner {
            let c = world.class_mut(class);
            c.revenue = round_to_precision(c.revenue + sale * price);
        }
    }
    Ok(())
}

fn consumption_demand(world: &mut World) {
    for class in world.class_ids() {
        let revenue = world.class(class).revenue;
        for s in world.class(class).consumption_stocks.clone() {
            let c = world.stock(s).commodity;
            let price = world.commodity(c).unit_price;
            let demand = if is_negligible(price) {
                0.0
            } else {
                round_to_precision(revenue * world.stock(s).consumption_coefficient / price)
            };
            world.stock_mut(s).replenishment_demand = demand;
            let commodity = world.commodity_mut(c);
            commodity.total_demand = round_to_precision(commodity.total_demand + demand);
        }
    }
}
