//! Value and price recalibration.
//!
//! 1. Unit values are re-derived from the value production put into stocks.
//! 2. The price/value ratio is measured before any repricing.
//! 3. The selected [`PriceResponse`] sets new unit prices.
//! 4. Every stock is revalued at the new unit figures.
//! 5. Under [`MeltResponse::Adjust`] the MELT is scaled by the ratio from 2.

use circ_model::numeric::{is_negligible, ratio, round_to_precision};
use circ_model::{Function, MeltResponse, Origin, PriceResponse, StructuralError, World};

use crate::context::PeriodContext;

pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    recalibrate_values(world);
    let price_value_ratio = ratio(world.aggregate_price(), world.aggregate_value());

    match world.global.price_response {
        PriceResponse::Simple => {}
        PriceResponse::Equalise => equalise(world),
        PriceResponse::Dynamic => {
            return Err(StructuralError::UnsupportedPricePolicy {
                policy: PriceResponse::Dynamic.as_str().to_string(),
            })
        }
    }

    for s in world.stock_ids() {
        world.revalue(s);
    }

    if world.global.melt_response == MeltResponse::Adjust && !price_value_ratio.is_nan() {
        world.global.melt = round_to_precision(world.global.melt * price_value_ratio);
    }

    tracing::debug!(
        period = ctx.period,
        policy = world.global.price_response.as_str(),
        melt = world.global.melt,
        "prices recalculated"
    );
    Ok(())
}

fn recalibrate_values(world: &mut World) {
    for c in world.commodity_ids() {
        if world.commodity(c).is_money() {
            continue;
        }
        let quantity = world.total_quantity(c);
        if is_negligible(quantity) {
            continue;
        }
        let unit_value = round_to_precision(world.total_value(c) / quantity);
        world.commodity_mut(c).unit_value = unit_value;
    }
}

/// Price every industrial product so that each industry earns the economy's
/// average rate of profit on its initial capital, then set the wage to the
/// cost of the consumer goods used up per unit of labour power.
fn equalise(world: &mut World) {
    let profit: f64 = world
        .industries()
        .map(|(_, i)| i.profit_earned)
        .sum();
    let capital: f64 = world
        .industries()
        .map(|(_, i)| i.initial_capital)
        .sum();
    let rate = ratio(profit, capital);
    if rate.is_nan() {
        return;
    }

    for i in world.industry_ids() {
        let ind = world.industry(i);
        let c = ind.commodity;
        if world.commodity(c).origin != Origin::IndustriallyProduced {
            continue;
        }
        let quantity = world.total_quantity(c);
        if is_negligible(quantity) {
            continue;
        }
        let price = round_to_precision(ind.initial_capital * (1.0 + rate) / quantity);
        world.commodity_mut(c).unit_price = price;
    }

    let Some(lp) = world.labour_power() else {
        return;
    };
    let hours = world.commodity(lp).stock_used_up;
    if is_negligible(hours) {
        return;
    }
    let subsistence: f64 = world
        .commodities()
        .filter(|(_, c)| c.function == Function::ConsumerGood)
        .map(|(_, c)| c.stock_used_up * c.unit_price)
        .sum();
    world.commodity_mut(lp).unit_price = round_to_precision(subsistence / hours);
}
