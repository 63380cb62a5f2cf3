use circ_model::numeric::{is_negligible, round_to_precision};
use circ_model::{StructuralError, World};

use crate::context::PeriodContext;

/// Ration demand proportionally to supply and cap each industry's output at
/// what its most binding input allows.
pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    for c in world.commodity_ids() {
        let commodity = world.commodity_mut(c);
        commodity.allocation_share = allocation_share(commodity.total_supply, commodity.total_demand);
    }

    for s in world.stock_ids() {
        let stock = world.stock(s);
        if !stock.kind.is_demand_source() {
            continue;
        }
        let share = world.commodity(stock.commodity).allocation_share;
        if share < 1.0 {
            let rationed = round_to_precision(stock.replenishment_demand * share);
            world.stock_mut(s).replenishment_demand = rationed;
        }
    }

    for i in world.industry_ids() {
        let mut output = world.industry(i).constrained_output;
        for s in &world.industry(i).productive_stocks {
            let stock = world.stock(*s);
            if is_negligible(stock.production_coefficient) {
                continue;
            }
            let possible = (stock.quantity + stock.replenishment_demand) / stock.production_coefficient;
            output = output.min(possible);
        }
        let output = round_to_precision(output);
        if output < world.industry(i).constrained_output {
            tracing::debug!(
                period = ctx.period,
                industry = %world.industry(i).name,
                output,
                "output constrained by inputs"
            );
        }
        world.industry_mut(i).constrained_output = output;
    }
    Ok(())
}

/// `min(1, supply / demand)`; 1 when nothing is demanded.
pub fn allocation_share(supply: f64, demand: f64) -> f64 {
    if is_negligible(demand) {
        return 1.0;
    }
    (supply / demand).clamp(0.0, 1.0)
}
