//! Production and class reproduction.
//!
//! Industries turn productive inputs into sales stock; the value of the new
//! output is the value transferred from inputs plus the value added by
//! labour at the current MELT, not quantity × unit value. Classes then grow,
//! consume their consumption stocks and regenerate labour power.

use circ_model::numeric::{exceeds, is_negligible, ratio, round_to_precision};
use circ_model::{ClassId, IndustryId, Origin, StructuralError, WarningKind, World};

use crate::context::PeriodContext;

/// Labour-power figures gathered while producing, for the rate of
/// exploitation.
#[derive(Default)]
struct LabourAccount {
    value_added: f64,
    value_used: f64,
}

pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    for c in world.commodity_ids() {
        let commodity = world.commodity_mut(c);
        commodity.stock_used_up = 0.0;
        commodity.stock_produced = 0.0;
    }
    for s in world.stock_ids() {
        world.stock_mut(s).stock_used_up = 0.0;
    }

    let mut labour = LabourAccount::default();
    for i in world.industry_ids() {
        produce(world, i, &mut labour, ctx)?;
    }
    for class in world.class_ids() {
        reproduce(world, class)?;
    }

    for c in world.commodity_ids() {
        let commodity = world.commodity_mut(c);
        if commodity.origin == Origin::IndustriallyProduced {
            commodity.surplus_product =
                round_to_precision(commodity.stock_produced - commodity.stock_used_up);
        }
    }

    let exploitation = ratio(labour.value_added - labour.value_used, labour.value_used);
    if !exploitation.is_nan() {
        world.global.rate_of_exploitation = round_to_precision(exploitation);
    }
    tracing::debug!(
        period = ctx.period,
        rate_of_exploitation = world.global.rate_of_exploitation,
        "production complete"
    );
    Ok(())
}

fn produce(
    world: &mut World,
    industry: IndustryId,
    labour: &mut LabourAccount,
    ctx: &mut PeriodContext,
) -> Result<(), StructuralError> {
    let inputs = world.industry(industry).productive_stocks.clone();
    let mut output = world.industry(industry).constrained_output;

    for s in &inputs {
        let stock = world.stock(*s);
        if is_negligible(stock.production_coefficient) {
            continue;
        }
        let possible = round_to_precision(stock.quantity / stock.production_coefficient);
        if exceeds(output, possible) {
            ctx.diagnostics.warn(
                WarningKind::InsufficientInputs,
                world.stock_key(*s),
                format!("holds enough for {possible} of planned output {output}"),
            );
            output = possible;
        }
    }
    world.industry_mut(industry).output = output;

    let melt = world.global.melt;
    let mut value_added = 0.0;
    for s in inputs {
        let stock = world.stock(s);
        let used = round_to_precision(output * stock.production_coefficient);
        // Never take more than is held; the clamp above only bounds to tolerance.
        let used = used.min(stock.quantity);
        let c = stock.commodity;
        let commodity = world.commodity(c);
        if commodity.is_labour_power() {
            value_added += used * melt;
            labour.value_added += used * melt;
            labour.value_used += used * commodity.unit_value;
        } else {
            value_added += used * commodity.unit_value;
        }
        world.modify_by(s, -used)?;
        let stock = world.stock_mut(s);
        stock.stock_used_up = round_to_precision(stock.stock_used_up + used);
        let commodity = world.commodity_mut(c);
        commodity.stock_used_up = round_to_precision(commodity.stock_used_up + used);
    }

    let sales = world.industry(industry).sales_stock;
    world.modify_by_with_value(sales, output, value_added)?;
    let product = world.industry(industry).commodity;
    let commodity = world.commodity_mut(product);
    commodity.stock_produced = round_to_precision(commodity.stock_produced + output);

    tracing::debug!(
        industry = %world.industry(industry).name,
        output,
        value_added,
        "produced"
    );
    Ok(())
}

fn reproduce(world: &mut World, class: ClassId) -> Result<(), StructuralError> {
    let growth = world.global.population_growth_rate;
    let c = world.class_mut(class);
    c.size = round_to_precision(c.size * (1.0 + growth));

    for s in world.class(class).consumption_stocks.clone() {
        let quantity = world.stock(s).quantity;
        if quantity <= 0.0 {
            continue;
        }
        world.modify_by(s, -quantity)?;
        world.stock_mut(s).stock_used_up = quantity;
        let c = world.stock(s).commodity;
        let commodity = world.commodity_mut(c);
        commodity.stock_used_up = round_to_precision(commodity.stock_used_up + quantity);
    }

    let Some(sales) = world.class(class).sales_stock else {
        return Ok(());
    };
    let lp = world.stock(sales).commodity;
    let c = world.class(class);
    let turnover = world.commodity(lp).turnover_time;
    let target = round_to_precision(c.size * c.participation_ratio / turnover);
    let current = world.stock(sales).quantity;
    if target > current {
        world.modify_to(sales, target)?;
        let commodity = world.commodity_mut(lp);
        commodity.stock_produced = round_to_precision(commodity.stock_produced + target - current);
    }
    Ok(())
}
