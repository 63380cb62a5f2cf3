//! Trade: settle rationed demand with paired goods/money transfers.
//!
//! Industries buy their productive inputs first (which pays the wages),
//! then classes buy consumer goods out of revenue. Each purchase draws on the
//! buyer's own sales stock first, then walks the remaining sellers in
//! [`World::sellers_of`] order.

use std::collections::BTreeMap;

use circ_model::numeric::{exceeds, is_negligible, round_to_precision, EPSILON};
use circ_model::{ClassId, Owner, StockId, StructuralError, WarningKind, World};

use crate::context::PeriodContext;

pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    let expected_wages = expected_wages(world);
    let money_before: BTreeMap<ClassId, f64> = world
        .class_ids()
        .into_iter()
        .map(|c| (c, world.class_money(c)))
        .collect();

    for i in world.industry_ids() {
        for s in world.industry(i).productive_stocks.clone() {
            let demand = world.stock(s).replenishment_demand;
            if demand > EPSILON {
                buy(world, s, demand, ctx)?;
            }
        }
    }

    settle_wage_shortfall(world, &expected_wages, &money_before, ctx);

    for class in world.class_ids() {
        let c = world.class(class);
        let money = world.class_money(class);
        if exceeds(c.revenue, money) {
            return Err(StructuralError::RevenueExceedsMoney {
                class: c.name.clone(),
                revenue: c.revenue,
                money,
            });
        }
        for s in c.consumption_stocks.clone() {
            let demand = world.stock(s).replenishment_demand;
            if demand > EPSILON {
                let spent = buy(world, s, demand, ctx)?;
                let c = world.class_mut(class);
                c.revenue = round_to_precision((c.revenue - spent).max(0.0));
            }
        }
    }

    tracing::debug!(period = ctx.period, "trade settled");
    Ok(())
}

/// Buy up to `demand` units into `buyer`, paying from its owner's money
/// stock. Returns the money spent.
///
/// Sellers sharing the buyer's money stock (an industry's own sales) are
/// drawn on first and cost nothing; only the rest is limited by money.
fn buy(
    world: &mut World,
    buyer: StockId,
    demand: f64,
    ctx: &mut PeriodContext,
) -> Result<f64, StructuralError> {
    let commodity = world.stock(buyer).commodity;
    let price = world.commodity(commodity).unit_price;
    let buyer_money = world.owner_money_stock(buyer);
    let buyer_key = world.stock_key(buyer);

    let (own, paid): (Vec<StockId>, Vec<StockId>) = world
        .sellers_of(commodity)
        .into_iter()
        .partition(|s| world.owner_money_stock(*s) == buyer_money);
    let own_supply: f64 = own.iter().map(|s| world.stock(*s).quantity).sum();

    let mut wanted = demand;
    if !is_negligible(price) {
        let affordable = round_to_precision(own_supply + world.stock(buyer_money).quantity / price);
        if exceeds(wanted, affordable) {
            let kind = match world.stock(buyer).owner {
                Owner::Class(_) => WarningKind::Unaffordable,
                Owner::Industry(_) => WarningKind::InsufficientMoney,
            };
            ctx.diagnostics.warn(
                kind,
                buyer_key.clone(),
                format!("wanted {wanted} at {price}, can afford {affordable}"),
            );
            wanted = affordable;
        }
    }

    let mut remaining = wanted;
    let mut spent = 0.0;
    for seller in own.into_iter().chain(paid) {
        if remaining <= EPSILON {
            break;
        }
        let quantity = world.stock(seller).quantity.min(remaining);
        if quantity <= 0.0 {
            continue;
        }
        world.transfer_stock(seller, buyer, quantity, &mut ctx.diagnostics)?;
        let seller_money = world.owner_money_stock(seller);
        if seller_money != buyer_money {
            let cost = round_to_precision(quantity * price);
            world.transfer_stock(buyer_money, seller_money, cost, &mut ctx.diagnostics)?;
            spent += cost;
        }
        remaining = round_to_precision(remaining - quantity);
    }

    if remaining > EPSILON {
        ctx.diagnostics.warn(
            WarningKind::InsufficientSupply,
            buyer_key,
            format!("bought {} of {wanted}; sellers exhausted", wanted - remaining),
        );
    }
    Ok(round_to_precision(spent))
}

/// Wages each labour-selling class was credited in Demand, recomputed from
/// the rationed demand and the sellers' holdings before trading.
fn expected_wages(world: &World) -> BTreeMap<ClassId, f64> {
    let mut out = BTreeMap::new();
    let Some(lp) = world.labour_power() else {
        return out;
    };
    let price = world.commodity(lp).unit_price;
    let mut remaining: f64 = world
        .stocks()
        .filter(|(_, s)| s.commodity == lp && s.kind.is_demand_source())
        .map(|(_, s)| s.replenishment_demand)
        .sum();
    for s in world.sellers_of(lp) {
        if let Owner::Class(class) = world.stock(s).owner {
            let sale = world.stock(s).quantity.min(remaining).max(0.0);
            remaining -= sale;
            *out.entry(class).or_insert(0.0) += sale * price;
        }
    }
    out
}

/// Take back anticipated wages that buyers could not pay.
fn settle_wage_shortfall(
    world: &mut World,
    expected: &BTreeMap<ClassId, f64>,
    money_before: &BTreeMap<ClassId, f64>,
    ctx: &mut PeriodContext,
) {
    for (class, anticipated) in expected {
        let before = money_before.get(class).copied().unwrap_or(0.0);
        let received = world.class_money(*class) - before;
        if exceeds(*anticipated, received) {
            let shortfall = round_to_precision(anticipated - received);
            let c = world.class_mut(*class);
            c.revenue = round_to_precision((c.revenue - shortfall).max(0.0));
            let name = c.name.clone();
            ctx.diagnostics.warn(
                WarningKind::InsufficientMoney,
                name,
                format!("wages short by {shortfall}: anticipated {anticipated}, received {received}"),
            );
        }
    }
}
