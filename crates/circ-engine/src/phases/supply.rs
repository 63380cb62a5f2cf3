use circ_model::{CommodityId, StructuralError, World};

use crate::context::PeriodContext;

/// Register each commodity's supply (Σ sales-stock quantity) and snapshot
/// every industry's capital for the new period. Running it twice in a row
/// gives identical results.
pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    for c in world.commodity_ids() {
        register_supply(world, c);
    }
    for i in world.industry_ids() {
        let capital = world.current_capital(i);
        world.industry_mut(i).initial_capital = capital;
    }
    tracing::debug!(period = ctx.period, "supply registered");
    Ok(())
}

pub(crate) fn register_supply(world: &mut World, commodity: CommodityId) {
    let supply = world.sales_quantity(commodity);
    world.commodity_mut(commodity).total_supply = supply;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    #[test]
    fn supply_sums_sales_stocks_and_is_idempotent() {
        let mut w = circ_testkit::two_department_economy().unwrap();
        let mut ctx = PeriodContext::new(1, Phase::Supply);
        run(&mut w, &mut ctx).unwrap();
        let mp = w.find_commodity("Means of Production").unwrap();
        let lp = w.find_commodity("Labour Power").unwrap();
        assert_eq!(w.commodity(mp).total_supply, 1000.0);
        assert_eq!(w.commodity(lp).total_supply, 500.0);

        let once = w.clone();
        run(&mut w, &mut ctx).unwrap();
        assert_eq!(w, once);
    }

    #[test]
    fn initial_capital_is_money_plus_stocks() {
        let mut w = circ_testkit::two_department_economy().unwrap();
        run(&mut w, &mut PeriodContext::new(1, Phase::Supply)).unwrap();
        let d1 = w.find_industry("Department I").unwrap();
        assert_eq!(w.industry(d1).initial_capital, 2000.0);
    }
}
