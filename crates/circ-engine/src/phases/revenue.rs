use circ_model::numeric::{exceeds, round_to_precision, EPSILON};
use circ_model::{StructuralError, WarningKind, World};

use crate::context::PeriodContext;

/// Record each industry's profit and pay it over to the capitalist class.
/// That money is the class's revenue for the next period.
pub fn run(world: &mut World, ctx: &mut PeriodContext) -> Result<(), StructuralError> {
    let capitalists = world.capitalists()?;
    let receiving = world.class(capitalists).money_stock;

    let mut distributed = 0.0;
    for i in world.industry_ids() {
        let profit = world.profit(i);
        world.industry_mut(i).profit_earned = profit;
        if profit <= EPSILON {
            continue;
        }

        let money = world.industry_money(i);
        let amount = if exceeds(profit, money) {
            ctx.diagnostics.warn(
                WarningKind::InsufficientMoney,
                world.industry(i).name.clone(),
                format!("profit {profit} exceeds money held {money}"),
            );
            money
        } else {
            profit.min(money)
        };

        let paying = world.industry(i).money_stock;
        world.transfer_stock(paying, receiving, amount, &mut ctx.diagnostics)?;
        let class = world.class_mut(capitalists);
        class.revenue = round_to_precision(class.revenue + amount);
        distributed += amount;
    }

    tracing::debug!(period = ctx.period, distributed, "profit distributed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::phases::{constrain, demand, produce, supply, trade};

    fn through_revenue(mut w: World) -> (World, PeriodContext) {
        supply::run(&mut w, &mut PeriodContext::new(1, Phase::Supply)).unwrap();
        demand::run(&mut w, &mut PeriodContext::new(1, Phase::Demand)).unwrap();
        constrain::run(&mut w, &mut PeriodContext::new(1, Phase::Constrain)).unwrap();
        trade::run(&mut w, &mut PeriodContext::new(1, Phase::Trade)).unwrap();
        produce::run(&mut w, &mut PeriodContext::new(1, Phase::Produce)).unwrap();
        let mut ctx = PeriodContext::new(1, Phase::Revenue);
        run(&mut w, &mut ctx).unwrap();
        (w, ctx)
    }

    #[test]
    fn profit_moves_to_capitalists() {
        let (w, ctx) = through_revenue(circ_testkit::two_department_economy().unwrap());
        assert!(ctx.diagnostics.is_empty());

        let d1 = w.find_industry("Department I").unwrap();
        let d2 = w.find_industry("Department II").unwrap();
        assert_eq!(w.industry(d1).profit_earned, 375.0);
        assert_eq!(w.industry(d2).profit_earned, 125.0);
        assert_eq!(w.industry_money(d1), 750.0);
        assert_eq!(w.industry_money(d2), 550.0);

        let caps = w.find_class("Capitalists").unwrap();
        assert_eq!(w.class_money(caps), 800.0);
        assert_eq!(w.class(caps).revenue, 500.0);
    }

    #[test]
    fn missing_capitalist_class_is_fatal() {
        let mut w = circ_model::World::new(circ_model::Global::default());
        let err = run(&mut w, &mut PeriodContext::new(1, Phase::Revenue)).unwrap_err();
        assert!(matches!(err, StructuralError::MissingEntity { .. }));
    }
}
