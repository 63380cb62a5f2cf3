//! Scenario: ledger consistency across whole periods.
//!
//! # Invariants under test
//! - After every committed period each stock's value and price equal its
//!   quantity at the commodity's unit value and unit price.
//! - No stock quantity, value or price is negative.
//! - Money is only ever transferred, so the total money stock is conserved.
//! - Earlier snapshots are untouched by later periods.

use circ_engine::Simulation;
use circ_model::numeric::approx_eq;
use circ_model::World;
use circ_store::{MemoryStore, ProjectId, SnapshotStore, TimeStamp};

const PROJECT: ProjectId = ProjectId(1);

fn total_money(w: &World) -> f64 {
    let money = w.money_commodity().unwrap();
    w.total_quantity(money)
}

#[test]
fn scenario_two_periods_stay_consistent() {
    // GIVEN: the two-department economy
    let opening = circ_testkit::two_department_economy().unwrap();
    let money_at_start = total_money(&opening);
    assert_eq!(money_at_start, 2_100.0);
    let mut sim = Simulation::create(MemoryStore::new(), PROJECT, opening.clone()).unwrap();

    for period in 1..=2 {
        // WHEN: a period runs
        let report = sim.run_period().unwrap();
        assert_eq!(report.period, period);
        assert_eq!(report.time_stamp, TimeStamp(period));

        // THEN: the committed snapshot is consistent
        let w = sim.world().unwrap();
        for c in w.commodity_ids() {
            assert!(
                w.unit_figures_consistent(c),
                "period {period}: {} stocks drifted from unit figures",
                w.commodity(c).name
            );
        }
        for (id, s) in w.stocks() {
            assert!(
                s.quantity >= 0.0 && s.value >= 0.0 && s.price >= 0.0,
                "period {period}: negative ledger in {}",
                w.stock_key(id)
            );
        }
        assert!(approx_eq(total_money(w), money_at_start));
    }

    // The opening snapshot is still the opening world.
    assert_eq!(sim.store().snapshot(PROJECT, TimeStamp::OPENING).unwrap(), &opening);
}

#[test]
fn scenario_first_period_figures() {
    let mut sim = Simulation::create(
        MemoryStore::new(),
        PROJECT,
        circ_testkit::two_department_economy().unwrap(),
    )
    .unwrap();
    let report = sim.run_period().unwrap();
    let w = sim.world().unwrap();

    let mp = w.find_commodity("Means of Production").unwrap();
    let cg = w.find_commodity("Consumption Goods").unwrap();
    assert_eq!(w.commodity(mp).surplus_product, 250.0);
    assert_eq!(w.commodity(cg).surplus_product, 50.0);
    assert_eq!(w.global.rate_of_exploitation, 1.0);
    assert_eq!(report.totals.rate_of_exploitation, 1.0);

    let d1 = w.find_industry("Department I").unwrap();
    let d2 = w.find_industry("Department II").unwrap();
    assert_eq!(w.industry(d1).profit_earned, 375.0);
    assert_eq!(w.industry(d2).profit_earned, 125.0);
    assert_eq!(w.stock(w.industry(d1).sales_stock).quantity, 1_250.0);
}
