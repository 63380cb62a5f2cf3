//! Scenario: one industry buys its input from another.
//!
//! # Invariants under test
//! - Demand for an input is `output × coefficient × turnover − held`.
//! - The money cost of that demand is demand × unit price.
//! - A whole period conserves money and leaves stocks consistent with unit
//!   values and prices.

use circ_engine::phases::demand::input_cost;
use circ_engine::Simulation;
use circ_model::numeric::approx_eq;
use circ_store::{MemoryStore, ProjectId};

#[test]
fn scenario_fifty_iron_for_one_hundred_corn() {
    // GIVEN: Farming plans 100 corn at 0.5 iron per corn, iron costs 2
    let opening = circ_testkit::corn_iron_economy().unwrap();
    let farm = opening.find_industry("Farming").unwrap();
    assert_eq!(input_cost(&opening, farm, 100.0), 100.0);

    // WHEN: one period runs
    let mut sim = Simulation::create(MemoryStore::new(), ProjectId(2), opening).unwrap();
    let report = sim.run_period().unwrap();
    let w = sim.world().unwrap();

    // THEN: 50 iron was bought for 100 and turned into 100 corn
    let iron = w.find_commodity("Iron").unwrap();
    let corn = w.find_commodity("Corn").unwrap();
    assert_eq!(w.commodity(iron).total_demand, 50.0);
    assert_eq!(w.commodity(iron).stock_used_up, 50.0);
    assert_eq!(w.commodity(corn).stock_produced, 100.0);
    assert_eq!(w.industry(farm).output, 100.0);
    assert_eq!(w.industry_money(farm), 900.0);

    let smith = w.find_industry("Smithing").unwrap();
    assert_eq!(w.industry_money(smith), 100.0);
    assert_eq!(w.stock(w.industry(smith).sales_stock).quantity, 50.0);

    // The corn carries the value of the iron it used up.
    let corn_sales = w.stock(w.industry(farm).sales_stock);
    assert!(approx_eq(corn_sales.value, 100.0));
    assert_eq!(report.warning_count(), 0);
}
