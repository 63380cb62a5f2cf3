//! Scenario: accumulation is bounded by the surplus product.
//!
//! # Invariants under test
//! - Department I is funded before Department II.
//! - Funding never draws more means of production than the surplus holds;
//!   an over-large request is scaled down with a FundingShortfall warning.
//! - Department II grows by everything the surplus Department I left over
//!   can equip, not by its own growth rate.
//! - Funding money leaves the capitalist class and arrives at the industry.

use circ_engine::{allocate_investment, Department, PeriodContext, Phase};
use circ_model::WarningKind;
use circ_testkit::WorldBuilder;

#[test]
fn scenario_department_one_exhausts_surplus() {
    // GIVEN: the foundry wants 1200 of steel for expansion; the surplus is 1000
    let mut b = WorldBuilder::new()
        .unwrap()
        .productive_input("Steel", 1.0)
        .unwrap()
        .consumer_good("Bread", 1.0)
        .unwrap();
    let foundry = b.industry("Foundry", "Steel", 12_000.0, 0.0, 0.0).unwrap();
    b.input(foundry, "Steel", 1.0).unwrap();
    let bakery = b.industry("Bakery", "Bread", 100.0, 0.0, 0.0).unwrap();
    b.input(bakery, "Steel", 1.0).unwrap();
    b.capitalists("Capitalists", 5_000.0).unwrap();
    let mut w = b.build();
    for i in [foundry, bakery] {
        w.industry_mut(i).growth_rate = 0.1;
    }
    let steel = w.find_commodity("Steel").unwrap();
    w.commodity_mut(steel).surplus_product = 1_000.0;

    // WHEN: investment is allocated
    let mut ctx = PeriodContext::new(1, Phase::Accumulate);
    let plan = allocate_investment(&mut w, &mut ctx).unwrap();

    // THEN: the foundry gets the whole surplus and the bakery nothing
    assert_eq!(plan.surplus_at_start, 1_000.0);
    assert_eq!(plan.surplus_remaining, 0.0);
    assert_eq!(plan.department_total(Department::One), 1_000.0);
    assert_eq!(plan.department_total(Department::Two), 0.0);
    assert_eq!(w.industry(foundry).proposed_output, 13_000.0);
    assert_eq!(w.industry(bakery).proposed_output, 100.0);
    assert_eq!(ctx.diagnostics.count(WarningKind::FundingShortfall), 1);

    // The money moved from capitalists to the foundry.
    let caps = w.capitalists().unwrap();
    assert_eq!(w.class_money(caps), 4_000.0);
    assert_eq!(w.industry_money(foundry), 1_000.0);
    let input = w.industry(foundry).productive_stocks[0];
    assert_eq!(w.stock(input).expansion_demand, 1_000.0);
}

#[test]
fn scenario_department_two_absorbs_remaining_surplus() {
    // GIVEN: the balanced two-department economy after one full period
    let mut sim = circ_engine::Simulation::create(
        circ_store::MemoryStore::new(),
        circ_store::ProjectId(1),
        circ_testkit::two_department_economy().unwrap(),
    )
    .unwrap();

    // WHEN: the period ends
    sim.run_period().unwrap();
    let w = sim.world().unwrap();

    // THEN: Department I was funded for 10% growth and Department II for
    // everything the remaining 200 of surplus means of production equips
    let d1 = w.find_industry("Department I").unwrap();
    let d2 = w.find_industry("Department II").unwrap();
    assert_eq!(w.industry(d1).proposed_output, 1_100.0);
    assert_eq!(w.industry(d2).proposed_output, 900.0);
    assert_eq!(w.industry_money(d1), 812.5);
    assert_eq!(w.industry_money(d2), 850.0);
    let caps = w.capitalists().unwrap();
    assert_eq!(w.class_money(caps), 437.5);
    assert_eq!(w.class(caps).revenue, 137.5);
}
