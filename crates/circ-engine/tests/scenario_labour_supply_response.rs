//! Scenario: fixed versus flexible labour supply after accumulation.
//!
//! # Invariants under test
//! - With a fixed labour supply, expansion beyond the available labour power
//!   is rationed and output falls back to what the workforce allows.
//! - With a flexible labour supply, the sellers' stock stretches to meet
//!   demand and the anticipated wage bill grows with it.

use circ_engine::{Phase, Simulation};
use circ_model::numeric::round_to_precision;
use circ_model::{LabourSupplyResponse, World};
use circ_store::{MemoryStore, ProjectId};

fn second_period_through_constrain(response: LabourSupplyResponse) -> World {
    let mut opening = circ_testkit::two_department_economy().unwrap();
    opening.global.labour_supply_response = response;
    let mut sim = Simulation::create(MemoryStore::new(), ProjectId(1), opening).unwrap();
    sim.run_period().unwrap();
    for phase in [Phase::Supply, Phase::Demand, Phase::Constrain] {
        sim.run_phase(phase).unwrap();
    }
    sim.world().unwrap().clone()
}

#[test]
fn scenario_fixed_labour_rations_expansion() {
    // GIVEN: period 1 funded 1100 and 900 of output; 500 hours are on offer
    // WHEN: period 2 reaches Constrain with a fixed labour supply
    let w = second_period_through_constrain(LabourSupplyResponse::Fixed);

    // THEN: 275 + 450 hours demanded, 500 supplied, output falls back
    let lp = w.find_commodity("Labour Power").unwrap();
    assert_eq!(w.commodity(lp).total_demand, 725.0);
    assert_eq!(w.commodity(lp).total_supply, 500.0);
    let share = w.commodity(lp).allocation_share;
    assert!((share - 500.0 / 725.0).abs() < 1e-9);

    let d1 = w.find_industry("Department I").unwrap();
    let d2 = w.find_industry("Department II").unwrap();
    let expected_d1 = round_to_precision(round_to_precision(275.0 * share) / 0.25);
    let expected_d2 = round_to_precision(round_to_precision(450.0 * share) / 0.5);
    assert_eq!(w.industry(d1).constrained_output, expected_d1);
    assert_eq!(w.industry(d2).constrained_output, expected_d2);
    assert_eq!(w.industry(d1).proposed_output, 1_100.0);
    assert_eq!(w.industry(d2).proposed_output, 900.0);
}

#[test]
fn scenario_flexible_labour_meets_expansion() {
    // WHEN: the same period runs with a flexible labour supply
    let w = second_period_through_constrain(LabourSupplyResponse::Flexible);

    // THEN: the workforce stretches to 725 hours and output is not rationed
    let lp = w.find_commodity("Labour Power").unwrap();
    assert_eq!(w.commodity(lp).total_supply, 725.0);
    assert_eq!(w.commodity(lp).allocation_share, 1.0);
    let d1 = w.find_industry("Department I").unwrap();
    let d2 = w.find_industry("Department II").unwrap();
    assert_eq!(w.industry(d1).constrained_output, 1_100.0);
    assert_eq!(w.industry(d2).constrained_output, 900.0);
    let workers = w.find_class("Workers").unwrap();
    assert_eq!(w.class(workers).revenue, 362.5);
}
