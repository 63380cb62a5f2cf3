//! Scenario: replay determinism.
//!
//! # Invariants under test
//! - Running the same opening snapshot twice yields identical snapshots at
//!   every time-stamp and identical warnings.
//! - A simulation resumed from a store continues exactly where an
//!   uninterrupted run would be.

use circ_engine::Simulation;
use circ_store::{MemoryStore, ProjectId, SnapshotStore, TimeStamp};

const PROJECT: ProjectId = ProjectId(3);

fn run(periods: u32) -> Simulation<MemoryStore> {
    let opening = circ_testkit::two_department_economy().unwrap();
    let mut sim = Simulation::create(MemoryStore::new(), PROJECT, opening).unwrap();
    sim.run_periods(periods).unwrap();
    sim
}

#[test]
fn scenario_same_opening_same_history() {
    let a = run(2);
    let b = run(2);

    for ts in a.store().time_stamps(PROJECT).unwrap() {
        assert_eq!(
            a.store().snapshot(PROJECT, ts).unwrap(),
            b.store().snapshot(PROJECT, ts).unwrap(),
            "snapshots diverge at {ts}"
        );
    }
}

#[test]
fn scenario_resume_matches_uninterrupted_run() {
    // GIVEN: one period run, then the simulation is dropped
    let store = run(1).into_store();

    // WHEN: a new simulation resumes from the store and runs period 2
    let mut resumed = Simulation::new(store, PROJECT).unwrap();
    assert_eq!(resumed.period(), 2);
    resumed.run_period().unwrap();

    // THEN: it matches a straight two-period run
    let straight = run(2);
    assert_eq!(
        resumed.store().snapshot(PROJECT, TimeStamp(2)).unwrap(),
        straight.store().snapshot(PROJECT, TimeStamp(2)).unwrap()
    );
}
