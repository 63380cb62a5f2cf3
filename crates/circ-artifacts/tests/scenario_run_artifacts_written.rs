//! Scenario: run artifacts.
//!
//! # Invariants under test
//! - `init_run_artifacts` creates `<exports>/<run_id>/manifest.json` carrying
//!   the project, config hash and period count.
//! - Each committed period appends exactly one row per entity to its table,
//!   under a single header.
//! - Two runs of the same scenario write byte-identical tables.

use std::fs;
use std::path::Path;

use circ_artifacts::{
    append_period_rows, deterministic_run_id, init_run_artifacts, read_manifest,
    InitRunArtifactsArgs, SCHEMA_VERSION,
};
use circ_engine::Simulation;
use circ_store::{MemoryStore, ProjectId};

const PERIODS: u32 = 2;

fn run_into(exports: &Path) -> std::path::PathBuf {
    let run_id = deterministic_run_id("fixture-hash", PERIODS);
    let init = init_run_artifacts(InitRunArtifactsArgs {
        exports_root: exports,
        schema_version: SCHEMA_VERSION,
        run_id,
        project_id: 1,
        project_name: "two departments",
        config_hash: "fixture-hash",
        periods: PERIODS,
    })
    .unwrap();

    let opening = circ_testkit::two_department_economy().unwrap();
    let mut sim = Simulation::create(MemoryStore::new(), ProjectId(1), opening).unwrap();
    for _ in 0..PERIODS {
        let report = sim.run_period().unwrap();
        append_period_rows(&init.run_dir, &report, sim.world().unwrap()).unwrap();
    }
    init.run_dir
}

#[test]
fn scenario_manifest_and_tables_created() {
    // GIVEN: an empty exports root
    let exports = tempfile::tempdir().unwrap();

    // WHEN: a two-period run writes its artifacts
    let run_dir = run_into(exports.path());

    // THEN: the manifest describes the run
    let manifest = read_manifest(&run_dir).unwrap();
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.project_id, 1);
    assert_eq!(manifest.config_hash, "fixture-hash");
    assert_eq!(manifest.periods, PERIODS);
    assert_eq!(run_dir.file_name().unwrap().to_string_lossy(), manifest.run_id.to_string());

    // AND: one row per entity per period
    let rows = |name: &str| {
        let path = run_dir.join(name);
        circ_testkit::load_csv_records(path.to_str().unwrap()).unwrap()
    };
    let (header, periods) = rows("periods.csv");
    assert_eq!(header[0], "period");
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[1][0], "2");
    assert_eq!(rows("commodities.csv").1.len(), 2 * 4);
    assert_eq!(rows("industries.csv").1.len(), 2 * 2);
    let (class_header, classes) = rows("classes.csv");
    assert_eq!(class_header, vec!["period", "name", "size", "revenue", "money"]);
    assert_eq!(classes.len(), 2 * 2);
}

#[test]
fn scenario_replay_writes_identical_tables() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let run_a = run_into(a.path());
    let run_b = run_into(b.path());

    for table in ["periods.csv", "commodities.csv", "industries.csv", "classes.csv"] {
        let left = fs::read_to_string(run_a.join(table)).unwrap();
        let right = fs::read_to_string(run_b.join(table)).unwrap();
        assert_eq!(left, right, "{table} differs between identical runs");
    }
}

#[test]
fn scenario_rerun_resets_tables() {
    // GIVEN: a run already exported
    let exports = tempfile::tempdir().unwrap();
    let first = run_into(exports.path());

    // WHEN: the same run is exported again into the same root
    let second = run_into(exports.path());

    // THEN: the tables hold one run's rows, not two
    assert_eq!(first, second);
    let (_, periods) =
        circ_testkit::load_csv_records(second.join("periods.csv").to_str().unwrap()).unwrap();
    assert_eq!(periods.len(), 2);
}
