//! `circ run`: simulate a scenario period by period.

use anyhow::{Context, Result};
use circ_artifacts::{
    append_period_rows, deterministic_run_id, init_run_artifacts, InitRunArtifactsArgs,
    SCHEMA_VERSION,
};
use circ_engine::{PeriodReport, Simulation};
use circ_store::{MemoryStore, ProjectId};
use std::path::Path;

pub struct RunArgs<'a> {
    pub config_paths: &'a [String],
    pub periods: u32,
    pub exports: Option<&'a str>,
    pub fail_on_unused_keys: bool,
}

pub fn run(args: RunArgs<'_>) -> Result<()> {
    let (loaded, scenario, _) = super::load_scenario(args.config_paths, args.fail_on_unused_keys)?;
    let opening = scenario.build_world()?;
    let project = ProjectId(scenario.project.id);

    let run_dir = match args.exports {
        Some(root) => {
            let init = init_run_artifacts(InitRunArtifactsArgs {
                exports_root: Path::new(root),
                schema_version: SCHEMA_VERSION,
                run_id: deterministic_run_id(&loaded.config_hash, args.periods),
                project_id: project.0,
                project_name: &scenario.project.name,
                config_hash: &loaded.config_hash,
                periods: args.periods,
            })?;
            Some(init.run_dir)
        }
        None => None,
    };

    println!("config_hash={}", loaded.config_hash);
    println!("project_id={}", project.0);

    let mut sim = Simulation::create(MemoryStore::new(), project, opening)
        .context("create simulation failed")?;
    for _ in 0..args.periods {
        let period = sim.period();
        let report = sim
            .run_period()
            .with_context(|| format!("period {period} failed"))?;
        print_period(&report);
        if let Some(dir) = &run_dir {
            append_period_rows(dir, &report, sim.world()?)?;
        }
    }

    println!("periods_run={}", args.periods);
    println!("latest_time_stamp={}", sim.latest_committed());
    if let Some(dir) = &run_dir {
        println!("run_dir={}", dir.display());
    }
    Ok(())
}

fn print_period(report: &PeriodReport) {
    let t = &report.totals;
    println!(
        "period={} time_stamp={} total_value={} total_price={} melt={} profit_rate={} exploitation={} warnings={}",
        report.period,
        report.time_stamp,
        t.total_value,
        t.total_price,
        t.melt,
        t.economy_profit_rate,
        t.rate_of_exploitation,
        report.warning_count()
    );
}
