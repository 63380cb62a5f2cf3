//! Run artifacts: `exports/<run_id>/manifest.json` plus one CSV per entity
//! kind, appended to after every committed period.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use circ_engine::PeriodReport;
use circ_model::World;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub project_id: u32,
    pub project_name: String,
    pub config_hash: String,
    pub periods: u32,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub periods_csv: String,
    pub commodities_csv: String,
    pub industries_csv: String,
    pub classes_csv: String,
}

impl Default for ArtifactList {
    fn default() -> Self {
        Self {
            manifest_json: "manifest.json".to_string(),
            periods_csv: "periods.csv".to_string(),
            commodities_csv: "commodities.csv".to_string(),
            industries_csv: "industries.csv".to_string(),
            classes_csv: "classes.csv".to_string(),
        }
    }
}

pub struct InitRunArtifactsArgs<'a> {
    pub exports_root: &'a Path,
    pub schema_version: i32,
    pub run_id: Uuid,
    pub project_id: u32,
    pub project_name: &'a str,
    pub config_hash: &'a str,
    pub periods: u32,
}

pub struct InitRunArtifactsResult {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
}

/// Run id derived from what the run is: the same config run for the same
/// number of periods always lands in the same directory.
pub fn deterministic_run_id(config_hash: &str, periods: u32) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{config_hash}:{periods}").as_bytes())
}

pub fn init_run_artifacts(args: InitRunArtifactsArgs<'_>) -> Result<InitRunArtifactsResult> {
    // exports/<run_id>/
    let run_dir = args.exports_root.join(args.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let artifacts = ArtifactList::default();
    // A re-run into the same directory starts its tables afresh.
    for name in [
        &artifacts.periods_csv,
        &artifacts.commodities_csv,
        &artifacts.industries_csv,
        &artifacts.classes_csv,
    ] {
        let path = run_dir.join(name);
        fs::write(&path, "").with_context(|| format!("reset table failed: {}", path.display()))?;
    }

    let manifest = RunManifest {
        schema_version: args.schema_version,
        run_id: args.run_id,
        project_id: args.project_id,
        project_name: args.project_name.to_string(),
        config_hash: args.config_hash.to_string(),
        periods: args.periods,
        created_at_utc: Utc::now(),
        artifacts,
    };

    let manifest_path = run_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(InitRunArtifactsResult {
        run_dir,
        manifest_path,
    })
}

pub fn read_manifest(run_dir: &Path) -> Result<RunManifest> {
    let path = run_dir.join("manifest.json");
    let raw =
        fs::read_to_string(&path).with_context(|| format!("read manifest: {}", path.display()))?;
    serde_json::from_str(&raw).context("parse manifest json")
}

// ---------------------------------------------------------------------------
// Per-period rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub period: u32,
    pub time_stamp: u32,
    pub total_value: f64,
    pub total_price: f64,
    pub melt: f64,
    pub economy_profit_rate: f64,
    pub rate_of_exploitation: f64,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityRow {
    pub period: u32,
    pub name: String,
    pub unit_value: f64,
    pub unit_price: f64,
    pub total_quantity: f64,
    pub total_value: f64,
    pub total_price: f64,
    pub total_supply: f64,
    pub total_demand: f64,
    pub allocation_share: f64,
    pub surplus_product: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRow {
    pub period: u32,
    pub name: String,
    pub commodity: String,
    pub output: f64,
    pub proposed_output: f64,
    pub initial_capital: f64,
    pub profit_earned: f64,
    pub money: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRow {
    pub period: u32,
    pub name: String,
    pub size: f64,
    pub revenue: f64,
    pub money: f64,
}

/// Everything written for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRows {
    pub period: PeriodRow,
    pub commodities: Vec<CommodityRow>,
    pub industries: Vec<IndustryRow>,
    pub classes: Vec<ClassRow>,
}

impl PeriodRows {
    /// Rows describing `world`, the snapshot `report` committed.
    pub fn collect(report: &PeriodReport, world: &World) -> Self {
        let period = report.period;
        let commodities = world
            .commodities()
            .map(|(id, c)| CommodityRow {
                period,
                name: c.name.clone(),
                unit_value: c.unit_value,
                unit_price: c.unit_price,
                total_quantity: world.total_quantity(id),
                total_value: world.total_value(id),
                total_price: world.total_price(id),
                total_supply: c.total_supply,
                total_demand: c.total_demand,
                allocation_share: c.allocation_share,
                surplus_product: c.surplus_product,
            })
            .collect();
        let industries = world
            .industries()
            .map(|(id, i)| IndustryRow {
                period,
                name: i.name.clone(),
                commodity: world.commodity(i.commodity).name.clone(),
                output: i.output,
                proposed_output: i.proposed_output,
                initial_capital: i.initial_capital,
                profit_earned: i.profit_earned,
                money: world.industry_money(id),
            })
            .collect();
        let classes = world
            .classes()
            .map(|(id, c)| ClassRow {
                period,
                name: c.name.clone(),
                size: c.size,
                revenue: c.revenue,
                money: world.class_money(id),
            })
            .collect();

        Self {
            period: PeriodRow {
                period,
                time_stamp: report.time_stamp.0,
                total_value: report.totals.total_value,
                total_price: report.totals.total_price,
                melt: report.totals.melt,
                economy_profit_rate: report.totals.economy_profit_rate,
                rate_of_exploitation: report.totals.rate_of_exploitation,
                warnings: report.warning_count(),
            },
            commodities,
            industries,
            classes,
        }
    }
}

/// Append one period's rows to the run's tables. The header is written by
/// the first append to an empty table.
pub fn append_period_rows(run_dir: &Path, report: &PeriodReport, world: &World) -> Result<()> {
    let rows = PeriodRows::collect(report, world);
    let names = ArtifactList::default();
    append_rows(&run_dir.join(&names.periods_csv), std::slice::from_ref(&rows.period))?;
    append_rows(&run_dir.join(&names.commodities_csv), &rows.commodities)?;
    append_rows(&run_dir.join(&names.industries_csv), &rows.industries)?;
    append_rows(&run_dir.join(&names.classes_csv), &rows.classes)?;
    Ok(())
}

fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open table failed: {}", path.display()))?;
    let empty = file
        .metadata()
        .with_context(|| format!("stat table failed: {}", path.display()))?
        .len()
        == 0;

    let mut w = csv::WriterBuilder::new().has_headers(empty).from_writer(file);
    for row in rows {
        w.serialize(row)
            .with_context(|| format!("write row failed: {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush table failed: {}", path.display()))?;
    Ok(())
}
