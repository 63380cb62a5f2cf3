use circ_model::World;
use circ_store::{ProjectId, SnapshotStore, TimeStamp};

use crate::context::PeriodContext;
use crate::error::PhaseError;
use crate::phase::{Phase, Stage};
use crate::phases;
use crate::report::{PeriodReport, PeriodTotals, PhaseReport};

/// Drives one project through the phase sequence.
///
/// `Supply` opens a new snapshot (a deep copy of the latest committed one),
/// every phase mutates that snapshot, and `Accumulate` commits it. A
/// structural error discards the open snapshot and resets the sequence to
/// `Supply`, so a failed period leaves no trace in the store.
pub struct Simulation<S: SnapshotStore> {
    store: S,
    project: ProjectId,
    committed: TimeStamp,
    open: Option<TimeStamp>,
    next_phase: Phase,
    reports: Vec<PhaseReport>,
}

impl<S: SnapshotStore> Simulation<S> {
    /// Resume `project` from its latest committed snapshot.
    pub fn new(store: S, project: ProjectId) -> Result<Self, PhaseError> {
        let committed = store.latest_committed(project)?;
        Ok(Self {
            store,
            project,
            committed,
            open: None,
            next_phase: Phase::Supply,
            reports: Vec::new(),
        })
    }

    /// Register `opening` as a new project in `store` and start at period 1.
    pub fn create(mut store: S, project: ProjectId, opening: World) -> Result<Self, PhaseError> {
        store.create_project(project, opening)?;
        Self::new(store, project)
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    /// The period currently running, or about to start.
    pub fn period(&self) -> u32 {
        self.committed.0 + 1
    }

    pub fn next_phase(&self) -> Phase {
        self.next_phase
    }

    pub fn latest_committed(&self) -> TimeStamp {
        self.committed
    }

    /// The open snapshot mid-period, otherwise the latest committed one.
    pub fn world(&self) -> Result<&World, PhaseError> {
        let ts = self.open.unwrap_or(self.committed);
        Ok(self.store.snapshot(self.project, ts)?)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Run exactly one phase. It must be the next one in sequence.
    pub fn run_phase(&mut self, phase: Phase) -> Result<PhaseReport, PhaseError> {
        if phase != self.next_phase {
            return Err(PhaseError::OutOfSequence {
                expected: self.next_phase,
                requested: phase,
            });
        }

        let ts = match self.open {
            Some(ts) => ts,
            None => {
                let ts = self
                    .store
                    .create_next_period_snapshot(self.project, self.committed)?;
                self.open = Some(ts);
                ts
            }
        };

        let period = self.period();
        let mut ctx = PeriodContext::new(period, phase);
        let world = self.store.snapshot_mut(self.project, ts)?;
        if let Err(source) = phases::run(phase, world, &mut ctx) {
            tracing::error!(period, %phase, error = %source, "period aborted");
            self.abort(ts)?;
            return Err(PhaseError::Structural {
                phase,
                period,
                source,
            });
        }

        let report = ctx.into_report();
        tracing::info!(
            period,
            phase = phase.as_str(),
            warnings = report.warnings.len(),
            "phase complete"
        );
        self.reports.push(report.clone());

        if phase.ends_period() {
            self.store.commit(self.project, ts)?;
            self.committed = ts;
            self.open = None;
        }
        self.next_phase = phase.next();
        Ok(report)
    }

    /// Run every phase of one stage, starting at its first phase.
    pub fn run_stage(&mut self, stage: Stage) -> Result<Vec<PhaseReport>, PhaseError> {
        stage
            .phases()
            .iter()
            .map(|p| self.run_phase(*p))
            .collect()
    }

    /// Run a whole period from `Supply` to `Accumulate`.
    pub fn run_period(&mut self) -> Result<PeriodReport, PhaseError> {
        if self.next_phase != Phase::Supply {
            return Err(PhaseError::OutOfSequence {
                expected: self.next_phase,
                requested: Phase::Supply,
            });
        }
        self.reports.clear();
        let period = self.period();
        self.run_stage(Stage::PreTrade)?;
        self.run_stage(Stage::ProduceAndDistribute)?;

        let world = self.store.snapshot(self.project, self.committed)?;
        let report = PeriodReport {
            period,
            time_stamp: self.committed,
            phases: std::mem::take(&mut self.reports),
            totals: PeriodTotals::from_world(world),
        };
        tracing::info!(
            period,
            total_value = report.totals.total_value,
            total_price = report.totals.total_price,
            melt = report.totals.melt,
            warnings = report.warning_count(),
            "period committed"
        );
        Ok(report)
    }

    /// Run `n` consecutive periods, stopping at the first failure.
    pub fn run_periods(&mut self, n: u32) -> Result<Vec<PeriodReport>, PhaseError> {
        (0..n).map(|_| self.run_period()).collect()
    }

    fn abort(&mut self, ts: TimeStamp) -> Result<(), PhaseError> {
        self.open = None;
        self.next_phase = Phase::Supply;
        self.reports.clear();
        self.store.discard(self.project, ts)?;
        Ok(())
    }
}
