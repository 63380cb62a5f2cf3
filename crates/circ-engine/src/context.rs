use circ_model::Diagnostics;

use crate::phase::Phase;
use crate::report::PhaseReport;

/// Explicit per-call context handed to every phase: which period and phase
/// is running, and where consistency warnings go.
#[derive(Clone, Debug)]
pub struct PeriodContext {
    pub period: u32,
    pub phase: Phase,
    pub diagnostics: Diagnostics,
}

impl PeriodContext {
    pub fn new(period: u32, phase: Phase) -> Self {
        Self {
            period,
            phase,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn into_report(self) -> PhaseReport {
        PhaseReport {
            period: self.period,
            phase: self.phase,
            warnings: self.diagnostics.into_warnings(),
        }
    }
}
