use std::fmt;

use circ_model::StructuralError;
use circ_store::StoreError;

use crate::phase::Phase;

/// Why a phase could not complete.
///
/// A `Structural` error aborts the period: the open snapshot is discarded and
/// the next runnable phase is `Supply` again.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseError {
    Structural {
        phase: Phase,
        period: u32,
        source: StructuralError,
    },
    /// The caller asked for a phase other than the next one in sequence.
    OutOfSequence { expected: Phase, requested: Phase },
    Store(StoreError),
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural {
                phase,
                period,
                source,
            } => write!(f, "period {period} aborted in {phase}: {source}"),
            Self::OutOfSequence {
                expected,
                requested,
            } => write!(f, "phase {requested} requested out of sequence (next is {expected})"),
            Self::Store(e) => write!(f, "snapshot store: {e}"),
        }
    }
}

impl std::error::Error for PhaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Structural { source, .. } => Some(source),
            Self::Store(e) => Some(e),
            Self::OutOfSequence { .. } => None,
        }
    }
}

impl From<StoreError> for PhaseError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
