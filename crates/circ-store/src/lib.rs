//! circ-store
//!
//! Persistence collaborator for the simulation core.
//!
//! A project is a sequence of [`World`] snapshots keyed by [`TimeStamp`].
//! Time-stamp 0 holds the opening state; each period deep-copies the latest
//! committed snapshot into a new, open time-stamp, mutates it through the
//! phases, and commits it. Committed snapshots are immutable and retained
//! for comparison (see [`diff`]).
//!
//! [`MemoryStore`] is the in-process implementation; anything that can hold
//! worlds by `(project, time-stamp)` can implement [`SnapshotStore`].

use std::fmt;

use circ_model::{ClassId, CommodityId, EntityKind, IndustryId, StockId, World};

pub mod diff;
mod memory;

pub use diff::{diff_snapshots, FieldChange};
pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(pub u32);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project {}", self.0)
    }
}

/// Position of a snapshot in a project's history. 0 is the opening state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(pub u32);

impl TimeStamp {
    pub const OPENING: TimeStamp = TimeStamp(0);

    pub fn next(self) -> TimeStamp {
        TimeStamp(self.0 + 1)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A resolved handle to one entity of a snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Commodity(CommodityId),
    Industry(IndustryId),
    SocialClass(ClassId),
    Stock(StockId),
    Global,
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Commodity(_) => EntityKind::Commodity,
            EntityRef::Industry(_) => EntityKind::Industry,
            EntityRef::SocialClass(_) => EntityKind::SocialClass,
            EntityRef::Stock(_) => EntityKind::Stock,
            EntityRef::Global => EntityKind::Global,
        }
    }

    /// The key the entity is found under: its name, or the stock key.
    pub fn key(&self, world: &World) -> String {
        match *self {
            EntityRef::Commodity(id) => world.commodity(id).name.clone(),
            EntityRef::Industry(id) => world.industry(id).name.clone(),
            EntityRef::SocialClass(id) => world.class(id).name.clone(),
            EntityRef::Stock(id) => world.stock_key(id),
            EntityRef::Global => "global".to_string(),
        }
    }
}

/// Every entity of `kind` in arena order.
pub fn entities_of(world: &World, kind: EntityKind) -> Vec<EntityRef> {
    match kind {
        EntityKind::Commodity => world
            .commodity_ids()
            .into_iter()
            .map(EntityRef::Commodity)
            .collect(),
        EntityKind::Industry => world
            .industry_ids()
            .into_iter()
            .map(EntityRef::Industry)
            .collect(),
        EntityKind::SocialClass => world
            .class_ids()
            .into_iter()
            .map(EntityRef::SocialClass)
            .collect(),
        EntityKind::Stock => world.stock_ids().into_iter().map(EntityRef::Stock).collect(),
        EntityKind::Global => vec![EntityRef::Global],
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    UnknownProject(ProjectId),
    ProjectExists(ProjectId),
    UnknownTimeStamp { project: ProjectId, ts: TimeStamp },
    /// Committed snapshots cannot be mutated, committed again or discarded.
    AlreadyCommitted { project: ProjectId, ts: TimeStamp },
    /// The snapshot is still open.
    NotCommitted { project: ProjectId, ts: TimeStamp },
    /// A new period may only branch from the latest snapshot.
    NotLatest {
        project: ProjectId,
        ts: TimeStamp,
        latest: TimeStamp,
    },
    UnknownEntity { kind: EntityKind, key: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProject(p) => write!(f, "unknown {p}"),
            Self::ProjectExists(p) => write!(f, "{p} already exists"),
            Self::UnknownTimeStamp { project, ts } => {
                write!(f, "{project} has no snapshot at {ts}")
            }
            Self::AlreadyCommitted { project, ts } => {
                write!(f, "{project} snapshot {ts} is already committed")
            }
            Self::NotCommitted { project, ts } => {
                write!(f, "{project} snapshot {ts} is not committed")
            }
            Self::NotLatest {
                project,
                ts,
                latest,
            } => write!(f, "{project}: {ts} is not the latest snapshot ({latest})"),
            Self::UnknownEntity { kind, key } => {
                write!(f, "no {} with key '{}'", kind.as_str(), key)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// Storage of per-period world snapshots.
pub trait SnapshotStore {
    /// Register a project with its opening state, committed at
    /// [`TimeStamp::OPENING`].
    fn create_project(&mut self, project: ProjectId, opening: World) -> Result<TimeStamp, StoreError>;

    /// Deep-copy the committed snapshot at `prior` into a new open
    /// time-stamp. `prior` must be the project's latest snapshot.
    fn create_next_period_snapshot(
        &mut self,
        project: ProjectId,
        prior: TimeStamp,
    ) -> Result<TimeStamp, StoreError>;

    fn snapshot(&self, project: ProjectId, ts: TimeStamp) -> Result<&World, StoreError>;

    /// Mutable access; fails for committed snapshots.
    fn snapshot_mut(&mut self, project: ProjectId, ts: TimeStamp) -> Result<&mut World, StoreError>;

    fn commit(&mut self, project: ProjectId, ts: TimeStamp) -> Result<(), StoreError>;

    /// Drop an open snapshot (after an aborted period).
    fn discard(&mut self, project: ProjectId, ts: TimeStamp) -> Result<(), StoreError>;

    fn latest_committed(&self, project: ProjectId) -> Result<TimeStamp, StoreError>;

    /// All time-stamps of a project, ascending.
    fn time_stamps(&self, project: ProjectId) -> Result<Vec<TimeStamp>, StoreError>;

    /// Resolve one entity by its key (name, or stock key for stocks).
    fn find_entity(
        &self,
        kind: EntityKind,
        project: ProjectId,
        ts: TimeStamp,
        key: &str,
    ) -> Result<EntityRef, StoreError> {
        let world = self.snapshot(project, ts)?;
        entities_of(world, kind)
            .into_iter()
            .find(|e| e.key(world) == key)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind,
                key: key.to_string(),
            })
    }

    /// Every entity of `kind` accepted by `filter`, in arena order.
    fn list_entities<F>(
        &self,
        kind: EntityKind,
        project: ProjectId,
        ts: TimeStamp,
        filter: F,
    ) -> Result<Vec<EntityRef>, StoreError>
    where
        F: Fn(&World, EntityRef) -> bool,
        Self: Sized,
    {
        let world = self.snapshot(project, ts)?;
        Ok(entities_of(world, kind)
            .into_iter()
            .filter(|e| filter(world, *e))
            .collect())
    }
}
