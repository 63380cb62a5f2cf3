use std::collections::BTreeMap;

use circ_model::World;

use crate::{ProjectId, SnapshotStore, StoreError, TimeStamp};

#[derive(Clone, Debug)]
struct Snapshot {
    world: World,
    committed: bool,
}

/// In-memory [`SnapshotStore`]. Snapshots are ordered by
/// `(project, time-stamp)`, so the last entry of a project's range is its
/// latest snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    snapshots: BTreeMap<(ProjectId, TimeStamp), Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn project_range(
        &self,
        project: ProjectId,
    ) -> impl DoubleEndedIterator<Item = (&(ProjectId, TimeStamp), &Snapshot)> {
        self.snapshots
            .range((project, TimeStamp(0))..=(project, TimeStamp(u32::MAX)))
    }

    fn latest(&self, project: ProjectId) -> Result<(TimeStamp, bool), StoreError> {
        self.project_range(project)
            .next_back()
            .map(|((_, ts), s)| (*ts, s.committed))
            .ok_or(StoreError::UnknownProject(project))
    }

    fn entry(&self, project: ProjectId, ts: TimeStamp) -> Result<&Snapshot, StoreError> {
        self.snapshots.get(&(project, ts)).ok_or_else(|| {
            if self.latest(project).is_err() {
                StoreError::UnknownProject(project)
            } else {
                StoreError::UnknownTimeStamp { project, ts }
            }
        })
    }

    fn open_entry(&mut self, project: ProjectId, ts: TimeStamp) -> Result<&mut Snapshot, StoreError> {
        let committed = self.entry(project, ts)?.committed;
        if committed {
            return Err(StoreError::AlreadyCommitted { project, ts });
        }
        self.snapshots
            .get_mut(&(project, ts))
            .ok_or(StoreError::UnknownTimeStamp { project, ts })
    }
}

impl SnapshotStore for MemoryStore {
    fn create_project(&mut self, project: ProjectId, opening: World) -> Result<TimeStamp, StoreError> {
        if self.latest(project).is_ok() {
            return Err(StoreError::ProjectExists(project));
        }
        self.snapshots.insert(
            (project, TimeStamp::OPENING),
            Snapshot {
                world: opening,
                committed: true,
            },
        );
        tracing::debug!(%project, "project created");
        Ok(TimeStamp::OPENING)
    }

    fn create_next_period_snapshot(
        &mut self,
        project: ProjectId,
        prior: TimeStamp,
    ) -> Result<TimeStamp, StoreError> {
        let (latest, committed) = self.latest(project)?;
        if prior != latest {
            self.entry(project, prior)?;
            return Err(StoreError::NotLatest {
                project,
                ts: prior,
                latest,
            });
        }
        if !committed {
            return Err(StoreError::NotCommitted { project, ts: prior });
        }
        let world = self.entry(project, prior)?.world.clone();
        let ts = prior.next();
        self.snapshots.insert(
            (project, ts),
            Snapshot {
                world,
                committed: false,
            },
        );
        tracing::debug!(%project, %ts, "snapshot opened");
        Ok(ts)
    }

    fn snapshot(&self, project: ProjectId, ts: TimeStamp) -> Result<&World, StoreError> {
        Ok(&self.entry(project, ts)?.world)
    }

    fn snapshot_mut(&mut self, project: ProjectId, ts: TimeStamp) -> Result<&mut World, StoreError> {
        Ok(&mut self.open_entry(project, ts)?.world)
    }

    fn commit(&mut self, project: ProjectId, ts: TimeStamp) -> Result<(), StoreError> {
        self.open_entry(project, ts)?.committed = true;
        tracing::debug!(%project, %ts, "snapshot committed");
        Ok(())
    }

    fn discard(&mut self, project: ProjectId, ts: TimeStamp) -> Result<(), StoreError> {
        self.open_entry(project, ts)?;
        self.snapshots.remove(&(project, ts));
        tracing::debug!(%project, %ts, "snapshot discarded");
        Ok(())
    }

    fn latest_committed(&self, project: ProjectId) -> Result<TimeStamp, StoreError> {
        self.latest(project)?;
        self.project_range(project)
            .rev()
            .find(|(_, s)| s.committed)
            .map(|((_, ts), _)| *ts)
            .ok_or(StoreError::UnknownProject(project))
    }

    fn time_stamps(&self, project: ProjectId) -> Result<Vec<TimeStamp>, StoreError> {
        self.latest(project)?;
        Ok(self.project_range(project).map(|((_, ts), _)| *ts).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circ_model::{Commodity, EntityKind, Function, Global, Origin};

    const P: ProjectId = ProjectId(1);

    fn opening() -> World {
        let mut w = World::new(Global::default());
        w.add_commodity(Commodity::new("Money", Origin::Money, Function::Money))
            .unwrap();
        w.add_commodity(Commodity::new(
            "Corn",
            Origin::IndustriallyProduced,
            Function::ConsumerGood,
        ))
        .unwrap();
        w.add_industry("Farming", "Corn", 10.0, 0.0).unwrap();
        w
    }

    #[test]
    fn next_snapshot_is_a_deep_copy() {
        let mut store = MemoryStore::new();
        let t0 = store.create_project(P, opening()).unwrap();
        let t1 = store.create_next_period_snapshot(P, t0).unwrap();
        assert_eq!(t1, TimeStamp(1));

        let farm = store.snapshot(P, t1).unwrap().find_industry("Farming").unwrap();
        store.snapshot_mut(P, t1).unwrap().industry_mut(farm).output = 99.0;

        assert_eq!(store.snapshot(P, t0).unwrap().industry(farm).output, 10.0);
        assert_eq!(store.snapshot(P, t1).unwrap().industry(farm).output, 99.0);
    }

    #[test]
    fn committed_snapshots_are_immutable() {
        let mut store = MemoryStore::new();
        let t0 = store.create_project(P, opening()).unwrap();
        assert_eq!(
            store.snapshot_mut(P, t0).unwrap_err(),
            StoreError::AlreadyCommitted { project: P, ts: t0 }
        );
        let t1 = store.create_next_period_snapshot(P, t0).unwrap();
        store.commit(P, t1).unwrap();
        assert!(store.commit(P, t1).is_err());
        assert!(store.discard(P, t1).is_err());
    }

    #[test]
    fn cannot_branch_from_open_or_stale_snapshot() {
        let mut store = MemoryStore::new();
        let t0 = store.create_project(P, opening()).unwrap();
        let t1 = store.create_next_period_snapshot(P, t0).unwrap();
        assert_eq!(
            store.create_next_period_snapshot(P, t1).unwrap_err(),
            StoreError::NotCommitted { project: P, ts: t1 }
        );
        assert!(matches!(
            store.create_next_period_snapshot(P, t0).unwrap_err(),
            StoreError::NotLatest { .. }
        ));
    }

    #[test]
    fn discard_rolls_back_to_latest_committed() {
        let mut store = MemoryStore::new();
        let t0 = store.create_project(P, opening()).unwrap();
        let t1 = store.create_next_period_snapshot(P, t0).unwrap();
        store.discard(P, t1).unwrap();
        assert_eq!(store.latest_committed(P).unwrap(), t0);
        assert_eq!(store.time_stamps(P).unwrap(), vec![t0]);
        assert_eq!(store.create_next_period_snapshot(P, t0).unwrap(), t1);
    }

    #[test]
    fn unknown_project_and_time_stamp() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.latest_committed(P).unwrap_err(),
            StoreError::UnknownProject(P)
        );
        store.create_project(P, opening()).unwrap();
        assert_eq!(
            store.snapshot(P, TimeStamp(7)).unwrap_err(),
            StoreError::UnknownTimeStamp {
                project: P,
                ts: TimeStamp(7)
            }
        );
        assert_eq!(
            store.create_project(P, opening()).unwrap_err(),
            StoreError::ProjectExists(P)
        );
    }

    #[test]
    fn find_and_list_entities() {
        let mut store = MemoryStore::new();
        let t0 = store.create_project(P, opening()).unwrap();
        let farm = store
            .find_entity(EntityKind::Industry, P, t0, "Farming")
            .unwrap();
        assert_eq!(farm.kind(), EntityKind::Industry);

        let stock = store
            .find_entity(EntityKind::Stock, P, t0, "Farming/Corn/sales")
            .unwrap();
        assert!(matches!(stock, crate::EntityRef::Stock(_)));

        assert!(matches!(
            store.find_entity(EntityKind::Commodity, P, t0, "Iron"),
            Err(StoreError::UnknownEntity { .. })
        ));

        let produced = store
            .list_entities(EntityKind::Commodity, P, t0, |w, e| match e {
                crate::EntityRef::Commodity(id) => !w.commodity(id).is_money(),
                _ => false,
            })
            .unwrap();
        assert_eq!(produced.len(), 1);
    }
}
