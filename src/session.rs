// Sequential allocation over all rooms of a booking, with manual overrides.
// Each room is ranked against the rates locked by the rooms before it; the
// cheapest allocation is picked automatically and locked for the next room.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    allocation::{build_allocations, AllocationEntry},
    config::{EngineConfig, SlotConsumption},
    error::EngineError,
    model::{validate_occupancies, Catalog, OccupancyRequirement},
    ranking::{rank_allocations, RankedResult},
    state::{ConsumedSlotTracker, LockedRateCounts},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub entry: AllocationEntry,
    pub source: SelectionSource,
}

// Per-room progress. All vectors have the same length: the number of rooms
// computed so far.
#[derive(Debug, Clone, Default)]
struct Progress {
    results: Vec<RankedResult>,
    selections: Vec<Selection>,
    // Tracker state reached after each room
    checkpoints: Vec<ConsumedSlotTracker>,
}

pub struct AllocationSession {
    catalog: Catalog,
    occupancies: Vec<OccupancyRequirement>,
    config: EngineConfig,
    progress: Progress,
}

impl AllocationSession {
    /// Runs the automatic selection over every room. The session keeps its own
    /// copy of the catalog and occupancies.
    pub fn auto_select(
        catalog: &Catalog,
        occupancies: &[OccupancyRequirement],
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        validate_occupancies(occupancies)?;

        let mut session = Self {
            catalog: catalog.clone(),
            occupancies: occupancies.to_vec(),
            config,
            progress: Progress::default(),
        };
        session.progress = session.advance(
            Progress::default(),
            LockedRateCounts::new(),
            ConsumedSlotTracker::new(),
        )?;

        info!(
            rooms = session.occupancies.len(),
            locked = ?session.locked_rates(),
            "auto-selection complete"
        );
        Ok(session)
    }

    /// Same as `auto_select`, then hands the per-room results to `on_complete`.
    pub fn auto_select_with<F>(
        catalog: &Catalog,
        occupancies: &[OccupancyRequirement],
        config: EngineConfig,
        on_complete: F,
    ) -> Result<Self, EngineError>
    where
        F: FnOnce(&[RankedResult]),
    {
        let session = Self::auto_select(catalog, occupancies, config)?;
        on_complete(session.results());
        Ok(session)
    }

    /// Confirms `recommendation_id`/`rate_id` for room `index`. Selections after
    /// `index` are dropped and every later room is ranked again against the
    /// locks of rooms `0..=index`. Rooms up to `index` keep their results.
    pub fn override_selection(
        &mut self,
        index: usize,
        recommendation_id: &str,
        rate_id: &str,
    ) -> Result<&[RankedResult], EngineError> {
        let rooms = self.occupancies.len();
        let result = self.progress.results.get(index).ok_or_else(|| {
            EngineError::InvalidSelection(format!("room {index} is out of range ({rooms} rooms)"))
        })?;
        let entry = result
            .find(recommendation_id, rate_id)
            .cloned()
            .ok_or_else(|| {
                EngineError::InvalidSelection(format!(
                    "{recommendation_id}-{rate_id} is not an allocation for room {index}"
                ))
            })?;

        let mut kept = self.progress.clone();
        kept.results.truncate(index + 1);
        kept.checkpoints.truncate(index + 1);
        kept.selections.truncate(index);
        kept.selections.push(Selection {
            entry,
            source: SelectionSource::Manual,
        });

        let locked = LockedRateCounts::from_selections(kept.selections.iter().map(|s| &s.entry));
        let tracker = kept.checkpoints[index].clone();

        info!(room = index, recommendation_id, rate_id, locked = ?locked, "manual override");
        self.progress = self.advance(kept, locked, tracker)?;
        Ok(self.results())
    }

    // Computes rooms `progress.results.len()..` and returns the extended
    // progress. The session is only updated by the caller on success.
    fn advance(
        &self,
        mut progress: Progress,
        mut locked: LockedRateCounts,
        mut tracker: ConsumedSlotTracker,
    ) -> Result<Progress, EngineError> {
        for index in progress.results.len()..self.occupancies.len() {
            let occupancy = &self.occupancies[index];
            if self.config.slot_consumption == SlotConsumption::PerOccupancy {
                tracker = ConsumedSlotTracker::new();
            }

            let entries = build_allocations(
                occupancy,
                &self.catalog,
                &locked,
                self.config.lock_policy,
                &mut tracker,
            )
            .map_err(|e| {
                warn!(room = index, error = %e, "allocation failed");
                e
            })?;
            let ranked = rank_allocations(entries);

            let cheapest = ranked
                .cheapest()
                .cloned()
                .ok_or_else(|| EngineError::unsatisfiable(occupancy, None))?;
            let count = locked.lock(&cheapest.rate_id);
            debug!(
                room = index,
                candidates = ranked.len(),
                groups = ranked.groups().len(),
                selected = %cheapest.key(),
                price = cheapest.total_price,
                lock_count = count,
                "room allocated"
            );

            progress.results.push(ranked);
            progress.selections.push(Selection {
                entry: cheapest,
                source: SelectionSource::Auto,
            });
            progress.checkpoints.push(tracker.clone());
        }
        Ok(progress)
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.progress.results
    }

    pub fn result(&self, index: usize) -> Option<&RankedResult> {
        self.progress.results.get(index)
    }

    pub fn selections(&self) -> &[Selection] {
        &self.progress.selections
    }

    pub fn selection(&self, index: usize) -> Option<&Selection> {
        self.progress.selections.get(index)
    }

    /// Locks implied by the current selection of every room.
    pub fn locked_rates(&self) -> LockedRateCounts {
        LockedRateCounts::from_selections(self.progress.selections.iter().map(|s| &s.entry))
    }

    pub fn occupancies(&self) -> &[OccupancyRequirement] {
        &self.occupancies
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }
}

/// A session shared between callers. Overrides are serialized by the lock.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<AllocationSession>>,
}

impl SharedSession {
    pub fn new(session: AllocationSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn override_selection(
        &self,
        index: usize,
        recommendation_id: &str,
        rate_id: &str,
    ) -> Result<Vec<RankedResult>, EngineError> {
        let mut session = self.inner.lock();
        session
            .override_selection(index, recommendation_id, rate_id)
            .map(<[RankedResult]>::to_vec)
    }

    pub fn selections(&self) -> Vec<Selection> {
        self.inner.lock().selections().to_vec()
    }

    pub fn results(&self) -> Vec<RankedResult> {
        self.inner.lock().results().to_vec()
    }
}
