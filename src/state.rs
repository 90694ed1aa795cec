// State threaded from one room to the next: consumed slots and locked rates

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::{allocation::AllocationEntry, config::LockPolicy, model::Recommendation};

/// Identifies one rate position inside one recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub recommendation_id: String,
    pub rate_id: String,
    pub position: usize,
}

impl SlotKey {
    pub fn new(recommendation_id: &str, rate_id: &str, position: usize) -> Self {
        Self {
            recommendation_id: recommendation_id.to_string(),
            rate_id: rate_id.to_string(),
            position,
        }
    }
}

static NO_SLOTS: BTreeSet<usize> = BTreeSet::new();

/// Slot indexes already handed out, per rate position. A slot index is never
/// handed out twice for the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedSlotTracker {
    used: HashMap<SlotKey, BTreeSet<usize>>,
}

impl ConsumedSlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consumed(&self, key: &SlotKey) -> &BTreeSet<usize> {
        self.used.get(key).unwrap_or(&NO_SLOTS)
    }

    /// Returns false if the slot had already been consumed.
    pub fn consume(&mut self, key: SlotKey, slot_index: usize) -> bool {
        self.used.entry(key).or_default().insert(slot_index)
    }

    pub fn total_consumed(&self) -> usize {
        self.used.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_consumed() == 0
    }
}

/// Usage count per rate id, accumulated over rooms already decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LockedRateCounts {
    counts: BTreeMap<String, u32>,
}

impl LockedRateCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_selections<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a AllocationEntry>,
    {
        let mut locks = Self::new();
        for entry in entries {
            locks.lock(&entry.rate_id);
        }
        locks
    }

    pub fn lock(&mut self, rate_id: &str) -> u32 {
        let count = self.counts.entry(rate_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, rate_id: &str) -> u32 {
        self.counts.get(rate_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(id, count)| (id.as_str(), *count))
    }

    /// Whether a recommendation can still be considered given the locks.
    pub fn admits(&self, recommendation: &Recommendation, policy: LockPolicy) -> bool {
        match policy {
            LockPolicy::PresenceOnly => self
                .counts
                .keys()
                .all(|rate_id| recommendation.rates.contains(rate_id)),
            LockPolicy::Multiplicity => self
                .counts
                .iter()
                .all(|(rate_id, count)| recommendation.rate_count(rate_id) >= *count as usize),
        }
    }
}
