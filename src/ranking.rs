// Deterministic ranking of one room's allocations, grouped by standardized room

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::allocation::AllocationEntry;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StdRoomGroup {
    pub std_room_id: String,
    /// Ascending by total price.
    pub entries: Vec<AllocationEntry>,
}

impl StdRoomGroup {
    pub fn cheapest(&self) -> Option<&AllocationEntry> {
        self.entries.first()
    }
}

/// Allocations for one room. The first entry of the first group is always the
/// cheapest allocation overall.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RankedResult {
    groups: Vec<StdRoomGroup>,
}

impl RankedResult {
    pub fn groups(&self) -> &[StdRoomGroup] {
        &self.groups
    }

    pub fn cheapest(&self) -> Option<&AllocationEntry> {
        self.groups.first().and_then(StdRoomGroup::cheapest)
    }

    pub fn entries(&self) -> impl Iterator<Item = &AllocationEntry> {
        self.groups.iter().flat_map(|group| group.entries.iter())
    }

    pub fn find(&self, recommendation_id: &str, rate_id: &str) -> Option<&AllocationEntry> {
        self.entries()
            .find(|entry| entry.is(recommendation_id, rate_id))
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Groups by `std_room_id` (first-seen order), sorts each group by price and
/// then orders the groups by their price sequences. Both sorts are stable.
pub fn rank_allocations(entries: Vec<AllocationEntry>) -> RankedResult {
    let mut groups: Vec<StdRoomGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let position = *positions.entry(entry.std_room_id.clone()).or_insert_with(|| {
            groups.push(StdRoomGroup {
                std_room_id: entry.std_room_id.clone(),
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].entries.push(entry);
    }

    for group in groups.iter_mut() {
        group
            .entries
            .sort_by(|a, b| a.total_price.total_cmp(&b.total_price));
    }
    insertion_sort_by(&mut groups, |a, b| cmp_price_sequences(&a.entries, &b.entries));

    RankedResult { groups }
}

/// Element-wise price comparison; the first differing price decides. A
/// sequence that is a prefix of the other compares equal, so the two groups
/// keep their encounter order.
pub fn cmp_price_sequences(a: &[AllocationEntry], b: &[AllocationEntry]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_price.total_cmp(&y.total_price))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

// Stable and tolerant of comparators whose equality is not transitive, which
// prefix-equal price sequences are. Group counts are small.
fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
