// Allocation building: one priced allocation per recommendation for a single room

use serde::{Deserialize, Serialize};

use crate::{
    config::LockPolicy,
    error::EngineError,
    matcher::find_matching_slot,
    model::{Catalog, OccupancyRequirement, Recommendation},
    state::{ConsumedSlotTracker, LockedRateCounts, SlotKey},
};

/// A recommendation priced for one room. `total_price` covers the whole
/// recommendation; the ids describe the anchor rate position.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub recommendation_id: String,
    pub rate_id: String,
    pub room_id: String,
    pub std_room_id: String,
    pub total_price: f64,
}

impl AllocationEntry {
    /// `<recommendationId>-<rateId>`, the key presentation layers use.
    pub fn key(&self) -> String {
        format!("{}-{}", self.recommendation_id, self.rate_id)
    }

    pub fn is(&self, recommendation_id: &str, rate_id: &str) -> bool {
        self.recommendation_id == recommendation_id && self.rate_id == rate_id
    }
}

/// Walks the recommendation's rates in order. Every rate adds its price; the
/// first position with a free matching slot anchors the allocation and
/// consumes that slot. Returns None when no position matches.
pub fn evaluate_recommendation(
    occupancy: &OccupancyRequirement,
    recommendation: &Recommendation,
    catalog: &Catalog,
    tracker: &mut ConsumedSlotTracker,
) -> Option<AllocationEntry> {
    let mut total_price = 0.0;
    let mut anchor = None;

    for (position, rate_id) in recommendation.rates.iter().enumerate() {
        let Some(rate) = catalog.rate(rate_id) else {
            continue;
        };
        total_price += rate.final_rate;

        if anchor.is_some() {
            continue;
        }

        let key = SlotKey::new(&recommendation.id, rate_id, position);
        if let Some(found) = find_matching_slot(occupancy, &rate.occupancies, tracker.consumed(&key)) {
            anchor = Some((
                rate_id.clone(),
                found.slot.room_id.clone(),
                found.slot.std_room_id.clone(),
            ));
            tracker.consume(key, found.index);
        }
    }

    anchor.map(|(rate_id, room_id, std_room_id)| AllocationEntry {
        recommendation_id: recommendation.id.clone(),
        rate_id,
        room_id,
        std_room_id,
        total_price,
    })
}

/// Prices every recommendation the locks admit for one room, in catalog order.
/// Consumed slots are recorded in `tracker`. Any admitted recommendation that
/// cannot host the room fails the whole call.
pub fn build_allocations(
    occupancy: &OccupancyRequirement,
    catalog: &Catalog,
    locked: &LockedRateCounts,
    policy: LockPolicy,
    tracker: &mut ConsumedSlotTracker,
) -> Result<Vec<AllocationEntry>, EngineError> {
    occupancy.validate()?;

    let mut entries = Vec::with_capacity(catalog.recommendations.len());
    for recommendation in catalog.recommendations.values() {
        if !locked.admits(recommendation, policy) {
            continue;
        }

        match evaluate_recommendation(occupancy, recommendation, catalog, tracker) {
            Some(entry) => entries.push(entry),
            None => {
                return Err(EngineError::unsatisfiable(
                    occupancy,
                    Some(&recommendation.id),
                ))
            }
        }
    }

    Ok(entries)
}

/// Stand-alone form of `build_allocations` with its own empty tracker.
/// Calling it twice with the same arguments gives the same result.
pub fn allocate_occupancy(
    occupancy: &OccupancyRequirement,
    catalog: &Catalog,
    locked: &LockedRateCounts,
    policy: LockPolicy,
) -> Result<Vec<AllocationEntry>, EngineError> {
    let mut tracker = ConsumedSlotTracker::new();
    build_allocations(occupancy, catalog, locked, policy, &mut tracker)
}
