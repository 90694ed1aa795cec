// Engine configuration

use serde::{Deserialize, Serialize};

/// How rates locked by earlier rooms restrict the recommendations considered
/// for later rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    /// Every locked rate id must appear in the recommendation at least once.
    /// Lock counts are ignored.
    #[default]
    PresenceOnly,
    /// Every locked rate id must appear at least as many times as it is locked.
    Multiplicity,
}

/// Lifetime of the consumed-slot bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotConsumption {
    /// Slots consumed by one room stay consumed for the rest of the session.
    #[default]
    Session,
    /// Every room starts from an empty tracker.
    PerOccupancy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub lock_policy: LockPolicy,
    pub slot_consumption: SlotConsumption,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
