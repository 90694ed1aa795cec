// Room-rate allocation engine: prices recommendation bundles per room, ranks
// them by standardized room and selects the cheapest one room by room

pub mod allocation;
pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod model;
pub mod ranking;
pub mod session;
pub mod state;

// Re-export key types for convenience
pub use allocation::{allocate_occupancy, build_allocations, evaluate_recommendation, AllocationEntry};
pub use config::{EngineConfig, LockPolicy, SlotConsumption};
pub use document::{load_catalog, load_config, load_occupancies, parse_catalog, parse_occupancies, DocumentError};
pub use error::EngineError;
pub use matcher::{find_matching_slot, SlotMatch};
pub use model::{Catalog, OccupancyRequirement, OccupancySlot, Rate, Recommendation, StandardizedRoom};
pub use ranking::{rank_allocations, RankedResult, StdRoomGroup};
pub use session::{AllocationSession, Selection, SelectionSource, SharedSession};
pub use state::{ConsumedSlotTracker, LockedRateCounts, SlotKey};
