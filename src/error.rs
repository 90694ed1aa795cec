// Error types shared by the allocation engine and its session driver

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid occupancy: {0}")]
    InvalidOccupancy(String),

    // `recommendation_id` is None when rate locks left nothing to evaluate
    #[error("Unsatisfiable occupancy {occupancy}{}", unsatisfied_by(.recommendation_id))]
    UnsatisfiableOccupancy {
        occupancy: String,
        recommendation_id: Option<String>,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

fn unsatisfied_by(recommendation_id: &Option<String>) -> String {
    match recommendation_id {
        Some(id) => format!(": recommendation {id} has no matching room"),
        None => ": no recommendation is eligible under the current rate locks".to_string(),
    }
}

impl EngineError {
    pub(crate) fn unsatisfiable(
        occupancy: &crate::model::OccupancyRequirement,
        recommendation_id: Option<&str>,
    ) -> Self {
        EngineError::UnsatisfiableOccupancy {
            occupancy: occupancy.to_string(),
            recommendation_id: recommendation_id.map(str::to_string),
        }
    }
}
