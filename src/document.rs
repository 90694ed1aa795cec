// Loading catalog, occupancy and config documents.
// A catalog is either a bare record or wrapped in the room-rate hub response
// envelope (`results[0].data[0].roomRate[0]`).

use std::{fs, path::Path};

use serde_json::Value;
use thiserror::Error;

use crate::{
    config::EngineConfig,
    error::EngineError,
    model::{validate_occupancies, Catalog, OccupancyRequirement},
};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

const HUB_CATALOG_POINTER: &str = "/results/0/data/0/roomRate/0";

pub fn parse_catalog(json: &str) -> Result<Catalog, DocumentError> {
    catalog_from_value(serde_json::from_str(json)?)
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, DocumentError> {
    parse_catalog(&fs::read_to_string(path)?)
}

pub fn catalog_from_value(mut value: Value) -> Result<Catalog, DocumentError> {
    if !value.is_object() {
        return Err(EngineError::InvalidCatalog("catalog must be a JSON object".to_string()).into());
    }
    if value.get("rates").is_none() {
        if let Some(inner) = value.pointer_mut(HUB_CATALOG_POINTER).map(Value::take) {
            value = inner;
        }
    }

    for section in ["rates", "recommendations"] {
        if !value.get(section).is_some_and(Value::is_object) {
            return Err(EngineError::InvalidCatalog(format!(
                "`{section}` must be present and be an object"
            ))
            .into());
        }
    }

    let mut catalog: Catalog = serde_json::from_value(value)?;
    catalog.fill_missing_ids();
    Ok(catalog)
}

pub fn parse_occupancies(json: &str) -> Result<Vec<OccupancyRequirement>, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(
            EngineError::InvalidOccupancy("occupancy document must be an array".to_string()).into(),
        );
    }

    let occupancies: Vec<OccupancyRequirement> = serde_json::from_value(value)?;
    validate_occupancies(&occupancies)?;
    Ok(occupancies)
}

pub fn load_occupancies(path: impl AsRef<Path>) -> Result<Vec<OccupancyRequirement>, DocumentError> {
    parse_occupancies(&fs::read_to_string(path)?)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, DocumentError> {
    Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?)
}

// Sample documents shipped with the crate
pub const SAMPLE_CATALOG_PATH: &str = "samples/combo_rates.json";
pub const SAMPLE_HUB_RESPONSE_PATH: &str = "samples/hub_response.json";
pub const SAMPLE_OCCUPANCY_PATH: &str = "samples/occupancy.json";
