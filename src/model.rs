// Catalog and occupancy value types.
// Field names follow the room-rate documents (camelCase); numbers are accepted
// either as JSON numbers or numeric strings, see `lenient`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// The guest mix one room booking has to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyRequirement {
    #[serde(deserialize_with = "lenient::count")]
    pub num_of_adults: u32,
    // Order is irrelevant, duplicates are not
    #[serde(default, deserialize_with = "lenient::ages")]
    pub child_ages: Vec<u32>,
}

impl OccupancyRequirement {
    pub fn new(num_of_adults: u32, child_ages: Vec<u32>) -> Self {
        Self {
            num_of_adults,
            child_ages,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.num_of_adults == 0 {
            return Err(EngineError::InvalidOccupancy(format!(
                "at least one adult is required, got {self}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for OccupancyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.num_of_adults == 1 { "adult" } else { "adults" };
        write!(f, "{} {}", self.num_of_adults, noun)?;
        if !self.child_ages.is_empty() {
            write!(f, ", children aged {:?}", self.child_ages)?;
        }
        Ok(())
    }
}

/// Checks a whole occupancy list before any engine work starts.
pub fn validate_occupancies(occupancies: &[OccupancyRequirement]) -> Result<(), EngineError> {
    if occupancies.is_empty() {
        return Err(EngineError::InvalidOccupancy(
            "occupancy list must contain at least one room".to_string(),
        ));
    }
    for (index, occupancy) in occupancies.iter().enumerate() {
        if let Err(EngineError::InvalidOccupancy(reason)) = occupancy.validate() {
            return Err(EngineError::InvalidOccupancy(format!("room {index}: {reason}")));
        }
    }
    Ok(())
}

/// One guest-mix option advertised by a rate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySlot {
    // Unreadable counts become 0, which no valid occupancy matches
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub num_of_adults: u32,
    #[serde(
        default,
        deserialize_with = "lenient::optional_ages",
        skip_serializing_if = "Option::is_none"
    )]
    pub child_ages: Option<Vec<u32>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub num_of_children: Option<u32>,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub std_room_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::price")]
    pub final_rate: f64,
    #[serde(default)]
    pub occupancies: Vec<OccupancySlot>,
}

/// An ordered bundle of rate ids. Position matters: it keys slot consumption
/// and decides which rate anchors the reported room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub rates: Vec<String>,
}

impl Recommendation {
    pub fn rate_count(&self, rate_id: &str) -> usize {
        self.rates.iter().filter(|id| id.as_str() == rate_id).count()
    }
}

/// Descriptive data for a standardized room. Never read by the engine, so any
/// shape is accepted: a missing or non-string name is empty and a missing or
/// non-array list is empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct StandardizedRoom {
    pub name: String,
    pub images: Vec<Value>,
    pub facilities: Vec<Value>,
}

impl From<Value> for StandardizedRoom {
    fn from(mut value: Value) -> Self {
        let mut list = |field: &str| match value.get_mut(field).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let images = list("images");
        let facilities = list("facilities");

        Self {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            images,
            facilities,
        }
    }
}

/// A parsed room-rate document. Maps keep document order: recommendations are
/// evaluated in the order the document lists them, which decides price ties.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub rates: IndexMap<String, Rate>,
    pub recommendations: IndexMap<String, Recommendation>,
    #[serde(default)]
    pub standardized_rooms: IndexMap<String, StandardizedRoom>,
    #[serde(default)]
    pub rooms: IndexMap<String, Value>,
}

impl Catalog {
    pub fn rate(&self, rate_id: &str) -> Option<&Rate> {
        self.rates.get(rate_id)
    }

    pub fn standardized_room(&self, std_room_id: &str) -> Option<&StandardizedRoom> {
        self.standardized_rooms.get(std_room_id)
    }

    /// Documents often omit the `id` inside a record and rely on the map key.
    pub fn fill_missing_ids(&mut self) {
        for (key, rate) in self.rates.iter_mut() {
            if rate.id.is_empty() {
                rate.id = key.clone();
            }
        }
        for (key, recommendation) in self.recommendations.iter_mut() {
            if recommendation.id.is_empty() {
                recommendation.id = key.clone();
            }
        }
    }

    pub fn add_rate(&mut self, rate: Rate) {
        self.rates.insert(rate.id.clone(), rate);
    }

    pub fn add_recommendation(&mut self, recommendation: Recommendation) {
        self.recommendations
            .insert(recommendation.id.clone(), recommendation);
    }
}

/// Numeric coercion at the document boundary.
pub(crate) mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Int(u64),
        Float(f64),
        Text(String),
    }

    impl NumberLike {
        fn as_f64(&self) -> Option<f64> {
            match self {
                NumberLike::Int(n) => Some(*n as f64),
                NumberLike::Float(f) => Some(*f),
                NumberLike::Text(s) => s.trim().parse::<f64>().ok(),
            }
        }

        fn as_u32(&self) -> Option<u32> {
            match self {
                NumberLike::Int(n) => u32::try_from(*n).ok(),
                _ => self.as_f64().and_then(|f| {
                    let whole = f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64;
                    whole.then_some(f as u32)
                }),
            }
        }
    }

    fn to_u32<E: Error>(value: NumberLike) -> Result<u32, E> {
        value
            .as_u32()
            .ok_or_else(|| E::custom("expected a non-negative whole number"))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        to_u32(NumberLike::deserialize(d)?)
    }

    pub fn count_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(d)?;
        Ok(value
            .and_then(|v| NumberLike::deserialize(v).ok())
            .and_then(|n| n.as_u32())
            .unwrap_or(0))
    }

    pub fn optional_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Option::<NumberLike>::deserialize(d)?.map(to_u32).transpose()
    }

    pub fn ages<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u32>, D::Error> {
        Ok(optional_ages(d)?.unwrap_or_default())
    }

    pub fn optional_ages<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u32>>, D::Error> {
        Option::<Vec<NumberLike>>::deserialize(d)?
            .map(|ages| ages.into_iter().map(to_u32).collect::<Result<Vec<_>, _>>())
            .transpose()
    }

    // A missing or null price counts as zero
    pub fn price<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Option::<NumberLike>::deserialize(d)? {
            None => Ok(0.0),
            Some(value) => value
                .as_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| D::Error::custom("expected a numeric price")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_accepts_numeric_strings() {
        let occ: OccupancyRequirement =
            serde_json::from_str(r#"{"numOfAdults": "2", "childAges": ["5", 7]}"#).unwrap();
        assert_eq!(occ, OccupancyRequirement::new(2, vec![5, 7]));

        let occ: OccupancyRequirement = serde_json::from_str(r#"{"numOfAdults": 1}"#).unwrap();
        assert!(occ.child_ages.is_empty());
    }

    #[test]
    fn test_negative_counts_are_rejected() {
        let res = serde_json::from_str::<OccupancyRequirement>(r#"{"numOfAdults": -1}"#);
        assert!(res.is_err());
        let res = serde_json::from_str::<OccupancyRequirement>(r#"{"numOfAdults": "two"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_slot_keeps_absent_child_ages_distinct_from_empty() {
        let slot: OccupancySlot = serde_json::from_str(
            r#"{"numOfAdults": 2, "numOfChildren": 0, "roomId": "r1", "stdRoomId": "s1"}"#,
        )
        .unwrap();
        assert_eq!(slot.child_ages, None);
        assert_eq!(slot.num_of_children, Some(0));

        let slot: OccupancySlot =
            serde_json::from_str(r#"{"numOfAdults": 2, "childAges": []}"#).unwrap();
        assert_eq!(slot.child_ages, Some(vec![]));
        assert_eq!(slot.num_of_children, None);
    }

    #[test]
    fn test_rate_price_coercion() {
        let rate: Rate = serde_json::from_str(r#"{"id": "A", "finalRate": "120.50"}"#).unwrap();
        assert_eq!(rate.final_rate, 120.5);

        let rate: Rate = serde_json::from_str(r#"{"id": "A", "finalRate": null}"#).unwrap();
        assert_eq!(rate.final_rate, 0.0);

        let rate: Rate = serde_json::from_str(r#"{"id": "A"}"#).unwrap();
        assert_eq!(rate.final_rate, 0.0);
        assert!(rate.occupancies.is_empty());
    }

    #[test]
    fn test_validate_occupancies() {
        assert!(matches!(
            validate_occupancies(&[]),
            Err(EngineError::InvalidOccupancy(_))
        ));

        let list = vec![
            OccupancyRequirement::new(2, vec![]),
            OccupancyRequirement::new(0, vec![4]),
        ];
        match validate_occupancies(&list) {
            Err(EngineError::InvalidOccupancy(msg)) => assert!(msg.starts_with("room 1")),
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(validate_occupancies(&list[..1]).is_ok());
    }

    #[test]
    fn test_fill_missing_ids_from_keys() {
        let mut catalog: Catalog = serde_json::from_str(
            r#"{
                "rates": {"A": {"finalRate": 10}},
                "recommendations": {"R1": {"rates": ["A"]}}
            }"#,
        )
        .unwrap();
        catalog.fill_missing_ids();
        assert_eq!(catalog.rates["A"].id, "A");
        assert_eq!(catalog.recommendations["R1"].id, "R1");
        assert_eq!(catalog.recommendations["R1"].rate_count("A"), 1);
    }

    #[test]
    fn test_unreadable_slot_adults_never_match() {
        for json in [
            r#"{"childAges": []}"#,
            r#"{"numOfAdults": null, "childAges": []}"#,
            r#"{"numOfAdults": 2.5, "childAges": []}"#,
            r#"{"numOfAdults": "many", "childAges": []}"#,
            r#"{"numOfAdults": {"min": 1}, "childAges": []}"#,
        ] {
            let slot: OccupancySlot = serde_json::from_str(json).unwrap();
            assert_eq!(slot.num_of_adults, 0, "{json}");
        }

        let slot: OccupancySlot = serde_json::from_str(r#"{"numOfAdults": "3"}"#).unwrap();
        assert_eq!(slot.num_of_adults, 3);
    }

    #[test]
    fn test_standardized_room_metadata_is_tolerant() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "rates": {},
                "recommendations": {},
                "standardizedRooms": {
                    "s1": {"name": null, "images": null},
                    "s2": {"name": 42, "images": "none", "facilities": ["Wifi"]},
                    "s3": "Double Room",
                    "s4": {"name": "Suite", "images": [{"url": "a.jpg"}]}
                }
            }"#,
        )
        .unwrap();

        let s1 = catalog.standardized_room("s1").unwrap();
        assert_eq!(s1.name, "");
        assert!(s1.images.is_empty());
        assert!(s1.facilities.is_empty());

        let s2 = catalog.standardized_room("s2").unwrap();
        assert_eq!(s2.name, "");
        assert!(s2.images.is_empty());
        assert_eq!(s2.facilities, vec![Value::from("Wifi")]);

        assert_eq!(catalog.standardized_room("s3").unwrap(), &StandardizedRoom::default());

        let s4 = catalog.standardized_room("s4").unwrap();
        assert_eq!(s4.name, "Suite");
        assert_eq!(s4.images.len(), 1);
    }

    #[test]
    fn test_catalog_keeps_document_order() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "rates": {"Z": {"finalRate": 1}, "A": {"finalRate": 2}},
                "recommendations": {
                    "rec-c": {"rates": ["Z"]},
                    "rec-a": {"rates": ["A"]},
                    "rec-b": {"rates": ["Z"]}
                }
            }"#,
        )
        .unwrap();

        let rates: Vec<&str> = catalog.rates.keys().map(String::as_str).collect();
        assert_eq!(rates, vec!["Z", "A"]);
        let recommendations: Vec<&str> = catalog.recommendations.keys().map(String::as_str).collect();
        assert_eq!(recommendations, vec!["rec-c", "rec-a", "rec-b"]);
    }
}
