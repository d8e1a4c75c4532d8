use crate::error::{AutocareError, AutocareResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Drive type of a vehicle; selects which sensor thresholds apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Powertrain {
    /// Internal combustion engine.
    Ice,
    /// Battery electric.
    Ev,
}

impl std::fmt::Display for Powertrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Powertrain::Ice => write!(f, "ICE"),
            Powertrain::Ev => write!(f, "EV"),
        }
    }
}

/// One vehicle with its latest sensor readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Fleet identifier, e.g. `VEH001`.
    pub vehicle_id: String,
    /// Serialized as `type` (`ICE` or `EV`).
    #[serde(rename = "type")]
    pub powertrain: Powertrain,
    /// Make and model, e.g. `Maruti Swift`.
    pub model: String,
    /// Model year.
    pub year: u16,
    /// Owner name as used in outreach scripts.
    pub owner: String,
    /// Owner contact number.
    pub phone: String,
    /// Sensor name to latest reading (e.g. `engine_temp`, `battery_soh`).
    #[serde(default)]
    pub sensor_data: BTreeMap<String, f64>,
}

/// Read-only access to vehicle records.
pub trait VehicleSource: Send + Sync {
    /// Record for `vehicle_id`, if known.
    fn get(&self, vehicle_id: &str) -> Option<VehicleRecord>;

    /// Every record, ordered by vehicle id.
    fn list_all(&self) -> Vec<VehicleRecord>;

    /// Like [`VehicleSource::get`] but reports a missing vehicle as an error.
    fn require(&self, vehicle_id: &str) -> AutocareResult<VehicleRecord> {
        self.get(vehicle_id)
            .ok_or_else(|| AutocareError::VehicleNotFound(vehicle_id.to_string()))
    }
}

/// In-memory fleet keyed by vehicle id. Contents reset on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFleet {
    vehicles: BTreeMap<String, VehicleRecord>,
}

impl InMemoryFleet {
    /// Empty fleet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records; a repeated id keeps the last record.
    pub fn from_records(records: impl IntoIterator<Item = VehicleRecord>) -> Self {
        let vehicles = records
            .into_iter()
            .map(|v| (v.vehicle_id.clone(), v))
            .collect();
        Self { vehicles }
    }

    /// Parse a JSON array of vehicle records.
    pub fn from_json_str(json: &str) -> AutocareResult<Self> {
        let records: Vec<VehicleRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Load a JSON array of vehicle records from disk.
    pub fn load(path: impl AsRef<Path>) -> AutocareResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AutocareError::Config(format!(
                "Failed to read fleet file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// `true` when no vehicle is loaded.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl VehicleSource for InMemoryFleet {
    fn get(&self, vehicle_id: &str) -> Option<VehicleRecord> {
        self.vehicles.get(vehicle_id).cloned()
    }

    fn list_all(&self) -> Vec<VehicleRecord> {
        self.vehicles.values().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const FLEET: &str = r#"[
        {
            "vehicle_id": "VEH002",
            "type": "EV",
            "model": "Tata Nexon EV",
            "year": 2022,
            "owner": "Ms. Priya Patel",
            "phone": "9123456789",
            "sensor_data": {"battery_soh": 72, "battery_temp": 58}
        },
        {
            "vehicle_id": "VEH001",
            "type": "ICE",
            "model": "Maruti Swift",
            "year": 2020,
            "owner": "Mr. Rajesh Sharma",
            "phone": "9876543210",
            "sensor_data": {"engine_temp": 92, "oil_pressure": 35}
        }
    ]"#;

    #[test]
    fn test_parse_fleet() {
        let fleet = InMemoryFleet::from_json_str(FLEET).unwrap();
        assert_eq!(fleet.len(), 2);
        let swift = fleet.get("VEH001").unwrap();
        assert_eq!(swift.powertrain, Powertrain::Ice);
        assert_eq!(swift.sensor_data["oil_pressure"], 35.0);
    }

    #[test]
    fn test_list_all_sorted_by_id() {
        let fleet = InMemoryFleet::from_json_str(FLEET).unwrap();
        let ids: Vec<String> = fleet.list_all().into_iter().map(|v| v.vehicle_id).collect();
        assert_eq!(ids, vec!["VEH001", "VEH002"]);
    }

    #[test]
    fn test_missing_vehicle() {
        let fleet = InMemoryFleet::new();
        assert!(fleet.is_empty());
        assert!(fleet.get("VEH404").is_none());
        let err = fleet.require("VEH404").unwrap_err();
        assert!(matches!(err, AutocareError::VehicleNotFound(ref id) if id == "VEH404"));
    }

    #[test]
    fn test_powertrain_wire_names() {
        assert_eq!(serde_json::to_string(&Powertrain::Ev).unwrap(), "\"EV\"");
        assert_eq!(Powertrain::Ice.to_string(), "ICE");
    }

    #[test]
    fn test_invalid_fleet_json() {
        assert!(InMemoryFleet::from_json_str("{\"vehicles\": 3}").is_err());
    }
}
