// Building domain model
use serde::{Deserialize, Serialize};

/// Identifier of a human reporter assigned to a building.
pub type ReporterId = i64;

/// Identifier of a monitored building.
pub type BuildingId = i64;

/// Identifier of a solar-inverter station.
pub type StationId = i64;

/// A solar/battery inverter installation associated with a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub battery_capacity_kwh: f64,
}

impl Station {
    pub fn new(id: StationId, battery_capacity_kwh: f64) -> Self {
        Self {
            id,
            battery_capacity_kwh,
        }
    }
}

/// A monitored building. One building maps to at most one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub station: Option<Station>,
}

impl Building {
    pub fn new(id: BuildingId, name: String, station: Option<Station>) -> Self {
        Self { id, name, station }
    }
}
