// Station telemetry domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One poll of a station's inverter.
///
/// All power fields are in watts. `charge_power` is stored negative while
/// the battery is charging; `discharge_power`, `generation_power`,
/// `wire_power` and `consumption_power` are non-negative magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    /// Battery state of charge, percent.
    pub battery_soc: f64,
    pub charge_power: f64,
    pub discharge_power: f64,
    pub generation_power: f64,
    pub wire_power: f64,
    pub consumption_power: f64,
}

impl TelemetrySample {
    pub fn new(
        timestamp: DateTime<Utc>,
        battery_soc: f64,
        charge_power: f64,
        discharge_power: f64,
        generation_power: f64,
        wire_power: f64,
        consumption_power: f64,
    ) -> Self {
        Self {
            timestamp,
            battery_soc,
            charge_power,
            discharge_power,
            generation_power,
            wire_power,
            consumption_power,
        }
    }

    /// True when the battery input comes from somewhere other than the wire:
    /// generation reports output while the grid connection carries nothing.
    pub fn is_islanded_generation(&self) -> bool {
        self.generation_power > 0.0 && self.wire_power == 0.0
    }

    /// True when neither the wire nor generation is feeding the battery.
    pub fn is_idle_input(&self) -> bool {
        self.generation_power == 0.0 && self.wire_power == 0.0
    }
}
