// Derived power-state domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A maximal time interval during which the aggregate grid-available state
/// of a building did not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_available: bool,
    pub duration_seconds: i64,
}

impl AvailabilityPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, is_available: bool) -> Self {
        Self {
            start,
            end,
            is_available,
            duration_seconds: (end - start).num_seconds(),
        }
    }
}

/// Historical availability log for one building over a query window.
///
/// Invariant: the periods tile the window exactly, so
/// `total_available_seconds + total_unavailable_seconds == total_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLog {
    pub periods: Vec<AvailabilityPeriod>,
    pub total_available_seconds: i64,
    pub total_unavailable_seconds: i64,
    pub total_generator_seconds: i64,
    pub total_seconds: i64,
}

/// The energy origin inferred to be currently charging the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeSource {
    Grid,
    Generator,
    Recuperation,
}

/// Instantaneous station state derived from the latest telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStatus {
    pub is_charging: bool,
    pub is_discharging: bool,
    pub is_offline: bool,
    pub battery_percent: f64,
    pub consumption_power: f64,
    /// Set only while charging.
    pub charge_source: Option<ChargeSource>,
    /// Zero-padded `HH:MM` until the charge target; `None` when no usable
    /// rate is available.
    pub battery_charge_time: Option<String>,
    /// Zero-padded `HH:MM` until the discharge floor; `None` when no usable
    /// rate is available.
    pub battery_discharge_time: Option<String>,
}

/// Current power picture for one building, recomputed on every request.
///
/// The station block is `None` when the building has no associated station
/// or the station has produced no telemetry yet, so a missing signal can
/// never be mistaken for a populated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingPowerSummary {
    pub is_grid_available: bool,
    pub grid_availability_pct: u8,
    pub has_mixed_reporter_states: bool,
    pub station: Option<StationStatus>,
}
