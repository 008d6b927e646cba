// Instantaneous station state classification from the latest telemetry sample
use crate::domain::power::{ChargeSource, StationStatus};
use crate::domain::telemetry::TelemetrySample;
use crate::infrastructure::config::EngineConfig;

/// Classifies a station's current charge/discharge direction, charge source
/// and linear time-to-target estimates from its latest telemetry sample.
pub struct StationStatusClassifier;

impl StationStatusClassifier {
    /// `avg_consumption_w` is a rolling average of the consumption column;
    /// `is_offline_hint` comes from the caller's staleness/connection check.
    pub fn classify(
        latest: &TelemetrySample,
        battery_capacity_kwh: f64,
        avg_consumption_w: Option<f64>,
        is_offline_hint: bool,
        config: &EngineConfig,
    ) -> StationStatus {
        let is_discharging = latest.discharge_power > config.power_threshold_w;
        // charge_power is stored negative while charging.
        let is_charging = -latest.charge_power > config.power_threshold_w;

        let mut charge_source = None;
        let mut battery_charge_time = None;
        if is_charging && latest.charge_power != 0.0 {
            charge_source = Some(Self::classify_charge_source(latest));
            battery_charge_time = estimate_hours(
                battery_capacity_kwh,
                config.charge_target_soc - latest.battery_soc,
                latest.charge_power.abs() / 1000.0,
            )
            .map(format_hours_hhmm);
        }

        let mut battery_discharge_time = None;
        if is_discharging {
            if let Some(avg_w) = avg_consumption_w {
                if avg_w > 0.0 {
                    battery_discharge_time = estimate_hours(
                        battery_capacity_kwh,
                        latest.battery_soc - config.discharge_floor_soc,
                        avg_w / 1000.0,
                    )
                    .map(format_hours_hhmm);
                }
            }
        }

        StationStatus {
            is_charging,
            is_discharging,
            is_offline: is_offline_hint,
            battery_percent: latest.battery_soc,
            consumption_power: latest.consumption_power,
            charge_source,
            battery_charge_time,
            battery_discharge_time,
        }
    }

    fn classify_charge_source(latest: &TelemetrySample) -> ChargeSource {
        if latest.is_islanded_generation() {
            ChargeSource::Generator
        } else if latest.is_idle_input() {
            ChargeSource::Recuperation
        } else {
            ChargeSource::Grid
        }
    }
}

/// Linear hours to move `soc_delta` percentage points of `capacity_kwh` at
/// `rate_kw`. `None` when the rate is unusable or the target is already
/// reached, so a zero rate can never surface as infinity or NaN.
fn estimate_hours(capacity_kwh: f64, soc_delta: f64, rate_kw: f64) -> Option<f64> {
    if rate_kw <= 0.0 {
        return None;
    }
    let hours = capacity_kwh * soc_delta / 100.0 / rate_kw;
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    Some(hours)
}

/// Zero-padded `HH:MM`; minutes are the floor of the fractional hour.
fn format_hours_hhmm(hours: f64) -> String {
    let whole_hours = hours.trunc() as i64;
    let minutes = (hours.fract() * 60.0).floor() as i64;
    format!("{whole_hours:02}:{minutes:02}")
}
