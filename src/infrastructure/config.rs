// Engine configuration - classification thresholds and fan-out limits
use serde::Deserialize;

/// Tunable thresholds for the inference engine. Defaults match the values
/// the classification rules were calibrated with; a deployment can override
/// them through an optional `config/engine` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum |power| in watts before a sample counts as charging or
    /// discharging.
    pub power_threshold_w: f64,
    /// Charge-time estimates aim at this state of charge, percent.
    pub charge_target_soc: f64,
    /// Discharge-time estimates aim at this state of charge, percent.
    pub discharge_floor_soc: f64,
    /// Window for the rolling consumption average, minutes.
    pub averaging_window_minutes: i64,
    /// Latest telemetry older than this counts as offline, minutes.
    pub telemetry_stale_after_minutes: i64,
    /// Concurrency limit when summarizing many buildings at once.
    pub summary_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            power_threshold_w: 200.0,
            charge_target_soc: 97.0,
            discharge_floor_soc: 10.0,
            averaging_window_minutes: 25,
            telemetry_stale_after_minutes: 10,
            summary_concurrency: 8,
        }
    }
}

pub fn load_engine_config() -> anyhow::Result<EngineConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/engine").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}
