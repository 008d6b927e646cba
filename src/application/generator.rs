// Generator overlap estimation over an ordered telemetry sequence
use crate::domain::telemetry::TelemetrySample;
use crate::infrastructure::config::EngineConfig;

/// Sums the time a building spent charging its battery from a backup
/// generator rather than grid or solar.
///
/// Each sample classifies only the interval that follows it, so the last
/// sample never contributes a duration by itself.
pub struct GeneratorOverlapEstimator;

impl GeneratorOverlapEstimator {
    /// Accumulated generator-charging seconds for `samples` (ascending by
    /// timestamp). Fewer than two samples carry no interval information.
    pub fn estimate(samples: &[TelemetrySample], config: &EngineConfig) -> i64 {
        samples
            .windows(2)
            .filter(|pair| Self::is_generator_charging(&pair[0], config))
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
            .sum()
    }

    fn is_generator_charging(sample: &TelemetrySample, config: &EngineConfig) -> bool {
        sample.charge_power.abs() > config.power_threshold_w && sample.is_islanded_generation()
    }
}
