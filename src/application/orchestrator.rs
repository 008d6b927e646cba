// Power inference orchestration - pulls rows through the repository and
// composes the timeline, generator and status algorithms
use crate::application::generator::GeneratorOverlapEstimator;
use crate::application::power_repository::{AverageColumn, PowerDataRepository};
use crate::application::status::StationStatusClassifier;
use crate::application::timeline::{AvailabilityTimelineReconstructor, ReporterSnapshot};
use crate::domain::building::{Building, BuildingId, ReporterId};
use crate::domain::observation::ReporterObservation;
use crate::domain::power::{BuildingPowerSummary, PowerLog};
use crate::error::EngineError;
use crate::infrastructure::config::EngineConfig;
use chrono::{DateTime, Duration, Utc};
use futures::future;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct PowerInferenceOrchestrator {
    repository: Arc<dyn PowerDataRepository>,
    config: EngineConfig,
}

impl PowerInferenceOrchestrator {
    pub fn new(repository: Arc<dyn PowerDataRepository>, config: EngineConfig) -> Self {
        Self { repository, config }
    }

    /// Historical availability log for `[start, end)`.
    ///
    /// Returns `Ok(None)` when the building has no reporters assigned: with
    /// no signal source there is no timeline to reconstruct. Generator
    /// seconds stay zero for buildings without a station.
    pub async fn get_power_log(
        &self,
        building: &Building,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<PowerLog>, EngineError> {
        if start >= end {
            return Err(EngineError::InvalidRange { start, end });
        }

        let reporters = self
            .repository
            .get_reporters_for_building(building.id)
            .await?;
        if reporters.is_empty() {
            tracing::debug!(building_id = building.id, "no reporters assigned, skipping power log");
            return Ok(None);
        }

        // Per-reporter range and last-before lookups are independent; issue
        // them concurrently and join before reconstructing.
        let fetches = reporters.iter().map(|reporter_id| {
            let repository = Arc::clone(&self.repository);
            let reporter_id = *reporter_id;
            async move {
                let in_range = repository
                    .get_observations_in_range(reporter_id, start, end)
                    .await?;
                let last_before = repository
                    .get_last_observation_before(reporter_id, start)
                    .await?;
                anyhow::Ok((reporter_id, in_range, last_before))
            }
        });
        let rows = future::try_join_all(fetches).await?;

        let mut observations_by_reporter: HashMap<ReporterId, Vec<ReporterObservation>> =
            HashMap::new();
        let mut last_known_before_start: HashMap<ReporterId, bool> = HashMap::new();
        for (reporter_id, in_range, last_before) in rows {
            observations_by_reporter.insert(reporter_id, in_range);
            if let Some(observation) = last_before {
                last_known_before_start.insert(reporter_id, observation.grid_available);
            }
        }

        let timeline = AvailabilityTimelineReconstructor::reconstruct(
            start,
            end,
            &reporters,
            &observations_by_reporter,
            &last_known_before_start,
        )?;

        let total_generator_seconds = match &building.station {
            Some(station) => {
                let samples = self
                    .repository
                    .get_telemetry_in_range(station.id, start, end)
                    .await?;
                GeneratorOverlapEstimator::estimate(&samples, &self.config)
            }
            None => 0,
        };

        Ok(Some(PowerLog {
            periods: timeline.periods,
            total_available_seconds: timeline.total_available_seconds,
            total_unavailable_seconds: timeline.total_unavailable_seconds,
            total_generator_seconds,
            total_seconds: (end - start).num_seconds(),
        }))
    }

    /// Live power picture for one building at `now`.
    ///
    /// Grid fields come from each reporter's most recent observation with
    /// unbounded lookback. The station block is `None` when the building has
    /// no station or the station has never reported telemetry.
    pub async fn get_building_summary(
        &self,
        building: &Building,
        now: DateTime<Utc>,
    ) -> Result<BuildingPowerSummary, EngineError> {
        let reporters = self
            .repository
            .get_reporters_for_building(building.id)
            .await?;

        let fetches = reporters.iter().map(|reporter_id| {
            let repository = Arc::clone(&self.repository);
            let reporter_id = *reporter_id;
            async move { repository.get_latest_observation(reporter_id).await }
        });
        let latest_observations = future::try_join_all(fetches).await?;
        let states: Vec<bool> = latest_observations
            .iter()
            .map(|observation| {
                observation
                    .as_ref()
                    .map(|o| o.grid_available)
                    .unwrap_or(false)
            })
            .collect();
        let snapshot = ReporterSnapshot::from_states(&states);

        let station_status = match &building.station {
            Some(station) => match self.repository.get_latest_telemetry(station.id).await? {
                Some(latest) => {
                    let window_start =
                        now - Duration::minutes(self.config.averaging_window_minutes);
                    let avg_consumption_w = self
                        .repository
                        .get_average_column(
                            station.id,
                            AverageColumn::ConsumptionPower,
                            window_start,
                            now,
                        )
                        .await?;
                    let stale_after =
                        Duration::minutes(self.config.telemetry_stale_after_minutes);
                    let is_offline_hint = now - latest.timestamp > stale_after;
                    Some(StationStatusClassifier::classify(
                        &latest,
                        station.battery_capacity_kwh,
                        avg_consumption_w,
                        is_offline_hint,
                        &self.config,
                    ))
                }
                None => None,
            },
            None => None,
        };

        Ok(BuildingPowerSummary {
            is_grid_available: snapshot.is_grid_available,
            grid_availability_pct: snapshot.grid_availability_pct,
            has_mixed_reporter_states: snapshot.has_mixed_reporter_states,
            station: station_status,
        })
    }

    /// Summaries for many buildings, fanned out with bounded concurrency.
    ///
    /// Each building yields its own result so one failed fetch cannot abort
    /// its siblings. Results are returned as they complete.
    pub async fn summarize_buildings(
        &self,
        buildings: &[Building],
        now: DateTime<Utc>,
    ) -> Vec<(BuildingId, Result<BuildingPowerSummary, EngineError>)> {
        stream::iter(buildings)
            .map(|building| async move {
                let result = self.get_building_summary(building, now).await;
                if let Err(error) = &result {
                    tracing::warn!(building_id = building.id, %error, "building summary failed");
                }
                (building.id, result)
            })
            .buffer_unordered(self.config.summary_concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::building::{Station, StationId};
    use crate::domain::power::ChargeSource;
    use crate::domain::telemetry::TelemetrySample;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;

    #[derive(Default)]
    struct FakeRepository {
        reporters: HashMap<BuildingId, Vec<ReporterId>>,
        observations: HashMap<ReporterId, Vec<ReporterObservation>>,
        telemetry: HashMap<StationId, Vec<TelemetrySample>>,
        averages: HashMap<StationId, f64>,
        fail_building: Option<BuildingId>,
    }

    #[async_trait]
    impl PowerDataRepository for FakeRepository {
        async fn get_reporters_for_building(
            &self,
            building_id: BuildingId,
        ) -> anyhow::Result<Vec<ReporterId>> {
            if self.fail_building == Some(building_id) {
                return Err(anyhow!("connection lost"));
            }
            Ok(self.reporters.get(&building_id).cloned().unwrap_or_default())
        }

        async fn get_observations_in_range(
            &self,
            reporter_id: ReporterId,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<ReporterObservation>> {
            Ok(self
                .observations
                .get(&reporter_id)
                .map(|rows| {
                    rows.iter()
                        .filter(|o| o.timestamp >= start && o.timestamp < end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn get_last_observation_before(
            &self,
            reporter_id: ReporterId,
            before: DateTime<Utc>,
        ) -> anyhow::Result<Option<ReporterObservation>> {
            Ok(self.observations.get(&reporter_id).and_then(|rows| {
                rows.iter()
                    .filter(|o| o.timestamp < before)
                    .max_by_key(|o| o.timestamp)
                    .cloned()
            }))
        }

        async fn get_latest_observation(
            &self,
            reporter_id: ReporterId,
        ) -> anyhow::Result<Option<ReporterObservation>> {
            Ok(self
                .observations
                .get(&reporter_id)
                .and_then(|rows| rows.iter().max_by_key(|o| o.timestamp).cloned()))
        }

        async fn get_telemetry_in_range(
            &self,
            station_id: StationId,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<TelemetrySample>> {
            Ok(self
                .telemetry
                .get(&station_id)
                .map(|rows| {
                    rows.iter()
                        .filter(|s| s.timestamp >= start && s.timestamp < end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn get_latest_telemetry(
            &self,
            station_id: StationId,
        ) -> anyhow::Result<Option<TelemetrySample>> {
            Ok(self
                .telemetry
                .get(&station_id)
                .and_then(|rows| rows.last().cloned()))
        }

        async fn get_average_column(
            &self,
            station_id: StationId,
            _column: AverageColumn,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<Option<f64>> {
            Ok(self.averages.get(&station_id).copied())
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    fn idle_sample(timestamp: DateTime<Utc>) -> TelemetrySample {
        TelemetrySample::new(timestamp, 50.0, 0.0, 0.0, 0.0, 1200.0, 900.0)
    }

    fn generator_sample(timestamp: DateTime<Utc>) -> TelemetrySample {
        TelemetrySample::new(timestamp, 50.0, -400.0, 0.0, 300.0, 0.0, 900.0)
    }

    fn building_with_station(id: BuildingId, station_id: StationId) -> Building {
        Building::new(
            id,
            format!("Building {id}"),
            Some(Station::new(station_id, 10.0)),
        )
    }

    fn orchestrator(repository: FakeRepository) -> PowerInferenceOrchestrator {
        PowerInferenceOrchestrator::new(Arc::new(repository), EngineConfig::default())
    }

    #[tokio::test]
    async fn power_log_assembles_timeline_and_generator_overlap() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10, 11])]),
            observations: HashMap::from([
                (
                    10,
                    vec![
                        ReporterObservation::new(10, at(9, 0), true),
                        ReporterObservation::new(10, at(10, 30), false),
                    ],
                ),
                (
                    11,
                    vec![
                        ReporterObservation::new(11, at(9, 30), false),
                        ReporterObservation::new(11, at(11, 0), true),
                    ],
                ),
            ]),
            telemetry: HashMap::from([(
                7,
                vec![
                    generator_sample(at(10, 30)),
                    idle_sample(at(10, 50)),
                    idle_sample(at(11, 0)),
                ],
            )]),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let building = building_with_station(1, 7);

        let log = orchestrator
            .get_power_log(&building, at(10, 0), at(12, 0))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(log.periods.len(), 3);
        assert_eq!(log.total_available_seconds, 5400);
        assert_eq!(log.total_unavailable_seconds, 1800);
        assert_eq!(log.total_generator_seconds, 1200);
        assert_eq!(log.total_seconds, 7200);
    }

    #[tokio::test]
    async fn power_log_is_absent_without_reporters() {
        let orchestrator = orchestrator(FakeRepository::default());
        let building = building_with_station(1, 7);

        let log = orchestrator
            .get_power_log(&building, at(10, 0), at(12, 0))
            .await
            .unwrap();
        assert!(log.is_none());
    }

    #[tokio::test]
    async fn power_log_rejects_inverted_range() {
        let orchestrator = orchestrator(FakeRepository::default());
        let building = building_with_station(1, 7);

        let result = orchestrator
            .get_power_log(&building, at(12, 0), at(10, 0))
            .await;
        assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn power_log_without_station_has_zero_generator_seconds() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10])]),
            observations: HashMap::from([(
                10,
                vec![ReporterObservation::new(10, at(9, 0), true)],
            )]),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let building = Building::new(1, "No station".to_string(), None);

        let log = orchestrator
            .get_power_log(&building, at(10, 0), at(12, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.total_generator_seconds, 0);
        assert_eq!(log.total_available_seconds, 7200);
    }

    #[tokio::test]
    async fn summary_without_station_keeps_grid_fields_only() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10, 11])]),
            observations: HashMap::from([
                (10, vec![ReporterObservation::new(10, at(11, 0), true)]),
                (11, vec![ReporterObservation::new(11, at(11, 30), false)]),
            ]),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let building = Building::new(1, "No station".to_string(), None);

        let summary = orchestrator
            .get_building_summary(&building, at(12, 0))
            .await
            .unwrap();

        assert!(summary.is_grid_available);
        assert_eq!(summary.grid_availability_pct, 50);
        assert!(summary.has_mixed_reporter_states);
        assert!(summary.station.is_none());
    }

    #[tokio::test]
    async fn summary_classifies_station_from_latest_sample() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10])]),
            observations: HashMap::from([(
                10,
                vec![ReporterObservation::new(10, at(11, 0), true)],
            )]),
            telemetry: HashMap::from([(7, vec![generator_sample(at(11, 55))])]),
            averages: HashMap::from([(7, 900.0)]),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let building = building_with_station(1, 7);

        let summary = orchestrator
            .get_building_summary(&building, at(12, 0))
            .await
            .unwrap();

        let station = summary.station.unwrap();
        assert!(station.is_charging);
        assert!(!station.is_offline);
        assert_eq!(station.charge_source, Some(ChargeSource::Generator));
        assert_eq!(station.battery_percent, 50.0);
    }

    #[tokio::test]
    async fn summary_marks_stale_telemetry_offline() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10])]),
            telemetry: HashMap::from([(7, vec![idle_sample(at(10, 0))])]),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let building = building_with_station(1, 7);

        // Latest sample is two hours old, well past the staleness cutoff.
        let summary = orchestrator
            .get_building_summary(&building, at(12, 0))
            .await
            .unwrap();
        assert!(summary.station.unwrap().is_offline);
    }

    #[tokio::test]
    async fn summarize_buildings_isolates_failures() {
        let repository = FakeRepository {
            reporters: HashMap::from([(1, vec![10])]),
            observations: HashMap::from([(
                10,
                vec![ReporterObservation::new(10, at(11, 0), true)],
            )]),
            fail_building: Some(2),
            ..FakeRepository::default()
        };
        let orchestrator = orchestrator(repository);
        let buildings = vec![
            Building::new(1, "Healthy".to_string(), None),
            Building::new(2, "Broken".to_string(), None),
        ];

        let mut results = orchestrator.summarize_buildings(&buildings, at(12, 0)).await;
        results.sort_by_key(|(id, _)| *id);

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(EngineError::DataAccess(_))));
    }
}
