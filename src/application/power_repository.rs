// Repository trait for observation and telemetry data access
use crate::domain::building::{BuildingId, ReporterId, StationId};
use crate::domain::observation::ReporterObservation;
use crate::domain::telemetry::TelemetrySample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Telemetry column a rolling average can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AverageColumn {
    ConsumptionPower,
}

#[async_trait]
pub trait PowerDataRepository: Send + Sync {
    /// List the reporters assigned to a building.
    async fn get_reporters_for_building(
        &self,
        building_id: BuildingId,
    ) -> anyhow::Result<Vec<ReporterId>>;

    /// Observations for one reporter within `[start, end)`, ascending by
    /// timestamp.
    async fn get_observations_in_range(
        &self,
        reporter_id: ReporterId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ReporterObservation>>;

    /// The most recent observation strictly before `before`, if any.
    async fn get_last_observation_before(
        &self,
        reporter_id: ReporterId,
        before: DateTime<Utc>,
    ) -> anyhow::Result<Option<ReporterObservation>>;

    /// The most recent observation for a reporter, unbounded lookback.
    async fn get_latest_observation(
        &self,
        reporter_id: ReporterId,
    ) -> anyhow::Result<Option<ReporterObservation>>;

    /// Telemetry samples for one station within `[start, end)`, ascending by
    /// timestamp.
    async fn get_telemetry_in_range(
        &self,
        station_id: StationId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TelemetrySample>>;

    /// The most recent telemetry sample for a station, if any.
    async fn get_latest_telemetry(
        &self,
        station_id: StationId,
    ) -> anyhow::Result<Option<TelemetrySample>>;

    /// Rolling average of one telemetry column over `[start, end)`; `None`
    /// when no samples fall in the range.
    async fn get_average_column(
        &self,
        station_id: StationId,
        column: AverageColumn,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Option<f64>>;
}
