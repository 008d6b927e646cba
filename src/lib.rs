// Power-state inference engine for the grid-availability dashboard.
//
// Fuses manual reporter observations into a contiguous availability
// timeline, estimates generator-bridged time from station telemetry and
// classifies a building's instantaneous power state. Persistence, routing,
// auth and scheduling live outside this crate; data arrives through the
// `PowerDataRepository` trait.
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::generator::GeneratorOverlapEstimator;
pub use application::orchestrator::PowerInferenceOrchestrator;
pub use application::power_repository::{AverageColumn, PowerDataRepository};
pub use application::status::StationStatusClassifier;
pub use application::timeline::{
    AvailabilityTimeline, AvailabilityTimelineReconstructor, ReporterSnapshot,
};
pub use domain::building::{Building, BuildingId, ReporterId, Station, StationId};
pub use domain::observation::ReporterObservation;
pub use domain::power::{
    AvailabilityPeriod, BuildingPowerSummary, ChargeSource, PowerLog, StationStatus,
};
pub use domain::telemetry::TelemetrySample;
pub use error::EngineError;
pub use infrastructure::config::{EngineConfig, load_engine_config};
