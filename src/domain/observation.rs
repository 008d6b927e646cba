// Reporter observation domain model
use super::building::ReporterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A manually submitted grid on/off report from one reporter.
///
/// Immutable once created; ordered by `timestamp`. Ties between distinct
/// reporters at the same instant are resolved by the timeline sweep
/// (`timestamp`, then `reporter_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterObservation {
    pub reporter_id: ReporterId,
    pub timestamp: DateTime<Utc>,
    pub grid_available: bool,
}

impl ReporterObservation {
    pub fn new(reporter_id: ReporterId, timestamp: DateTime<Utc>, grid_available: bool) -> Self {
        Self {
            reporter_id,
            timestamp,
            grid_available,
        }
    }
}
