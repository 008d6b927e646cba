// Availability timeline reconstruction - merges per-reporter observation
// streams into one contiguous sequence of availability periods
use crate::domain::building::ReporterId;
use crate::domain::observation::ReporterObservation;
use crate::domain::power::AvailabilityPeriod;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Result of one reconstruction: periods tiling `[start, end)` exactly,
/// plus the per-label duration totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityTimeline {
    pub periods: Vec<AvailabilityPeriod>,
    pub total_available_seconds: i64,
    pub total_unavailable_seconds: i64,
}

/// Aggregate view of a set of reporters' last-known states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReporterSnapshot {
    /// Logical OR over all last-known states.
    pub is_grid_available: bool,
    /// Rounded percentage of reporters whose last-known state is available.
    pub grid_availability_pct: u8,
    /// True iff some, but not all, reporters observe grid power.
    pub has_mixed_reporter_states: bool,
}

impl ReporterSnapshot {
    pub fn from_states(states: &[bool]) -> Self {
        let total = states.len();
        let available = states.iter().filter(|s| **s).count();
        if total == 0 {
            return Self {
                is_grid_available: false,
                grid_availability_pct: 0,
                has_mixed_reporter_states: false,
            };
        }
        let pct = (100.0 * available as f64 / total as f64).round() as u8;
        Self {
            is_grid_available: available > 0,
            grid_availability_pct: pct,
            has_mixed_reporter_states: available > 0 && available < total,
        }
    }
}

/// One merged event in the sweep.
#[derive(Debug, Clone)]
struct SweepEvent {
    timestamp: DateTime<Utc>,
    reporter_id: ReporterId,
    grid_available: bool,
}

/// Merges asynchronous multi-reporter boolean observations into an ordered,
/// contiguous, non-overlapping availability timeline for `[start, end)`.
///
/// Aggregation is a logical OR across reporters: the building counts as
/// powered if any reporter currently observes grid power, so a single
/// false-negative report cannot mark the whole building unavailable.
pub struct AvailabilityTimelineReconstructor;

impl AvailabilityTimelineReconstructor {
    /// Reconstruct the availability timeline for `[start, end)`.
    ///
    /// `last_known_before_start` carries each reporter's most recent state
    /// before the window; a reporter with no prior observation defaults to
    /// unavailable. Same-instant events from distinct reporters are ordered
    /// by `(timestamp, reporter_id)` so the merge is deterministic.
    pub fn reconstruct(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reporters: &[ReporterId],
        observations_by_reporter: &HashMap<ReporterId, Vec<ReporterObservation>>,
        last_known_before_start: &HashMap<ReporterId, bool>,
    ) -> Result<AvailabilityTimeline, EngineError> {
        if start >= end {
            return Err(EngineError::InvalidRange { start, end });
        }

        let mut states: HashMap<ReporterId, bool> = reporters
            .iter()
            .map(|id| (*id, *last_known_before_start.get(id).unwrap_or(&false)))
            .collect();
        let initial_aggregate = states.values().any(|s| *s);

        let mut events: Vec<SweepEvent> = Vec::new();
        for reporter_id in reporters {
            let Some(observations) = observations_by_reporter.get(reporter_id) else {
                continue;
            };
            for obs in observations {
                // Out-of-window rows are a repository contract violation;
                // tolerate them rather than corrupt the tiling.
                if obs.timestamp < start || obs.timestamp >= end {
                    continue;
                }
                events.push(SweepEvent {
                    timestamp: obs.timestamp,
                    reporter_id: *reporter_id,
                    grid_available: obs.grid_available,
                });
            }
        }
        events.sort_by_key(|e| (e.timestamp, e.reporter_id));

        if events.is_empty() {
            let period = AvailabilityPeriod::new(start, end, initial_aggregate);
            return Ok(Self::finish(vec![period]));
        }

        let mut periods = Vec::new();
        let mut current_time = start;
        let mut current_aggregate = initial_aggregate;

        // All events sharing one instant are applied as a group before the
        // aggregate is re-read. A flip away and back within the same instant
        // must not split a period, so boundaries are emitted only when the
        // aggregate after the group differs from before it.
        let mut index = 0;
        while index < events.len() {
            let group_time = events[index].timestamp;
            while index < events.len() && events[index].timestamp == group_time {
                states.insert(events[index].reporter_id, events[index].grid_available);
                index += 1;
            }
            let new_aggregate = states.values().any(|s| *s);

            if new_aggregate != current_aggregate {
                if group_time > current_time {
                    periods.push(AvailabilityPeriod::new(
                        current_time,
                        group_time,
                        current_aggregate,
                    ));
                }
                current_time = group_time;
                current_aggregate = new_aggregate;
            }
        }

        if current_time < end {
            periods.push(AvailabilityPeriod::new(current_time, end, current_aggregate));
        }

        Ok(Self::finish(periods))
    }

    fn finish(periods: Vec<AvailabilityPeriod>) -> AvailabilityTimeline {
        let total_available_seconds = periods
            .iter()
            .filter(|p| p.is_available)
            .map(|p| p.duration_seconds)
            .sum();
        let total_unavailable_seconds = periods
            .iter()
            .filter(|p| !p.is_available)
            .map(|p| p.duration_seconds)
            .sum();
        AvailabilityTimeline {
            periods,
            total_available_seconds,
            total_unavailable_seconds,
        }
    }
}
