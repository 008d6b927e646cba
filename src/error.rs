// Engine error taxonomy
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the engine's public entry points.
///
/// A building with no reporters or no station is not an error: those cases
/// produce absent results instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A repository call failed (timeout, connection loss, decode error).
    /// Propagated unchanged; the engine performs no retries.
    #[error("data access failure")]
    DataAccess(#[from] anyhow::Error),
}
