//! Temperature log records produced by the sensor ingestion pipeline.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, UnixSeconds};

/// A single reading downloaded from a sensor.
///
/// Immutable once recorded. Streams handed to the detector are ordered
/// by `timestamp`; the detector does not re-sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureLog {
    pub id: RecordId,
    pub sensor_id: RecordId,
    /// Unix epoch seconds from the sensor's clock.
    pub timestamp: UnixSeconds,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Seconds until the next scheduled reading.
    pub log_interval_secs: i32,
}
