//! Sensor records.

use serde::{Deserialize, Serialize};

use crate::types::{new_record_id, RecordId};

/// Seconds between two consecutive readings for a newly registered sensor.
pub const DEFAULT_LOG_INTERVAL_SECS: i32 = 300;

/// A wireless temperature sensor and the storage location it monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: RecordId,
    /// Bluetooth MAC address readings are downloaded from.
    pub mac_address: String,
    pub name: String,
    /// Location copied onto breaches created for this sensor.
    pub location_id: Option<RecordId>,
    pub log_interval_secs: i32,
    /// Paused sensors are excluded from breach detection runs.
    pub is_paused: bool,
}

impl Sensor {
    /// A new unpaused, unnamed sensor with the default log interval.
    pub fn new(mac_address: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            mac_address: mac_address.into(),
            name: String::new(),
            location_id: None,
            log_interval_secs: DEFAULT_LOG_INTERVAL_SECS,
            is_paused: false,
        }
    }
}
