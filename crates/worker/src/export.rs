//! Cold-chain data exports.
//!
//! A JSON document holding sensors, breach configurations, and
//! downloaded readings -- the worker's offline stand-in for the
//! application database when replaying detection over an exported
//! data set.

use serde::Deserialize;

use coldtrace_core::breach_config::BreachConfiguration;
use coldtrace_core::error::CoreError;
use coldtrace_core::sensor::Sensor;
use coldtrace_core::temperature_log::TemperatureLog;
use coldtrace_store::MemoryStore;

/// Parsed export document.
#[derive(Debug, Deserialize)]
pub struct ColdChainExport {
    pub sensors: Vec<Sensor>,
    pub configs: Vec<BreachConfiguration>,
    pub logs: Vec<TemperatureLog>,
}

impl ColdChainExport {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject malformed configurations before they reach the detector.
    pub fn validate(&self) -> Result<(), CoreError> {
        for config in &self.configs {
            config.validate()?;
        }
        Ok(())
    }

    /// Seed a fresh in-memory store with the export's records.
    pub async fn into_store(self) -> MemoryStore {
        let store = MemoryStore::new();
        for sensor in self.sensors {
            store.insert_sensor(sensor).await;
        }
        store.insert_configs(self.configs).await;
        store.insert_logs(self.logs).await;
        store
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
