//! In-memory [`ColdChainStore`] implementation.

use std::collections::HashMap;

use tokio::sync::RwLock;

use coldtrace_core::breach::{BreachLogLink, TemperatureBreach};
use coldtrace_core::breach_config::BreachConfiguration;
use coldtrace_core::error::CoreError;
use coldtrace_core::sensor::Sensor;
use coldtrace_core::temperature_log::TemperatureLog;
use coldtrace_core::types::{RecordId, UnixSeconds};

use crate::store::ColdChainStore;

#[derive(Default)]
struct Inner {
    sensors: Vec<Sensor>,
    logs: HashMap<RecordId, TemperatureLog>,
    /// Insertion order is preserved -- it drives configuration tie-break.
    configs: Vec<BreachConfiguration>,
    breaches: HashMap<RecordId, TemperatureBreach>,
    /// Keyed by log id, so a reading is only ever linked to one breach.
    links: HashMap<RecordId, BreachLogLink>,
}

/// Id-keyed in-memory record store.
///
/// Stand-in for the embedded object database: tests and the worker
/// seed it with sensors, configurations, and downloaded readings, then
/// run detection against it through [`ColdChainStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_sensor(&self, sensor: Sensor) {
        self.inner.write().await.sensors.push(sensor);
    }

    pub async fn insert_logs(&self, logs: impl IntoIterator<Item = TemperatureLog>) {
        let mut inner = self.inner.write().await;
        for log in logs {
            inner.logs.insert(log.id.clone(), log);
        }
    }

    pub async fn insert_configs(&self, configs: impl IntoIterator<Item = BreachConfiguration>) {
        self.inner.write().await.configs.extend(configs);
    }

    /// All seeded sensors, in insertion order.
    pub async fn sensors(&self) -> Vec<Sensor> {
        self.inner.read().await.sensors.clone()
    }

    /// All breaches for a sensor, ordered by start instant.
    pub async fn breaches_for(&self, sensor_id: &str) -> Vec<TemperatureBreach> {
        let inner = self.inner.read().await;
        let mut breaches: Vec<_> = inner
            .breaches
            .values()
            .filter(|b| b.sensor_id == sensor_id)
            .cloned()
            .collect();
        breaches.sort_by_key(|b| b.start_timestamp);
        breaches
    }

    /// All reading-to-breach links, unordered.
    pub async fn log_links(&self) -> Vec<BreachLogLink> {
        self.inner.read().await.links.values().cloned().collect()
    }
}

impl ColdChainStore for MemoryStore {
    async fn most_recent_breach_log(
        &self,
        sensor_id: &str,
    ) -> Result<Option<TemperatureLog>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .logs
            .values()
            .filter(|log| log.sensor_id == sensor_id && inner.links.contains_key(&log.id))
            .max_by_key(|log| log.timestamp)
            .cloned())
    }

    async fn temperature_logs_from(
        &self,
        sensor_id: &str,
        since: UnixSeconds,
    ) -> Result<Vec<TemperatureLog>, CoreError> {
        let inner = self.inner.read().await;
        let mut logs: Vec<_> = inner
            .logs
            .values()
            .filter(|log| log.sensor_id == sensor_id && log.timestamp > since)
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.timestamp);
        Ok(logs)
    }

    async fn most_recent_breach(
        &self,
        sensor_id: &str,
    ) -> Result<Option<TemperatureBreach>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .breaches
            .values()
            .filter(|b| b.sensor_id == sensor_id)
            .max_by_key(|b| b.start_timestamp)
            .cloned())
    }

    async fn breach_configs(&self) -> Result<Vec<BreachConfiguration>, CoreError> {
        Ok(self.inner.read().await.configs.clone())
    }

    async fn upsert_breaches(
        &self,
        breaches: Vec<TemperatureBreach>,
    ) -> Result<Vec<TemperatureBreach>, CoreError> {
        let mut inner = self.inner.write().await;
        for breach in &breaches {
            inner.breaches.insert(breach.id.clone(), breach.clone());
        }
        tracing::debug!(count = breaches.len(), "Upserted breaches");
        Ok(breaches)
    }

    async fn upsert_log_links(
        &self,
        links: Vec<BreachLogLink>,
    ) -> Result<Vec<BreachLogLink>, CoreError> {
        let mut inner = self.inner.write().await;
        for link in &links {
            inner.links.insert(link.log_id.clone(), link.clone());
        }
        tracing::debug!(count = links.len(), "Upserted log links");
        Ok(links)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
