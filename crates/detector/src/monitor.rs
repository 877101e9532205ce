//! Incremental per-sensor breach detection service.
//!
//! [`BreachMonitor`] wires the checkpoint -> fetch -> scan -> upsert
//! cycle over a [`ColdChainStore`]. Scans are incremental: only
//! readings after the most recent breach-linked reading are fetched,
//! and the previously-open breach is carried into the scan so it can
//! be extended or closed by the new readings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use coldtrace_core::breach::TemperatureBreach;
use coldtrace_core::error::CoreError;
use coldtrace_core::sensor::Sensor;
use coldtrace_core::types::{RecordId, UnixSeconds};
use coldtrace_store::ColdChainStore;

use crate::engine::{BreachDetector, Detection};

/// Scan start when a sensor has no breach-linked reading yet.
const SCAN_EPOCH: UnixSeconds = 0;

/// Summary of one detection run for a sensor.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub sensor_id: RecordId,
    /// Breaches written back, including a carried-over breach that was
    /// extended or closed by this run.
    pub breaches_recorded: usize,
    pub logs_linked: usize,
}

impl ScanOutcome {
    fn unchanged(sensor: &Sensor) -> Self {
        Self {
            sensor_id: sensor.id.clone(),
            breaches_recorded: 0,
            logs_linked: 0,
        }
    }
}

/// Detection service over a record store.
///
/// Runs for different sensors proceed concurrently; runs for the same
/// sensor are serialized through a per-sensor lock, because each run
/// reads back the checkpoint and open breach the previous run wrote.
pub struct BreachMonitor<S> {
    store: Arc<S>,
    detector: BreachDetector,
    scan_locks: Mutex<HashMap<RecordId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: ColdChainStore> BreachMonitor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_detector(store, BreachDetector::new())
    }

    pub fn with_detector(store: Arc<S>, detector: BreachDetector) -> Self {
        Self {
            store,
            detector,
            scan_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one detection pass for a sensor.
    ///
    /// Paused sensors are skipped. Store failures propagate unchanged;
    /// retrying the whole pass is safe because upserts are idempotent
    /// per record id.
    pub async fn check_sensor(&self, sensor: &Sensor) -> Result<ScanOutcome, CoreError> {
        if sensor.is_paused {
            tracing::debug!(sensor_id = %sensor.id, "Sensor is paused -- skipping breach scan");
            return Ok(ScanOutcome::unchanged(sensor));
        }

        let lock = self.scan_lock(&sensor.id);
        let _guard = lock.lock().await;

        let since = self.scan_start(&sensor.id).await?;
        let logs = self.store.temperature_logs_from(&sensor.id, since).await?;
        let configs: Vec<_> = self
            .store
            .breach_configs()
            .await?
            .into_iter()
            .filter(|config| config.kind.is_consecutive())
            .collect();
        let most_recent = self
            .store
            .most_recent_breach(&sensor.id)
            .await?
            .filter(TemperatureBreach::is_ongoing);

        let Detection { breaches, log_links } =
            self.detector.detect(sensor, &logs, &configs, most_recent);

        if breaches.is_empty() && log_links.is_empty() {
            tracing::debug!(
                sensor_id = %sensor.id,
                scanned = logs.len(),
                "Breach scan found nothing to record",
            );
            return Ok(ScanOutcome::unchanged(sensor));
        }

        let breaches = self.store.upsert_breaches(breaches).await?;
        let log_links = self.store.upsert_log_links(log_links).await?;

        tracing::info!(
            sensor_id = %sensor.id,
            scanned = logs.len(),
            breaches = breaches.len(),
            linked = log_links.len(),
            "Breach scan recorded changes",
        );

        Ok(ScanOutcome {
            sensor_id: sensor.id.clone(),
            breaches_recorded: breaches.len(),
            logs_linked: log_links.len(),
        })
    }

    /// Timestamp to scan from: the most recent breach-linked reading,
    /// or the epoch when the sensor has none.
    async fn scan_start(&self, sensor_id: &str) -> Result<UnixSeconds, CoreError> {
        let checkpoint = self.store.most_recent_breach_log(sensor_id).await?;
        Ok(checkpoint.map_or(SCAN_EPOCH, |log| log.timestamp))
    }

    fn scan_lock(&self, sensor_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .scan_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(sensor_id.to_string()).or_default().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use coldtrace_core::breach::BreachKind;
    use coldtrace_core::breach_config::BreachConfiguration;
    use coldtrace_core::temperature_log::TemperatureLog;
    use coldtrace_store::MemoryStore;

    fn sensor() -> Sensor {
        Sensor {
            id: "sensor-1".to_string(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: "Vaccine fridge".to_string(),
            location_id: Some("loc-1".to_string()),
            log_interval_secs: 300,
            is_paused: false,
        }
    }

    fn log(id: &str, timestamp: UnixSeconds, temperature: f64) -> TemperatureLog {
        TemperatureLog {
            id: id.to_string(),
            sensor_id: "sensor-1".to_string(),
            timestamp,
            temperature,
            log_interval_secs: 300,
        }
    }

    fn hot(duration_ms: i64) -> BreachConfiguration {
        BreachConfiguration::new(BreachKind::HotConsecutive, 8.0, 999.0, duration_ms)
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_sensor(sensor()).await;
        store.insert_configs([hot(1000)]).await;
        store
    }

    #[tokio::test]
    async fn scan_persists_breach_and_links() {
        let store = seeded_store().await;
        store
            .insert_logs([log("a", 100, 10.0), log("b", 101, 10.0)])
            .await;
        let monitor = BreachMonitor::new(store.clone());

        let outcome = monitor.check_sensor(&sensor()).await.unwrap();

        assert_eq!(outcome.breaches_recorded, 1);
        assert_eq!(outcome.logs_linked, 2);

        let breaches = store.breaches_for("sensor-1").await;
        assert_eq!(breaches.len(), 1);
        assert!(breaches[0].is_ongoing());
        assert_eq!(breaches[0].start_timestamp.timestamp_millis(), 100_000);
    }

    #[tokio::test]
    async fn second_scan_resumes_from_checkpoint_and_closes() {
        let store = seeded_store().await;
        store
            .insert_logs([log("a", 100, 10.0), log("b", 101, 10.0)])
            .await;
        let monitor = BreachMonitor::new(store.clone());
        monitor.check_sensor(&sensor()).await.unwrap();

        // New download: one more in-bounds reading, then a cold one.
        store
            .insert_logs([log("c", 102, 10.0), log("d", 103, 1.0)])
            .await;
        let outcome = monitor.check_sensor(&sensor()).await.unwrap();

        // The carried-over breach was extended by "c" and closed by "d".
        assert_eq!(outcome.breaches_recorded, 1);
        assert_eq!(outcome.logs_linked, 1);

        let breaches = store.breaches_for("sensor-1").await;
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].end_timestamp.unwrap().timestamp_millis(), 103_000);

        let mut linked: Vec<_> = store
            .log_links()
            .await
            .into_iter()
            .map(|l| l.log_id)
            .collect();
        linked.sort();
        assert_eq!(linked, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn paused_sensor_is_skipped() {
        let store = seeded_store().await;
        store
            .insert_logs([log("a", 100, 10.0), log("b", 101, 10.0)])
            .await;
        let monitor = BreachMonitor::new(store.clone());

        let mut paused = sensor();
        paused.is_paused = true;
        let outcome = monitor.check_sensor(&paused).await.unwrap();

        assert_eq!(outcome.breaches_recorded, 0);
        assert!(store.breaches_for("sensor-1").await.is_empty());
    }

    #[tokio::test]
    async fn cumulative_configurations_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.insert_sensor(sensor()).await;
        store
            .insert_configs([BreachConfiguration::new(
                BreachKind::HotCumulative,
                8.0,
                999.0,
                1000,
            )])
            .await;
        store
            .insert_logs([log("a", 100, 10.0), log("b", 101, 10.0)])
            .await;
        let monitor = BreachMonitor::new(store.clone());

        let outcome = monitor.check_sensor(&sensor()).await.unwrap();

        assert_eq!(outcome.breaches_recorded, 0);
        assert!(store.breaches_for("sensor-1").await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_scans_for_one_sensor_do_not_duplicate() {
        let store = seeded_store().await;
        store
            .insert_logs([log("a", 100, 10.0), log("b", 101, 10.0)])
            .await;
        let monitor = BreachMonitor::new(store.clone());

        let subject = sensor();
        let (first, second) = tokio::join!(
            monitor.check_sensor(&subject),
            monitor.check_sensor(&subject),
        );
        first.unwrap();
        second.unwrap();

        // The serialized second run sees the first run's checkpoint and
        // open breach instead of re-detecting from scratch.
        assert_eq!(store.breaches_for("sensor-1").await.len(), 1);
    }

    #[tokio::test]
    async fn scan_with_no_new_readings_records_nothing() {
        let store = seeded_store().await;
        let monitor = BreachMonitor::new(store.clone());

        let outcome = monitor.check_sensor(&sensor()).await.unwrap();

        assert_eq!(outcome.breaches_recorded, 0);
        assert_eq!(outcome.logs_linked, 0);
    }
}
