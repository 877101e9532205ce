//! The breach detection scan.
//!
//! A single forward pass over a time-ordered reading stream. The
//! scanner tracks one currently-open breach and a candidate window of
//! readings that are in bounds for some configuration but have not yet
//! violated it for long enough. Readings close the open breach when
//! they leave its own stored bounds, extend it while they stay inside,
//! and otherwise grow the candidate window until a configuration's
//! duration is met.

use coldtrace_core::breach::{BreachLogLink, TemperatureBreach};
use coldtrace_core::breach_config::BreachConfiguration;
use coldtrace_core::sensor::Sensor;
use coldtrace_core::temperature_log::TemperatureLog;
use coldtrace_core::types::{instant_from_unix, new_record_id, UnixSeconds, MILLISECONDS_PER_SECOND};

// ---------------------------------------------------------------------------
// Breach factory
// ---------------------------------------------------------------------------

/// Builds the breach record for a confirmed candidate window.
///
/// Injected at detector construction so callers (and tests) control id
/// generation and any extra fields a deployment carries.
pub type BreachFactory =
    Box<dyn Fn(&Sensor, &BreachConfiguration, UnixSeconds) -> TemperatureBreach + Send + Sync>;

/// Default breach construction: fresh id, thresholds and kind copied
/// from the winning configuration, location copied from the sensor,
/// open-ended and unacknowledged.
pub fn default_breach_record(
    sensor: &Sensor,
    config: &BreachConfiguration,
    start: UnixSeconds,
) -> TemperatureBreach {
    TemperatureBreach {
        id: new_record_id(),
        sensor_id: sensor.id.clone(),
        location_id: sensor.location_id.clone(),
        kind: config.kind,
        threshold_min_temperature: config.minimum_temperature,
        threshold_max_temperature: config.maximum_temperature,
        threshold_duration_ms: config.duration_ms,
        start_timestamp: instant_from_unix(start),
        end_timestamp: None,
        acknowledged: false,
    }
}

// ---------------------------------------------------------------------------
// Detection result
// ---------------------------------------------------------------------------

/// Outcome of one scan, in creation order.
///
/// `breaches` includes the seeded most-recent breach when one was
/// carried into the scan, so upserting the batch also persists a close
/// applied to it.
#[derive(Debug, Default)]
pub struct Detection {
    pub breaches: Vec<TemperatureBreach>,
    pub log_links: Vec<BreachLogLink>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.breaches.is_empty() && self.log_links.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scan predicates
// ---------------------------------------------------------------------------

/// Whether a reading falls inside the bounds of any configuration.
fn could_be_in_breach(log: &TemperatureLog, configs: &[BreachConfiguration]) -> bool {
    configs.iter().any(|config| config.contains(log.temperature))
}

/// Whether a configuration confirms the candidate window as a breach:
/// the window must span at least the configured duration and every
/// reading in it must be inside the configuration's bounds.
///
/// Reading timestamps are epoch seconds while durations are stored in
/// milliseconds, so the span is scaled before the comparison.
fn confirms_breach(config: &BreachConfiguration, window: &[&TemperatureLog]) -> bool {
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return false;
    };

    let span_ms = MILLISECONDS_PER_SECOND * (last.timestamp - first.timestamp);
    if span_ms < config.duration_ms {
        return false;
    }

    window.iter().all(|log| config.contains(log.temperature))
}

/// The first configuration, in caller order, that confirms the window.
fn confirming_config<'a>(
    configs: &'a [BreachConfiguration],
    window: &[&TemperatureLog],
) -> Option<&'a BreachConfiguration> {
    configs.iter().find(|config| confirms_breach(config, window))
}

// ---------------------------------------------------------------------------
// BreachDetector
// ---------------------------------------------------------------------------

/// Pure single-pass breach scanner.
///
/// Holds no scan state between invocations; safe to share across
/// sensors. Same-sensor invocations must be serialized by the caller
/// because each scan depends on the previously committed open breach.
pub struct BreachDetector {
    create_breach: BreachFactory,
}

impl Default for BreachDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BreachDetector {
    /// Detector with the [`default_breach_record`] factory.
    pub fn new() -> Self {
        Self {
            create_breach: Box::new(default_breach_record),
        }
    }

    /// Detector with a caller-supplied breach factory.
    pub fn with_breach_factory(create_breach: BreachFactory) -> Self {
        Self { create_breach }
    }

    /// Scan `logs` (time-ordered) against `configs` (evaluation-ordered)
    /// and return the breaches and reading links the stream produces.
    ///
    /// `most_recent_breach` carries context from before this batch of
    /// readings: when it is still open it seeds the scan as the current
    /// breach, so the new readings can extend or close it.
    pub fn detect(
        &self,
        sensor: &Sensor,
        logs: &[TemperatureLog],
        configs: &[BreachConfiguration],
        most_recent_breach: Option<TemperatureBreach>,
    ) -> Detection {
        let mut breaches: Vec<TemperatureBreach> = Vec::new();
        let mut log_links: Vec<BreachLogLink> = Vec::new();

        // Index into `breaches` of the breach currently open.
        let mut current: Option<usize> = None;
        if let Some(breach) = most_recent_breach.filter(TemperatureBreach::is_ongoing) {
            breaches.push(breach);
            current = Some(0);
        }

        // Readings in bounds for some configuration, not yet confirmed.
        let mut window: Vec<&TemperatureLog> = Vec::new();

        for log in logs {
            let in_any_bounds = could_be_in_breach(log, configs);
            let continues = current.is_some_and(|i| breaches[i].contains(log.temperature));
            let closes = current.is_some_and(|i| !breaches[i].contains(log.temperature));

            if closes {
                if let Some(i) = current.take() {
                    breaches[i].close(log.timestamp);
                }
                // The closing reading never seeds the next window, even
                // when it is in bounds for another configuration.
                window.clear();
            } else if in_any_bounds {
                window.push(log);
            } else {
                window.clear();
            }

            if continues {
                if let Some(i) = current {
                    log_links.push(BreachLogLink {
                        log_id: log.id.clone(),
                        breach_id: breaches[i].id.clone(),
                    });
                }
                // Attributed to the open breach; the reading does not
                // also drive window confirmation this iteration.
                continue;
            }

            if let Some(config) = confirming_config(configs, &window) {
                let breach = (self.create_breach)(sensor, config, window[0].timestamp);
                for in_window in &window {
                    log_links.push(BreachLogLink {
                        log_id: in_window.id.clone(),
                        breach_id: breach.id.clone(),
                    });
                }
                breaches.push(breach);
                current = Some(breaches.len() - 1);
            }
        }

        Detection { breaches, log_links }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
