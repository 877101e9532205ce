//! The [`ColdChainStore`] trait.

use coldtrace_core::breach::{BreachLogLink, TemperatureBreach};
use coldtrace_core::breach_config::BreachConfiguration;
use coldtrace_core::error::CoreError;
use coldtrace_core::temperature_log::TemperatureLog;
use coldtrace_core::types::UnixSeconds;

/// Read/write access to cold-chain records, keyed by record id.
///
/// Implementations adapt whatever actually holds the records (the
/// embedded object database, an in-memory map in tests). Upserts must
/// be idempotent per record id -- that is the retry-correctness
/// mechanism for a scan repeated after a partial failure.
pub trait ColdChainStore: Send + Sync {
    /// The most recent reading already linked to a breach, or `None`
    /// if the sensor has never had one. Checkpoint source for
    /// incremental scans.
    fn most_recent_breach_log(
        &self,
        sensor_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<TemperatureLog>, CoreError>> + Send;

    /// Readings for a sensor strictly after `since`, ordered by timestamp.
    fn temperature_logs_from(
        &self,
        sensor_id: &str,
        since: UnixSeconds,
    ) -> impl std::future::Future<Output = Result<Vec<TemperatureLog>, CoreError>> + Send;

    /// The sensor's most recent breach (open or closed), or `None`.
    fn most_recent_breach(
        &self,
        sensor_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<TemperatureBreach>, CoreError>> + Send;

    /// All breach configurations, in their stored (caller-controlled) order.
    fn breach_configs(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<BreachConfiguration>, CoreError>> + Send;

    /// Insert-or-replace breaches by id; returns the persisted records.
    fn upsert_breaches(
        &self,
        breaches: Vec<TemperatureBreach>,
    ) -> impl std::future::Future<Output = Result<Vec<TemperatureBreach>, CoreError>> + Send;

    /// Insert-or-replace reading-to-breach links by log id; returns the
    /// persisted records.
    fn upsert_log_links(
        &self,
        links: Vec<BreachLogLink>,
    ) -> impl std::future::Future<Output = Result<Vec<BreachLogLink>, CoreError>> + Send;
}
