//! `coldtrace-core` -- domain records for cold-chain breach detection.
//!
//! Zero-internal-dependency crate shared by the store, detector, and
//! worker layers: sensor/log/breach record types, breach threshold
//! configurations, and the id/timestamp conventions they rely on.

pub mod breach;
pub mod breach_config;
pub mod error;
pub mod sensor;
pub mod temperature_log;
pub mod types;
