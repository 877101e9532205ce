//! `coldtrace-detector` -- temperature breach detection.
//!
//! [`engine::BreachDetector`] is the pure single-pass scanner that
//! turns an ordered reading stream into breach intervals and
//! reading-to-breach links. [`monitor::BreachMonitor`] wraps it into
//! an incremental per-sensor service over a [`coldtrace_store::ColdChainStore`].

pub mod engine;
pub mod monitor;

pub use engine::{BreachDetector, Detection};
pub use monitor::{BreachMonitor, ScanOutcome};
