//! `coldtrace-worker` library surface.

pub mod export;
