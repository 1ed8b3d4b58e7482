//! Observability
//!
//! Structured logging setup for the playback engine and its hosts.

pub mod telemetry;
