//! Observability
//!
//! Structured logging for page lifecycle and intro state transitions.

pub mod telemetry;
