#![deny(unsafe_code)]
//! # deferral-telemetry
//!
//! Bounded, thread-safe history of the kernel's diagnostic metrics.
//!
//! The [`TelemetryStore`] is the only state that survives across requests
//! besides the coherence tracker's sample buffer. It is an explicit object
//! with a declared lifecycle (`new`, `reset`) — never a process-wide
//! global — so one instance per tenant is safe and tests stay
//! deterministic.

pub mod store;

pub use store::{Metric, TelemetryStore};
