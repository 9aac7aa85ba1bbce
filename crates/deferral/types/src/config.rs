//! Runtime configuration for one kernel instance.

use serde::{Deserialize, Serialize};

use crate::error::{DeferralError, DeferralResult};

/// Tuning parameters for the deferral kernel.
///
/// Validation is strict: out-of-range values are rejected with
/// [`DeferralError::InvalidConfig`] before any computation, never clamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Detection threshold: a basin pair conflicts only when its projection
    /// divergence exceeds this. Must be > 0.
    pub epsilon_axiom: f64,

    /// Boundary inflation factor. Must be > 1.
    pub gamma: f64,

    /// Capacity of the coherence sample buffer and of each telemetry
    /// series. Oldest entries are evicted on overflow. Must be > 0.
    pub window_k: usize,

    /// Incoherence flux above this escalates the tracker. Must be > 0.
    pub theta_flux: f64,

    /// Consecutive quiet samples required to return from calm-down to
    /// nominal. Must be > 0.
    pub hysteresis_h: u32,

    /// Base deceleration delay in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on the deceleration delay. Must be >= `base_delay_ms`.
    pub max_delay_ms: u64,

    /// Checksum penalty added whenever a bifurcation event is observed.
    /// Must be >= 0.
    pub penalty: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            epsilon_axiom: 0.1,
            gamma: 1.5,
            window_k: 50,
            theta_flux: 1.0,
            hysteresis_h: 3,
            base_delay_ms: 50,
            max_delay_ms: 5000,
            penalty: 1.0,
        }
    }
}

impl KernelConfig {
    /// Check every precondition, reporting the first violation.
    pub fn validate(&self) -> DeferralResult<()> {
        if !(self.epsilon_axiom > 0.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "epsilon_axiom must be > 0, got {}",
                self.epsilon_axiom
            )));
        }
        if !(self.gamma > 1.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "gamma must be > 1, got {}",
                self.gamma
            )));
        }
        if self.window_k == 0 {
            return Err(DeferralError::InvalidConfig(
                "window_k must be > 0".into(),
            ));
        }
        if !(self.theta_flux > 0.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "theta_flux must be > 0, got {}",
                self.theta_flux
            )));
        }
        if self.hysteresis_h == 0 {
            return Err(DeferralError::InvalidConfig(
                "hysteresis_h must be > 0".into(),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(DeferralError::InvalidConfig(format!(
                "max_delay_ms ({}) must be >= base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        if !(self.penalty >= 0.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "penalty must be >= 0, got {}",
                self.penalty
            )));
        }
        Ok(())
    }
}
