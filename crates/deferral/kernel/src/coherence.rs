//! Coherence tracking — a running checksum of internal tension across
//! basins, its rate of change, and the escalation state machine that
//! decides when responses carry an introspection note and a deceleration
//! delay.

use std::collections::VecDeque;

use chrono::Utc;
use tracing::{info, warn};

use deferral_types::{
    BasinSet, BifurcationEvent, CoherenceSample, DeferralError, DeferralResult,
    EpistemicStatus, KernelConfig, LatentPoint,
};

// ── Escalation state ────────────────────────────────────────────────────

/// Explicit finite-state machine for escalation, with the hysteresis
/// counter as part of its state. Flux is a first difference and is
/// naturally noisy, so one quiet sample must not claim resolution:
/// returning to nominal requires `hysteresis_h` consecutive quiet
/// samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EscalationState {
    Nominal,
    Elevated,
    CalmDown { quiet_samples: u32 },
}

impl EscalationState {
    fn status(self) -> EpistemicStatus {
        match self {
            Self::Nominal => EpistemicStatus::Nominal,
            Self::Elevated => EpistemicStatus::Elevated,
            Self::CalmDown { .. } => EpistemicStatus::CalmDown,
        }
    }
}

/// Result of one tracker update.
#[derive(Clone, Debug)]
pub struct CoherenceUpdate {
    pub sample: CoherenceSample,
    /// First difference of the checksum; 0 until two samples exist.
    pub flux: f64,
    pub status: EpistemicStatus,
    /// Present while the tracker is elevated.
    pub introspection_note: Option<String>,
    /// Advisory pacing duration; 0 unless elevated.
    pub deceleration_delay_ms: u64,
}

// ── Tracker ─────────────────────────────────────────────────────────────

/// Maintains the bounded coherence sample history and the escalation
/// state machine.
///
/// checksum = Σ over basins of the per-basin projection variance, plus a
/// fixed penalty whenever a bifurcation event accompanies the update.
pub struct CoherenceTracker {
    window_k: usize,
    theta_flux: f64,
    hysteresis_h: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    penalty: f64,
    samples: VecDeque<CoherenceSample>,
    state: EscalationState,
    next_index: u64,
}

impl CoherenceTracker {
    pub fn new(config: &KernelConfig) -> DeferralResult<Self> {
        config.validate()?;
        Ok(Self {
            window_k: config.window_k,
            theta_flux: config.theta_flux,
            hysteresis_h: config.hysteresis_h,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            penalty: config.penalty,
            samples: VecDeque::with_capacity(config.window_k),
            state: EscalationState::Nominal,
            next_index: 0,
        })
    }

    /// Append one sample and advance the state machine.
    pub fn update(
        &mut self,
        event: Option<&BifurcationEvent>,
        point: &LatentPoint,
        basins: &BasinSet,
    ) -> DeferralResult<CoherenceUpdate> {
        let mut checksum = 0.0;
        for basin in basins.iter() {
            checksum += projection_variance(point, &basin.vector)?;
        }
        if event.is_some() {
            checksum += self.penalty;
        }

        let flux = self
            .samples
            .back()
            .map(|prev| checksum - prev.checksum)
            .unwrap_or(0.0);

        if self.samples.len() >= self.window_k {
            self.samples.pop_front();
        }
        let sample = CoherenceSample {
            index: self.next_index,
            checksum,
            conflict: event.is_some(),
            recorded_at: Utc::now(),
        };
        self.next_index += 1;
        self.samples.push_back(sample.clone());

        self.transition(flux);

        let (introspection_note, deceleration_delay_ms) =
            if self.state == EscalationState::Elevated {
                let scaled =
                    self.base_delay_ms as f64 * (1.0 + flux / self.theta_flux);
                let delay = scaled.min(self.max_delay_ms as f64) as u64;
                (Some(self.introspection_note(event, checksum, flux)), delay)
            } else {
                (None, 0)
            };

        Ok(CoherenceUpdate {
            sample,
            flux,
            status: self.state.status(),
            introspection_note,
            deceleration_delay_ms,
        })
    }

    fn transition(&mut self, flux: f64) {
        let loud = flux > self.theta_flux;
        let previous = self.state;
        self.state = match (self.state, loud) {
            (_, true) => EscalationState::Elevated,
            (EscalationState::Nominal, false) => EscalationState::Nominal,
            (EscalationState::Elevated, false) => self.quiet(1),
            (EscalationState::CalmDown { quiet_samples }, false) => {
                self.quiet(quiet_samples + 1)
            }
        };
        if self.state != previous {
            match self.state {
                EscalationState::Elevated => warn!(
                    flux,
                    theta_flux = self.theta_flux,
                    from = %previous.status(),
                    "incoherence flux above threshold, escalating"
                ),
                EscalationState::CalmDown { quiet_samples } => info!(
                    quiet_samples,
                    hysteresis_h = self.hysteresis_h,
                    "flux quieted, entering calm-down"
                ),
                EscalationState::Nominal => {
                    info!("coherence settled back to nominal")
                }
            }
        }
    }

    fn quiet(&self, quiet_samples: u32) -> EscalationState {
        if quiet_samples >= self.hysteresis_h {
            EscalationState::Nominal
        } else {
            EscalationState::CalmDown { quiet_samples }
        }
    }

    fn introspection_note(
        &self,
        event: Option<&BifurcationEvent>,
        checksum: f64,
        flux: f64,
    ) -> String {
        match event {
            Some(e) => format!(
                "output bounded by contradiction between '{}' and '{}': the input \
                 yields diverging valid inferences, neither reducible to the other \
                 (checksum {:.4}, flux {:.4} above threshold {:.4})",
                e.basins[0], e.basins[1], checksum, flux, self.theta_flux
            ),
            None => format!(
                "incoherence flux {:.4} above threshold {:.4} with no conflicting \
                 pair attributed (checksum {:.4})",
                flux, self.theta_flux, checksum
            ),
        }
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &CoherenceSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn status(&self) -> EpistemicStatus {
        self.state.status()
    }

    /// Drop all samples and return to nominal. Sequence numbering
    /// restarts, so a reset tracker is indistinguishable from a fresh one.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.state = EscalationState::Nominal;
        self.next_index = 0;
    }
}

/// Population variance of the componentwise products of `point` and
/// `basin` — the spread of one basin's directional pull across
/// dimensions.
pub fn projection_variance(
    point: &LatentPoint,
    basin: &LatentPoint,
) -> DeferralResult<f64> {
    if point.dim() != basin.dim() {
        return Err(DeferralError::InvalidDimension {
            expected: point.dim(),
            actual: basin.dim(),
        });
    }
    let products: Vec<f64> = point
        .as_slice()
        .iter()
        .zip(basin.as_slice().iter())
        .map(|(a, b)| a * b)
        .collect();
    let n = products.len() as f64;
    let mean = products.iter().sum::<f64>() / n;
    Ok(products.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n)
}
