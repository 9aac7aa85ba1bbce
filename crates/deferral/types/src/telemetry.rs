//! Diagnostic sample and snapshot types shared by the coherence tracker
//! and the telemetry store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Escalation status reported with every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EpistemicStatus {
    /// No elevated tension.
    Nominal,
    /// Incoherence flux exceeded its threshold; outputs carry an
    /// introspection note and a deceleration delay.
    Elevated,
    /// Flux has quieted but the hysteresis window has not yet elapsed.
    CalmDown,
}

impl std::fmt::Display for EpistemicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::Elevated => write!(f, "elevated"),
            Self::CalmDown => write!(f, "calm-down"),
        }
    }
}

/// One coherence observation appended per request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoherenceSample {
    /// Monotonically increasing sequence index.
    pub index: u64,
    /// Running scalar summarizing internal tension across basins.
    pub checksum: f64,
    /// Whether a bifurcation event was observed for this request.
    pub conflict: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Point-in-time diagnostic metrics attached to every response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Conscience-latency estimate in milliseconds.
    pub cli: f64,
    /// Gradient-decoherence score in [0, 1].
    pub gds: f64,
    /// Semantic-viscosity score in [0, 1].
    pub svm: f64,
    /// Current coherence checksum.
    pub checksum: f64,
    /// Current incoherence flux.
    pub flux: f64,
    pub status: EpistemicStatus,
}

impl TelemetrySnapshot {
    /// Build a snapshot, clamping the bounded scores into their ranges.
    pub fn new(
        cli: f64,
        gds: f64,
        svm: f64,
        checksum: f64,
        flux: f64,
        status: EpistemicStatus,
    ) -> Self {
        Self {
            cli: cli.max(0.0),
            gds: gds.clamp(0.0, 1.0),
            svm: svm.clamp(0.0, 1.0),
            checksum,
            flux,
            status,
        }
    }
}
