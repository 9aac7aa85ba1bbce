//! The assembled result of one request/response cycle.

use serde::Serialize;

use crate::event::{BifurcationEvent, ModalPartition};
use crate::telemetry::TelemetrySnapshot;

/// Everything the orchestrator returns for one decision point.
///
/// Either the nominal shape (no event, one implicit partition) or the
/// deferred shape (an event with two or more weighted partitions). The
/// deceleration delay is a scheduling advisory: the core never sleeps,
/// honoring or cancelling the delay is the caller's concern.
#[derive(Clone, Debug, Serialize)]
pub struct DeferralResponse {
    pub event: Option<BifurcationEvent>,
    pub partitions: Vec<ModalPartition>,
    /// Templated diagnostic message, present while the tracker is elevated.
    pub introspection_note: Option<String>,
    /// Advisory pacing duration in milliseconds; 0 when not elevated.
    pub deceleration_delay_ms: u64,
    /// True when all moral weights were zero and uniform weights were used.
    pub degraded_weighting: bool,
    pub telemetry: TelemetrySnapshot,
}
