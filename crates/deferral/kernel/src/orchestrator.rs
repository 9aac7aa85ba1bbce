//! The deferral orchestrator: composes detector, inflator, partitioner,
//! coherence tracker, and telemetry store into one request/response
//! cycle.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::info;

use deferral_telemetry::TelemetryStore;
use deferral_types::{
    BasinSet, DeferralError, DeferralResponse, DeferralResult, Decoder,
    KernelConfig, LatentPoint, ModalPartition, MoralEvaluator, PartitionId,
    TelemetrySnapshot,
};

use crate::coherence::{projection_variance, CoherenceTracker};
use crate::detector::SingularityDetector;
use crate::inflator::ManifoldInflator;
use crate::partitioner::ModalPartitioner;

/// Owns one kernel instance: stateless pipeline stages plus the two
/// persistent pieces (coherence tracker, telemetry store).
///
/// Each `process` call runs as one uninterrupted sequence. The tracker
/// sits behind a mutex and the store serializes internally, so concurrent
/// requests observe monotonic sample indices and escalation transitions
/// in a single order. Instances share nothing: one per tenant is safe.
pub struct DeferralOrchestrator {
    max_delay_ms: u64,
    detector: SingularityDetector,
    inflator: ManifoldInflator,
    partitioner: ModalPartitioner,
    tracker: Mutex<CoherenceTracker>,
    store: Arc<TelemetryStore>,
}

impl DeferralOrchestrator {
    /// Validate the configuration and construct a fresh instance.
    /// Rejection happens here, before any request is accepted.
    pub fn new(config: KernelConfig) -> DeferralResult<Self> {
        config.validate()?;
        Ok(Self {
            max_delay_ms: config.max_delay_ms,
            detector: SingularityDetector::new(config.epsilon_axiom)?,
            inflator: ManifoldInflator::new(config.gamma)?,
            partitioner: ModalPartitioner::new(),
            tracker: Mutex::new(CoherenceTracker::new(&config)?),
            store: Arc::new(TelemetryStore::new(config.window_k)?),
        })
    }

    /// Handle to the telemetry store for out-of-band queries.
    pub fn telemetry(&self) -> Arc<TelemetryStore> {
        Arc::clone(&self.store)
    }

    /// Current escalation status without processing a request.
    pub fn status(&self) -> deferral_types::EpistemicStatus {
        self.tracker
            .lock()
            .expect("coherence tracker lock poisoned")
            .status()
    }

    /// Clear tracker and telemetry history, returning to a fresh state.
    pub fn reset(&self) {
        self.tracker
            .lock()
            .expect("coherence tracker lock poisoned")
            .reset();
        self.store.reset();
    }

    /// Run one full cycle for a decision point.
    ///
    /// Validation errors abort before the tracker or the store is
    /// touched, so failed requests leave no trace in telemetry.
    pub fn process(
        &self,
        point: &LatentPoint,
        basins: &BasinSet,
        decoder: &dyn Decoder,
        moral: &dyn MoralEvaluator,
    ) -> DeferralResult<DeferralResponse> {
        let started = Instant::now();

        if basins.is_empty() {
            return Err(DeferralError::EmptyBasinSet);
        }
        if let Some(dim) = basins.dim() {
            if dim != point.dim() {
                return Err(DeferralError::InvalidDimension {
                    expected: point.dim(),
                    actual: dim,
                });
            }
        }

        let event = self.detector.detect(point, basins)?;

        let (partitions, degraded_weighting) = match &event {
            None => (vec![implicit_partition(point, moral)], false),
            Some(event) => {
                let mut regions = Vec::with_capacity(event.basins.len());
                for label in &event.basins {
                    let basin = basins
                        .get(label)
                        .expect("event labels originate from the basin set");
                    let variance = projection_variance(point, &basin.vector)?;
                    regions.push(self.inflator.inflate(point, basin, variance)?);
                }
                let outcome =
                    self.partitioner.partition(event, &regions, decoder, moral)?;
                (outcome.partitions, outcome.degraded_weighting)
            }
        };

        let update = {
            let mut tracker = self
                .tracker
                .lock()
                .expect("coherence tracker lock poisoned");
            tracker.update(event.as_ref(), point, basins)?
        };

        let cli = started.elapsed().as_secs_f64() * 1000.0;
        let max_divergence = self.detector.max_divergence(point, basins)?;
        let gds = max_divergence / (1.0 + max_divergence);
        let svm = if self.max_delay_ms > 0 {
            update.deceleration_delay_ms as f64 / self.max_delay_ms as f64
        } else {
            0.0
        };
        let snapshot = TelemetrySnapshot::new(
            cli,
            gds,
            svm,
            update.sample.checksum,
            update.flux,
            update.status,
        );
        self.store.record(snapshot.clone());

        info!(
            conflict = event.is_some(),
            status = %update.status,
            delay_ms = update.deceleration_delay_ms,
            "deferral cycle complete"
        );

        Ok(DeferralResponse {
            event,
            partitions,
            introspection_note: update.introspection_note,
            deceleration_delay_ms: update.deceleration_delay_ms,
            degraded_weighting,
            telemetry: snapshot,
        })
    }
}

/// The nominal path's single partition: the input itself, at full weight.
fn implicit_partition(point: &LatentPoint, moral: &dyn MoralEvaluator) -> ModalPartition {
    let payload =
        serde_json::to_value(point).expect("latent point serializes to a JSON array");
    let raw = moral.evaluate(&payload);
    let moral_weight = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
    ModalPartition {
        id: PartitionId::new(),
        basin_label: None,
        payload,
        plausibility: 1.0,
        moral_weight,
        weight: 1.0,
        siblings: Vec::new(),
    }
}
