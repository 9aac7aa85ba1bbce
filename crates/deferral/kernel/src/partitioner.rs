//! Modal partitioning: turns inflated regions into weighted,
//! mutually-aware candidate output branches.

use tracing::{debug, warn};

use deferral_types::{
    BifurcationEvent, Decoder, DeferralError, DeferralResult, InflatedRegion,
    ModalPartition, MoralEvaluator, PartitionId,
};

/// Softmax temperature for plausibility weighting. 1.0 reproduces
/// uniform plausibility for equidistant region centers.
const SOFTMAX_TEMPERATURE: f64 = 1.0;

/// Partitions produced for one event, plus the weighting-quality flag.
#[derive(Clone, Debug)]
pub struct PartitionOutcome {
    pub partitions: Vec<ModalPartition>,
    /// True when every moral weight was zero and uniform weights were
    /// substituted. A recoverable condition, not an error.
    pub degraded_weighting: bool,
}

/// Builds weighted modal partitions from the inflated regions of one
/// bifurcation event.
///
/// Plausibility is the softmax, over all regions, of the negative distance
/// from the triggering point to each region center — closer means more
/// plausible. Each fused weight is plausibility times the clipped moral
/// weight, renormalized so the weights sum to 1.
pub struct ModalPartitioner {
    temperature: f64,
}

impl Default for ModalPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalPartitioner {
    pub fn new() -> Self {
        Self {
            temperature: SOFTMAX_TEMPERATURE,
        }
    }

    pub fn partition(
        &self,
        event: &BifurcationEvent,
        regions: &[InflatedRegion],
        decoder: &dyn Decoder,
        moral: &dyn MoralEvaluator,
    ) -> DeferralResult<PartitionOutcome> {
        if regions.len() < 2 {
            return Err(DeferralError::InvalidConfig(format!(
                "partitioning requires at least two inflated regions, got {}",
                regions.len()
            )));
        }

        let plausibilities = self.plausibilities(event, regions)?;

        let ids: Vec<PartitionId> = regions.iter().map(|_| PartitionId::new()).collect();
        let mut moral_weights = Vec::with_capacity(regions.len());
        let mut payloads = Vec::with_capacity(regions.len());
        for region in regions {
            let payload = decoder.decode(region);
            let raw = moral.evaluate(&payload);
            // A non-finite score carries no usable preference.
            let clipped = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
            payloads.push(payload);
            moral_weights.push(clipped);
        }

        let fused: Vec<f64> = plausibilities
            .iter()
            .zip(moral_weights.iter())
            .map(|(p, m)| p * m)
            .collect();
        let total: f64 = fused.iter().sum();

        let (weights, degraded_weighting) = if total > 0.0 {
            (fused.iter().map(|w| w / total).collect::<Vec<f64>>(), false)
        } else {
            warn!(
                basin_a = %event.basins[0],
                basin_b = %event.basins[1],
                "all moral weights zero, falling back to uniform weighting"
            );
            let uniform = 1.0 / regions.len() as f64;
            (vec![uniform; regions.len()], true)
        };

        let partitions = regions
            .iter()
            .enumerate()
            .map(|(i, region)| ModalPartition {
                id: ids[i],
                basin_label: Some(region.basin_label.clone()),
                payload: payloads[i].clone(),
                plausibility: plausibilities[i],
                moral_weight: moral_weights[i],
                weight: weights[i],
                siblings: ids
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, id)| *id)
                    .collect(),
            })
            .collect();

        debug!(
            partition_count = regions.len(),
            degraded_weighting, "modal partitions assembled"
        );
        Ok(PartitionOutcome {
            partitions,
            degraded_weighting,
        })
    }

    /// Numerically stable softmax over negative center distances.
    fn plausibilities(
        &self,
        event: &BifurcationEvent,
        regions: &[InflatedRegion],
    ) -> DeferralResult<Vec<f64>> {
        let mut logits = Vec::with_capacity(regions.len());
        for region in regions {
            logits.push(-event.point.distance(&region.center)? / self.temperature);
        }
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        Ok(exps.iter().map(|e| e / sum).collect())
    }
}
