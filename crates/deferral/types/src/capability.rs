//! Capability seams for the two injectable collaborators: decoding an
//! inflated region into a payload, and assigning it a moral weight.
//!
//! Both are narrow, named interfaces rather than ad hoc callables, so a
//! caller can supply a submodel-backed implementation while tests stay
//! deterministic.

use serde_json::{json, Value};

use crate::event::InflatedRegion;

/// Decodes an inflated region into an opaque payload.
///
/// Implementations must be deterministic for a given region: the
/// partitioner's output weights are reproducible only if decoding is.
pub trait Decoder: Send + Sync {
    fn decode(&self, region: &InflatedRegion) -> Value;
}

/// Assigns a desirability score to a decoded payload.
///
/// Scores are clipped to [0, 1] by the partitioner; implementations may
/// return any finite value.
pub trait MoralEvaluator: Send + Sync {
    fn evaluate(&self, payload: &Value) -> f64;
}

/// Default decoder: a deterministic JSON summary of the region — its basin
/// label, center, radius, and the orientation of the center-coordinate sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionSummaryDecoder;

impl Decoder for RegionSummaryDecoder {
    fn decode(&self, region: &InflatedRegion) -> Value {
        let sum: f64 = region.center.as_slice().iter().sum();
        json!({
            "basin_label": region.basin_label,
            "center": region.center.as_slice(),
            "radius": region.radius,
            "lean": if sum > 0.0 { "affirmative" } else { "cautionary" },
        })
    }
}

/// Default moral evaluator: weight 1.0 for every payload, leaving the
/// fused weights purely geometric. Used when no evaluator is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformMoralEvaluator;

impl MoralEvaluator for UniformMoralEvaluator {
    fn evaluate(&self, _payload: &Value) -> f64 {
        1.0
    }
}
