//! Per-request artifacts of the conflict pipeline: bifurcation events,
//! inflated regions, and modal partitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::point::LatentPoint;

/// Identifier of one modal partition within a response.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartitionId(Uuid);

impl PartitionId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A detected pair of basins pulling a point in incompatible directions.
///
/// Transient: created per request and discarded once the response is
/// assembled. The triggering point is carried for downstream partitioning
/// but never serialized.
#[derive(Clone, Debug, Serialize)]
pub struct BifurcationEvent {
    /// The conflicting pair, lexicographically smallest label first.
    pub basins: [String; 2],
    /// Absolute difference of the two directional projections.
    pub divergence: f64,
    /// The point that triggered the event.
    #[serde(skip)]
    pub point: LatentPoint,
}

impl BifurcationEvent {
    /// Build an event, normalizing the label pair into lexicographic order.
    pub fn new(a: impl Into<String>, b: impl Into<String>, divergence: f64, point: LatentPoint) -> Self {
        let (a, b) = (a.into(), b.into());
        let basins = if a <= b { [a, b] } else { [b, a] };
        Self {
            basins,
            divergence,
            point,
        }
    }
}

/// An expanded confidence region around one conflicting basin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InflatedRegion {
    /// The basin this region derives from.
    pub basin_label: String,
    /// Midpoint of the triggering point and the basin vector.
    pub center: LatentPoint,
    /// Non-negative expansion radius; zero yields a single-point region.
    pub radius: f64,
}

/// One weighted candidate output branch tied to a single basin, aware of
/// its sibling branches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModalPartition {
    pub id: PartitionId,
    /// Basin the branch derives from; `None` for the implicit pass-through
    /// partition on the nominal path.
    pub basin_label: Option<String>,
    /// Opaque decoded payload, produced by the injected [`crate::Decoder`].
    pub payload: Value,
    /// Geometric closeness weight in [0, 1].
    pub plausibility: f64,
    /// Externally supplied desirability score in [0, 1].
    pub moral_weight: f64,
    /// Normalized fusion of plausibility and moral weight; sums to 1
    /// across the partitions of one event.
    pub weight: f64,
    /// Identifiers of every other partition from the same event.
    pub siblings: Vec<PartitionId>,
}
