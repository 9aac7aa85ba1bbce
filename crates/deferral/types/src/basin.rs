//! Attractor basins — the named reference vectors a point is evaluated
//! against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DeferralError, DeferralResult};
use crate::point::LatentPoint;

/// A named reference vector representing one fixed interpretive stance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttractorBasin {
    /// The axiom this basin represents.
    pub label: String,
    /// Reference vector, same dimension as every other vector in a request.
    pub vector: LatentPoint,
}

impl AttractorBasin {
    pub fn new(label: impl Into<String>, vector: LatentPoint) -> Self {
        Self {
            label: label.into(),
            vector,
        }
    }
}

/// The set of basins for one request: a label-to-basin mapping with unique
/// labels and a uniform vector dimension.
///
/// Backed by a `BTreeMap` so iteration order is the lexicographic label
/// order — the detector's pair enumeration and tie-break depend on this.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasinSet {
    basins: BTreeMap<String, AttractorBasin>,
}

impl BasinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a basin. The first insert fixes the set's dimension; any
    /// later basin of a different dimension is rejected. Inserting under an
    /// existing label replaces that basin (labels are unique).
    pub fn insert(&mut self, basin: AttractorBasin) -> DeferralResult<()> {
        if let Some(dim) = self.dim() {
            if basin.vector.dim() != dim {
                return Err(DeferralError::InvalidDimension {
                    expected: dim,
                    actual: basin.vector.dim(),
                });
            }
        }
        self.basins.insert(basin.label.clone(), basin);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&AttractorBasin> {
        self.basins.get(label)
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    /// Dimension shared by every basin, or `None` for an empty set.
    pub fn dim(&self) -> Option<usize> {
        self.basins.values().next().map(|b| b.vector.dim())
    }

    /// Basins in lexicographic label order.
    pub fn iter(&self) -> impl Iterator<Item = &AttractorBasin> {
        self.basins.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.basins.keys().map(String::as_str)
    }
}
