//! Latent point arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::{DeferralError, DeferralResult};

/// An immutable, fixed-dimension point in the caller's latent space.
///
/// All vectors participating in one request must share the same dimension;
/// every pairwise operation checks this and fails with
/// [`DeferralError::InvalidDimension`] on disagreement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatentPoint(Vec<f64>);

impl LatentPoint {
    /// Construct a point from its coordinates. Zero-dimensional points are
    /// rejected.
    pub fn new(coords: Vec<f64>) -> DeferralResult<Self> {
        if coords.is_empty() {
            return Err(DeferralError::InvalidDimension {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self(coords))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Dot product with another point of the same dimension.
    pub fn dot(&self, other: &LatentPoint) -> DeferralResult<f64> {
        self.check_dim(other)?;
        Ok(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Euclidean distance to another point of the same dimension.
    pub fn distance(&self, other: &LatentPoint) -> DeferralResult<f64> {
        self.check_dim(other)?;
        Ok(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt())
    }

    /// Componentwise midpoint with another point of the same dimension.
    pub fn midpoint(&self, other: &LatentPoint) -> DeferralResult<LatentPoint> {
        self.check_dim(other)?;
        Ok(Self(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| (a + b) / 2.0)
                .collect(),
        ))
    }

    fn check_dim(&self, other: &LatentPoint) -> DeferralResult<()> {
        if self.dim() != other.dim() {
            return Err(DeferralError::InvalidDimension {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }
}
