//! Boundary inflation: expands a confidence region around each basin
//! involved in a bifurcation event.

use tracing::debug;

use deferral_types::{
    AttractorBasin, DeferralError, DeferralResult, InflatedRegion, LatentPoint,
};

/// Computes expanded confidence regions.
///
/// The region center is the midpoint of the triggering point and the
/// basin's vector; the radius scales the caller-supplied variance by
/// `gamma`. A `gamma <= 1` would deflate instead of inflate and is
/// rejected outright — no silent clamping.
pub struct ManifoldInflator {
    gamma: f64,
}

impl ManifoldInflator {
    pub fn new(gamma: f64) -> DeferralResult<Self> {
        if !(gamma > 1.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "gamma must be > 1, got {}",
                gamma
            )));
        }
        Ok(Self { gamma })
    }

    /// Called once per basin involved in the selected event. `variance`
    /// is a non-negative scalar supplied by the caller; zero yields a
    /// valid single-point region.
    pub fn inflate(
        &self,
        point: &LatentPoint,
        basin: &AttractorBasin,
        variance: f64,
    ) -> DeferralResult<InflatedRegion> {
        if !(variance >= 0.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "variance must be >= 0, got {}",
                variance
            )));
        }
        let center = point.midpoint(&basin.vector)?;
        let radius = self.gamma * variance.sqrt();
        debug!(basin = %basin.label, radius, "inflated confidence region");
        Ok(InflatedRegion {
            basin_label: basin.label.clone(),
            center,
            radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(coords: &[f64]) -> LatentPoint {
        LatentPoint::new(coords.to_vec()).unwrap()
    }

    #[test]
    fn rejects_gamma_at_or_below_one() {
        assert!(ManifoldInflator::new(1.0).is_err());
        assert!(ManifoldInflator::new(0.5).is_err());
        assert!(ManifoldInflator::new(f64::NAN).is_err());
    }

    #[test]
    fn accepts_gamma_just_above_one() {
        assert!(ManifoldInflator::new(1.0001).is_ok());
    }

    #[test]
    fn center_is_midpoint() {
        let inflator = ManifoldInflator::new(2.0).unwrap();
        let basin = AttractorBasin::new("A", pt(&[1.0, 0.0]));
        let region = inflator.inflate(&pt(&[0.0, 1.0]), &basin, 0.0).unwrap();
        assert_eq!(region.center, pt(&[0.5, 0.5]));
        assert_eq!(region.basin_label, "A");
    }

    #[test]
    fn radius_scales_root_variance() {
        let inflator = ManifoldInflator::new(2.0).unwrap();
        let basin = AttractorBasin::new("A", pt(&[1.0]));
        let region = inflator.inflate(&pt(&[0.0]), &basin, 4.0).unwrap();
        assert_eq!(region.radius, 4.0); // 2.0 * sqrt(4.0)
    }

    #[test]
    fn zero_variance_yields_point_region() {
        let inflator = ManifoldInflator::new(1.5).unwrap();
        let basin = AttractorBasin::new("A", pt(&[1.0]));
        let region = inflator.inflate(&pt(&[0.0]), &basin, 0.0).unwrap();
        assert_eq!(region.radius, 0.0);
    }

    #[test]
    fn negative_variance_rejected() {
        let inflator = ManifoldInflator::new(1.5).unwrap();
        let basin = AttractorBasin::new("A", pt(&[1.0]));
        assert!(inflator.inflate(&pt(&[0.0]), &basin, -0.1).is_err());
    }

    #[test]
    fn dimension_mismatch_propagates() {
        let inflator = ManifoldInflator::new(1.5).unwrap();
        let basin = AttractorBasin::new("A", pt(&[1.0, 0.0]));
        assert!(matches!(
            inflator.inflate(&pt(&[0.0]), &basin, 0.0),
            Err(DeferralError::InvalidDimension { .. })
        ));
    }
}
