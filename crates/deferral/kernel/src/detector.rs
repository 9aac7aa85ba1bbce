//! Singularity detection: decides whether a point is pulled in mutually
//! incompatible directions by two or more basins.

use tracing::debug;

use deferral_types::{
    BasinSet, BifurcationEvent, DeferralError, DeferralResult, LatentPoint,
};

/// Detects bifurcation events from pairwise projection divergence.
///
/// A basin pair conflicts when the absolute difference of the point's
/// directional projections exceeds `epsilon_axiom` *and* the projections
/// carry different signs. Among conflicting pairs the one with maximum
/// divergence wins; ties go to the lexicographically smallest label pair,
/// so repeated runs over the same inputs select the same pair.
pub struct SingularityDetector {
    epsilon_axiom: f64,
}

impl SingularityDetector {
    pub fn new(epsilon_axiom: f64) -> DeferralResult<Self> {
        if !(epsilon_axiom > 0.0) {
            return Err(DeferralError::InvalidConfig(format!(
                "epsilon_axiom must be > 0, got {}",
                epsilon_axiom
            )));
        }
        Ok(Self { epsilon_axiom })
    }

    /// Pure function of its inputs: no state is touched on either path.
    /// `None` is the common, nominal outcome — including for sets with
    /// fewer than two basins, where no pair exists to conflict.
    pub fn detect(
        &self,
        point: &LatentPoint,
        basins: &BasinSet,
    ) -> DeferralResult<Option<BifurcationEvent>> {
        let mut projections = Vec::with_capacity(basins.len());
        for basin in basins.iter() {
            projections.push((basin.label.as_str(), point.dot(&basin.vector)?));
        }

        // Basin iteration is lexicographic, so pairs are enumerated in
        // lexicographic pair order and a strict `>` keeps the smallest
        // pair among divergence ties.
        let mut selected: Option<(&str, &str, f64)> = None;
        for (i, &(label_a, proj_a)) in projections.iter().enumerate() {
            for &(label_b, proj_b) in &projections[i + 1..] {
                let divergence = (proj_a - proj_b).abs();
                if divergence <= self.epsilon_axiom || sign(proj_a) == sign(proj_b) {
                    continue;
                }
                if selected.map_or(true, |(_, _, best)| divergence > best) {
                    selected = Some((label_a, label_b, divergence));
                }
            }
        }

        Ok(selected.map(|(label_a, label_b, divergence)| {
            debug!(
                basin_a = label_a,
                basin_b = label_b,
                divergence,
                epsilon = self.epsilon_axiom,
                "bifurcation event detected"
            );
            BifurcationEvent::new(label_a, label_b, divergence, point.clone())
        }))
    }

    /// Maximum pairwise projection divergence across the whole set,
    /// regardless of sign agreement. Feeds the gradient-decoherence
    /// metric; 0 for sets with fewer than two basins.
    pub fn max_divergence(
        &self,
        point: &LatentPoint,
        basins: &BasinSet,
    ) -> DeferralResult<f64> {
        let mut projections = Vec::with_capacity(basins.len());
        for basin in basins.iter() {
            projections.push(point.dot(&basin.vector)?);
        }
        let mut max = 0.0f64;
        for (i, &a) in projections.iter().enumerate() {
            for &b in &projections[i + 1..] {
                max = max.max((a - b).abs());
            }
        }
        Ok(max)
    }
}

/// Three-valued sign: zero is its own sign, distinct from both positive
/// and negative. (`f64::signum` maps 0.0 to 1.0, which is not wanted
/// here: an orthogonal projection agrees with neither direction.)
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferral_types::AttractorBasin;

    fn pt(coords: &[f64]) -> LatentPoint {
        LatentPoint::new(coords.to_vec()).unwrap()
    }

    fn basins(entries: &[(&str, &[f64])]) -> BasinSet {
        let mut set = BasinSet::new();
        for (label, coords) in entries {
            set.insert(AttractorBasin::new(*label, pt(coords))).unwrap();
        }
        set
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        assert!(SingularityDetector::new(0.0).is_err());
        assert!(SingularityDetector::new(-1.0).is_err());
        assert!(SingularityDetector::new(f64::NAN).is_err());
    }

    #[test]
    fn detects_opposed_basins() {
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[1.0, 0.0]), ("B", &[-1.0, 0.0])]);
        let event = detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().unwrap();
        assert_eq!(event.basins, ["A".to_string(), "B".to_string()]);
        assert_eq!(event.divergence, 2.0);
    }

    #[test]
    fn no_event_below_epsilon() {
        let detector = SingularityDetector::new(10.0).unwrap();
        let set = basins(&[("A", &[1.0, 0.0]), ("B", &[-1.0, 0.0])]);
        assert!(detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().is_none());
    }

    #[test]
    fn no_event_when_signs_agree() {
        // Divergence 2.0 clears epsilon, but both projections are positive.
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[1.0, 0.0]), ("B", &[3.0, 0.0])]);
        assert!(detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().is_none());
    }

    #[test]
    fn no_event_for_single_basin() {
        let detector = SingularityDetector::new(0.1).unwrap();
        let set = basins(&[("A", &[1.0, 0.0])]);
        assert!(detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().is_none());
    }

    #[test]
    fn zero_projection_counts_as_distinct_sign() {
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[0.0, 1.0]), ("B", &[1.0, 0.0])]);
        let event = detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().unwrap();
        assert_eq!(event.divergence, 1.0);
    }

    #[test]
    fn selects_maximum_divergence() {
        let detector = SingularityDetector::new(0.1).unwrap();
        let set = basins(&[
            ("near", &[-0.5, 0.0]),
            ("far", &[-3.0, 0.0]),
            ("pos", &[1.0, 0.0]),
        ]);
        let event = detector.detect(&pt(&[1.0, 0.0]), &set).unwrap().unwrap();
        assert_eq!(event.basins, ["far".to_string(), "pos".to_string()]);
        assert_eq!(event.divergence, 4.0);
    }

    #[test]
    fn ties_break_to_lexicographically_smallest_pair() {
        // (A, B) and (B, C) both reach divergence 2.0.
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[
            ("A", &[-1.0, 0.0]),
            ("B", &[1.0, 0.0]),
            ("C", &[-1.0, 0.0]),
        ]);
        let point = pt(&[1.0, 0.0]);
        let event = detector.detect(&point, &set).unwrap().unwrap();
        assert_eq!(event.basins, ["A".to_string(), "B".to_string()]);

        // Deterministic across repeated runs.
        let again = detector.detect(&point, &set).unwrap().unwrap();
        assert_eq!(again.basins, event.basins);
        assert_eq!(again.divergence, event.divergence);
    }

    #[test]
    fn dimension_mismatch_propagates() {
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[1.0, 0.0]), ("B", &[-1.0, 0.0])]);
        assert!(matches!(
            detector.detect(&pt(&[1.0, 0.0, 0.0]), &set),
            Err(DeferralError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn max_divergence_ignores_sign_agreement() {
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[1.0, 0.0]), ("B", &[3.0, 0.0])]);
        assert_eq!(detector.max_divergence(&pt(&[1.0, 0.0]), &set).unwrap(), 2.0);
    }

    #[test]
    fn max_divergence_zero_for_single_basin() {
        let detector = SingularityDetector::new(0.5).unwrap();
        let set = basins(&[("A", &[1.0])]);
        assert_eq!(detector.max_divergence(&pt(&[2.0]), &set).unwrap(), 0.0);
    }
}
