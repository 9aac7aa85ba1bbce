//! Bounded, thread-safe history of diagnostic metrics.

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use deferral_types::{DeferralError, DeferralResult, TelemetrySnapshot};

/// Numeric metrics tracked per snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Conscience-latency estimate.
    Cli,
    /// Gradient-decoherence score.
    Gds,
    /// Semantic-viscosity score.
    Svm,
    /// Coherence checksum.
    Checksum,
    /// Incoherence flux.
    Flux,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Cli,
        Metric::Gds,
        Metric::Svm,
        Metric::Checksum,
        Metric::Flux,
    ];

    fn extract(&self, snapshot: &TelemetrySnapshot) -> f64 {
        match self {
            Metric::Cli => snapshot.cli,
            Metric::Gds => snapshot.gds,
            Metric::Svm => snapshot.svm,
            Metric::Checksum => snapshot.checksum,
            Metric::Flux => snapshot.flux,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Cli => write!(f, "cli"),
            Metric::Gds => write!(f, "gds"),
            Metric::Svm => write!(f, "svm"),
            Metric::Checksum => write!(f, "checksum"),
            Metric::Flux => write!(f, "flux"),
        }
    }
}

struct StoreInner {
    next_index: u64,
    latest: Option<TelemetrySnapshot>,
    series: HashMap<Metric, VecDeque<(u64, f64)>>,
}

impl StoreInner {
    fn empty() -> Self {
        Self {
            next_index: 0,
            latest: None,
            series: HashMap::new(),
        }
    }
}

/// Capacity-bounded history of [`TelemetrySnapshot`]s, one series per
/// metric, oldest entries evicted on overflow.
///
/// All mutation happens inside a single write lock, so sequence indices
/// stay monotonic under concurrent callers; readers see the most recently
/// committed state without blocking writers indefinitely.
pub struct TelemetryStore {
    capacity: usize,
    inner: RwLock<StoreInner>,
}

impl TelemetryStore {
    /// Create a store retaining at most `capacity` entries per metric.
    pub fn new(capacity: usize) -> DeferralResult<Self> {
        if capacity == 0 {
            return Err(DeferralError::InvalidConfig(
                "telemetry capacity must be > 0".into(),
            ));
        }
        Ok(Self {
            capacity,
            inner: RwLock::new(StoreInner::empty()),
        })
    }

    /// Append a snapshot to every metric series, returning its sequence
    /// index. Eviction of the oldest entry is normal operation, never an
    /// error.
    pub fn record(&self, snapshot: TelemetrySnapshot) -> u64 {
        let mut inner = self.inner.write().expect("telemetry store lock poisoned");
        let index = inner.next_index;
        inner.next_index += 1;
        for metric in Metric::ALL {
            let value = metric.extract(&snapshot);
            let series = inner.series.entry(metric).or_default();
            if series.len() >= self.capacity {
                series.pop_front();
            }
            series.push_back((index, value));
        }
        inner.latest = Some(snapshot);
        index
    }

    /// The most recently committed snapshot, if any was recorded.
    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        self.inner
            .read()
            .expect("telemetry store lock poisoned")
            .latest
            .clone()
    }

    /// Retained values of one metric whose sequence index falls in
    /// `range`, ordered by index.
    pub fn query(&self, metric: Metric, range: Range<u64>) -> Vec<(u64, f64)> {
        let inner = self.inner.read().expect("telemetry store lock poisoned");
        inner
            .series
            .get(&metric)
            .map(|series| {
                series
                    .iter()
                    .filter(|(index, _)| range.contains(index))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of snapshots currently retained.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("telemetry store lock poisoned");
        inner
            .series
            .get(&Metric::Checksum)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all history and restart sequence numbering.
    pub fn reset(&self) {
        let mut inner = self.inner.write().expect("telemetry store lock poisoned");
        let dropped = inner.next_index;
        *inner = StoreInner::empty();
        debug!(dropped, "telemetry store reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferral_types::EpistemicStatus;

    fn snapshot(checksum: f64) -> TelemetrySnapshot {
        TelemetrySnapshot::new(1.0, 0.5, 0.25, checksum, 0.0, EpistemicStatus::Nominal)
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(TelemetryStore::new(0).is_err());
    }

    #[test]
    fn record_and_latest() {
        let store = TelemetryStore::new(4).unwrap();
        assert!(store.latest().is_none());
        store.record(snapshot(1.0));
        store.record(snapshot(2.0));
        assert_eq!(store.latest().unwrap().checksum, 2.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn indices_are_monotonic() {
        let store = TelemetryStore::new(4).unwrap();
        let a = store.record(snapshot(1.0));
        let b = store.record(snapshot(2.0));
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = TelemetryStore::new(3).unwrap();
        for i in 0..5 {
            store.record(snapshot(i as f64));
        }
        assert_eq!(store.len(), 3);
        let series = store.query(Metric::Checksum, 0..u64::MAX);
        assert_eq!(series, vec![(2, 2.0), (3, 3.0), (4, 4.0)]);
    }

    #[test]
    fn query_filters_by_range() {
        let store = TelemetryStore::new(10).unwrap();
        for i in 0..6 {
            store.record(snapshot(i as f64));
        }
        let series = store.query(Metric::Checksum, 2..4);
        assert_eq!(series, vec![(2, 2.0), (3, 3.0)]);
    }

    #[test]
    fn query_unknown_range_is_empty() {
        let store = TelemetryStore::new(4).unwrap();
        store.record(snapshot(1.0));
        assert!(store.query(Metric::Flux, 10..20).is_empty());
    }

    #[test]
    fn every_metric_gets_a_series() {
        let store = TelemetryStore::new(4).unwrap();
        let s = TelemetrySnapshot::new(7.0, 0.5, 0.25, 3.0, -1.0, EpistemicStatus::Elevated);
        store.record(s);
        assert_eq!(store.query(Metric::Cli, 0..1), vec![(0, 7.0)]);
        assert_eq!(store.query(Metric::Gds, 0..1), vec![(0, 0.5)]);
        assert_eq!(store.query(Metric::Svm, 0..1), vec![(0, 0.25)]);
        assert_eq!(store.query(Metric::Flux, 0..1), vec![(0, -1.0)]);
    }

    #[test]
    fn reset_clears_history_and_indices() {
        let store = TelemetryStore::new(4).unwrap();
        store.record(snapshot(1.0));
        store.reset();
        assert!(store.is_empty());
        assert!(store.latest().is_none());
        assert_eq!(store.record(snapshot(2.0)), 0);
    }

    #[test]
    fn concurrent_writers_keep_indices_unique() {
        use std::sync::Arc;

        let store = Arc::new(TelemetryStore::new(64).unwrap());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                (0..16).map(|i| store.record(snapshot(i as f64))).collect::<Vec<_>>()
            }));
        }
        let mut indices: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 64);
        assert_eq!(store.len(), 64);
    }

    #[test]
    fn metric_display_names() {
        assert_eq!(format!("{}", Metric::Cli), "cli");
        assert_eq!(format!("{}", Metric::Checksum), "checksum");
    }

    #[test]
    fn metric_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Metric::Gds).unwrap(), "\"gds\"");
        assert_eq!(
            serde_json::to_string(&Metric::Checksum).unwrap(),
            "\"checksum\""
        );
    }
}
