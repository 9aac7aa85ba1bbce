#![deny(unsafe_code)]
//! # deferral-kernel
//!
//! The conflict-detection → region-expansion → weighted-partitioning →
//! trend-feedback pipeline.
//!
//! A decision point is projected onto a set of named attractor basins.
//! When two basins pull it in incompatible directions, the kernel does
//! not force a single resolution: it inflates a confidence region around
//! each conflicting basin, decodes both into weighted modal partitions,
//! and reports the tension through a running coherence checksum whose
//! rate of change drives an escalation state machine. Escalated responses
//! carry an introspection note and an advisory deceleration delay — the
//! kernel itself never sleeps.

pub mod coherence;
pub mod detector;
pub mod inflator;
pub mod orchestrator;
pub mod partitioner;

pub use coherence::{projection_variance, CoherenceTracker, CoherenceUpdate};
pub use detector::SingularityDetector;
pub use inflator::ManifoldInflator;
pub use orchestrator::DeferralOrchestrator;
pub use partitioner::{ModalPartitioner, PartitionOutcome};
