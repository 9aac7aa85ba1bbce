#![deny(unsafe_code)]
//! # deferral-types
//!
//! Data model for the deferral kernel: latent points and attractor basins,
//! the per-request conflict artifacts (bifurcation events, inflated
//! regions, modal partitions), diagnostic sample/snapshot types, kernel
//! configuration, the error taxonomy, and the two injectable capability
//! seams ([`Decoder`], [`MoralEvaluator`]).
//!
//! Pure data and validation — the pipeline logic lives in
//! `deferral-kernel`, the bounded metric history in `deferral-telemetry`.

pub mod basin;
pub mod capability;
pub mod config;
pub mod error;
pub mod event;
pub mod point;
pub mod response;
pub mod telemetry;

pub use basin::{AttractorBasin, BasinSet};
pub use capability::{Decoder, MoralEvaluator, RegionSummaryDecoder, UniformMoralEvaluator};
pub use config::KernelConfig;
pub use error::{DeferralError, DeferralResult};
pub use event::{BifurcationEvent, InflatedRegion, ModalPartition, PartitionId};
pub use point::LatentPoint;
pub use response::DeferralResponse;
pub use telemetry::{CoherenceSample, EpistemicStatus, TelemetrySnapshot};
