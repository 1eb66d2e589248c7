//! `assembly_core` — Frame-sequential track assembly pipeline.
//!
//! Consumes a stream of detector read-out frames carrying compressed hit
//! clusters, runs a frame-local track-finding step through pluggable
//! collaborators, and re-assembles the per-frame results into contiguous,
//! globally-addressable output buffers.
//!
//! # Module layout
//! - [`types`]      — Fundamental types (frames, clusters, ranges, MC labels)
//! - [`cursor`]     — Sequential cursor over the shared pattern byte-stream
//! - [`frame`]      — Per-frame cluster working set
//! - [`track`]      — Track candidates and output tracks
//! - [`loader`]     — Frame-loading collaborator contract
//! - [`finder`]     — Track-finding / label-association contracts
//! - [`aggregator`] — Merge of candidates into the global output buffers
//! - [`pipeline`]   — Frame loop, read-out gating, run counters
//! - [`metrics`]    — Per-run counters
//! - [`error`]      — Error taxonomy

pub mod aggregator;
pub mod cursor;
pub mod error;
pub mod finder;
pub mod frame;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod track;
pub mod types;

pub use aggregator::TrackAssembly;
pub use cursor::PatternCursor;
pub use error::AssemblyError;
pub use finder::{FrameTrackFinder, LabelAssociator};
pub use frame::{FrameWorkingSet, SpacePoint};
pub use loader::FrameLoader;
pub use metrics::RunCounters;
pub use pipeline::{FrameInput, Pipeline, PipelineConfig, PipelineOutput};
pub use track::{FrameCandidates, OutputTrack, TrackCandidate, TrackFit, TrackKind};
pub use types::{
    ClusterId, ClusterLabels, CompactCluster, FrameId, FrameTrackRange, InteractionRecord,
    Mc2FrameRecord, McLabel, ReadOutFrame,
};
