//! Pipeline error taxonomy.
//!
//! Only two failure classes escape the pipeline: configuration problems
//! (fatal before any frame is touched) and track-finder failures (fatal
//! mid-run, since buffer offsets are only meaningful for fully-completed
//! frames). Per-frame decode problems never surface as errors; the loader
//! absorbs them as "zero usable clusters".

use crate::types::FrameId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Required run conditions or collaborator wiring is missing/inconsistent.
    #[error("invalid pipeline configuration: {0}")]
    Config(String),

    /// The track finder failed on a frame. No partial results are kept.
    #[error("track finder failed on frame {frame}: {reason}")]
    TrackFinder { frame: FrameId, reason: String },
}
