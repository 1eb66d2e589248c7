//! Per-run counters, accumulated by the pipeline for reporting.

use serde::{Deserialize, Serialize};

/// Running totals over one pipeline invocation. Reporting only — output
/// correctness never depends on these.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunCounters {
    /// Frames seen (including empty ones).
    pub n_frames: u64,
    /// Frames that yielded zero usable clusters.
    pub n_empty_frames: u64,
    /// Usable clusters loaded across all frames.
    pub n_clusters_used: u64,
    /// Tracks found by the linear pass.
    pub n_linear_tracks: u64,
    /// Tracks found by the cellular-automaton pass.
    pub n_cellular_tracks: u64,
    /// Total tracks pushed to the output buffer.
    pub n_tracks_total: u64,
    /// Wall-clock duration of the run (µs).
    pub elapsed_us: u64,
}

impl RunCounters {
    /// Mean tracks per non-empty frame.
    pub fn tracks_per_active_frame(&self) -> f64 {
        let active = self.n_frames.saturating_sub(self.n_empty_frames);
        if active == 0 {
            0.0
        } else {
            self.n_tracks_total as f64 / active as f64
        }
    }
}
