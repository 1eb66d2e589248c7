//! Track candidates and output tracks.

use crate::types::ClusterId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which finder pass produced a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    /// Linear track finder: road following from a straight-line seed.
    Linear,
    /// Cellular-automaton pass over the clusters the linear pass left behind.
    CellularAutomaton,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Linear => write!(f, "LTF"),
            TrackKind::CellularAutomaton => write!(f, "CA"),
        }
    }
}

/// Geometric/kinematic fit parameters of a track. Produced by the finder and
/// copied verbatim into the output track; the assembly stage never inspects
/// them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackFit {
    /// Position of the innermost point (cm).
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Azimuthal angle (rad).
    pub phi: f64,
    /// Dip: tan(lambda).
    pub tanl: f64,
    /// Signed inverse transverse momentum estimate (1/GeV); 0 without field.
    pub inv_qpt: f64,
}

/// An unmerged, frame-local track hypothesis.
///
/// `clusters` holds frame-local indices into the originating
/// [`FrameWorkingSet`](crate::frame::FrameWorkingSet), in detector-point
/// order. The candidate is consumed when merged into the global output.
#[derive(Clone, Debug, Default)]
pub struct TrackCandidate {
    pub clusters: Vec<usize>,
    pub fit: TrackFit,
}

impl TrackCandidate {
    pub fn new(clusters: Vec<usize>, fit: TrackFit) -> Self {
        Self { clusters, fit }
    }

    pub fn n_points(&self) -> usize {
        self.clusters.len()
    }
}

/// The two candidate populations one frame produces. Within a frame the
/// linear list is always merged before the cellular-automaton list; this
/// order defines the final track ordering and must not change.
#[derive(Clone, Debug, Default)]
pub struct FrameCandidates {
    pub linear: Vec<TrackCandidate>,
    pub cellular: Vec<TrackCandidate>,
}

impl FrameCandidates {
    pub fn total(&self) -> usize {
        self.linear.len() + self.cellular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linear.is_empty() && self.cellular.is_empty()
    }
}

/// The externally visible track record.
///
/// Invariant: the global cluster-index buffer entries
/// `[cluster_offset, cluster_offset + n_points)` are exactly this track's
/// cluster ids, in candidate-internal order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputTrack {
    pub fit: TrackFit,
    pub kind: TrackKind,
    /// Index into the global cluster-index buffer where this track's own
    /// cluster ids begin.
    pub cluster_offset: usize,
    pub n_points: usize,
}

impl OutputTrack {
    /// The slice of `cluster_indices` belonging to this track.
    pub fn cluster_ids<'a>(&self, cluster_indices: &'a [ClusterId]) -> &'a [ClusterId] {
        &cluster_indices[self.cluster_offset..self.cluster_offset + self.n_points]
    }
}
