//! Track-finding and label-association collaborator contracts.

use crate::error::AssemblyError;
use crate::frame::FrameWorkingSet;
use crate::track::{FrameCandidates, TrackCandidate};
use crate::types::McLabel;

/// Produces the two per-frame candidate populations from a loaded working
/// set.
///
/// Implementations must be deterministic for a given working set and
/// configuration. Field strength and tracking configuration are supplied
/// once at construction, not per frame. A returned error aborts the whole
/// run.
pub trait FrameTrackFinder {
    fn find_tracks(&mut self, ws: &FrameWorkingSet) -> Result<FrameCandidates, AssemblyError>;
}

/// Computes one MC label per candidate.
///
/// Called while the frame-local candidates and working set are still alive,
/// before the merge discards them. Pure function of the candidate and the
/// frame's truth container.
pub trait LabelAssociator {
    fn label_for(&self, candidate: &TrackCandidate, ws: &FrameWorkingSet) -> McLabel;
}
