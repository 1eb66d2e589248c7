//! Fundamental types used across the entire workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifier types — newtype wrappers so indices are never confused at
// compile time
// ---------------------------------------------------------------------------

/// Index into the run-wide compact-cluster input buffer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClusterId(pub u32);

/// Read-out-frame identifier: position of the frame in the input sequence,
/// zero-based, strictly increasing, no gaps.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FrameId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Read-out frames
// ---------------------------------------------------------------------------

/// Bunch-crossing timestamp of a read-out frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub orbit: u32,
    pub bc: u16,
}

impl fmt::Display for InteractionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.orbit, self.bc)
    }
}

/// One read-out frame descriptor: a time slice of detector activity and the
/// contiguous slice `[first_cluster, first_cluster + n_clusters)` of the
/// run-wide compact-cluster buffer that belongs to it.
///
/// Input frames are never mutated by the pipeline; per-frame track output
/// ranges are reported in a parallel [`FrameTrackRange`] list instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOutFrame {
    pub ir: InteractionRecord,
    pub first_cluster: usize,
    pub n_clusters: usize,
}

/// A frame's contiguous range `[first_entry, first_entry + n_entries)` into
/// the global output track buffer. Ranges never overlap, appear in frame
/// order, and their union covers the whole track buffer with no gaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTrackRange {
    pub first_entry: usize,
    pub n_entries: usize,
}

impl FrameTrackRange {
    pub fn new(first_entry: usize, n_entries: usize) -> Self {
        Self { first_entry, n_entries }
    }

    /// Empty range anchored at the current track count.
    pub fn empty(first_entry: usize) -> Self {
        Self { first_entry, n_entries: 0 }
    }

    /// One past the last track entry of this frame.
    pub fn end(&self) -> usize {
        self.first_entry + self.n_entries
    }
}

// ---------------------------------------------------------------------------
// Compact clusters
// ---------------------------------------------------------------------------

/// Compressed detector hit: pixel address on a chip plus a topology id.
///
/// `pattern_id` either refers to an entry of the topology dictionary or is
/// the raw-pattern escape, in which case the explicit pixel bitmap follows in
/// the shared pattern byte-stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactCluster {
    pub chip_id: u16,
    pub row: u16,
    pub col: u16,
    pub pattern_id: u16,
}

// ---------------------------------------------------------------------------
// Monte-Carlo truth
// ---------------------------------------------------------------------------

/// Monte-Carlo label: which generated particle of which event produced a
/// cluster or track. `event_id`/`track_id` of -1 means no association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct McLabel {
    pub event_id: i32,
    pub track_id: i32,
    /// Set when the label was assigned by majority vote over a mixed set of
    /// contributing clusters rather than a clean association.
    pub fake: bool,
}

impl McLabel {
    pub fn new(event_id: i32, track_id: i32) -> Self {
        Self { event_id, track_id, fake: false }
    }

    /// The "no association" label (noise clusters, unmatched tracks).
    pub fn none() -> Self {
        Self { event_id: -1, track_id: -1, fake: false }
    }

    pub fn is_none(&self) -> bool {
        self.event_id < 0 || self.track_id < 0
    }

    /// Same association, flagged as fake.
    pub fn as_fake(mut self) -> Self {
        self.fake = true;
        self
    }
}

impl Default for McLabel {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for McLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(
                f,
                "E{}T{}{}",
                self.event_id,
                self.track_id,
                if self.fake { " (fake)" } else { "" }
            )
        }
    }
}

/// Per-cluster MC truth for the whole run, indexed by global cluster id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClusterLabels {
    labels: Vec<McLabel>,
}

impl ClusterLabels {
    pub fn new(labels: Vec<McLabel>) -> Self {
        Self { labels }
    }

    pub fn push(&mut self, label: McLabel) {
        self.labels.push(label);
    }

    /// Label of the given cluster; `McLabel::none()` when out of range.
    pub fn get(&self, id: ClusterId) -> McLabel {
        self.labels.get(id.0 as usize).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Mapping from one MC event to the frame span its hits ended up in.
/// Forwarded unchanged alongside the track labels when MC mode is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mc2FrameRecord {
    pub event_id: u32,
    pub first_frame: u32,
    pub last_frame: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_range_end() {
        let r = FrameTrackRange::new(3, 4);
        assert_eq!(r.end(), 7);
        assert_eq!(FrameTrackRange::empty(5).end(), 5);
    }

    #[test]
    fn cluster_labels_out_of_range_is_none() {
        let labels = ClusterLabels::new(vec![McLabel::new(0, 7)]);
        assert_eq!(labels.get(ClusterId(0)), McLabel::new(0, 7));
        assert!(labels.get(ClusterId(1)).is_none());
    }

    #[test]
    fn fake_label_keeps_association() {
        let l = McLabel::new(2, 9).as_fake();
        assert!(l.fake);
        assert!(!l.is_none());
        assert_eq!(format!("{l}"), "E2T9 (fake)");
    }
}
