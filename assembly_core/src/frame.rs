//! Per-frame working set: the decoded clusters of one read-out frame.

use crate::types::{ClusterId, FrameId, McLabel};
use nalgebra::Vector3;

/// One decoded hit usable for track finding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacePoint {
    /// Hit position in the detector frame (cm).
    pub xyz: Vector3<f64>,
    /// Detector plane the hit sits on, counted from the interaction point.
    pub layer: u8,
}

/// The frame-local cluster working set filled by a [`FrameLoader`] and
/// consumed by a [`FrameTrackFinder`].
///
/// Track candidates reference clusters by index into `points`; the parallel
/// `global_ids` vector carries the translation back into the run-wide
/// cluster numbering. The set is reset and refilled for every frame, never
/// shared between frames.
///
/// [`FrameLoader`]: crate::loader::FrameLoader
/// [`FrameTrackFinder`]: crate::finder::FrameTrackFinder
#[derive(Clone, Debug, Default)]
pub struct FrameWorkingSet {
    frame_id: FrameId,
    points: Vec<SpacePoint>,
    global_ids: Vec<ClusterId>,
    /// Per-cluster MC labels, parallel to `points`. Empty when MC is off.
    labels: Vec<McLabel>,
}

impl FrameWorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-frame state and stamp the set with the new frame id.
    /// Keeps allocations for reuse across frames.
    pub fn reset(&mut self, frame_id: FrameId) {
        self.frame_id = frame_id;
        self.points.clear();
        self.global_ids.clear();
        self.labels.clear();
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Append one usable cluster. `label` must be given for every cluster or
    /// for none within a frame.
    pub fn push_cluster(&mut self, point: SpacePoint, global_id: ClusterId, label: Option<McLabel>) {
        self.points.push(point);
        self.global_ids.push(global_id);
        if let Some(l) = label {
            self.labels.push(l);
        }
        debug_assert!(self.labels.is_empty() || self.labels.len() == self.points.len());
    }

    /// Number of usable clusters in the frame.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SpacePoint] {
        &self.points
    }

    pub fn point(&self, local: usize) -> &SpacePoint {
        &self.points[local]
    }

    /// Translate a frame-local cluster index into its global cluster id.
    pub fn global_id(&self, local: usize) -> ClusterId {
        self.global_ids[local]
    }

    /// MC label of a frame-local cluster; `None` when MC is off.
    pub fn label(&self, local: usize) -> Option<McLabel> {
        self.labels.get(local).copied()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(layer: u8) -> SpacePoint {
        SpacePoint { xyz: Vector3::new(0.0, 0.0, -45.0), layer }
    }

    #[test]
    fn reset_clears_but_keeps_frame_id() {
        let mut ws = FrameWorkingSet::new();
        ws.push_cluster(point(0), ClusterId(12), Some(McLabel::new(0, 3)));
        ws.push_cluster(point(1), ClusterId(13), Some(McLabel::new(0, 3)));
        assert_eq!(ws.len(), 2);
        assert!(ws.has_labels());

        ws.reset(FrameId(4));
        assert!(ws.is_empty());
        assert!(!ws.has_labels());
        assert_eq!(ws.frame_id(), FrameId(4));
    }

    #[test]
    fn local_to_global_translation() {
        let mut ws = FrameWorkingSet::new();
        ws.push_cluster(point(0), ClusterId(40), None);
        ws.push_cluster(point(2), ClusterId(44), None);
        assert_eq!(ws.global_id(0), ClusterId(40));
        assert_eq!(ws.global_id(1), ClusterId(44));
        assert_eq!(ws.label(0), None);
    }
}
