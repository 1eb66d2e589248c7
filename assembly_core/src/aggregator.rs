//! Global track assembly: merges frame-local candidates into the run-wide
//! output buffers.
//!
//! Three numbering spaces meet here: frame-local cluster indices (valid only
//! inside one working set), the run-wide cluster numbering, and offsets into
//! the append-only global buffers. The merge reconciles them append-then-
//! record: a track's cluster ids are written first, at the offset the track
//! will declare, and only then is the track itself committed.

use crate::frame::FrameWorkingSet;
use crate::track::{OutputTrack, TrackCandidate, TrackKind};
use crate::types::{ClusterId, McLabel};

/// The append-only global output buffers of one run.
///
/// `tracks` is grouped contiguously by frame in processing order;
/// `cluster_indices` grows monotonically and is never reordered. `labels`
/// stays parallel to `tracks` (empty when MC is off).
#[derive(Clone, Debug, Default)]
pub struct TrackAssembly {
    pub tracks: Vec<OutputTrack>,
    pub cluster_indices: Vec<ClusterId>,
    pub labels: Vec<McLabel>,
}

impl TrackAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks committed so far.
    pub fn n_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Merge one candidate list, in list order, translating frame-local
    /// cluster references through `ws` into global cluster ids.
    ///
    /// Called once per list per frame, linear list first. Zero-point
    /// candidates are committed too: every candidate must be represented,
    /// since per-frame entry counts are derived from the track buffer.
    /// `labels`, when given, must be parallel to `candidates`.
    pub fn merge_candidates(
        &mut self,
        candidates: Vec<TrackCandidate>,
        kind: TrackKind,
        ws: &FrameWorkingSet,
        labels: Option<Vec<McLabel>>,
    ) {
        debug_assert!(
            labels.as_ref().map_or(true, |l| l.len() == candidates.len()),
            "candidate labels must be parallel to the candidate list"
        );
        let mut labels = labels.map(Vec::into_iter);

        for candidate in candidates {
            let cluster_offset = self.cluster_indices.len();
            for &local in &candidate.clusters {
                self.cluster_indices.push(ws.global_id(local));
            }
            self.tracks.push(OutputTrack {
                fit: candidate.fit,
                kind,
                cluster_offset,
                n_points: candidate.clusters.len(),
            });
            if let Some(iter) = labels.as_mut() {
                // One label per candidate, computed before the merge.
                self.labels.push(iter.next().unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SpacePoint;
    use crate::types::FrameId;
    use nalgebra::Vector3;

    fn ws_with_globals(frame: u32, globals: &[u32]) -> FrameWorkingSet {
        let mut ws = FrameWorkingSet::new();
        ws.reset(FrameId(frame));
        for (layer, &g) in globals.iter().enumerate() {
            ws.push_cluster(
                SpacePoint { xyz: Vector3::zeros(), layer: layer as u8 },
                ClusterId(g),
                None,
            );
        }
        ws
    }

    fn candidate(refs: &[usize]) -> TrackCandidate {
        TrackCandidate::new(refs.to_vec(), Default::default())
    }

    #[test]
    fn offsets_match_cluster_buffer_growth() {
        let mut assembly = TrackAssembly::new();
        let ws = ws_with_globals(0, &[10, 11, 12, 13]);

        assembly.merge_candidates(
            vec![candidate(&[0, 2]), candidate(&[1, 3, 0])],
            TrackKind::Linear,
            &ws,
            None,
        );

        assert_eq!(assembly.tracks.len(), 2);
        let t0 = assembly.tracks[0];
        let t1 = assembly.tracks[1];
        assert_eq!((t0.cluster_offset, t0.n_points), (0, 2));
        assert_eq!((t1.cluster_offset, t1.n_points), (2, 3));
        assert_eq!(
            assembly.cluster_indices,
            vec![ClusterId(10), ClusterId(12), ClusterId(11), ClusterId(13), ClusterId(10)]
        );
        // The declared slice reproduces the candidate's refs, translated.
        assert_eq!(
            t1.cluster_ids(&assembly.cluster_indices),
            &[ClusterId(11), ClusterId(13), ClusterId(10)]
        );
    }

    #[test]
    fn zero_point_candidate_is_committed() {
        let mut assembly = TrackAssembly::new();
        let ws = ws_with_globals(0, &[5]);

        assembly.merge_candidates(
            vec![candidate(&[]), candidate(&[0])],
            TrackKind::CellularAutomaton,
            &ws,
            None,
        );

        assert_eq!(assembly.tracks.len(), 2, "empty candidates still count");
        assert_eq!(assembly.tracks[0].n_points, 0);
        assert_eq!(assembly.tracks[0].cluster_offset, 0);
        assert_eq!(assembly.tracks[1].cluster_offset, 0);
        assert_eq!(assembly.cluster_indices, vec![ClusterId(5)]);
    }

    #[test]
    fn empty_list_is_a_noop() {
        let mut assembly = TrackAssembly::new();
        let ws = ws_with_globals(0, &[1, 2]);
        assembly.merge_candidates(vec![], TrackKind::Linear, &ws, Some(vec![]));
        assert!(assembly.tracks.is_empty());
        assert!(assembly.cluster_indices.is_empty());
        assert!(assembly.labels.is_empty());
    }

    #[test]
    fn labels_stay_parallel_to_tracks() {
        let mut assembly = TrackAssembly::new();
        let ws = ws_with_globals(0, &[7, 8]);

        assembly.merge_candidates(
            vec![candidate(&[0]), candidate(&[1])],
            TrackKind::Linear,
            &ws,
            Some(vec![McLabel::new(0, 4), McLabel::new(0, 9).as_fake()]),
        );

        assert_eq!(assembly.labels.len(), assembly.tracks.len());
        assert_eq!(assembly.labels[0], McLabel::new(0, 4));
        assert_eq!(assembly.labels[1], McLabel::new(0, 9).as_fake());
    }

    #[test]
    fn merge_appends_across_frames() {
        let mut assembly = TrackAssembly::new();
        let ws0 = ws_with_globals(0, &[0, 1]);
        assembly.merge_candidates(vec![candidate(&[0, 1])], TrackKind::Linear, &ws0, None);

        let ws1 = ws_with_globals(1, &[2, 3]);
        assembly.merge_candidates(
            vec![candidate(&[1, 0])],
            TrackKind::CellularAutomaton,
            &ws1,
            None,
        );

        assert_eq!(assembly.tracks[1].cluster_offset, 2);
        assert_eq!(
            assembly.cluster_indices,
            vec![ClusterId(0), ClusterId(1), ClusterId(3), ClusterId(2)]
        );
    }
}
