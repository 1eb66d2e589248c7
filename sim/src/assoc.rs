//! Majority-vote label association.

use assembly_core::{FrameWorkingSet, LabelAssociator, McLabel, TrackCandidate};
use std::collections::HashMap;

/// Labels a candidate with the MC label most of its clusters carry. A track
/// whose winning label covers at most half its points is flagged fake; a
/// track with no labelled clusters at all gets the none label.
pub struct MajorityAssociator;

impl LabelAssociator for MajorityAssociator {
    fn label_for(&self, candidate: &TrackCandidate, ws: &FrameWorkingSet) -> McLabel {
        let mut counts: HashMap<McLabel, usize> = HashMap::new();
        for &local in &candidate.clusters {
            match ws.label(local) {
                Some(l) if !l.is_none() => *counts.entry(l).or_default() += 1,
                _ => {}
            }
        }

        // Deterministic winner: highest count, ties broken by label order.
        let Some((&label, &count)) = counts
            .iter()
            .max_by_key(|(l, c)| (**c, std::cmp::Reverse((l.event_id, l.track_id))))
        else {
            return McLabel::none();
        };

        if 2 * count > candidate.n_points() {
            label
        } else {
            label.as_fake()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembly_core::{ClusterId, FrameId, SpacePoint, TrackCandidate};
    use nalgebra::Vector3;

    fn ws_with_labels(labels: &[McLabel]) -> FrameWorkingSet {
        let mut ws = FrameWorkingSet::new();
        ws.reset(FrameId(0));
        for (i, &l) in labels.iter().enumerate() {
            ws.push_cluster(
                SpacePoint { xyz: Vector3::zeros(), layer: i as u8 },
                ClusterId(i as u32),
                Some(l),
            );
        }
        ws
    }

    fn candidate(refs: &[usize]) -> TrackCandidate {
        TrackCandidate::new(refs.to_vec(), Default::default())
    }

    #[test]
    fn clean_majority_wins() {
        let l = McLabel::new(0, 3);
        let other = McLabel::new(0, 8);
        let ws = ws_with_labels(&[l, l, l, other]);
        let label = MajorityAssociator.label_for(&candidate(&[0, 1, 2, 3]), &ws);
        assert_eq!(label, l);
        assert!(!label.fake);
    }

    #[test]
    fn split_vote_is_fake() {
        let a = McLabel::new(0, 1);
        let b = McLabel::new(0, 2);
        let ws = ws_with_labels(&[a, a, b, b]);
        let label = MajorityAssociator.label_for(&candidate(&[0, 1, 2, 3]), &ws);
        assert!(label.fake, "no absolute majority");
        assert!(!label.is_none());
    }

    #[test]
    fn noise_only_candidate_has_no_label() {
        let ws = ws_with_labels(&[McLabel::none(), McLabel::none()]);
        let label = MajorityAssociator.label_for(&candidate(&[0, 1]), &ws);
        assert!(label.is_none());
    }

    #[test]
    fn noise_votes_do_not_count_toward_majority() {
        let l = McLabel::new(1, 4);
        let ws = ws_with_labels(&[l, l, l, McLabel::none(), McLabel::none()]);
        let label = MajorityAssociator.label_for(&candidate(&[0, 1, 2, 3, 4]), &ws);
        assert_eq!(label, l);
        assert!(!label.fake, "3 of 5 points is a majority");
    }
}
