//! Frame-loading collaborator contract.

use crate::cursor::PatternCursor;
use crate::frame::FrameWorkingSet;
use crate::types::{ClusterLabels, CompactCluster, ReadOutFrame};

/// Decodes one frame's compact clusters (plus the shared pattern stream)
/// into the per-frame working set.
pub trait FrameLoader {
    /// Materialize `frame`'s usable clusters into `ws` and return their
    /// count.
    ///
    /// Contract:
    /// - advances `cursor` by exactly the pattern bytes the frame's clusters
    ///   consume; the cursor is shared sequentially across all frames and
    ///   must never be reset;
    /// - a frame that cannot be decoded yields 0 with an empty working set —
    ///   decode problems are absorbed here, never raised as errors;
    /// - when `cluster_labels` is given, every pushed cluster carries its
    ///   label.
    fn load_frame(
        &self,
        frame: &ReadOutFrame,
        clusters: &[CompactCluster],
        cursor: &mut PatternCursor<'_>,
        cluster_labels: Option<&ClusterLabels>,
        ws: &mut FrameWorkingSet,
    ) -> usize;
}
