//! Dictionary-based frame loader.
//!
//! Decodes one frame's slice of compact clusters into space points: pixel
//! anchor plus the topology's centre-of-gravity offset, either from the
//! dictionary or from an explicit bitmap read off the shared pattern
//! stream.

use crate::dictionary::{TopologyDictionary, RAW_PATTERN};
use crate::geometry::PlaneGeometry;
use assembly_core::{
    ClusterId, ClusterLabels, CompactCluster, FrameLoader, FrameWorkingSet, PatternCursor,
    ReadOutFrame, SpacePoint,
};
use tracing::{trace, warn};

/// Concrete [`FrameLoader`] over a topology dictionary and plane geometry.
pub struct DictLoader {
    dict: TopologyDictionary,
    geom: PlaneGeometry,
}

/// Decoded topology: COG offset in pixels, or `None` when the cluster is
/// not usable for tracking.
type CogOffset = Option<(f64, f64)>;

impl DictLoader {
    pub fn new(dict: TopologyDictionary, geom: PlaneGeometry) -> Self {
        Self { dict, geom }
    }

    pub fn with_standard_dictionary() -> Self {
        Self::new(TopologyDictionary::standard(), PlaneGeometry::default())
    }

    pub fn geometry(&self) -> &PlaneGeometry {
        &self.geom
    }

    /// Centre of gravity of an explicit bitmap. The bitmap bytes are always
    /// consumed, even for shapes that end up unusable, to keep the shared
    /// cursor in sync. `None` on a truncated stream.
    fn decode_raw_pattern(cursor: &mut PatternCursor<'_>) -> Option<CogOffset> {
        let rows = cursor.read_u8()? as usize;
        let cols = cursor.read_u8()? as usize;
        let n_bytes = (rows * cols + 7) / 8;
        let bitmap = cursor.take(n_bytes)?;

        let mut n_set = 0u32;
        let (mut sum_row, mut sum_col) = (0u64, 0u64);
        for bit in 0..rows * cols {
            if bitmap[bit / 8] & (0x80 >> (bit % 8)) != 0 {
                n_set += 1;
                sum_row += (bit / cols) as u64;
                sum_col += (bit % cols) as u64;
            }
        }
        if n_set == 0 {
            return Some(None); // decodable but empty shape: skip the cluster
        }
        Some(Some((
            sum_col as f64 / n_set as f64,
            sum_row as f64 / n_set as f64,
        )))
    }
}

impl FrameLoader for DictLoader {
    fn load_frame(
        &self,
        frame: &ReadOutFrame,
        clusters: &[CompactCluster],
        cursor: &mut PatternCursor<'_>,
        cluster_labels: Option<&ClusterLabels>,
        ws: &mut FrameWorkingSet,
    ) -> usize {
        let end = frame.first_cluster + frame.n_clusters;
        let Some(slice) = clusters.get(frame.first_cluster..end) else {
            warn!(
                frame = %ws.frame_id(),
                first = frame.first_cluster,
                n = frame.n_clusters,
                total = clusters.len(),
                "frame cluster range out of bounds, dropping frame"
            );
            return 0;
        };

        for (k, cluster) in slice.iter().enumerate() {
            let global_id = ClusterId((frame.first_cluster + k) as u32);

            let cog: CogOffset = if cluster.pattern_id == RAW_PATTERN {
                match Self::decode_raw_pattern(cursor) {
                    Some(cog) => cog,
                    None => {
                        // Truncated pattern stream: the frame cannot be
                        // decoded consistently. Absorbed as zero usable
                        // clusters.
                        warn!(frame = %ws.frame_id(), cluster = %global_id,
                              "pattern stream exhausted, dropping frame");
                        ws.reset(ws.frame_id());
                        return 0;
                    }
                }
            } else {
                match self.dict.get(cluster.pattern_id) {
                    Some(entry) if entry.usable => Some((entry.dx, entry.dy)),
                    Some(_) => None,
                    None => {
                        trace!(cluster = %global_id, pattern = cluster.pattern_id,
                               "unknown topology id, skipping cluster");
                        None
                    }
                }
            };

            let Some((dx, dy)) = cog else { continue };
            let Some(layer) = self.geom.layer_of(cluster.chip_id) else { continue };
            let Some(xyz) =
                self.geom
                    .point_for(cluster.chip_id, cluster.row as f64 + dy, cluster.col as f64 + dx)
            else {
                continue;
            };

            let label = cluster_labels.map(|l| l.get(global_id));
            ws.push_cluster(SpacePoint { xyz, layer }, global_id, label);
        }
        ws.len()
    }
}
