//! Synthetic event generation.
//!
//! Produces a full run's worth of pipeline input: frame descriptors, compact
//! clusters, the shared pattern byte-stream, and MC truth. Particles are
//! straight lines from the interaction point through the plane stack;
//! detection inefficiency, noise clusters, and raw-pattern escapes are
//! sampled per cluster. Deterministic for a given seed.

use assembly_core::{
    ClusterLabels, CompactCluster, InteractionRecord, Mc2FrameRecord, McLabel, ReadOutFrame,
};
use cluster_io::{PlaneGeometry, CHIPS_PER_LAYER, N_LAYERS, RAW_PATTERN};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Knobs for the synthetic run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventGenConfig {
    pub n_frames: usize,
    /// Particles generated per non-empty frame.
    pub particles_per_frame: usize,
    /// Noise clusters per non-empty frame.
    pub noise_per_frame: usize,
    /// Probability a particle leaves a usable hit on a plane it crosses.
    pub efficiency: f64,
    /// Fraction of hits emitted as raw patterns instead of dictionary ids.
    pub raw_fraction: f64,
    /// Fraction of frames generated with no activity at all.
    pub empty_frame_fraction: f64,
}

impl Default for EventGenConfig {
    fn default() -> Self {
        Self {
            n_frames: 16,
            particles_per_frame: 12,
            noise_per_frame: 5,
            efficiency: 0.95,
            raw_fraction: 0.1,
            empty_frame_fraction: 0.0,
        }
    }
}

/// One run's pipeline input, plus its MC truth.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneratedRun {
    pub frames: Vec<ReadOutFrame>,
    pub clusters: Vec<CompactCluster>,
    pub patterns: Vec<u8>,
    pub cluster_labels: ClusterLabels,
    pub mc2frames: Vec<Mc2FrameRecord>,
}

pub struct EventGenerator {
    config: EventGenConfig,
    geom: PlaneGeometry,
    rng: ChaCha8Rng,
}

impl EventGenerator {
    pub fn new(config: EventGenConfig, geom: PlaneGeometry, seed: u64) -> Self {
        Self { config, geom, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Generate the whole run, frame by frame. Pattern bytes are appended in
    /// cluster order, so the stream lines up with sequential decoding.
    pub fn generate(&mut self) -> GeneratedRun {
        let mut run = GeneratedRun::default();

        for f in 0..self.config.n_frames {
            let first_cluster = run.clusters.len();
            let empty = self.rng.gen::<f64>() < self.config.empty_frame_fraction;

            if !empty {
                for p in 0..self.config.particles_per_frame {
                    self.emit_particle(&mut run, f as i32, p as i32);
                }
                for _ in 0..self.config.noise_per_frame {
                    self.emit_noise(&mut run);
                }
            }

            run.frames.push(ReadOutFrame {
                ir: InteractionRecord { orbit: f as u32, bc: 0 },
                first_cluster,
                n_clusters: run.clusters.len() - first_cluster,
            });
            run.mc2frames.push(Mc2FrameRecord {
                event_id: f as u32,
                first_frame: f as u32,
                last_frame: f as u32,
            });
        }
        run
    }

    /// One straight-line particle from the origin; a hit per plane, subject
    /// to efficiency and acceptance.
    fn emit_particle(&mut self, run: &mut GeneratedRun, event_id: i32, track_id: i32) {
        let phi = self.rng.gen::<f64>() * std::f64::consts::TAU - std::f64::consts::PI;
        // Transverse slope dr/d|z|, chosen to stay inside the plane
        // acceptance out to the last plane.
        let slope = 0.001 + self.rng.gen::<f64>() * 0.007;

        for layer in 0..N_LAYERS as u8 {
            if self.rng.gen::<f64>() > self.config.efficiency {
                continue;
            }
            let z = self.geom.layer_z[layer as usize];
            let r = slope * z.abs();
            let (x, y) = (r * phi.cos(), r * phi.sin());
            let Some((chip_id, row, col)) = self.geom.pixel_for(layer, x, y) else {
                continue;
            };
            self.emit_cluster(run, chip_id, row, col, McLabel::new(event_id, track_id));
        }
    }

    fn emit_noise(&mut self, run: &mut GeneratedRun) {
        let chip_id = self.rng.gen_range(0..(N_LAYERS as u16 * CHIPS_PER_LAYER));
        let row = self.rng.gen_range(0..self.geom.n_rows);
        let col = self.rng.gen_range(0..self.geom.n_cols);
        self.emit_cluster(run, chip_id, row, col, McLabel::none());
    }

    fn emit_cluster(
        &mut self,
        run: &mut GeneratedRun,
        chip_id: u16,
        row: u16,
        col: u16,
        label: McLabel,
    ) {
        let pattern_id = if self.rng.gen::<f64>() < self.config.raw_fraction {
            // Full 2x2 block as an explicit bitmap: rows, cols, one byte.
            run.patterns.extend_from_slice(&[2, 2, 0b1111_0000]);
            RAW_PATTERN
        } else {
            // Dictionary ids 0..=3 are the common small usable shapes.
            self.rng.gen_range(0..4u16)
        };
        run.clusters.push(CompactCluster { chip_id, row, col, pattern_id });
        run.cluster_labels.push(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, config: EventGenConfig) -> GeneratedRun {
        EventGenerator::new(config, PlaneGeometry::default(), seed).generate()
    }

    #[test]
    fn deterministic_for_a_seed() {
        let a = generate(42, EventGenConfig::default());
        let b = generate(42, EventGenConfig::default());
        assert_eq!(a.clusters, b.clusters);
        assert_eq!(a.patterns, b.patterns);
        assert_eq!(a.frames, b.frames);

        let c = generate(43, EventGenConfig::default());
        assert_ne!(a.clusters, c.clusters, "different seed, different run");
    }

    #[test]
    fn frames_tile_the_cluster_buffer() {
        let run = generate(7, EventGenConfig::default());
        let mut next = 0;
        for frame in &run.frames {
            assert_eq!(frame.first_cluster, next);
            next += frame.n_clusters;
        }
        assert_eq!(next, run.clusters.len());
        assert_eq!(run.cluster_labels.len(), run.clusters.len());
        assert_eq!(run.mc2frames.len(), run.frames.len());
    }

    #[test]
    fn pattern_bytes_match_raw_cluster_count() {
        let run = generate(
            11,
            EventGenConfig { raw_fraction: 0.5, ..Default::default() },
        );
        let n_raw =
            run.clusters.iter().filter(|c| c.pattern_id == RAW_PATTERN).count();
        assert_eq!(run.patterns.len(), n_raw * 3, "3 bytes per 2x2 raw pattern");
    }

    #[test]
    fn empty_frames_have_no_clusters() {
        let run = generate(
            5,
            EventGenConfig { empty_frame_fraction: 1.0, ..Default::default() },
        );
        assert!(run.clusters.is_empty());
        assert!(run.frames.iter().all(|f| f.n_clusters == 0));
        assert_eq!(run.frames.len(), 16);
    }
}
