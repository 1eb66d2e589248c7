//! Detector plane geometry: pixel address ↔ space point conversion.
//!
//! The detector is modeled as a stack of pixel planes downstream of the
//! interaction point, a few chips tiling each plane along x. Enough geometry
//! for the loader to place clusters in space and for the simulator to invert
//! the mapping; alignment and thermal deformations are not modeled.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Number of detector planes.
pub const N_LAYERS: usize = 10;

/// Chips tiling one plane along x.
pub const CHIPS_PER_LAYER: u16 = 4;

/// Pixel-plane geometry shared by loader and simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaneGeometry {
    /// Pixel pitch (cm).
    pub pitch: f64,
    /// Pixel rows per chip.
    pub n_rows: u16,
    /// Pixel columns per chip.
    pub n_cols: u16,
    /// z position of each plane (cm), interaction point at the origin.
    pub layer_z: [f64; N_LAYERS],
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        Self {
            pitch: 29.24e-4, // 29.24 µm
            n_rows: 512,
            n_cols: 1024,
            layer_z: [
                -45.3, -46.7, -48.6, -50.0, -52.4, -53.8, -67.7, -69.1, -76.1, -77.5,
            ],
        }
    }
}

impl PlaneGeometry {
    /// Plane a chip sits on; `None` for out-of-range chip ids.
    pub fn layer_of(&self, chip_id: u16) -> Option<u8> {
        let layer = chip_id / CHIPS_PER_LAYER;
        ((layer as usize) < N_LAYERS).then_some(layer as u8)
    }

    /// Chip extent along x (cm).
    pub fn chip_width(&self) -> f64 {
        self.n_cols as f64 * self.pitch
    }

    /// Chip extent along y (cm).
    pub fn chip_height(&self) -> f64 {
        self.n_rows as f64 * self.pitch
    }

    /// Space point of a (fractional) pixel address. `row`/`col` may carry
    /// sub-pixel centre-of-gravity offsets.
    pub fn point_for(&self, chip_id: u16, row: f64, col: f64) -> Option<Vector3<f64>> {
        let layer = self.layer_of(chip_id)? as usize;
        let chip_in_layer = (chip_id % CHIPS_PER_LAYER) as f64;
        let x0 = (chip_in_layer - CHIPS_PER_LAYER as f64 / 2.0) * self.chip_width();
        let x = x0 + (col + 0.5) * self.pitch;
        let y = (row + 0.5) * self.pitch - self.chip_height() / 2.0;
        Some(Vector3::new(x, y, self.layer_z[layer]))
    }

    /// Inverse of [`point_for`](Self::point_for): pixel address covering an
    /// (x, y) position on the given plane. `None` when outside the plane's
    /// acceptance.
    pub fn pixel_for(&self, layer: u8, x: f64, y: f64) -> Option<(u16, u16, u16)> {
        if layer as usize >= N_LAYERS {
            return None;
        }
        let half_span = CHIPS_PER_LAYER as f64 / 2.0 * self.chip_width();
        if x < -half_span || x >= half_span {
            return None;
        }
        let y_local = y + self.chip_height() / 2.0;
        if y_local < 0.0 || y_local >= self.chip_height() {
            return None;
        }
        let chip_in_layer = ((x + half_span) / self.chip_width()) as u16;
        let chip_in_layer = chip_in_layer.min(CHIPS_PER_LAYER - 1);
        let x0 = (chip_in_layer as f64 - CHIPS_PER_LAYER as f64 / 2.0) * self.chip_width();
        let col = ((x - x0) / self.pitch) as u16;
        let row = (y_local / self.pitch) as u16;
        let chip_id = layer as u16 * CHIPS_PER_LAYER + chip_in_layer;
        Some((chip_id, row.min(self.n_rows - 1), col.min(self.n_cols - 1)))
    }
}
