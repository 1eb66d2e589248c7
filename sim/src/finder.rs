//! Reference track finder: linear road following plus a cellular-automaton
//! cleanup pass.
//!
//! The linear pass seeds on each unused point and follows the straight line
//! through the interaction point, picking the nearest in-road point on every
//! further plane. The CA pass chains whatever the linear pass left behind,
//! extrapolating locally from the last two chain points with a wider road.
//! Deterministic for a given working set and configuration.

use assembly_core::{
    AssemblyError, FrameCandidates, FrameTrackFinder, FrameWorkingSet, TrackCandidate, TrackFit,
};
use serde::{Deserialize, Serialize};

/// Tracking configuration, supplied once at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Field strength at the detector reference point (T). Only feeds the
    /// curvature estimate of the fit payload.
    pub bz: f64,
    /// Road half-width of the linear pass (cm).
    pub road_xy: f64,
    /// Road half-width of the CA pass (cm).
    pub road_xy_ca: f64,
    /// Minimum points for a linear candidate.
    pub min_points_linear: usize,
    /// Minimum points for a CA candidate.
    pub min_points_ca: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            bz: -5.0,
            road_xy: 0.02,
            road_xy_ca: 0.08,
            min_points_linear: 5,
            min_points_ca: 4,
        }
    }
}

pub struct RoadFinder {
    config: FinderConfig,
}

impl RoadFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Nearest unused point of `layer_points` to the predicted (x, y) at
    /// that point's own z, within `road`.
    fn nearest_in_road(
        ws: &FrameWorkingSet,
        layer_points: &[usize],
        used: &[bool],
        predict: impl Fn(f64) -> (f64, f64),
        road: f64,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &i in layer_points {
            if used[i] {
                continue;
            }
            let p = ws.point(i).xyz;
            let (px, py) = predict(p.z);
            let d = ((p.x - px).powi(2) + (p.y - py).powi(2)).sqrt();
            if d <= road && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Fit payload from the chain's endpoints. Opaque to the assembly
    /// stage.
    fn fit(&self, ws: &FrameWorkingSet, chain: &[usize]) -> TrackFit {
        let a = ws.point(chain[0]).xyz;
        let b = ws.point(chain[chain.len() - 1]).xyz;
        let dir = b - a;
        let dr = (dir.x * dir.x + dir.y * dir.y).sqrt();
        TrackFit {
            x: a.x,
            y: a.y,
            z: a.z,
            phi: dir.y.atan2(dir.x),
            tanl: if dr > 0.0 { dir.z / dr } else { 0.0 },
            inv_qpt: if self.config.bz == 0.0 {
                0.0
            } else {
                1.0 / (0.3 * self.config.bz * dr.max(1e-6))
            },
        }
    }
}

impl FrameTrackFinder for RoadFinder {
    fn find_tracks(&mut self, ws: &FrameWorkingSet) -> Result<FrameCandidates, AssemblyError> {
        let mut candidates = FrameCandidates::default();
        let Some(max_layer) = ws.points().iter().map(|p| p.layer).max() else {
            return Ok(candidates);
        };

        let mut by_layer: Vec<Vec<usize>> = vec![Vec::new(); max_layer as usize + 1];
        for (i, p) in ws.points().iter().enumerate() {
            by_layer[p.layer as usize].push(i);
        }
        let mut used = vec![false; ws.len()];

        // Linear pass: straight line through the interaction point.
        for l0 in 0..by_layer.len() {
            for s in 0..by_layer[l0].len() {
                let seed = by_layer[l0][s];
                if used[seed] {
                    continue;
                }
                let sp = ws.point(seed).xyz;
                let mut chain = vec![seed];
                for layer in &by_layer[l0 + 1..] {
                    let predict = |z: f64| (sp.x * z / sp.z, sp.y * z / sp.z);
                    if let Some(hit) =
                        Self::nearest_in_road(ws, layer, &used, predict, self.config.road_xy)
                    {
                        chain.push(hit);
                    }
                }
                if chain.len() >= self.config.min_points_linear {
                    for &i in &chain {
                        used[i] = true;
                    }
                    let fit = self.fit(ws, &chain);
                    candidates.linear.push(TrackCandidate::new(chain, fit));
                }
            }
        }

        // CA pass over leftovers: local extrapolation, wider road, gaps
        // allowed.
        for l0 in 0..by_layer.len() {
            for s in 0..by_layer[l0].len() {
                let start = by_layer[l0][s];
                if used[start] {
                    continue;
                }
                let mut chain = vec![start];
                for layer in &by_layer[l0 + 1..] {
                    let (last, prev) = match chain.len() {
                        1 => (ws.point(chain[0]).xyz, None),
                        n => (ws.point(chain[n - 1]).xyz, Some(ws.point(chain[n - 2]).xyz)),
                    };
                    let predict = |z: f64| match prev {
                        Some(p) => {
                            let t = (z - last.z) / (last.z - p.z);
                            (last.x + t * (last.x - p.x), last.y + t * (last.y - p.y))
                        }
                        None => (last.x * z / last.z, last.y * z / last.z),
                    };
                    if let Some(hit) =
                        Self::nearest_in_road(ws, layer, &used, predict, self.config.road_xy_ca)
                    {
                        chain.push(hit);
                    }
                }
                if chain.len() >= self.config.min_points_ca {
                    for &i in &chain {
                        used[i] = true;
                    }
                    let fit = self.fit(ws, &chain);
                    candidates.cellular.push(TrackCandidate::new(chain, fit));
                }
            }
        }

        Ok(candidates)
    }
}
