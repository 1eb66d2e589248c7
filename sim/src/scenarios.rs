//! Scenario definitions.
//!
//! Each scenario is a named configuration of event generation and tracking
//! parameters. All scenarios are deterministic given the same seed.

use crate::event_gen::EventGenConfig;
use crate::finder::FinderConfig;
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// A handful of particles per frame, light noise
    Simple,
    /// Busy frames: many particles, heavy noise, more raw patterns
    HighOccupancy,
    /// Mostly-empty read-out: exercises zero-cluster frames
    SparseFrames,
    /// Scalability stress test
    Stress,
}

/// A fully configured run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub events: EventGenConfig,
    pub finder: FinderConfig,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Simple => Self {
                name: "simple".into(),
                seed,
                events: EventGenConfig::default(),
                finder: FinderConfig::default(),
            },
            ScenarioKind::HighOccupancy => Self {
                name: "high-occupancy".into(),
                seed,
                events: EventGenConfig {
                    n_frames: 32,
                    particles_per_frame: 60,
                    noise_per_frame: 40,
                    raw_fraction: 0.25,
                    ..Default::default()
                },
                finder: FinderConfig::default(),
            },
            ScenarioKind::SparseFrames => Self {
                name: "sparse-frames".into(),
                seed,
                events: EventGenConfig {
                    n_frames: 24,
                    particles_per_frame: 2,
                    noise_per_frame: 0,
                    efficiency: 0.85,
                    empty_frame_fraction: 0.4,
                    ..Default::default()
                },
                finder: FinderConfig::default(),
            },
            ScenarioKind::Stress => Self {
                name: "stress".into(),
                seed,
                events: EventGenConfig {
                    n_frames: 64,
                    particles_per_frame: 300,
                    noise_per_frame: 100,
                    ..Default::default()
                },
                finder: FinderConfig::default(),
            },
        }
    }
}
