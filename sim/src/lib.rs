//! `sim` — Synthetic detector read-out: event generation, a reference track
//! finder, label association, scenarios, replay.

pub mod assoc;
pub mod event_gen;
pub mod finder;
pub mod replay;
pub mod scenarios;

pub use assoc::MajorityAssociator;
pub use event_gen::{EventGenConfig, EventGenerator, GeneratedRun};
pub use finder::{FinderConfig, RoadFinder};
pub use replay::{load_replay, save_replay, ReplayLog};
pub use scenarios::{Scenario, ScenarioKind};
