//! `cluster_io` — Compact-cluster decoding: topology dictionary, plane
//! geometry, and the dictionary-based frame loader.

pub mod dictionary;
pub mod geometry;
pub mod loader;

pub use dictionary::{DictionaryError, TopologyDictionary, TopologyEntry, RAW_PATTERN};
pub use geometry::{PlaneGeometry, CHIPS_PER_LAYER, N_LAYERS};
pub use loader::DictLoader;
