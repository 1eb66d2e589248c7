//! Cluster-topology dictionary.
//!
//! Frequent pixel-cluster shapes are encoded as a dictionary id carried in
//! the compact cluster itself; the dictionary stores each shape's
//! centre-of-gravity offset. Rare shapes escape through [`RAW_PATTERN`]: the
//! explicit pixel bitmap then follows in the shared pattern byte-stream.
//! Dictionary entries can be flagged unusable for tracking (pathological
//! shapes), in which case the cluster is loaded but skipped.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// `pattern_id` value signalling an explicit bitmap in the pattern stream.
pub const RAW_PATTERN: u16 = u16::MAX;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("cannot read dictionary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dictionary file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recognized cluster topology.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyEntry {
    /// Centre-of-gravity column offset from the cluster anchor (pixels).
    pub dx: f64,
    /// Centre-of-gravity row offset from the cluster anchor (pixels).
    pub dy: f64,
    /// Pixels in the shape.
    pub n_pixels: u16,
    /// Whether clusters of this shape are fit for track finding.
    pub usable: bool,
}

/// Topology id → entry lookup table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopologyDictionary {
    entries: Vec<TopologyEntry>,
}

impl TopologyDictionary {
    pub fn new(entries: Vec<TopologyEntry>) -> Self {
        Self { entries }
    }

    /// The built-in table of the most common small shapes.
    pub fn standard() -> Self {
        let e = |dx, dy, n_pixels, usable| TopologyEntry { dx, dy, n_pixels, usable };
        Self::new(vec![
            e(0.0, 0.0, 1, true),  // single pixel
            e(0.5, 0.0, 2, true),  // horizontal pair
            e(0.0, 0.5, 2, true),  // vertical pair
            e(0.5, 0.5, 4, true),  // 2x2 block
            e(0.5, 0.5, 3, true),  // L-shape
            e(1.0, 0.0, 3, true),  // horizontal triple
            e(1.5, 1.5, 12, false), // large blob: not fit for tracking
        ])
    }

    pub fn get(&self, pattern_id: u16) -> Option<&TopologyEntry> {
        self.entries.get(pattern_id as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DictionaryError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<(), DictionaryError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load the dictionary at `path`, falling back to the built-in table
    /// when the file is absent or unreadable.
    pub fn load_or_standard(path: &Path) -> Self {
        match Self::from_json_file(path) {
            Ok(dict) => dict,
            Err(err) => {
                warn!(path = %path.display(), %err, "dictionary unavailable, using built-in table");
                Self::standard()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_lookup() {
        let dict = TopologyDictionary::standard();
        let single = dict.get(0).unwrap();
        assert_eq!(single.n_pixels, 1);
        assert!(single.usable);
        assert!(dict.get(dict.len() as u16).is_none());
    }

    #[test]
    fn blob_entry_is_unusable() {
        let dict = TopologyDictionary::standard();
        assert!(dict.entries.iter().any(|e| !e.usable));
    }

    #[test]
    fn json_roundtrip() {
        let dir = std::env::temp_dir().join("cluster_io_dict_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dict.json");

        let dict = TopologyDictionary::standard();
        dict.to_json_file(&path).unwrap();
        let loaded = TopologyDictionary::from_json_file(&path).unwrap();
        assert_eq!(loaded.len(), dict.len());
        assert_eq!(loaded.get(3), dict.get(3));
    }

    #[test]
    fn missing_file_falls_back_to_standard() {
        let dict = TopologyDictionary::load_or_standard(Path::new("/nonexistent/dict.json"));
        assert_eq!(dict.len(), TopologyDictionary::standard().len());
    }
}
