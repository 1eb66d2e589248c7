//! Full-stack run: generated events through the dictionary loader, road
//! finder, and assembly pipeline, checking the global-buffer invariants.

use assembly_core::{FrameInput, Pipeline, PipelineConfig};
use cluster_io::{DictLoader, PlaneGeometry, TopologyDictionary};
use sim::{EventGenerator, MajorityAssociator, RoadFinder, Scenario, ScenarioKind};

fn run_scenario(kind: ScenarioKind, seed: u64, mc: bool) -> assembly_core::PipelineOutput {
    let scenario = Scenario::build(kind, seed);
    let run = EventGenerator::new(scenario.events, PlaneGeometry::default(), seed).generate();

    let loader = DictLoader::new(TopologyDictionary::standard(), PlaneGeometry::default());
    let finder = RoadFinder::new(scenario.finder);
    let associator = mc
        .then(|| Box::new(MajorityAssociator) as Box<dyn assembly_core::LabelAssociator>);

    let config = PipelineConfig { continuous_readout: true, mc_enabled: mc };
    let mut pipeline =
        Pipeline::new(config, Box::new(loader), Box::new(finder), associator).unwrap();

    let input = FrameInput {
        frames: &run.frames,
        clusters: &run.clusters,
        patterns: &run.patterns,
        cluster_labels: Some(&run.cluster_labels),
        mc2frames: &run.mc2frames,
    };
    pipeline.run(&input).unwrap()
}

fn assert_invariants(out: &assembly_core::PipelineOutput) {
    // Frame ranges partition the track buffer, gapless and in order.
    let mut next = 0;
    for range in &out.frame_ranges {
        assert_eq!(range.first_entry, next);
        next = range.end();
    }
    assert_eq!(next, out.tracks.len());

    // Track offsets tile the cluster-index buffer, in commit order.
    let mut offset = 0;
    for track in &out.tracks {
        assert_eq!(track.cluster_offset, offset);
        offset += track.n_points;
        assert!(track.n_points > 0, "the road finder never emits empty candidates");
    }
    assert_eq!(offset, out.cluster_indices.len());
}

#[test]
fn simple_scenario_reconstructs_tracks() {
    let out = run_scenario(ScenarioKind::Simple, 42, false);
    assert_invariants(&out);
    assert!(out.counters.n_tracks_total > 0, "a clean run must find tracks");
    assert!(out.labels.is_none());
}

#[test]
fn sparse_scenario_handles_empty_frames() {
    let out = run_scenario(ScenarioKind::SparseFrames, 7, false);
    assert_invariants(&out);
    assert!(out.counters.n_empty_frames > 0, "the sparse scenario must produce empty frames");
    assert_eq!(out.frame_ranges.len(), 24);
}

#[test]
fn mc_run_keeps_labels_parallel() {
    let out = run_scenario(ScenarioKind::Simple, 42, true);
    assert_invariants(&out);
    let labels = out.labels.as_ref().expect("MC run must carry labels");
    assert_eq!(labels.len(), out.tracks.len());
    assert_eq!(out.mc2frames.len(), out.frame_ranges.len());
    // At least some tracks should be cleanly associated in a clean run.
    assert!(labels.iter().any(|l| !l.is_none() && !l.fake));
}

#[test]
fn high_occupancy_keeps_buffers_consistent() {
    let out = run_scenario(ScenarioKind::HighOccupancy, 3, true);
    assert_invariants(&out);
    assert_eq!(out.counters.n_frames, 32);
    assert_eq!(
        out.counters.n_tracks_total,
        out.counters.n_linear_tracks + out.counters.n_cellular_tracks
    );
}
