//! `roftrack` CLI: scenario runs, replay import/export, counters reports.

use anyhow::Result;
use assembly_core::{
    FrameInput, LabelAssociator, Pipeline, PipelineConfig, PipelineOutput,
};
use clap::{Parser, Subcommand};
use cluster_io::{DictLoader, PlaneGeometry, TopologyDictionary};
use sim::replay::{load_replay, save_replay, ReplayLog};
use sim::{EventGenerator, FinderConfig, GeneratedRun, MajorityAssociator, RoadFinder};
use sim::{Scenario, ScenarioKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roftrack", about = "Read-out-frame track assembly CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a named scenario and run it through the pipeline.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Enable Monte-Carlo label propagation
        #[arg(long)]
        mc: bool,
        /// Treat the read-out as triggered instead of continuous
        #[arg(long)]
        triggered: bool,
        /// Cluster-topology dictionary file (built-in table when absent)
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Output the run counters to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the generated run for later replay
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Load and reprocess a previously recorded run.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Enable Monte-Carlo label propagation
        #[arg(long)]
        mc: bool,
        /// Output the run counters to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            mc,
            triggered,
            dictionary,
            output,
            save_replay: save_path,
        } => {
            run_scenario(
                scenario,
                seed,
                mc,
                triggered,
                dictionary.as_deref(),
                output.as_deref(),
                save_path.as_deref(),
            )?;
        }
        Commands::Replay { input, mc, output } => {
            run_replay(&input, mc, output.as_deref())?;
        }
    }

    Ok(())
}

fn process(
    run: &GeneratedRun,
    finder_config: FinderConfig,
    mc: bool,
    triggered: bool,
    dictionary: Option<&std::path::Path>,
) -> Result<PipelineOutput> {
    let dict = match dictionary {
        Some(path) => TopologyDictionary::load_or_standard(path),
        None => TopologyDictionary::standard(),
    };
    let loader = DictLoader::new(dict, PlaneGeometry::default());
    let finder = RoadFinder::new(finder_config);
    let associator =
        mc.then(|| Box::new(MajorityAssociator) as Box<dyn LabelAssociator>);

    let config = PipelineConfig { continuous_readout: !triggered, mc_enabled: mc };
    let mut pipeline = Pipeline::new(config, Box::new(loader), Box::new(finder), associator)?;

    let input = FrameInput {
        frames: &run.frames,
        clusters: &run.clusters,
        patterns: &run.patterns,
        cluster_labels: mc.then_some(&run.cluster_labels),
        mc2frames: &run.mc2frames,
    };
    Ok(pipeline.run(&input)?)
}

fn report(out: &PipelineOutput, output_path: Option<&std::path::Path>) -> Result<()> {
    let c = &out.counters;
    println!(
        "Done: {} frames ({} empty), {} clusters used, elapsed={}us",
        c.n_frames, c.n_empty_frames, c.n_clusters_used, c.elapsed_us
    );
    println!(
        "Tracks: {} linear, {} cellular-automaton, {} total ({:.1} per active frame)",
        c.n_linear_tracks,
        c.n_cellular_tracks,
        c.n_tracks_total,
        c.tracks_per_active_frame(),
    );
    if let Some(labels) = &out.labels {
        let clean = labels.iter().filter(|l| !l.is_none() && !l.fake).count();
        let fake = labels.iter().filter(|l| l.fake).count();
        println!("Labels: {} clean, {} fake, {} unassociated", clean, fake, labels.len() - clean - fake);
    }

    if let Some(opath) = output_path {
        std::fs::write(opath, serde_json::to_string_pretty(&out.counters)?)?;
        println!("Counters saved to {}", opath.display());
    }
    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    mc: bool,
    triggered: bool,
    dictionary: Option<&std::path::Path>,
    output_path: Option<&std::path::Path>,
    replay_path: Option<&std::path::Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!("Running scenario '{}' (seed={})...", scenario.name, seed);

    let run =
        EventGenerator::new(scenario.events.clone(), PlaneGeometry::default(), seed).generate();
    let out = process(&run, scenario.finder.clone(), mc, triggered, dictionary)?;
    report(&out, output_path)?;

    if let Some(rpath) = replay_path {
        let log = ReplayLog { scenario_name: scenario.name.clone(), seed, run };
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }
    Ok(())
}

fn run_replay(input: &std::path::Path, mc: bool, output_path: Option<&std::path::Path>) -> Result<()> {
    let log = load_replay(input)?;
    println!(
        "Replaying '{}' ({} frames, {} clusters)...",
        log.scenario_name,
        log.run.frames.len(),
        log.run.clusters.len()
    );

    let out = process(&log.run, FinderConfig::default(), mc, false, None)?;
    report(&out, output_path)
}
