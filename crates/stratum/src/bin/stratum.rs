//! Stratum command line.
//!
//! ```text
//! stratum [--config world.toml] [--seed N] [--weld-seams] [--verbose] generate
//! stratum request --coords X Y Z
//! stratum config
//! ```
//!
//! Log output is controlled by `RUST_LOG`; `--verbose` raises the default
//! level to debug.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stratum::{
    finish_level_generation, GenerationRequest, GenerationWorker, Pipeline, StratumResult,
    WorkQueue, WorldConfig,
};
use stratum_core::IVec3;

#[derive(Parser)]
#[command(name = "stratum", about = "Generate and mesh procedural voxel terrain")]
struct Cli {
    /// World config file (TOML); defaults apply when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Override the noise seed
    #[arg(long)]
    seed: Option<u64>,
    /// Weld seam vertices when merging chunk meshes
    #[arg(long)]
    weld_seams: bool,
    /// Debug-level logging
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drain the initial work queue and report one mesh per chunk group
    Generate {
        /// Run the pipeline on a background worker thread
        #[arg(long)]
        background: bool,
    },
    /// Generate a single chunk group
    Request {
        /// Group offset in chunk units (3 integers: X Y Z)
        #[arg(long, required = true, num_args = 3, value_names = ["X", "Y", "Z"], allow_hyphen_values = true)]
        coords: Vec<i32>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
    log::debug!("logging initialized at {default_level}");
}

fn resolve_config(cli: &Cli) -> StratumResult<WorldConfig> {
    let mut config = match &cli.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.generation.seed = seed;
    }
    if cli.weld_seams {
        config.meshing.weld_seams = true;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> StratumResult<()> {
    let config = resolve_config(cli)?;
    let strategy = config.meshing.merge_strategy();

    match &cli.command {
        Command::Generate { background } => {
            let mut queue = WorkQueue::initial(&config.generation);
            tracing::info!(groups = queue.len(), seed = config.generation.seed, "starting level generation");

            let pipeline = Pipeline::from_config(&config)?;
            let groups = if *background {
                GenerationWorker::spawn(pipeline)?.finish_level_generation(&mut queue, strategy)?
            } else {
                finish_level_generation(&pipeline, &mut queue, strategy)?
            };

            for group in &groups {
                tracing::info!(
                    coords = ?group.request.coords.to_array(),
                    vertices = group.mesh.vertex_count(),
                    faces = group.mesh.face_count(),
                    "group mesh ready"
                );
            }
        }
        Command::Request { coords } => {
            let coords = IVec3::new(coords[0], coords[1], coords[2]);
            let request = GenerationRequest::new(config.generation.chunk_size, config.generation.group_size, coords);
            let result = Pipeline::from_config(&config)?.process(&request)?;

            for chunk_mesh in &result.raw_meshes {
                tracing::info!(
                    chunk = ?chunk_mesh.chunk.coords.to_array(),
                    faces = chunk_mesh.mesh.face_count(),
                    "chunk mesh"
                );
            }
            let merged = result.merge(strategy);
            tracing::info!(
                vertices = merged.vertex_count(),
                faces = merged.face_count(),
                "group mesh ready"
            );
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
