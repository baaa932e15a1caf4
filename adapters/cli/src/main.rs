#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Hiding Wumpus simulations headless.

mod level;
mod report;

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hiding_wumpus_core::{AgentRole, CellCoord};
use hiding_wumpus_system_simulation::{RoundOutcome, Simulation, SimulationConfig};
use hiding_wumpus_world::query;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Headless hide-and-seek simulations on a grid.
#[derive(Debug, Parser)]
#[command(name = "hiding-wumpus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run batches of rounds and report their metrics
    Simulate(SimulateArgs),
    /// Find a seeker path on a level and draw it
    Path(PathArgs),
    /// Convert levels to and from share codes
    #[command(subcommand)]
    Level(LevelCommand),
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Number of rounds to run
    #[arg(short, long, default_value_t = 10)]
    rounds: u32,
    /// JSON level file to load before the first round
    #[arg(short, long)]
    level: Option<PathBuf>,
    /// TOML simulation config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the configured RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// Writes per-round metrics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Prints per-round metrics as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct PathArgs {
    /// Goal cell as `column,row`
    #[arg(long, value_parser = parse_cell)]
    to: CellCoord,
    /// Start cell as `column,row`; defaults to the seeker's cell
    #[arg(long, value_parser = parse_cell)]
    from: Option<CellCoord>,
    /// JSON level file providing the walls
    #[arg(short, long)]
    level: Option<PathBuf>,
    /// Grid size when no level is given
    #[arg(long, default_value_t = 20)]
    size: u32,
}

#[derive(Debug, Subcommand)]
enum LevelCommand {
    /// Print the share code of a level file
    Encode {
        /// JSON level file
        path: PathBuf,
    },
    /// Turn a share code back into a level
    Decode {
        /// Share code starting with `wumpus:v1:`
        code: String,
        /// Writes the level here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw a level file as ASCII
    Show {
        /// JSON level file
        path: PathBuf,
    },
}

/// Entry point for the Hiding Wumpus command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Path(args) => find_path(args),
        Command::Level(command) => level_command(command),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SimulationConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn simulation_for_level(
    config: SimulationConfig,
    level_path: Option<&PathBuf>,
) -> Result<Simulation> {
    let mut simulation = Simulation::new(config).context("failed to build simulation")?;
    if let Some(path) = level_path {
        let loaded = level::read_level(path)
            .with_context(|| format!("failed to load level {}", path.display()))?;
        simulation
            .load_level(&loaded)
            .with_context(|| format!("level {} cannot be applied", path.display()))?;
    }
    Ok(simulation)
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = simulation_for_level(config, args.level.as_ref())?;
    info!(rounds = args.rounds, seed = config.seed, "starting batch");
    let outcomes = simulation.run_batch(args.rounds);

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        report::write_csv(BufWriter::new(file), &outcomes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "results saved");
    }
    if args.json {
        for outcome in &outcomes {
            println!("{}", serde_json::to_string(outcome)?);
        }
    }

    print_summary(&outcomes);
    Ok(())
}

fn print_summary(outcomes: &[RoundOutcome]) {
    let rounds = outcomes.len();
    let caught: Vec<&RoundOutcome> = outcomes.iter().filter(|outcome| outcome.caught).collect();
    println!("caught {} of {rounds} rounds", caught.len());
    if !caught.is_empty() {
        let mean = caught
            .iter()
            .map(|outcome| outcome.time_elapsed)
            .sum::<f32>()
            / caught.len() as f32;
        println!("mean time to catch: {mean:.2}s");
    }
    if rounds > 0 {
        let exposure = outcomes
            .iter()
            .map(|outcome| outcome.exposure_time)
            .sum::<f32>()
            / rounds as f32;
        println!("mean hider exposure: {exposure:.2}s");
    }
}

fn find_path(args: PathArgs) -> Result<()> {
    let config = SimulationConfig {
        grid_size: args.size,
        ..SimulationConfig::default()
    };
    let mut simulation = simulation_for_level(config, args.level.as_ref())?;
    if let Some(from) = args.from {
        simulation.place_agent(AgentRole::Seeker, from.center());
    }

    let start = query::agent_cell(simulation.world(), AgentRole::Seeker);
    let planned = simulation.set_target(AgentRole::Seeker, args.to);
    let diagnostics = simulation.pathfinder().diagnostics();
    println!(
        "{}",
        report::render_ascii(simulation.world(), diagnostics.path)
    );
    println!(
        "visited {} cells, {} left on the frontier",
        diagnostics.visited.len(),
        diagnostics.frontier.len()
    );

    planned.with_context(|| {
        format!(
            "no route from ({}, {}) to ({}, {})",
            start.column(),
            start.row(),
            args.to.column(),
            args.to.row()
        )
    })?;
    println!("path of {} cells", diagnostics.path.len());
    Ok(())
}

fn level_command(command: LevelCommand) -> Result<()> {
    match command {
        LevelCommand::Encode { path } => {
            let loaded = level::read_level(&path)
                .with_context(|| format!("failed to load level {}", path.display()))?;
            println!("{}", level::encode_share_code(&loaded)?);
        }
        LevelCommand::Decode { code, output } => {
            let decoded = level::decode_share_code(&code).context("invalid share code")?;
            match output {
                Some(path) => level::write_level(&path, &decoded)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", serde_json::to_string_pretty(&decoded)?),
            }
        }
        LevelCommand::Show { path } => {
            let config = SimulationConfig::default();
            let simulation = simulation_for_level(config, Some(&path))?;
            let seeker = query::body(simulation.world(), AgentRole::Seeker);
            print!("{}", report::render_ascii(simulation.world(), seeker.path()));
        }
    }
    Ok(())
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, got '{value}'"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("bad column '{column}': {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("bad row '{row}': {error}"))?;
    Ok(CellCoord::new(column, row))
}
