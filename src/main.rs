use std::path::PathBuf;

use anyhow::Context;
use ascent_simulation::*;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Staged liquid-fuel rocket ascent simulator")]
struct Cli {
    /// Rocket design document (YAML, or TOML with a .toml extension)
    #[arg(long)]
    rocket: PathBuf,

    /// Start position as planet=<Name>:alt=<metres>
    #[arg(long, default_value = DEFAULT_START_POSITION)]
    start: String,

    /// Physics tick in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_STEP)]
    dt: f64,

    /// Seconds between periodic flight reports
    #[arg(long, default_value_t = DEFAULT_REPORT_FREQUENCY)]
    report_freq: f64,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the drag coefficient from an altitude measured in flight
    GuessDrag {
        /// Measured altitude above ground in metres
        #[arg(long)]
        terminal_altitude: f64,

        /// Flight time of the measurement in seconds
        #[arg(long)]
        terminal_time: f64,
    },
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bodies = BodyCatalog::kerbol_system();
    let parts = PartCatalog::stock();
    let position = bodies
        .parse_position(&cli.start)
        .with_context(|| format!("invalid start position {:?}", cli.start))?;
    let design = RocketDesign::load(&cli.rocket)
        .with_context(|| format!("failed to load rocket design {}", cli.rocket.display()))?;
    let mut rocket = design.build(&parts, position)?;

    match cli.command {
        Some(Command::GuessDrag {
            terminal_altitude,
            terminal_time,
        }) => {
            let solver = DragSolver {
                dt: cli.dt,
                ..DragSolver::new(terminal_altitude, terminal_time)
            };
            let estimate =
                solver.solve_with(&rocket, |min, max| println!("[{:.6}, {:.6}]", min, max))?;
            println!("Estimated drag: {:.6}", estimate.drag);
        }
        None => {
            let flight = rocket.fly(cli.dt)?;
            for report in Tracker::new(flight, cli.report_freq) {
                let report = report?;
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
                    OutputFormat::Text => println!("{}", report),
                }
            }
        }
    }

    Ok(())
}
