//! approach-sim: inspect approach rosters from the command line.

use anyhow::{bail, Context, Result};
use approach_cli::{generate_roster, render, RosterSpec};
use approach_core::{load_roster, Point3D, SimulationRules, SimulationSession};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derived flight records (distance, speed, arrival time)
    Flights(SimArgs),
    /// Positions, progress and collisions at one point in time
    Snapshot {
        #[command(flatten)]
        sim: SimArgs,
        /// Simulation time in minutes
        #[arg(long, short, default_value_t = 0.0)]
        time: f64,
    },
    /// Collisions over the whole approach, tick by tick
    Timeline {
        #[command(flatten)]
        sim: SimArgs,
        /// Minutes between ticks
        #[arg(long, default_value_t = 1.0)]
        step: f64,
        /// Also print ticks without collisions
        #[arg(long)]
        all: bool,
    },
    /// Adjust speeds until arrivals are separated and print the log
    Reconcile(SimArgs),
    /// Write a random roster as JSON
    Generate {
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value = "0,0,0")]
        airport: Point3D,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SimArgs {
    /// Roster file (JSON array of aircraft)
    #[arg(default_value = "data/planes.json")]
    roster: PathBuf,

    /// Airport position as x,y,z
    #[arg(long, default_value = "0,0,0")]
    airport: Point3D,

    /// Minimum separation between aircraft positions
    #[arg(long, default_value_t = 10.0)]
    threshold: f64,

    /// Minimum gap between arrival times in minutes (defaults to --threshold)
    #[arg(long)]
    time_separation: Option<f64>,

    /// Upper bound on reconciliation scans
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,

    /// Reconcile speeds before running the command
    #[arg(long)]
    reconcile: bool,

    /// Fail instead of continuing with a diverged reconciliation
    #[arg(long)]
    require_convergence: bool,
}

impl SimArgs {
    fn rules(&self) -> SimulationRules {
        SimulationRules {
            collision_threshold: self.threshold,
            time_separation_min: self.time_separation,
            max_iterations: self.max_iterations,
            ..SimulationRules::default()
        }
    }

    fn session(&self, reconcile: bool) -> Result<SimulationSession> {
        let aircraft = load_roster(&self.roster)
            .with_context(|| format!("loading roster {}", self.roster.display()))?;
        let session = SimulationSession::new(&aircraft, self.airport, self.rules())?;
        if !(reconcile || self.reconcile) {
            return Ok(session);
        }
        let session = session.reconciled();
        if self.require_convergence {
            return Ok(session.require_converged()?);
        }
        Ok(session)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Flights(sim) => {
            let session = sim.session(false)?;
            print!("{}", render::flights_table(session.flights()));
        }
        Command::Snapshot { sim, time } => {
            if !time.is_finite() || time < 0.0 {
                bail!("time must be a non-negative number of minutes");
            }
            let session = sim.session(false)?;
            print!("{}", render::snapshot_table(&session.snapshot(time)));
        }
        Command::Timeline { sim, step, all } => {
            let session = sim.session(false)?;
            let mut conflict_ticks = 0;
            for snapshot in session.timeline(step)? {
                if snapshot.collisions.is_empty() && !all {
                    continue;
                }
                if !snapshot.collisions.is_empty() {
                    conflict_ticks += 1;
                }
                println!("t = {:>7.1} min: {}", snapshot.time, approach_core::collision_warning(&snapshot.collisions));
            }
            println!(
                "{} tick(s) with collisions up to t = {:.1} min",
                conflict_ticks,
                session.horizon()
            );
        }
        Command::Reconcile(sim) => {
            let session = sim.session(true)?;
            print!(
                "{}",
                render::adjustments_table(session.adjustments(), session.reconciliation())
            );
            println!();
            print!("{}", render::flights_table(session.flights()));
        }
        Command::Generate {
            count,
            seed,
            airport,
            output,
        } => {
            let spec = RosterSpec {
                count,
                ..RosterSpec::default()
            };
            let roster = generate_roster(&spec, airport, seed);
            let json = serde_json::to_string_pretty(&roster)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Wrote {} aircraft to {}", roster.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
