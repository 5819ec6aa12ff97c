//! Command-line arguments

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trackvision", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Settings file (JSON). Defaults to <config dir>/trackvision/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the telemetry service base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the request timeout
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Override the directory holding cached snapshots
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Also append the result as a JSON line to this file
    #[arg(long, global = true)]
    pub export: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct FetchArgs {
    /// Number of most recent samples to request
    #[arg(short = 'n', long, default_value_t = 10)]
    pub last_n: u32,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct TrackArgs {
    /// Track length in meters
    #[arg(short, long, allow_negative_numbers = true)]
    pub track_length: f64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Time of day each lap was received, with a smoothed curve
    Schedule {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Duration of each lap
    LapTimes {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Average speed of each lap
    Speed {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        track: TrackArgs,
    },
    /// Fastest lap and highest average speed
    Fastest {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        track: TrackArgs,
    },
    /// Slowest lap and lowest average speed
    Slowest {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        track: TrackArgs,
    },
    /// Speed and duration of one lap
    Lap {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        track: TrackArgs,
        /// Lap number to look up
        #[arg(long)]
        number: u32,
    },
    /// Recent luminosity readings
    Luminosity {
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

impl Commands {
    pub fn fetch_args(&self) -> FetchArgs {
        match self {
            Commands::Schedule { fetch }
            | Commands::LapTimes { fetch }
            | Commands::Speed { fetch, .. }
            | Commands::Fastest { fetch, .. }
            | Commands::Slowest { fetch, .. }
            | Commands::Lap { fetch, .. }
            | Commands::Luminosity { fetch } => *fetch,
        }
    }
}
