#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the fishing zones toolchain.
//!
//! `fetch` pulls water bodies from Overpass into per-query snapshots,
//! `consolidate` merges snapshots, curated files and the existing dataset
//! into `data/fishing_zones.json`, and `export-js` renders the module the
//! map frontend imports. Run without a subcommand for an interactive menu.

mod commands;
mod harvest;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fishing_zones_consolidate::{MergePolicy, SimplifyBudget, simplify::DEFAULT_BUDGET};
use fishing_zones_dataset::paths;
use fishing_zones_source::{overpass::DEFAULT_ENDPOINT, throttle::DEFAULT_DELAY_MS};

use crate::commands::{ConsolidateOptions, ENDPOINT_ENV, FetchOptions};

#[derive(Parser)]
#[command(name = "fishing_zones", about = "Fishing zone dataset toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered Overpass queries
    Sources,
    /// Fetch queries from Overpass and save one snapshot per query
    Fetch {
        /// Query ids to run (repeatable). Runs every query if omitted.
        #[arg(long = "query")]
        queries: Vec<String>,
        /// Seed list TOML replacing the embedded list with the same id
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Overpass interpreter endpoint
        #[arg(long, env = ENDPOINT_ENV, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Minimum delay between request starts, in milliseconds
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        delay_ms: u64,
        /// Consolidation config TOML (its `[filter]` table applies)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Merge snapshots, curated files and the existing dataset
    Consolidate {
        /// Consolidation config TOML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Curated zone JSON files (repeatable), merged after the existing dataset
        #[arg(long)]
        curated: Vec<PathBuf>,
        /// Simplify every ring to at most this many points
        #[arg(long)]
        simplify: Option<usize>,
        /// How same-named zones are resolved
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Leave the current dataset's zones out of the merge
        #[arg(long)]
        no_existing: bool,
    },
    /// Simplify the current dataset in place
    Optimize {
        /// Maximum points kept per ring
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        max_points: usize,
    },
    /// Write the JavaScript module the map frontend imports
    ExportJs {
        /// Output path (defaults to `data/generated/fishingZones.js`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show dataset and snapshot statistics
    Stats,
    /// List the zones containing a point
    Locate {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Keep whichever geometry has more points
    RicherGeometry,
    /// Keep the first zone seen
    KeepFirst,
}

impl From<PolicyArg> for MergePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::RicherGeometry => Self::RicherGeometry,
            PolicyArg::KeepFirst => Self::KeepFirst,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = fishing_zones_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Sources => commands::list_sources(),
        Commands::Fetch {
            queries,
            seeds,
            endpoint,
            delay_ms,
            config,
        } => {
            let options = FetchOptions {
                queries,
                seeds,
                endpoint,
                delay_ms,
                config: commands::load_config(config.as_deref())?,
            };
            commands::fetch(&multi, &options).await?;
        }
        Commands::Consolidate {
            config,
            curated,
            simplify,
            policy,
            no_existing,
        } => {
            let mut config = commands::load_config(config.as_deref())?;
            if let Some(max_points) = simplify {
                config.simplify = Some(SimplifyBudget::new(max_points)?);
            }
            if let Some(policy) = policy {
                config.policy = policy.into();
            }

            let report = commands::run_consolidate(&ConsolidateOptions {
                config,
                curated,
                include_existing: !no_existing,
            })?;
            commands::print_report(&report);
        }
        Commands::Optimize { max_points } => {
            commands::optimize(SimplifyBudget::new(max_points)?)?;
        }
        Commands::ExportJs { output } => {
            commands::export_js(&output.unwrap_or_else(paths::js_module_path))?;
        }
        Commands::Stats => commands::stats()?,
        Commands::Locate { lat, lng } => commands::locate(lat, lng)?,
    }

    Ok(())
}
