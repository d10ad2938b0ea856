//! Interactive menu shown when no subcommand is given.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use fishing_zones_cli_utils::MultiProgress;
use fishing_zones_consolidate::{ConsolidationConfig, SimplifyBudget, simplify::DEFAULT_BUDGET};
use fishing_zones_dataset::paths;
use fishing_zones_source::{
    overpass::DEFAULT_ENDPOINT, registry::all_queries, throttle::DEFAULT_DELAY_MS,
};

use crate::commands::{self, ConsolidateOptions, ENDPOINT_ENV, FetchOptions};

enum Action {
    Fetch,
    Consolidate,
    Optimize,
    ExportJs,
    Stats,
    Locate,
    Sources,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Fetch,
        Self::Consolidate,
        Self::Optimize,
        Self::ExportJs,
        Self::Stats,
        Self::Locate,
        Self::Sources,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Fetch => "Fetch from Overpass",
            Self::Consolidate => "Consolidate dataset",
            Self::Optimize => "Simplify dataset",
            Self::ExportJs => "Export frontend module",
            Self::Stats => "Show statistics",
            Self::Locate => "Find zones at a point",
            Self::Sources => "List queries",
        }
    }
}

/// Runs the menu once.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen operation fails.
#[allow(clippy::future_not_send)]
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fishing Zones Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Fetch => fetch(multi).await?,
        Action::Consolidate => consolidate()?,
        Action::Optimize => {
            let max_points: usize = Input::new()
                .with_prompt("Maximum points per ring")
                .default(DEFAULT_BUDGET)
                .interact_text()?;
            commands::optimize(SimplifyBudget::new(max_points)?)?;
        }
        Action::ExportJs => {
            let output: String = Input::new()
                .with_prompt("Output path")
                .default(paths::js_module_path().display().to_string())
                .interact_text()?;
            commands::export_js(&PathBuf::from(output))?;
        }
        Action::Stats => commands::stats()?,
        Action::Locate => {
            let lat: f64 = Input::new().with_prompt("Latitude").interact_text()?;
            let lng: f64 = Input::new().with_prompt("Longitude").interact_text()?;
            commands::locate(lat, lng)?;
        }
        Action::Sources => commands::list_sources(),
    }

    Ok(())
}

#[allow(clippy::future_not_send)]
async fn fetch(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let queries = all_queries();
    let labels: Vec<String> = queries
        .iter()
        .map(|query| format!("{} ({})", query.name, query.id))
        .collect();
    let defaults = vec![true; queries.len()];

    let selected = MultiSelect::new()
        .with_prompt("Select queries to fetch (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        println!("No queries selected.");
        return Ok(());
    }

    let delay_ms: u64 = Input::new()
        .with_prompt("Delay between requests (ms)")
        .default(DEFAULT_DELAY_MS)
        .interact_text()?;

    let options = FetchOptions {
        queries: selected.into_iter().map(|i| queries[i].id.clone()).collect(),
        seeds: None,
        endpoint: std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
        delay_ms,
        config: ConsolidationConfig::default(),
    };

    commands::fetch(multi, &options).await
}

fn consolidate() -> Result<(), Box<dyn std::error::Error>> {
    let include_existing = Confirm::new()
        .with_prompt("Merge into the existing dataset?")
        .default(true)
        .interact()?;

    let simplify = Confirm::new()
        .with_prompt("Simplify geometry?")
        .default(false)
        .interact()?;

    let mut config = ConsolidationConfig::default();
    if simplify {
        let max_points: usize = Input::new()
            .with_prompt("Maximum points per ring")
            .default(DEFAULT_BUDGET)
            .interact_text()?;
        config.simplify = Some(SimplifyBudget::new(max_points)?);
    }

    let report = commands::run_consolidate(&ConsolidateOptions {
        config,
        curated: Vec::new(),
        include_existing,
    })?;
    commands::print_report(&report);

    Ok(())
}
