//! Operations behind the subcommands and the interactive menu.
//!
//! Everything here reads and writes the files under the data directory;
//! the consolidation logic itself lives in `fishing_zones_consolidate`.

use std::path::{Path, PathBuf};

use fishing_zones_cli_utils::{IndicatifProgress, MultiProgress};
use fishing_zones_consolidate::{
    ConsolidationConfig, ConsolidationReport, SimplifyBudget, SourceDataset, consolidate,
    identity::assign_ids, pipeline::simplify_zones,
};
use fishing_zones_dataset::{Dataset, SourceSnapshot, load_drafts, paths};
use fishing_zones_source::{
    overpass::OverpassClient,
    registry::{all_queries, load_seed_list, query, seeds_for},
    throttle::Throttle,
};
use fishing_zones_source_models::{FetcherConfig, QueryDefinition};
use fishing_zones_spatial::ZoneIndex;
use fishing_zones_zone_models::{Classification, GeometryKind, Zone, ZoneDraft};

/// Environment variable that overrides the Overpass endpoint.
pub const ENDPOINT_ENV: &str = "FISHING_ZONES_OVERPASS_URL";

/// Reads a consolidation config, or the defaults when `path` is `None`.
///
/// # Errors
///
/// Returns an error if the file can't be read or isn't a valid config.
pub fn load_config(path: Option<&Path>) -> Result<ConsolidationConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ConsolidationConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config = toml::de::from_str(&text)
        .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;

    log::info!("Loaded consolidation config from {}", path.display());
    Ok(config)
}

/// Prints the query registry.
pub fn list_sources() {
    println!("{:<4} {:<16} {:<9} {:>8}  NAME", "PRI", "ID", "TYPE", "REQUESTS");
    println!("{}", "-".repeat(64));
    for query in all_queries() {
        let (kind, requests) = match &query.fetcher {
            FetcherConfig::Category { .. } => ("category", 1),
            FetcherConfig::ByName { .. } => (
                "by_name",
                seeds_for(&query, None)
                    .ok()
                    .flatten()
                    .map_or(0, |list| list.seeds.len()),
            ),
        };
        println!(
            "{:<4} {:<16} {:<9} {:>8}  {}",
            query.priority, query.id, kind, requests, query.name
        );
    }
}

/// Settings for a fetch run.
pub struct FetchOptions {
    /// Query ids to run; empty runs every query.
    pub queries: Vec<String>,
    /// Replacement for the embedded seed list with the same id.
    pub seeds: Option<PathBuf>,
    /// Overpass endpoint.
    pub endpoint: String,
    /// Minimum delay between request starts.
    pub delay_ms: u64,
    /// Filter thresholds (from the consolidation config).
    pub config: ConsolidationConfig,
}

/// Fetches the selected queries and writes one snapshot per query.
///
/// # Errors
///
/// Returns an error for an unknown query id, an unreadable seed file, or
/// a snapshot that can't be written. Failed requests are not errors.
#[allow(clippy::future_not_send)]
pub async fn fetch(
    multi: &MultiProgress,
    options: &FetchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let queries = if options.queries.is_empty() {
        all_queries()
    } else {
        options
            .queries
            .iter()
            .map(|id| query(id))
            .collect::<Result<Vec<_>, _>>()?
    };

    let override_list = options.seeds.as_deref().map(load_seed_list).transpose()?;
    if let Some(list) = &override_list {
        log::info!("Using {} seeds from {} for '{}'", list.seeds.len(), list.name, list.id);
    }

    let client = OverpassClient::new(
        options.endpoint.clone(),
        Throttle::from_millis(options.delay_ms),
    );

    let overall = IndicatifProgress::queries_bar(multi, queries.len() as u64);

    for query in &queries {
        overall.set_message(query.id.clone());
        let seeds = seeds_for(query, override_list.as_ref())?;
        let progress = IndicatifProgress::requests_bar(multi, &query.name);

        let snapshot = crate::harvest::harvest_query(
            &client,
            query,
            seeds.as_ref(),
            &options.config.filter,
            &progress,
        )
        .await?;

        snapshot.save(&paths::snapshot_path(&query.id))?;
        overall.inc(1);
    }

    overall.finish(format!("Fetched {} queries", queries.len()));
    Ok(())
}

/// Settings for a consolidation run.
pub struct ConsolidateOptions {
    /// Merge and simplification settings.
    pub config: ConsolidationConfig,
    /// Hand-maintained zone files, merged after the existing dataset.
    pub curated: Vec<PathBuf>,
    /// Whether the current dataset takes part in the merge.
    pub include_existing: bool,
}

/// Orders snapshots by their query's registry priority. Snapshots for
/// queries no longer in the registry go last, by id.
#[must_use]
pub fn order_snapshots(
    mut snapshots: Vec<SourceSnapshot>,
    queries: &[QueryDefinition],
) -> Vec<SourceSnapshot> {
    let priority = |id: &str| {
        queries
            .iter()
            .find(|query| query.id == id)
            .map_or(u32::MAX, |query| query.priority)
    };
    snapshots.sort_by(|a, b| {
        priority(&a.query_id)
            .cmp(&priority(&b.query_id))
            .then_with(|| a.query_id.cmp(&b.query_id))
    });
    snapshots
}

/// Builds the merge inputs in precedence order: the existing dataset,
/// then curated files, then snapshots.
#[must_use]
pub fn merge_inputs(
    existing: Option<&Dataset>,
    curated: Vec<(String, Vec<ZoneDraft>)>,
    snapshots: Vec<SourceSnapshot>,
) -> Vec<SourceDataset> {
    let mut inputs = Vec::with_capacity(1 + curated.len() + snapshots.len());

    if let Some(dataset) = existing {
        inputs.push(SourceDataset::new(
            "existing",
            dataset.zones.iter().cloned().map(Zone::into_draft).collect(),
        ));
    }
    inputs.extend(
        curated
            .into_iter()
            .map(|(label, drafts)| SourceDataset::new(label, drafts)),
    );
    inputs.extend(
        snapshots
            .into_iter()
            .map(|snapshot| SourceDataset::new(snapshot.query_id, snapshot.drafts)),
    );

    inputs
}

/// Merges every source into the dataset file.
///
/// The style table is carried over unchanged from the existing dataset,
/// even when its zones are left out of the merge. Only a missing dataset
/// gets the default table.
///
/// # Errors
///
/// Returns an error if any input can't be read, simplification collapses
/// a ring, or the dataset can't be written. Nothing is written on error.
pub fn run_consolidate(
    options: &ConsolidateOptions,
) -> Result<ConsolidationReport, Box<dyn std::error::Error>> {
    let dataset_path = paths::dataset_path();
    let existing = Dataset::load_optional(&dataset_path)?;

    let curated = options
        .curated
        .iter()
        .map(|path| Ok((path.display().to_string(), load_drafts(path)?)))
        .collect::<Result<Vec<_>, fishing_zones_dataset::DatasetError>>()?;

    let snapshots = order_snapshots(SourceSnapshot::load_dir(&paths::sources_dir())?, &all_queries());

    let inputs = merge_inputs(
        existing.as_ref().filter(|_| options.include_existing),
        curated,
        snapshots,
    );
    for input in &inputs {
        log::info!("Input {}: {} drafts", input.label, input.drafts.len());
    }

    let result = consolidate(inputs, &options.config)?;
    if result.zones.is_empty() {
        log::warn!("No usable zones; writing an empty dataset");
    }

    let styles = existing.map(|dataset| dataset.styles).unwrap_or_default();
    Dataset::new(result.zones, styles).save(&dataset_path)?;

    Ok(result.report)
}

/// Prints a consolidation report.
pub fn print_report(report: &ConsolidationReport) {
    println!();
    for (label, count) in &report.inputs {
        println!("  {label:<40} {count:>6} drafts");
    }
    println!();
    println!("Zones:           {}", report.zones);
    for (classification, count) in &report.by_classification {
        println!("  {:<14} {count}", classification.as_ref());
    }
    println!("Replaced:        {}", report.replaced);
    println!("Kept:            {}", report.kept);
    println!("Dropped:         {}", report.dropped);
    if report.simplified_rings > 0 {
        println!("Simplified:      {} rings", report.simplified_rings);
    }
}

/// Simplifies every zone in the dataset file and renumbers it.
///
/// # Errors
///
/// Returns an error if the dataset is missing or unreadable, a ring
/// collapses, or the file can't be written.
pub fn optimize(budget: SimplifyBudget) -> Result<(), Box<dyn std::error::Error>> {
    let path = paths::dataset_path();
    let dataset = Dataset::load(&path)?;

    let before_points: usize = dataset.zones.iter().map(|z| z.geometry.point_count()).sum();
    let zone_count = dataset.zones.len();

    let drafts = dataset.zones.into_iter().map(Zone::into_draft).collect();
    let (drafts, reduced) = simplify_zones(drafts, budget)?;
    let zones = assign_ids(drafts);

    let after_points: usize = zones.iter().map(|z| z.geometry.point_count()).sum();

    Dataset::new(zones, dataset.styles).save(&path)?;

    println!("Zones:   {zone_count}");
    println!("Rings:   {reduced} simplified to at most {} points", budget.max_points());
    println!("Points:  {before_points} -> {after_points}");
    if let Ok(meta) = std::fs::metadata(&path) {
        #[allow(clippy::cast_precision_loss)]
        let mib = meta.len() as f64 / 1024.0 / 1024.0;
        println!("Size:    {mib:.1} MiB");
    }

    Ok(())
}

/// Writes the frontend module for the current dataset.
///
/// # Errors
///
/// Returns an error if the dataset can't be read or the module written.
pub fn export_js(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Dataset::load(&paths::dataset_path())?;
    dataset.export_js(output)?;
    println!("Exported {} zones to {}", dataset.zones.len(), output.display());
    Ok(())
}

/// Prints dataset and snapshot statistics.
///
/// # Errors
///
/// Returns an error if an existing file can't be read.
pub fn stats() -> Result<(), Box<dyn std::error::Error>> {
    let path = paths::dataset_path();
    match Dataset::load_optional(&path)? {
        Some(dataset) => print_dataset_stats(&dataset),
        None => println!("No dataset at {}", path.display()),
    }

    let snapshots = order_snapshots(SourceSnapshot::load_dir(&paths::sources_dir())?, &all_queries());
    if snapshots.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:<16} {:<20} {:>7} {:>9} {:>9} {:>7}",
        "SNAPSHOT", "FETCHED", "ZONES", "EXAMINED", "REJECTED", "FAILED"
    );
    println!("{}", "-".repeat(74));
    for snapshot in &snapshots {
        println!(
            "{:<16} {:<20} {:>7} {:>9} {:>9} {:>7}",
            snapshot.query_id,
            snapshot.fetched_at.format("%Y-%m-%d %H:%M").to_string(),
            snapshot.drafts.len(),
            snapshot.stats.examined,
            snapshot.stats.rejected(),
            snapshot.failed_requests,
        );
    }

    Ok(())
}

fn print_dataset_stats(dataset: &Dataset) {
    let zones = &dataset.zones;
    let count_class =
        |class: Classification| zones.iter().filter(|z| z.classification == class).count();
    let multipolygons = zones
        .iter()
        .filter(|z| z.geometry.kind() == GeometryKind::Multipolygon)
        .count();
    let rings: usize = zones.iter().map(|z| z.geometry.rings().len()).sum();
    let points: usize = zones.iter().map(|z| z.geometry.point_count()).sum();

    println!("Zones:          {}", zones.len());
    for class in Classification::ALL {
        println!("  {:<12} {}", class.as_ref(), count_class(*class));
    }
    println!("Multipolygons:  {multipolygons}");
    println!("Rings:          {rings}");
    println!("Points:         {points}");

    let unstyled = dataset.styles.unstyled();
    if !unstyled.is_empty() {
        let tags: Vec<&str> = unstyled.iter().map(AsRef::as_ref).collect();
        println!("Unstyled:       {}", tags.join(", "));
    }

    if let Some(largest) = zones.iter().max_by_key(|z| z.geometry.point_count()) {
        println!(
            "Largest:        {} ({} points)",
            largest.name,
            largest.geometry.point_count()
        );
    }
}

/// Prints the zones containing a point.
///
/// # Errors
///
/// Returns an error if the dataset can't be read.
pub fn locate(lat: f64, lng: f64) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Dataset::load(&paths::dataset_path())?;
    let index = ZoneIndex::build(&dataset.zones);

    let hits = index.containing(lat, lng);
    if hits.is_empty() {
        println!("No fishing zone at ({lat}, {lng})");
        return Ok(());
    }

    for id in hits {
        let Some(zone) = dataset.zones.iter().find(|z| z.id == id) else {
            continue;
        };
        println!("#{} {} [{}] {}", zone.id, zone.name, zone.classification, zone.region);
        for line in zone.restriction.lines() {
            println!("    {line}");
        }
    }

    Ok(())
}
