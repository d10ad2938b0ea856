//! End-to-end consolidation: merge, optional simplification, numbering.

use std::collections::BTreeMap;

use fishing_zones_zone_models::{
    Classification, GeometryAssembly, Ring, Zone, ZoneAttributes, ZoneDraft,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ConsolidateError,
    filter::{FilterConfig, FilterStats, filter_records},
    identity::assign_ids,
    merge::{MergePolicy, SourceDataset, merge_sources},
    simplify::{SimplifyBudget, simplify_draft},
};

/// Tunables for one consolidation run. Every field has a default, so an
/// empty TOML document is a valid config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Collision resolution between same-named drafts.
    pub policy: MergePolicy,
    /// Per-ring point budget; `None` leaves geometry untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplify: Option<SimplifyBudget>,
    /// Thresholds for fetched geometry.
    pub filter: FilterConfig,
}

/// Turns raw Overpass elements into attributed drafts.
///
/// Elements are extracted, closed and filtered, same-named rings are
/// combined with `assembly`, and `attributes` are attached to every
/// surviving record.
#[must_use]
pub fn collect_records(
    elements: &[Value],
    filter: &FilterConfig,
    assembly: GeometryAssembly,
    attributes: &ZoneAttributes,
) -> (Vec<ZoneDraft>, FilterStats) {
    let (records, stats) = filter_records(elements, filter, assembly);
    let drafts = records
        .into_iter()
        .map(|record| ZoneDraft::from_record(record, attributes))
        .collect();
    (drafts, stats)
}

/// Summary of a consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// `(label, draft count)` for every input, in merge order.
    pub inputs: Vec<(String, usize)>,
    /// Zones in the output.
    pub zones: usize,
    /// Collisions won by a later, richer draft.
    pub replaced: usize,
    /// Collisions won by the earlier draft.
    pub kept: usize,
    /// Drafts dropped for a blank name or unusable geometry.
    pub dropped: usize,
    /// Rings reduced by simplification.
    pub simplified_rings: usize,
    /// Output zone count per classification.
    pub by_classification: BTreeMap<Classification, usize>,
}

/// Output of [`consolidate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    /// Final zones, numbered `1..=N`.
    pub zones: Vec<Zone>,
    /// What happened along the way.
    pub report: ConsolidationReport,
}

/// Merges every input, optionally simplifies, and assigns ids.
///
/// Inputs earlier in the list win ties. No usable input produces an
/// empty zone list.
///
/// # Errors
///
/// * [`ConsolidateError::DegenerateRing`] if simplification collapses a
///   ring
pub fn consolidate(
    inputs: Vec<SourceDataset>,
    config: &ConsolidationConfig,
) -> Result<Consolidated, ConsolidateError> {
    let counts: Vec<(String, usize)> = inputs
        .iter()
        .map(|input| (input.label.clone(), input.drafts.len()))
        .collect();

    let merged = merge_sources(inputs, config.policy);
    log::info!(
        "Merged {} inputs into {} zones ({} replaced, {} kept, {} dropped)",
        counts.len(),
        merged.drafts.len(),
        merged.replaced,
        merged.kept,
        merged.dropped,
    );

    let (drafts, simplified_rings) = match config.simplify {
        Some(budget) => simplify_zones(merged.drafts, budget)?,
        None => (merged.drafts, 0),
    };

    let zones = assign_ids(drafts);

    let mut by_classification = BTreeMap::new();
    for zone in &zones {
        *by_classification.entry(zone.classification).or_insert(0) += 1;
    }

    let report = ConsolidationReport {
        inputs: counts,
        zones: zones.len(),
        replaced: merged.replaced,
        kept: merged.kept,
        dropped: merged.dropped,
        simplified_rings,
        by_classification,
    };

    Ok(Consolidated { zones, report })
}

/// Simplifies every draft, returning the drafts and how many rings lost
/// points.
///
/// # Errors
///
/// * [`ConsolidateError::DegenerateRing`] on the first collapsed ring
pub fn simplify_zones(
    drafts: Vec<ZoneDraft>,
    budget: SimplifyBudget,
) -> Result<(Vec<ZoneDraft>, usize), ConsolidateError> {
    let mut reduced = 0;
    let mut simplified = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let before: Vec<usize> = draft.geometry.rings().iter().map(Ring::len).collect();
        let draft = simplify_draft(draft, budget)?;
        reduced += draft
            .geometry
            .rings()
            .iter()
            .zip(before)
            .filter(|(ring, len)| ring.len() < *len)
            .count();
        simplified.push(draft);
    }

    log::info!(
        "Simplified {reduced} rings to at most {} points",
        budget.max_points()
    );

    Ok((simplified, reduced))
}
