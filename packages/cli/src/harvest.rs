//! Runs a query definition against Overpass and turns the responses into a
//! [`SourceSnapshot`].
//!
//! A failed request counts as an empty response: it is logged, tallied in
//! the snapshot, and the harvest moves on to the next request.

use std::sync::Arc;

use chrono::Utc;
use fishing_zones_consolidate::{FilterConfig, FilterStats, pipeline::collect_records};
use fishing_zones_dataset::SourceSnapshot;
use fishing_zones_source::{
    SourceError,
    overpass::{OverpassClient, PlannedRequest, plan_requests},
    progress::ProgressCallback,
};
use fishing_zones_source_models::{QueryDefinition, SeedEntry, SeedList};
use fishing_zones_zone_models::ZoneDraft;
use serde_json::Value;

/// Filter thresholds for one query: `base` with the query's span override.
#[must_use]
pub fn query_filter(query: &QueryDefinition, base: &FilterConfig) -> FilterConfig {
    query
        .max_span
        .map_or(*base, |max_span| base.with_max_span(max_span))
}

/// Turns the elements returned for one request into drafts.
///
/// Seed lookups take the seed's attributes and are renamed to the seed's
/// canonical name, so an `osm_name` alias never leaks into the dataset.
#[must_use]
pub fn collect_request(
    query: &QueryDefinition,
    request: &PlannedRequest,
    elements: &[Value],
    filter: &FilterConfig,
) -> (Vec<ZoneDraft>, FilterStats) {
    let attributes = request
        .seed
        .as_ref()
        .map_or_else(|| query.defaults.attributes(), SeedEntry::attributes);

    let (mut drafts, stats) = collect_records(elements, filter, query.assembly, &attributes);

    if let Some(seed) = &request.seed {
        for draft in &mut drafts {
            draft.name.clone_from(&seed.name);
        }
    }

    (drafts, stats)
}

/// Fetches every request of `query` and collects the accepted drafts.
///
/// # Errors
///
/// * [`SourceError::UnknownSeeds`] if a `by_name` query has no matching
///   seed list. Request failures are not errors.
pub async fn harvest_query(
    client: &OverpassClient,
    query: &QueryDefinition,
    seeds: Option<&SeedList>,
    base_filter: &FilterConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<SourceSnapshot, SourceError> {
    let filter = query_filter(query, base_filter);
    let requests = plan_requests(query, seeds, &filter.envelope)?;

    log::info!(
        "{}: {} request(s) against {}",
        query.id,
        requests.len(),
        client.endpoint()
    );
    progress.set_total(requests.len() as u64);

    let mut drafts = Vec::new();
    let mut stats = FilterStats::default();
    let mut failed_requests = 0;

    for request in &requests {
        progress.set_message(format!("{}: {}", query.id, request.label));

        let elements = match client.fetch_planned(request).await {
            Ok(elements) => elements,
            Err(e) => {
                log::warn!("{}: request for {} failed: {e}", query.id, request.label);
                failed_requests += 1;
                progress.request_failed();
                Vec::new()
            }
        };

        let (found, request_stats) = collect_request(query, request, &elements, &filter);
        if request.seed.is_some() && found.is_empty() {
            log::debug!("{}: nothing usable for {}", query.id, request.label);
        }

        stats.absorb(&request_stats);
        drafts.extend(found);
        progress.inc(1);
    }

    progress.finish(format!(
        "{}: {} zones ({} rejected, {failed_requests} failed)",
        query.id,
        drafts.len(),
        stats.rejected(),
    ));

    log::info!(
        "{}: examined {}, accepted {}, unnamed {}, no geometry {}, too few points {}, outside envelope {}, too large {}",
        query.id,
        stats.examined,
        stats.accepted,
        stats.unnamed,
        stats.no_geometry,
        stats.too_few_points,
        stats.outside_envelope,
        stats.extent_too_large,
    );

    Ok(SourceSnapshot {
        query_id: query.id.clone(),
        fetched_at: Utc::now(),
        failed_requests,
        stats,
        drafts,
    })
}

#[cfg(test)]
mod tests {
    use fishing_zones_consolidate::filter::RIVER_MAX_SPAN;
    use fishing_zones_source::{progress::null_progress, throttle::Throttle};
    use fishing_zones_zone_models::{Classification, GeometryKind};
    use serde_json::json;

    use super::*;

    fn query(toml: &str) -> QueryDefinition {
        toml::de::from_str(toml).unwrap()
    }

    fn dams() -> QueryDefinition {
        query(
            r#"
            id = "dams"
            name = "Dams"
            priority = 20
            timeout_secs = 60

            [defaults]
            classification = "prohibited"
            restriction = "상수원보호구역"

            [fetcher]
            type = "by_name"
            seeds = "dams"

            [[fetcher.selectors]]
            element = "way"
            "#,
        )
    }

    fn ponds() -> QueryDefinition {
        query(
            r#"
            id = "ponds"
            name = "Ponds"
            priority = 60
            timeout_secs = 300

            [defaults]
            classification = "restricted"
            region = "전국"

            [fetcher]
            type = "category"

            [[fetcher.selectors]]
            element = "way"
            tags = { natural = "water", water = "pond" }
            "#,
        )
    }

    /// A closed 8-point way named `name` around (`lat`, `lng`).
    fn way(name: &str, lat: f64, lng: f64) -> Value {
        let d = 0.001;
        let points: Vec<Value> = [
            (0.0, 0.0),
            (0.0, 1.0),
            (0.0, 2.0),
            (1.0, 2.0),
            (2.0, 2.0),
            (2.0, 1.0),
            (2.0, 0.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]
        .iter()
        .map(|(y, x)| json!({ "lat": lat + y * d, "lon": lng + x * d }))
        .collect();

        json!({ "type": "way", "tags": { "name": name }, "geometry": points })
    }

    fn request(seed: Option<SeedEntry>) -> PlannedRequest {
        PlannedRequest {
            label: "test".to_string(),
            seed,
            ql: String::new(),
            timeout_secs: 60,
        }
    }

    #[test]
    fn seed_lookup_takes_seed_name_and_attributes() {
        let seed = SeedEntry {
            name: "소양강댐".to_string(),
            region: "강원도 춘천시".to_string(),
            classification: Classification::Restricted,
            restriction: None,
            osm_name: Some("소양호".to_string()),
        };
        let elements = [way("소양호", 37.9, 127.8), way("소양호", 37.95, 127.85)];

        let (drafts, stats) = collect_request(
            &dams(),
            &request(Some(seed)),
            &elements,
            &FilterConfig::default(),
        );

        assert_eq!(stats.accepted, 2);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "소양강댐");
        assert_eq!(drafts[0].region, "강원도 춘천시");
        assert_eq!(drafts[0].classification, Classification::Restricted);
        assert_eq!(drafts[0].restriction, "낚시 제한");
    }

    #[test]
    fn category_results_use_query_defaults() {
        let elements = [
            way("연못", 36.0, 127.0),
            json!({ "type": "way", "tags": {}, "geometry": [] }),
        ];

        let (drafts, stats) = collect_request(
            &ponds(),
            &request(None),
            &elements,
            &FilterConfig::default(),
        );

        assert_eq!(stats.examined, 2);
        assert_eq!(stats.unnamed, 1);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "연못");
        assert_eq!(drafts[0].region, "전국");
        assert_eq!(drafts[0].restriction, "낚시 제한");
        assert_eq!(drafts[0].geometry.kind(), GeometryKind::Polygon);
    }

    #[test]
    fn empty_response_yields_nothing() {
        let (drafts, stats) =
            collect_request(&ponds(), &request(None), &[], &FilterConfig::default());
        assert!(drafts.is_empty());
        assert_eq!(stats, FilterStats::default());
    }

    #[test]
    fn query_span_override_applies() {
        let base = FilterConfig::default();
        let mut rivers = ponds();
        rivers.max_span = Some(RIVER_MAX_SPAN);

        assert!((query_filter(&rivers, &base).max_span - RIVER_MAX_SPAN).abs() < f64::EPSILON);
        assert!((query_filter(&ponds(), &base).max_span - base.max_span).abs() < f64::EPSILON);
        assert_eq!(query_filter(&rivers, &base).envelope, base.envelope);
    }

    #[tokio::test]
    async fn failed_requests_count_as_empty() {
        // Nothing listens on the discard port, so every request is refused.
        let client = OverpassClient::new(
            "http://127.0.0.1:9/api/interpreter",
            Throttle::from_millis(0),
        );
        let seeds: SeedList = toml::de::from_str(
            r#"
            id = "dams"
            name = "Dams"

            [[seeds]]
            name = "대청댐"

            [[seeds]]
            name = "충주댐"
            "#,
        )
        .unwrap();

        let snapshot = harvest_query(
            &client,
            &dams(),
            Some(&seeds),
            &FilterConfig::default(),
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.query_id, "dams");
        assert_eq!(snapshot.failed_requests, 2);
        assert!(snapshot.drafts.is_empty());
        assert_eq!(snapshot.stats.examined, 0);
    }

    #[tokio::test]
    async fn by_name_query_without_seeds_is_an_error() {
        let result = harvest_query(
            &OverpassClient::default(),
            &dams(),
            None,
            &FilterConfig::default(),
            &null_progress(),
        )
        .await;

        assert!(matches!(result, Err(SourceError::UnknownSeeds { .. })));
    }
}
