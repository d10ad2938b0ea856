//! Query and seed registry, loaded from embedded TOML.
//!
//! Each `.toml` file in `packages/source/queries/` and
//! `packages/source/seeds/` is baked into the binary at compile time via
//! [`include_str!`]. Adding a query or seed list means adding a file and a
//! line below.

use std::path::Path;

use fishing_zones_source_models::{FetcherConfig, QueryDefinition, SeedList};

use crate::SourceError;

/// Query definitions embedded at compile time.
const QUERY_TOMLS: &[(&str, &str)] = &[
    // ── Curated name lookups ─────────────────────────────────────────
    ("major_waters", include_str!("../queries/major_waters.toml")),
    ("dams", include_str!("../queries/dams.toml")),
    ("water_bodies", include_str!("../queries/water_bodies.toml")),
    ("inland_waters", include_str!("../queries/inland_waters.toml")),
    // ── Nationwide categories ────────────────────────────────────────
    ("reservoirs", include_str!("../queries/reservoirs.toml")),
    ("ponds", include_str!("../queries/ponds.toml")),
    ("rivers", include_str!("../queries/rivers.toml")),
    ("streams", include_str!("../queries/streams.toml")),
];

/// Seed lists embedded at compile time.
const SEED_TOMLS: &[(&str, &str)] = &[
    ("major_waters", include_str!("../seeds/major_waters.toml")),
    ("dams", include_str!("../seeds/dams.toml")),
    ("water_bodies", include_str!("../seeds/water_bodies.toml")),
    ("inland_waters", include_str!("../seeds/inland_waters.toml")),
];

#[cfg(test)]
const EXPECTED_QUERY_COUNT: usize = 8;

#[cfg(test)]
const EXPECTED_SEED_LIST_COUNT: usize = 4;

/// Returns every query definition, sorted by priority.
///
/// # Panics
///
/// Panics if any embedded TOML is malformed (checked by the tests below).
#[must_use]
pub fn all_queries() -> Vec<QueryDefinition> {
    let mut queries: Vec<QueryDefinition> = QUERY_TOMLS
        .iter()
        .map(|(name, toml)| {
            toml::de::from_str(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect();
    queries.sort_by_key(|query| query.priority);
    queries
}

/// Looks up one query definition by id.
///
/// # Errors
///
/// * [`SourceError::UnknownQuery`] if no definition has this id
pub fn query(id: &str) -> Result<QueryDefinition, SourceError> {
    all_queries()
        .into_iter()
        .find(|query| query.id == id)
        .ok_or_else(|| SourceError::UnknownQuery { id: id.to_string() })
}

/// Returns every embedded seed list.
///
/// # Panics
///
/// Panics if any embedded TOML is malformed (checked by the tests below).
#[must_use]
pub fn all_seed_lists() -> Vec<SeedList> {
    SEED_TOMLS
        .iter()
        .map(|(name, toml)| {
            toml::de::from_str(toml)
                .unwrap_or_else(|e| panic!("Failed to parse seeds/{name}.toml: {e}"))
        })
        .collect()
}

/// Looks up one embedded seed list by id.
///
/// # Errors
///
/// * [`SourceError::UnknownSeeds`] if no list has this id
pub fn seed_list(id: &str) -> Result<SeedList, SourceError> {
    all_seed_lists()
        .into_iter()
        .find(|list| list.id == id)
        .ok_or_else(|| SourceError::UnknownSeeds { id: id.to_string() })
}

/// Reads a seed list from a user-supplied TOML file.
///
/// # Errors
///
/// * [`SourceError::Io`] if the file can't be read
/// * [`SourceError::Toml`] if it doesn't match the seed list schema
pub fn load_seed_list(path: &Path) -> Result<SeedList, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::de::from_str(&text).map_err(|source| SourceError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the seed list a query needs, if any.
///
/// `override_list` replaces the embedded list when its id matches the one
/// the query references.
///
/// # Errors
///
/// * [`SourceError::UnknownSeeds`] if the referenced list doesn't exist
pub fn seeds_for(
    query: &QueryDefinition,
    override_list: Option<&SeedList>,
) -> Result<Option<SeedList>, SourceError> {
    match &query.fetcher {
        FetcherConfig::Category { .. } => Ok(None),
        FetcherConfig::ByName { seeds, .. } => match override_list {
            Some(list) if list.id == *seeds => Ok(Some(list.clone())),
            _ => seed_list(seeds).map(Some),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_queries() {
        assert_eq!(all_queries().len(), EXPECTED_QUERY_COUNT);
    }

    #[test]
    fn query_ids_are_unique() {
        let queries = all_queries();
        let mut ids: Vec<&str> = queries.iter().map(|q| q.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_QUERY_COUNT);
    }

    #[test]
    fn queries_are_sorted_by_priority() {
        let queries = all_queries();
        assert!(queries.windows(2).all(|w| w[0].priority < w[1].priority));
    }

    #[test]
    fn all_queries_have_required_fields() {
        for query in &all_queries() {
            assert!(!query.id.is_empty(), "query id is empty");
            assert!(!query.name.is_empty(), "{}: name is empty", query.id);
            assert!(query.timeout_secs > 0, "{}: zero timeout", query.id);
            assert!(
                !query.fetcher.selectors().is_empty(),
                "{}: no selectors",
                query.id
            );
        }
    }

    #[test]
    fn by_name_queries_reference_existing_seed_lists() {
        for query in &all_queries() {
            let seeds = seeds_for(query, None).unwrap();
            if let FetcherConfig::ByName { .. } = query.fetcher {
                let seeds = seeds.unwrap();
                assert!(!seeds.seeds.is_empty(), "{}: empty seed list", query.id);
            } else {
                assert!(seeds.is_none());
            }
        }
    }

    #[test]
    fn loads_all_seed_lists() {
        let lists = all_seed_lists();
        assert_eq!(lists.len(), EXPECTED_SEED_LIST_COUNT);

        let mut ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_SEED_LIST_COUNT);
    }

    #[test]
    fn seed_names_are_unique_within_a_list() {
        for list in &all_seed_lists() {
            let mut names: Vec<&str> = list.seeds.iter().map(|s| s.name.as_str()).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{}: duplicate seed names", list.id);
        }
    }

    #[test]
    fn river_query_uses_tighter_span() {
        assert_eq!(query("rivers").unwrap().max_span, Some(0.05));
        assert!(query("reservoirs").unwrap().max_span.is_none());
    }

    #[test]
    fn unknown_ids_are_errors() {
        assert!(matches!(
            query("nope"),
            Err(SourceError::UnknownQuery { .. })
        ));
        assert!(matches!(
            seed_list("nope"),
            Err(SourceError::UnknownSeeds { .. })
        ));
    }

    #[test]
    fn override_replaces_matching_seed_list() {
        let dams = query("dams").unwrap();
        let custom: SeedList = toml::de::from_str(
            r#"
            id = "dams"
            name = "Custom"

            [[seeds]]
            name = "평화의댐"
            "#,
        )
        .unwrap();

        let resolved = seeds_for(&dams, Some(&custom)).unwrap().unwrap();
        assert_eq!(resolved.name, "Custom");

        let other = query("major_waters").unwrap();
        let resolved = seeds_for(&other, Some(&custom)).unwrap().unwrap();
        assert_eq!(resolved.id, "major_waters");
    }

    #[test]
    fn missing_seed_file_is_io_error() {
        assert!(matches!(
            load_seed_list(Path::new("/nonexistent/seeds.toml")),
            Err(SourceError::Io { .. })
        ));
    }
}
