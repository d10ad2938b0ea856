#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Schemas for geodata query definitions and curated seed lists.
//!
//! Both are authored as TOML. A [`QueryDefinition`] describes one
//! acquisition run against the Overpass API; a [`SeedList`] names the
//! water bodies a `by_name` query looks up one at a time.

use std::collections::BTreeMap;

use fishing_zones_zone_models::{Classification, GeometryAssembly, ZoneAttributes};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// OSM element type a selector matches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    /// A closed way.
    Way,
    /// A multipolygon relation.
    Relation,
}

/// One Overpass statement: an element type plus tag filters.
///
/// A tag value of `"*"` only requires the key to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// Element type to match.
    pub element: ElementKind,
    /// Tag filters, rendered in key order.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// How a query selects elements, tagged by `type` in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Every element matching the selectors inside the envelope, in one
    /// request.
    Category {
        /// Statements unioned into the query.
        selectors: Vec<Selector>,
    },
    /// One request per seed entry, with a `name` filter added to every
    /// selector.
    ByName {
        /// Id of the seed list to iterate.
        seeds: String,
        /// Statements unioned into each per-name query.
        selectors: Vec<Selector>,
    },
}

impl FetcherConfig {
    /// Returns the selectors regardless of variant.
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        match self {
            Self::Category { selectors } | Self::ByName { selectors, .. } => selectors,
        }
    }
}

/// Attributes attached to every zone a query produces (seed entries
/// override them for `by_name` queries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    /// Zone classification.
    #[serde(default)]
    pub classification: Classification,
    /// Restriction text; the classification's default when omitted.
    #[serde(default)]
    pub restriction: Option<String>,
    /// Region label.
    #[serde(default)]
    pub region: String,
}

impl QueryDefaults {
    /// Resolves the defaults into zone attributes.
    #[must_use]
    pub fn attributes(&self) -> ZoneAttributes {
        ZoneAttributes {
            classification: self.classification,
            restriction: self.restriction.clone().unwrap_or_else(|| {
                self.classification.default_restriction().to_string()
            }),
            region: self.region.clone(),
        }
    }
}

/// One geodata acquisition run, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    /// Unique identifier; also the snapshot file stem.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Merge order: lower values are merged first and win ties.
    pub priority: u32,
    /// Overpass server-side timeout in seconds.
    pub timeout_secs: u64,
    /// Span limit override in degrees (rivers use a tighter one).
    #[serde(default)]
    pub max_span: Option<f64>,
    /// How same-named rings are combined.
    #[serde(default)]
    pub assembly: GeometryAssembly,
    /// Attributes for produced zones.
    pub defaults: QueryDefaults,
    /// Element selection.
    pub fetcher: FetcherConfig,
}

/// A curated water body to look up by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    /// Name used for the zone.
    pub name: String,
    /// Region label.
    #[serde(default)]
    pub region: String,
    /// Zone classification.
    #[serde(default)]
    pub classification: Classification,
    /// Restriction text; the classification's default when omitted.
    #[serde(default)]
    pub restriction: Option<String>,
    /// Name to search for when the map data uses a different one.
    #[serde(default)]
    pub osm_name: Option<String>,
}

impl SeedEntry {
    /// Name to put in the Overpass `name` filter.
    #[must_use]
    pub fn lookup_name(&self) -> &str {
        self.osm_name.as_deref().unwrap_or(&self.name)
    }

    /// Resolves this entry into zone attributes.
    #[must_use]
    pub fn attributes(&self) -> ZoneAttributes {
        ZoneAttributes {
            classification: self.classification,
            restriction: self.restriction.clone().unwrap_or_else(|| {
                self.classification.default_restriction().to_string()
            }),
            region: self.region.clone(),
        }
    }
}

/// A named list of seed entries, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedList {
    /// Unique identifier referenced by `by_name` queries.
    pub id: String,
    /// Human-readable description.
    pub name: String,
    /// Entries in lookup order.
    #[serde(default)]
    pub seeds: Vec<SeedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_query() {
        let query: QueryDefinition = toml::from_str(
            r#"
            id = "rivers"
            name = "Rivers"
            priority = 30
            timeout_secs = 300
            max_span = 0.05

            [defaults]
            classification = "restricted"

            [fetcher]
            type = "category"

            [[fetcher.selectors]]
            element = "way"
            tags = { waterway = "riverbank" }
            "#,
        )
        .unwrap();

        assert_eq!(query.assembly, GeometryAssembly::Richest);
        assert_eq!(query.max_span, Some(0.05));
        assert_eq!(query.fetcher.selectors().len(), 1);
        assert_eq!(query.fetcher.selectors()[0].element, ElementKind::Way);
        assert_eq!(query.defaults.attributes().restriction, "낚시 제한");
    }

    #[test]
    fn parses_by_name_query() {
        let query: QueryDefinition = toml::from_str(
            r#"
            id = "dams"
            name = "Dams"
            priority = 10
            timeout_secs = 60
            assembly = "multipolygon"

            [defaults]
            restriction = "상수원보호구역"

            [fetcher]
            type = "by_name"
            seeds = "dams"

            [[fetcher.selectors]]
            element = "relation"
            "#,
        )
        .unwrap();

        assert_eq!(query.assembly, GeometryAssembly::Multipolygon);
        assert!(matches!(query.fetcher, FetcherConfig::ByName { ref seeds, .. } if seeds == "dams"));
        assert!(query.fetcher.selectors()[0].tags.is_empty());
        assert_eq!(query.defaults.attributes().restriction, "상수원보호구역");
    }

    #[test]
    fn unknown_fetcher_type_is_rejected() {
        let result: Result<FetcherConfig, _> = toml::from_str(r#"type = "scrape""#);
        assert!(result.is_err());
    }

    #[test]
    fn seed_entry_defaults() {
        let list: SeedList = toml::from_str(
            r#"
            id = "test"
            name = "Test"

            [[seeds]]
            name = "팔당댐"
            osm_name = "팔당호"

            [[seeds]]
            name = "예당저수지"
            region = "충남"
            classification = "restricted"
            "#,
        )
        .unwrap();

        assert_eq!(list.seeds[0].lookup_name(), "팔당호");
        assert_eq!(list.seeds[0].attributes().restriction, "낚시 금지");
        assert_eq!(list.seeds[1].lookup_name(), "예당저수지");
        assert_eq!(
            list.seeds[1].attributes().classification,
            Classification::Restricted
        );
    }
}
