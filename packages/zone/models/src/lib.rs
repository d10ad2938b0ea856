#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fishing zone types shared across the toolchain.
//!
//! A [`Zone`] is one named water body where fishing is prohibited or
//! restricted, together with its polygon geometry. Zones flow through the
//! consolidation pipeline as identifier-less [`ZoneDraft`]s and only get
//! their numeric id once the final dataset is assembled.

pub mod geometry;
pub mod style;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use geometry::{
    BoundingBox, COORDINATE_DECIMALS, GeoPoint, GeometryAssembly, GeometryKind, GeometryShapeError,
    MIN_RING_POINTS, Ring, ZoneGeometry, round_coordinate,
};
pub use style::{StyleTable, ZoneStyle};

/// How fishing is regulated inside a zone.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Classification {
    /// Fishing is banned outright.
    #[default]
    Prohibited,
    /// Fishing is allowed with restrictions (seasons, methods, permits).
    Restricted,
}

impl Classification {
    /// Every classification, in tag order.
    pub const ALL: &[Self] = &[Self::Prohibited, Self::Restricted];

    /// Restriction text used when a curated entry doesn't provide one.
    #[must_use]
    pub const fn default_restriction(self) -> &'static str {
        match self {
            Self::Prohibited => "낚시 금지",
            Self::Restricted => "낚시 제한",
        }
    }
}

/// Non-geometry attributes attached to a fetched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    /// Zone classification.
    pub classification: Classification,
    /// Human-readable description of the restriction.
    pub restriction: String,
    /// Administrative region label (may be empty).
    #[serde(default)]
    pub region: String,
}

/// A named geometry extracted from a geodata element, before any
/// attributes or identifier are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Value of the element's `name` tag.
    pub name: String,
    /// Extracted rings.
    pub geometry: ZoneGeometry,
}

/// A zone without an identifier, as it moves through merging.
///
/// Any `id` present in input JSON is ignored when reading a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDraft {
    /// Zone name, also the deduplication key.
    pub name: String,
    /// Zone classification, serialized as `type`.
    #[serde(rename = "type")]
    pub classification: Classification,
    /// Human-readable description of the restriction.
    #[serde(default)]
    pub restriction: String,
    /// Administrative region label (may be empty).
    #[serde(default)]
    pub region: String,
    /// Zone geometry.
    #[serde(flatten)]
    pub geometry: ZoneGeometry,
}

impl ZoneDraft {
    /// Attaches attributes to an extracted record.
    #[must_use]
    pub fn from_record(record: RawRecord, attributes: &ZoneAttributes) -> Self {
        Self {
            name: record.name,
            classification: attributes.classification,
            restriction: attributes.restriction.clone(),
            region: attributes.region.clone(),
            geometry: record.geometry,
        }
    }

    /// Assigns an identifier, producing a final zone.
    #[must_use]
    pub fn into_zone(self, id: u32) -> Zone {
        Zone {
            id,
            name: self.name,
            classification: self.classification,
            restriction: self.restriction,
            region: self.region,
            geometry: self.geometry,
        }
    }
}

/// A canonical fishing zone in the output dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Dense 1-based identifier, assigned after merging.
    pub id: u32,
    /// Zone name, unique within a dataset.
    pub name: String,
    /// Zone classification, serialized as `type`.
    #[serde(rename = "type")]
    pub classification: Classification,
    /// Human-readable description of the restriction.
    #[serde(default)]
    pub restriction: String,
    /// Administrative region label (may be empty).
    #[serde(default)]
    pub region: String,
    /// Zone geometry.
    #[serde(flatten)]
    pub geometry: ZoneGeometry,
}

impl Zone {
    /// Drops the identifier so the zone can be merged again.
    #[must_use]
    pub fn into_draft(self) -> ZoneDraft {
        ZoneDraft {
            name: self.name,
            classification: self.classification,
            restriction: self.restriction,
            region: self.region,
            geometry: self.geometry,
        }
    }
}
