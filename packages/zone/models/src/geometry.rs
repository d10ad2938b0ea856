//! Coordinate, ring, and zone geometry types.
//!
//! Coordinates are stored the way the map frontend consumes them:
//! `{ "lat": .., "lng": .. }` objects, with rings as bare arrays of points.

use serde::{Deserialize, Serialize};

/// Number of decimal places kept for every extracted coordinate
/// (roughly 0.11 m of resolution).
pub const COORDINATE_DECIMALS: i32 = 6;

const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Minimum length of a usable ring: three distinct vertices plus the
/// closing point.
pub const MIN_RING_POINTS: usize = 4;

/// Rounds a degree value to [`COORDINATE_DECIMALS`] places.
///
/// Rounding an already-rounded value returns it unchanged.
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// A single WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point without touching its precision.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a point rounded to the canonical precision.
    #[must_use]
    pub fn rounded(lat: f64, lng: f64) -> Self {
        Self {
            lat: round_coordinate(lat),
            lng: round_coordinate(lng),
        }
    }

    /// Returns this point rounded to the canonical precision.
    #[must_use]
    pub fn round(self) -> Self {
        Self::rounded(self.lat, self.lng)
    }
}

/// An ordered polygon boundary.
///
/// A ring built with [`Ring::closed`] (or passed through [`Ring::close`])
/// always has its first point equal to its last point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring(Vec<GeoPoint>);

impl Ring {
    /// Wraps the points as-is.
    #[must_use]
    pub const fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    /// Wraps the points and closes the ring.
    #[must_use]
    pub fn closed(points: Vec<GeoPoint>) -> Self {
        let mut ring = Self(points);
        ring.close();
        ring
    }

    /// Appends a copy of the first point if the ring is open.
    ///
    /// Empty and already-closed rings are left untouched.
    pub fn close(&mut self) {
        if let Some(&first) = self.0.first()
            && self.0.last() != Some(&first)
        {
            self.0.push(first);
        }
    }

    /// Returns `true` if the first and last points are equal (vacuously
    /// `true` for an empty ring).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.first() == self.0.last()
    }

    /// Returns the points of the ring.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    /// Number of points, including the closing point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the ring has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the ring is long enough to be zone geometry.
    #[must_use]
    pub fn is_viable(&self) -> bool {
        self.0.len() >= MIN_RING_POINTS
    }

    /// Iterates over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.0.iter()
    }

    /// Consumes the ring, returning its points.
    #[must_use]
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.0
    }
}

impl From<Vec<GeoPoint>> for Ring {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }
}

impl FromIterator<GeoPoint> for Ring {
    fn from_iter<T: IntoIterator<Item = GeoPoint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ring {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The serialized geometry kind flag (`"polygon"` / `"multipolygon"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Exactly one ring.
    #[default]
    Polygon,
    /// An ordered list of independent rings.
    Multipolygon,
}

/// Geometry payload of a zone.
///
/// Serialized flattened into the zone record as a `geometry` kind flag
/// plus a `coordinates` payload. Records without a `geometry` flag load
/// as polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeometryRecord", into = "GeometryRecord")]
pub enum ZoneGeometry {
    /// A single ring.
    Polygon(Ring),
    /// Several rings, in source order.
    Multipolygon(Vec<Ring>),
}

impl ZoneGeometry {
    /// Returns the kind flag for this geometry.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::Multipolygon(_) => GeometryKind::Multipolygon,
        }
    }

    /// Returns all rings as a slice (a polygon yields one ring).
    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        match self {
            Self::Polygon(ring) => std::slice::from_ref(ring),
            Self::Multipolygon(rings) => rings,
        }
    }

    /// Total number of points across all rings.
    ///
    /// This is the "richness" used to pick between records that share a
    /// name: more points wins.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.rings().iter().map(Ring::len).sum()
    }
}

/// Flat wire shape of [`ZoneGeometry`].
#[derive(Serialize, Deserialize)]
struct GeometryRecord {
    #[serde(default)]
    geometry: GeometryKind,
    #[serde(default)]
    coordinates: Coordinates,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Coordinates {
    Rings(Vec<Ring>),
    Points(Vec<GeoPoint>),
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::Points(Vec::new())
    }
}

/// Error returned when a record's coordinates don't match its geometry
/// kind flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryShapeError {
    /// The declared kind.
    pub kind: GeometryKind,
}

impl std::fmt::Display for GeometryShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            GeometryKind::Polygon => {
                f.write_str("polygon geometry must be a flat list of points")
            }
            GeometryKind::Multipolygon => {
                f.write_str("multipolygon geometry must be a list of rings")
            }
        }
    }
}

impl std::error::Error for GeometryShapeError {}

impl TryFrom<GeometryRecord> for ZoneGeometry {
    type Error = GeometryShapeError;

    fn try_from(record: GeometryRecord) -> Result<Self, Self::Error> {
        match (record.geometry, record.coordinates) {
            (GeometryKind::Polygon, Coordinates::Points(points)) => {
                Ok(Self::Polygon(Ring::new(points)))
            }
            (GeometryKind::Polygon, Coordinates::Rings(rings)) if rings.is_empty() => {
                Ok(Self::Polygon(Ring::default()))
            }
            (GeometryKind::Multipolygon, Coordinates::Rings(rings)) => {
                Ok(Self::Multipolygon(rings))
            }
            (GeometryKind::Multipolygon, Coordinates::Points(points)) if points.is_empty() => {
                Ok(Self::Multipolygon(Vec::new()))
            }
            (kind, _) => Err(GeometryShapeError { kind }),
        }
    }
}

impl From<ZoneGeometry> for GeometryRecord {
    fn from(geometry: ZoneGeometry) -> Self {
        match geometry {
            ZoneGeometry::Polygon(ring) => Self {
                geometry: GeometryKind::Polygon,
                coordinates: Coordinates::Points(ring.into_points()),
            },
            ZoneGeometry::Multipolygon(rings) => Self {
                geometry: GeometryKind::Multipolygon,
                coordinates: Coordinates::Rings(rings),
            },
        }
    }
}

/// How the accepted rings of several same-named elements from one query
/// are combined into a single zone geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryAssembly {
    /// Keep only the ring with the most points (first seen on ties).
    #[default]
    Richest,
    /// Keep every ring, in source order, as one multipolygon.
    Multipolygon,
}

/// An axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BoundingBox {
    /// Envelope of South Korea used by the reference deployment.
    pub const SOUTH_KOREA: Self = Self {
        min_lat: 33.0,
        min_lng: 124.0,
        max_lat: 39.0,
        max_lng: 132.0,
    };

    /// Returns `true` if the point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SOUTH_KOREA
    }
}
