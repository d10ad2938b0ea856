#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over fishing zones.
//!
//! Answers the two questions the map asks: which zone is under a tapped
//! point, and which zones fall inside the visible viewport. Zones are
//! bulk-loaded into an R-tree keyed by their bounding boxes, and point
//! queries are confirmed with an exact point-in-polygon test.

use fishing_zones_zone_models::{BoundingBox, Ring, Zone};
use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use rstar::{AABB, RTree, RTreeObject};

/// A zone's outline stored in the R-tree.
struct ZoneEntry {
    id: u32,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of zone outlines (x = longitude, y = latitude).
pub struct ZoneIndex {
    tree: RTree<ZoneEntry>,
}

impl ZoneIndex {
    /// Builds the index. Zones without any ring are skipped.
    #[must_use]
    pub fn build(zones: &[Zone]) -> Self {
        let entries: Vec<ZoneEntry> = zones
            .iter()
            .filter_map(|zone| {
                let polygon = to_multipolygon(zone.geometry.rings());
                let Some(envelope) = compute_envelope(&polygon) else {
                    log::debug!("Zone {} ({}) has no geometry, not indexed", zone.id, zone.name);
                    return None;
                };
                Some(ZoneEntry {
                    id: zone.id,
                    envelope,
                    polygon,
                })
            })
            .collect();

        log::info!("Indexed {} zones", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if no zone was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Ids of zones whose outline contains the point, ascending.
    ///
    /// Points exactly on an outline are not contained.
    #[must_use]
    pub fn containing(&self, lat: f64, lng: f64) -> Vec<u32> {
        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        let mut ids: Vec<u32> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of zones whose bounding box intersects the viewport, ascending.
    #[must_use]
    pub fn in_viewport(&self, viewport: &BoundingBox) -> Vec<u32> {
        let query_env = AABB::from_corners(
            [viewport.min_lng, viewport.min_lat],
            [viewport.max_lng, viewport.max_lat],
        );

        let mut ids: Vec<u32> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Each ring becomes its own polygon; holes are not modelled.
fn to_multipolygon(rings: &[Ring]) -> MultiPolygon<f64> {
    MultiPolygon(
        rings
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| {
                let exterior: LineString<f64> = ring
                    .iter()
                    .map(|point| Coord {
                        x: point.lng,
                        y: point.lat,
                    })
                    .collect();
                Polygon::new(exterior, Vec::new())
            })
            .collect(),
    )
}

fn compute_envelope(polygon: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon
        .bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
