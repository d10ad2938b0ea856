//! Coordinate rounding, ring closure and removal of unusable rings.

use fishing_zones_zone_models::{GeoPoint, Ring, ZoneDraft, ZoneGeometry};

/// Rounds a ring to the persisted precision, closes it, and keeps it only
/// if it is long enough to draw.
#[must_use]
pub fn normalize_ring(ring: Ring) -> Option<Ring> {
    let mut ring: Ring = ring.into_points().into_iter().map(GeoPoint::round).collect();
    ring.close();
    ring.is_viable().then_some(ring)
}

/// Closes every ring of a geometry and drops the ones that are too short.
///
/// Returns `None` when nothing usable is left. A multipolygon keeps its
/// kind even if only one ring survives.
#[must_use]
pub fn normalize_geometry(geometry: ZoneGeometry) -> Option<ZoneGeometry> {
    match geometry {
        ZoneGeometry::Polygon(ring) => normalize_ring(ring).map(ZoneGeometry::Polygon),
        ZoneGeometry::Multipolygon(rings) => {
            let rings: Vec<Ring> = rings.into_iter().filter_map(normalize_ring).collect();
            (!rings.is_empty()).then_some(ZoneGeometry::Multipolygon(rings))
        }
    }
}

/// Trims the draft's name and normalizes its geometry.
///
/// Drafts from every source pass through here, so curated files and the
/// existing dataset come out at the same precision as extracted ones.
///
/// Returns `None` if the name is blank or the geometry does not survive.
#[must_use]
pub fn normalize_draft(draft: ZoneDraft) -> Option<ZoneDraft> {
    let ZoneDraft {
        name,
        classification,
        restriction,
        region,
        geometry,
    } = draft;

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(ZoneDraft {
        name: name.to_string(),
        classification,
        restriction,
        region,
        geometry: normalize_geometry(geometry)?,
    })
}
