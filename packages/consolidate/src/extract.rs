//! Extracts named rings from raw Overpass `out geom` elements.
//!
//! Elements are handled as loose [`serde_json::Value`]s so that one
//! malformed element only drops itself, never the whole response.

use std::collections::BTreeMap;

use fishing_zones_zone_models::{GeoPoint, GeometryAssembly, RawRecord, Ring, ZoneGeometry};
use serde_json::Value;

use crate::Rejection;

/// Extracts a record from every element, skipping the ones that yield no
/// named geometry. Source order is preserved.
#[must_use]
pub fn extract_records(elements: &[Value]) -> Vec<RawRecord> {
    elements
        .iter()
        .filter_map(|element| extract_record(element).ok())
        .collect()
}

/// Extracts the name and boundary of a single way or relation.
///
/// * `way`: the element's own `geometry` list.
/// * `relation`: the geometry of the first member with role `outer`
///   that carries geometry. Inner members (holes) are ignored.
///
/// Coordinates are rounded to 6 decimals. The returned ring is not closed
/// yet.
///
/// # Errors
///
/// Returns the [`Rejection`] explaining why nothing was produced.
pub fn extract_record(element: &Value) -> Result<RawRecord, Rejection> {
    let name = element
        .get("tags")
        .and_then(|tags| tags.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(Rejection::Unnamed)?
        .to_string();

    let ring = match element.get("type").and_then(Value::as_str) {
        Some("way") => element.get("geometry").and_then(parse_ring),
        Some("relation") => outer_ring(element),
        _ => None,
    }
    .ok_or(Rejection::NoGeometry)?;

    Ok(RawRecord {
        name,
        geometry: ZoneGeometry::Polygon(ring),
    })
}

fn outer_ring(relation: &Value) -> Option<Ring> {
    let outer = relation.get("members")?.as_array()?.iter().find(|member| {
        member.get("role").and_then(Value::as_str) == Some("outer")
            && member.get("geometry").is_some()
    })?;

    parse_ring(outer.get("geometry")?)
}

/// Parses an Overpass geometry list (`[{ "lat": .., "lon": .. }, ..]`).
///
/// Any point without numeric coordinates (Overpass emits `null` for nodes
/// it could not resolve) invalidates the whole list.
fn parse_ring(geometry: &Value) -> Option<Ring> {
    let points = geometry
        .as_array()?
        .iter()
        .map(|point| {
            let lat = point.get("lat")?.as_f64()?;
            let lon = point.get("lon")?.as_f64()?;
            Some(GeoPoint::rounded(lat, lon))
        })
        .collect::<Option<Vec<_>>>()?;

    if points.is_empty() {
        return None;
    }

    Some(Ring::new(points))
}

/// Combines same-named records from one query into one record per name,
/// in first-seen order.
#[must_use]
pub fn assemble_by_name(records: Vec<RawRecord>, assembly: GeometryAssembly) -> Vec<RawRecord> {
    let mut slots: BTreeMap<String, usize> = BTreeMap::new();
    let mut grouped: Vec<(String, Vec<ZoneGeometry>)> = Vec::new();

    for record in records {
        if let Some(&slot) = slots.get(&record.name) {
            grouped[slot].1.push(record.geometry);
        } else {
            slots.insert(record.name.clone(), grouped.len());
            grouped.push((record.name, vec![record.geometry]));
        }
    }

    grouped
        .into_iter()
        .filter_map(|(name, geometries)| {
            let geometry = match assembly {
                GeometryAssembly::Richest => richest(geometries)?,
                GeometryAssembly::Multipolygon => combine(geometries)?,
            };
            Some(RawRecord { name, geometry })
        })
        .collect()
}

fn richest(geometries: Vec<ZoneGeometry>) -> Option<ZoneGeometry> {
    geometries.into_iter().reduce(|best, candidate| {
        if candidate.point_count() > best.point_count() {
            candidate
        } else {
            best
        }
    })
}

fn combine(geometries: Vec<ZoneGeometry>) -> Option<ZoneGeometry> {
    let mut rings: Vec<Ring> = geometries
        .into_iter()
        .flat_map(|geometry| match geometry {
            ZoneGeometry::Polygon(ring) => vec![ring],
            ZoneGeometry::Multipolygon(rings) => rings,
        })
        .collect();

    match rings.len() {
        0 => None,
        1 => rings.pop().map(ZoneGeometry::Polygon),
        _ => Some(ZoneGeometry::Multipolygon(rings)),
    }
}
