//! Dense 1-based zone numbering.

use fishing_zones_zone_models::{Zone, ZoneDraft};

/// Numbers drafts `1..=N` in order.
#[must_use]
pub fn assign_ids(drafts: Vec<ZoneDraft>) -> Vec<Zone> {
    (1..)
        .zip(drafts)
        .map(|(id, draft)| draft.into_zone(id))
        .collect()
}

/// Discards existing ids and renumbers zones `1..=N` in order.
#[must_use]
pub fn reassign_ids(zones: Vec<Zone>) -> Vec<Zone> {
    assign_ids(zones.into_iter().map(Zone::into_draft).collect())
}

#[cfg(test)]
mod tests {
    use fishing_zones_zone_models::{Classification, Ring, ZoneGeometry};

    use super::*;

    fn zone(id: u32, name: &str) -> Zone {
        Zone {
            id,
            name: name.to_string(),
            classification: Classification::Prohibited,
            restriction: String::new(),
            region: String::new(),
            geometry: ZoneGeometry::Polygon(Ring::default()),
        }
    }

    #[test]
    fn ids_are_dense_from_one() {
        let zones = reassign_ids(vec![zone(7, "a"), zone(7, "b"), zone(42, "c")]);
        let ids: Vec<u32> = zones.iter().map(|z| z.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(zones[2].name, "c");
    }

    #[test]
    fn empty_input_yields_no_zones() {
        assert!(assign_ids(Vec::new()).is_empty());
    }
}
