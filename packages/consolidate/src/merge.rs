//! Name-keyed deduplication across source datasets.

use std::collections::BTreeMap;

use fishing_zones_zone_models::ZoneDraft;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_draft;

/// How a name collision between two drafts is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the draft with strictly more coordinates; first seen on ties.
    ///
    /// Point count is only a proxy for geometric quality.
    #[default]
    RicherGeometry,
    /// The first draft seen for a name always wins.
    KeepFirst,
}

/// One labelled batch of drafts (a fetch run, a curated list, or the
/// previous dataset).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDataset {
    /// Human-readable origin, used in logs and reports.
    pub label: String,
    /// Drafts in source order.
    pub drafts: Vec<ZoneDraft>,
}

impl SourceDataset {
    #[must_use]
    pub fn new(label: impl Into<String>, drafts: Vec<ZoneDraft>) -> Self {
        Self {
            label: label.into(),
            drafts,
        }
    }
}

/// Merge result: one draft per name plus collision counts.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Surviving drafts in first-seen name order.
    pub drafts: Vec<ZoneDraft>,
    /// Collisions where a later draft replaced the earlier one.
    pub replaced: usize,
    /// Collisions where the earlier draft was kept.
    pub kept: usize,
    /// Drafts dropped for a blank name or unusable geometry.
    pub dropped: usize,
}

/// Merges datasets in order into one draft per name.
///
/// Every draft is normalized first. The result only depends on the
/// inputs and their order.
#[must_use]
pub fn merge_sources(sources: Vec<SourceDataset>, policy: MergePolicy) -> MergeOutcome {
    let mut slots: BTreeMap<String, usize> = BTreeMap::new();
    let mut outcome = MergeOutcome {
        drafts: Vec::new(),
        replaced: 0,
        kept: 0,
        dropped: 0,
    };

    for source in sources {
        let mut dropped = 0;

        for draft in source.drafts {
            let Some(draft) = normalize_draft(draft) else {
                dropped += 1;
                continue;
            };

            let Some(&slot) = slots.get(&draft.name) else {
                slots.insert(draft.name.clone(), outcome.drafts.len());
                outcome.drafts.push(draft);
                continue;
            };

            let current = &mut outcome.drafts[slot];
            let replace = match policy {
                MergePolicy::RicherGeometry => {
                    draft.geometry.point_count() > current.geometry.point_count()
                }
                MergePolicy::KeepFirst => false,
            };

            if replace {
                log::trace!(
                    "'{}' from {} replaces earlier geometry ({} > {} points)",
                    draft.name,
                    source.label,
                    draft.geometry.point_count(),
                    current.geometry.point_count(),
                );
                *current = draft;
                outcome.replaced += 1;
            } else {
                outcome.kept += 1;
            }
        }

        if dropped > 0 {
            log::debug!("{}: dropped {dropped} unusable drafts", source.label);
        }
        outcome.dropped += dropped;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use fishing_zones_zone_models::{Classification, GeoPoint, Ring, ZoneGeometry};

    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn ring(n: usize, offset: f64) -> Ring {
        Ring::closed(
            (0..n)
                .map(|i| GeoPoint::rounded(36.0 + offset + i as f64 * 0.001, 127.0 + (i % 2) as f64 * 0.001))
                .collect(),
        )
    }

    fn draft(name: &str, class: Classification, restriction: &str, points: usize) -> ZoneDraft {
        ZoneDraft {
            name: name.to_string(),
            classification: class,
            restriction: restriction.to_string(),
            region: String::new(),
            geometry: ZoneGeometry::Polygon(ring(points - 1, 0.0)),
        }
    }

    #[test]
    fn richer_geometry_wins_with_its_attributes() {
        let a = draft("안동호", Classification::Prohibited, "A", 8);
        let b = draft("안동호", Classification::Restricted, "B", 20);

        let outcome = merge_sources(
            vec![
                SourceDataset::new("first", vec![a]),
                SourceDataset::new("second", vec![b.clone()]),
            ],
            MergePolicy::RicherGeometry,
        );

        assert_eq!(outcome.drafts, vec![b]);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.kept, 0);
    }

    #[test]
    fn ties_keep_first_seen() {
        let a = draft("충주호", Classification::Prohibited, "A", 10);
        let b = draft("충주호", Classification::Restricted, "B", 10);

        let outcome = merge_sources(
            vec![SourceDataset::new("mixed", vec![a.clone(), b])],
            MergePolicy::RicherGeometry,
        );

        assert_eq!(outcome.drafts, vec![a]);
        assert_eq!(outcome.kept, 1);
    }

    #[test]
    fn keep_first_ignores_richness() {
        let a = draft("소양호", Classification::Prohibited, "A", 5);
        let b = draft("소양호", Classification::Prohibited, "B", 50);

        let outcome = merge_sources(
            vec![SourceDataset::new("existing", vec![a.clone()]), SourceDataset::new("new", vec![b])],
            MergePolicy::KeepFirst,
        );

        assert_eq!(outcome.drafts, vec![a]);
    }

    #[test]
    fn preserves_first_seen_name_order() {
        let outcome = merge_sources(
            vec![
                SourceDataset::new(
                    "one",
                    vec![
                        draft("가", Classification::Prohibited, "", 6),
                        draft("나", Classification::Prohibited, "", 6),
                    ],
                ),
                SourceDataset::new(
                    "two",
                    vec![
                        draft("다", Classification::Prohibited, "", 6),
                        draft("가", Classification::Prohibited, "", 30),
                    ],
                ),
            ],
            MergePolicy::RicherGeometry,
        );

        let names: Vec<_> = outcome.drafts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["가", "나", "다"]);
        assert_eq!(outcome.drafts[0].geometry.point_count(), 30);
    }

    #[test]
    fn drops_unusable_drafts_and_merges_trimmed_names() {
        let mut blank = draft("x", Classification::Prohibited, "", 6);
        blank.name = "   ".to_string();
        let mut short = draft("짧은", Classification::Prohibited, "", 6);
        short.geometry = ZoneGeometry::Polygon(Ring::new(vec![GeoPoint::new(36.0, 127.0)]));
        let mut padded = draft(" 예당저수지 ", Classification::Prohibited, "", 12);
        padded.region = "충남".to_string();

        let outcome = merge_sources(
            vec![SourceDataset::new(
                "curated",
                vec![
                    blank,
                    short,
                    draft("예당저수지", Classification::Prohibited, "", 6),
                    padded,
                ],
            )],
            MergePolicy::RicherGeometry,
        );

        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.drafts.len(), 1);
        assert_eq!(outcome.drafts[0].name, "예당저수지");
        assert_eq!(outcome.drafts[0].region, "충남");
    }

    #[test]
    fn merging_is_deterministic() {
        let sources = vec![
            SourceDataset::new(
                "a",
                vec![
                    draft("탑정호", Classification::Prohibited, "1", 9),
                    draft("삽교호", Classification::Restricted, "2", 7),
                ],
            ),
            SourceDataset::new(
                "b",
                vec![
                    draft("삽교호", Classification::Prohibited, "3", 14),
                    draft("탑정호", Classification::Restricted, "4", 9),
                ],
            ),
        ];

        let first = merge_sources(sources.clone(), MergePolicy::RicherGeometry);
        let second = merge_sources(sources, MergePolicy::RicherGeometry);
        assert_eq!(first, second);

        let again = merge_sources(
            vec![SourceDataset::new("previous", first.drafts.clone())],
            MergePolicy::RicherGeometry,
        );
        assert_eq!(again.drafts, first.drafts);
    }

    #[test]
    fn merged_coordinates_are_rounded() {
        let mut curated = draft("청평호", Classification::Restricted, "", 6);
        curated.geometry = ZoneGeometry::Polygon(Ring::new(vec![
            GeoPoint::new(37.123_456_789, 127.987_654_321),
            GeoPoint::new(37.123_456_789, 127.997_654_321),
            GeoPoint::new(37.133_456_789, 127.997_654_321),
            GeoPoint::new(37.133_456_789, 127.987_654_321),
        ]));

        let outcome = merge_sources(
            vec![SourceDataset::new("curated", vec![curated])],
            MergePolicy::RicherGeometry,
        );

        let ring = &outcome.drafts[0].geometry.rings()[0];
        assert_eq!(ring.points()[0], GeoPoint::new(37.123_457, 127.987_654));
        assert_eq!(ring.points()[2], GeoPoint::new(37.133_457, 127.997_654));
        assert!(ring.is_closed());
    }
}
