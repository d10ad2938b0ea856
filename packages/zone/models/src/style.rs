//! Map styling table keyed by zone classification.
//!
//! The table is static configuration shipped alongside the zones. It is
//! never derived from zone data, and consolidation carries an existing
//! table through untouched: entries are kept as raw JSON in file order,
//! so keys this crate doesn't know about and integer-valued numbers are
//! written back exactly as they were read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::Classification;

/// Typed view of one table entry.
///
/// Only used for reading; the table itself is never rebuilt from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStyle {
    /// Polygon fill color (CSS hex).
    pub fill_color: String,
    /// Fill opacity, 0.0 to 1.0.
    pub fill_opacity: f64,
    /// Outline color (CSS hex).
    pub stroke_color: String,
    /// Outline width in pixels.
    pub stroke_weight: u32,
    /// Outline opacity, 0.0 to 1.0.
    pub stroke_opacity: f64,
    /// Fill opacity while the zone is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_fill_opacity: Option<f64>,
    /// Outline width while the zone is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_stroke_weight: Option<u32>,
    /// Outline opacity while the zone is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_stroke_opacity: Option<f64>,
}

/// Styles for every classification, serialized as an object keyed by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleTable(Map<String, Value>);

impl StyleTable {
    /// Raw entry for a classification, exactly as stored.
    #[must_use]
    pub fn get(&self, classification: Classification) -> Option<&Value> {
        self.0.get(classification.as_ref())
    }

    /// Typed view of a classification's entry.
    ///
    /// Returns `None` if the entry is missing or lacks a required field.
    #[must_use]
    pub fn style(&self, classification: Classification) -> Option<ZoneStyle> {
        self.get(classification)
            .and_then(|entry| ZoneStyle::deserialize(entry).ok())
    }

    /// Classifications without a usable entry.
    #[must_use]
    pub fn unstyled(&self) -> Vec<Classification> {
        Classification::ALL
            .iter()
            .copied()
            .filter(|class| self.style(*class).is_none())
            .collect()
    }

    /// Number of entries, including ones for unknown tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry tags in file order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        let mut styles = Map::new();
        styles.insert(
            Classification::Prohibited.as_ref().to_string(),
            json!({
                "fillColor": "#CC3333",
                "fillOpacity": 0.3,
                "strokeColor": "#CC0000",
                "strokeWeight": 2,
                "strokeOpacity": 0.8
            }),
        );
        styles.insert(
            Classification::Restricted.as_ref().to_string(),
            json!({
                "fillColor": "#E67E22",
                "fillOpacity": 0.25,
                "strokeColor": "#CC6600",
                "strokeWeight": 2,
                "strokeOpacity": 0.7
            }),
        );
        Self(styles)
    }
}

impl From<Map<String, Value>> for StyleTable {
    fn from(entries: Map<String, Value>) -> Self {
        Self(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_classification() {
        let table = StyleTable::default();
        assert!(table.unstyled().is_empty());
        assert_eq!(
            table.style(Classification::Prohibited).unwrap().fill_color,
            "#CC3333"
        );
        assert_eq!(table.tags().collect::<Vec<_>>(), ["prohibited", "restricted"]);
    }

    #[test]
    fn serializes_keyed_by_tag_in_camel_case() {
        let json = serde_json::to_value(StyleTable::default()).unwrap();
        assert_eq!(json["prohibited"]["fillColor"], "#CC3333");
        assert_eq!(json["restricted"]["strokeWeight"], 2);
        assert!(json["prohibited"].get("selectedFillOpacity").is_none());
    }

    #[test]
    fn keeps_selected_overrides() {
        let table: StyleTable = serde_json::from_value(json!({
            "prohibited": {
                "fillColor": "#FF0000",
                "fillOpacity": 0.5,
                "strokeColor": "#CC0000",
                "strokeWeight": 3,
                "strokeOpacity": 1,
                "selectedFillOpacity": 0.7,
                "selectedStrokeWeight": 4,
                "selectedStrokeOpacity": 1
            }
        }))
        .unwrap();

        let style = table.style(Classification::Prohibited).unwrap();
        assert_eq!(style.selected_stroke_weight, Some(4));
        assert!((style.stroke_opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(table.unstyled(), [Classification::Restricted]);
    }

    #[test]
    fn table_text_survives_a_load_and_save() {
        let text = r##"{
  "restricted": {
    "fillColor": "#E67E22",
    "fillOpacity": 0.25,
    "strokeColor": "#CC6600",
    "strokeWeight": 2,
    "strokeOpacity": 1,
    "zIndex": 5
  },
  "prohibited": {
    "fillColor": "#CC3333",
    "fillOpacity": 0.3,
    "strokeColor": "#CC0000",
    "strokeWeight": 2,
    "strokeOpacity": 0.8
  },
  "seasonal": {
    "fillColor": "#3366CC"
  }
}"##;

        let table: StyleTable = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string_pretty(&table).unwrap(), text);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(Classification::Restricted).unwrap()["zIndex"], 5);
    }

    #[test]
    fn malformed_entry_has_no_typed_view() {
        let table: StyleTable =
            serde_json::from_value(json!({ "prohibited": { "fillColor": "#000000" } })).unwrap();
        assert!(table.get(Classification::Prohibited).is_some());
        assert!(table.style(Classification::Prohibited).is_none());
    }
}
