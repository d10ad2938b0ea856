#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistence for the fishing zone dataset.
//!
//! The canonical artifact is a typed JSON file holding the zones and the
//! style table. The map frontend imports an ES module, which
//! [`Dataset::to_js_module`] renders from the same data. Per-query fetch
//! results are kept as [`SourceSnapshot`]s so fetching and consolidating
//! can run separately.

pub mod paths;
pub mod snapshot;

use std::path::{Path, PathBuf};

use fishing_zones_zone_models::{StyleTable, Zone, ZoneDraft};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub use snapshot::SourceSnapshot;

/// Errors from reading or writing dataset files.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// File system access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected shape (this includes
    /// geometry whose coordinates don't match its kind flag).
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// The canonical dataset: numbered zones plus their map styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Zones, numbered `1..=N`.
    pub zones: Vec<Zone>,
    /// Styles per classification; defaulted when absent from the file.
    #[serde(default)]
    pub styles: StyleTable,
}

impl Dataset {
    #[must_use]
    pub const fn new(zones: Vec<Zone>, styles: StyleTable) -> Self {
        Self { zones, styles }
    }

    /// Reads a dataset file.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the file can't be read
    /// * [`DatasetError::Json`] if it isn't a valid dataset
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        read_json(path)
    }

    /// Reads a dataset file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`], except a missing file is `Ok(None)`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, DatasetError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Writes the dataset as pretty JSON with a trailing newline,
    /// creating parent directories.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the file can't be written
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        write_json(path, self)?;
        log::info!("Wrote {} zones to {}", self.zones.len(), path.display());
        Ok(())
    }

    /// Renders the ES module the map frontend imports.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the zones can't be encoded (this
    /// does not happen for finite coordinates).
    pub fn to_js_module(&self) -> Result<String, serde_json::Error> {
        Ok(format!(
            "export const fishingZones = {};\n\nexport const zoneStyles = {};\n",
            serde_json::to_string_pretty(&self.zones)?,
            serde_json::to_string_pretty(&self.styles)?,
        ))
    }

    /// Writes [`Self::to_js_module`] to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the file can't be written
    /// * [`DatasetError::Json`] if the zones can't be encoded
    pub fn export_js(&self, path: &Path) -> Result<(), DatasetError> {
        let module = self.to_js_module().map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_text(path, &module)?;
        log::info!("Exported {} zones to {}", self.zones.len(), path.display());
        Ok(())
    }
}

/// On-disk shapes accepted for curated zone files.
#[derive(Deserialize)]
#[serde(untagged)]
enum DraftFile {
    List(Vec<ZoneDraft>),
    Wrapped { zones: Vec<ZoneDraft> },
}

/// Reads curated zones as drafts.
///
/// Accepts a bare JSON array of zone records or an object with a `zones`
/// array (a dataset file qualifies). Any `id` is ignored.
///
/// # Errors
///
/// * [`DatasetError::Io`] if the file can't be read
/// * [`DatasetError::Json`] if neither shape matches
pub fn load_drafts(path: &Path) -> Result<Vec<ZoneDraft>, DatasetError> {
    Ok(match read_json(path)? {
        DraftFile::List(drafts) | DraftFile::Wrapped { zones: drafts } => drafts,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DatasetError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    write_text(path, &text)
}

fn write_text(path: &Path, text: &str) -> Result<(), DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent).map_err(io_err)?;
    }
    std::fs::write(path, text).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use fishing_zones_zone_models::{Classification, GeoPoint, Ring, ZoneGeometry};

    use super::*;

    fn zone(id: u32, name: &str, geometry: ZoneGeometry) -> Zone {
        Zone {
            id,
            name: name.to_string(),
            classification: Classification::Prohibited,
            restriction: "낚시 금지구역\n※ 정확한 규제 내용은 관할 지자체에 확인".to_string(),
            region: "경기도".to_string(),
            geometry,
        }
    }

    fn square(lat: f64, lng: f64) -> Ring {
        Ring::closed(vec![
            GeoPoint::new(lat, lng),
            GeoPoint::new(lat, lng + 0.001_234),
            GeoPoint::new(lat + 0.001_234, lng + 0.001_234),
            GeoPoint::new(lat + 0.001_234, lng),
        ])
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                zone(1, "기흥저수지", ZoneGeometry::Polygon(square(37.23, 127.11))),
                zone(
                    2,
                    "한강",
                    ZoneGeometry::Multipolygon(vec![square(37.52, 126.98), square(37.53, 127.01)]),
                ),
                zone(3, "신갈저수지", ZoneGeometry::Polygon(square(37.24, 127.09))),
            ],
            StyleTable::default(),
        )
    }

    #[test]
    fn save_then_load_is_lossless() {
        let tmp = std::env::temp_dir().join("fishing_zones_dataset_roundtrip");
        let _ = std::fs::remove_dir_all(&tmp);
        let path = tmp.join("nested").join("fishing_zones.json");

        let dataset = sample();
        dataset.save(&path).unwrap();
        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded, dataset);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("기흥저수지"));
        assert!(text.find("\"zones\"").unwrap() < text.find("\"styles\"").unwrap());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_styles_fall_back_to_defaults() {
        let dataset: Dataset = serde_json::from_value(serde_json::json!({ "zones": [] })).unwrap();
        assert_eq!(dataset.styles, StyleTable::default());
    }

    #[test]
    fn load_optional_handles_missing_file() {
        let path = std::env::temp_dir().join("fishing_zones_dataset_absent.json");
        let _ = std::fs::remove_file(&path);
        assert!(Dataset::load_optional(&path).unwrap().is_none());
    }

    #[test]
    fn js_module_has_both_exports() {
        let module = sample().to_js_module().unwrap();
        assert!(module.starts_with("export const fishingZones = [\n"));
        assert!(module.contains("];\n\nexport const zoneStyles = {\n"));
        assert!(module.ends_with("};\n"));
        assert!(module.contains("\"fillColor\": \"#CC3333\""));
    }

    #[test]
    fn load_drafts_accepts_array_and_wrapped_forms() {
        let tmp = std::env::temp_dir().join("fishing_zones_dataset_drafts");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let array = tmp.join("array.json");
        std::fs::write(
            &array,
            serde_json::to_string(&sample().zones).unwrap(),
        )
        .unwrap();
        let wrapped = tmp.join("wrapped.json");
        std::fs::write(
            &wrapped,
            r#"{ "zones": [{ "id": 99, "name": "수성못", "type": "restricted", "coordinates": [] }], "total": 1 }"#,
        )
        .unwrap();

        assert_eq!(load_drafts(&array).unwrap().len(), 3);
        let drafts = load_drafts(&wrapped).unwrap();
        assert_eq!(drafts[0].name, "수성못");
        assert_eq!(drafts[0].classification, Classification::Restricted);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn mismatched_geometry_is_a_json_error() {
        let tmp = std::env::temp_dir().join("fishing_zones_dataset_bad_shape.json");
        std::fs::write(
            &tmp,
            r#"{ "zones": [{ "id": 1, "name": "x", "type": "prohibited", "geometry": "multipolygon", "coordinates": [{ "lat": 1, "lng": 2 }] }] }"#,
        )
        .unwrap();

        assert!(matches!(Dataset::load(&tmp), Err(DatasetError::Json { .. })));
        let _ = std::fs::remove_file(&tmp);
    }
}
