//! Canonical file paths under the data directory.
//!
//! Everything lives under `data/` at the workspace root unless
//! `FISHING_ZONES_DATA_DIR` points elsewhere.

use std::path::{Path, PathBuf};

/// Environment variable that overrides [`data_dir`].
pub const DATA_DIR_ENV: &str = "FISHING_ZONES_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the canonical dataset file.
#[must_use]
pub fn dataset_path() -> PathBuf {
    data_dir().join("fishing_zones.json")
}

/// Returns the `sources/` directory holding one snapshot per query.
#[must_use]
pub fn sources_dir() -> PathBuf {
    data_dir().join("sources")
}

/// Returns the snapshot file for a query.
#[must_use]
pub fn snapshot_path(query_id: &str) -> PathBuf {
    sources_dir().join(format!("{query_id}.json"))
}

/// Returns the `generated/` directory for frontend artifacts.
#[must_use]
pub fn generated_dir() -> PathBuf {
    data_dir().join("generated")
}

/// Returns the default JavaScript module export path.
#[must_use]
pub fn js_module_path() -> PathBuf {
    generated_dir().join("fishingZones.js")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
