//! Per-query fetch results persisted between `fetch` and `consolidate`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fishing_zones_consolidate::FilterStats;
use fishing_zones_zone_models::ZoneDraft;
use serde::{Deserialize, Serialize};

use crate::{DatasetError, read_json, write_json};

/// Drafts produced by one query run, with filter counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// Id of the query definition that produced this snapshot.
    pub query_id: String,
    /// When the fetch finished (RFC 3339).
    pub fetched_at: DateTime<Utc>,
    /// Requests that failed and contributed no elements.
    #[serde(default)]
    pub failed_requests: usize,
    /// Filter counts summed over every request.
    #[serde(default)]
    pub stats: FilterStats,
    /// Accepted drafts in source order.
    pub drafts: Vec<ZoneDraft>,
}

impl SourceSnapshot {
    /// Reads a snapshot file.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the file can't be read
    /// * [`DatasetError::Json`] if it isn't a valid snapshot
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        read_json(path)
    }

    /// Writes the snapshot as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the file can't be written
    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        write_json(path, self)?;
        log::info!(
            "Saved {} drafts for {} to {}",
            self.drafts.len(),
            self.query_id,
            path.display()
        );
        Ok(())
    }

    /// Loads every `*.json` snapshot in `dir`, sorted by file name.
    ///
    /// A missing directory yields no snapshots.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::Io`] if the directory can't be listed
    /// * any error from [`Self::load`]
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, DatasetError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let io_err = |source| DatasetError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        files.iter().map(|path| Self::load(path)).collect()
    }
}
