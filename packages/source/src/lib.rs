#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geodata acquisition for fishing zones.
//!
//! Query definitions and seed lists are embedded TOML (see [`registry`]).
//! [`overpass`] turns them into Overpass QL and fetches raw elements,
//! spacing requests with a shared [`throttle::Throttle`]. Turning elements
//! into zones is left to the consolidation pipeline.

pub mod overpass;
pub mod progress;
pub mod registry;
pub mod throttle;

use std::path::PathBuf;

/// Errors that can occur while fetching or loading source definitions.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Overpass returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response JSON had no `elements` array.
    #[error("Overpass response has no elements array")]
    MissingElements,

    /// A `by_name` query references a seed list that doesn't exist.
    #[error("Unknown seed list: {id}")]
    UnknownSeeds {
        /// Requested seed list id.
        id: String,
    },

    /// No query definition has this id.
    #[error("Unknown query: {id}")]
    UnknownQuery {
        /// Requested query id.
        id: String,
    },

    /// Reading a seed list file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A seed list file is not valid TOML for the schema.
    #[error("Invalid seed list {path}: {source}")]
    Toml {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}
