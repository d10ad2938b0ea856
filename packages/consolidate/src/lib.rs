#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone consolidation pipeline.
//!
//! Turns raw Overpass elements and previously curated zone lists into one
//! deduplicated, densely numbered set of [`Zone`]s. Every stage is a pure
//! function over in-memory data:
//!
//! 1. [`extract`] pulls a name and ring out of each way/relation element.
//! 2. [`normalize`] closes rings and drops unusable ones.
//! 3. [`filter`] rejects rings outside the country envelope or spanning
//!    too large an area.
//! 4. [`simplify`] optionally caps the number of points per ring.
//! 5. [`merge`] keys everything by name and keeps the richest geometry.
//! 6. [`identity`] numbers the surviving zones `1..=N`.
//!
//! [`pipeline`] wires these together.
//!
//! [`Zone`]: fishing_zones_zone_models::Zone

pub mod extract;
pub mod filter;
pub mod identity;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod simplify;

use thiserror::Error;

pub use filter::{FilterConfig, FilterStats};
pub use merge::{MergePolicy, SourceDataset};
pub use pipeline::{ConsolidationConfig, ConsolidationReport, Consolidated, consolidate};
pub use simplify::SimplifyBudget;

/// Errors that abort a consolidation run.
///
/// Rejected geometry is not an error; see [`Rejection`].
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// The simplification budget can never produce a valid ring.
    #[error("Simplification budget of {max_points} points is below the minimum of {minimum}")]
    InvalidBudget {
        /// Requested budget.
        max_points: usize,
        /// Smallest usable budget.
        minimum: usize,
    },

    /// Simplifying a ring left fewer points than a valid ring needs.
    #[error(
        "Simplifying '{name}' to {max_points} points produced a degenerate ring \
         ({points} points from {original} points)"
    )]
    DegenerateRing {
        /// Name of the zone that owns the ring.
        name: String,
        /// Points left after simplification.
        points: usize,
        /// Points before simplification.
        original: usize,
        /// Configured budget.
        max_points: usize,
    },
}

/// Why a candidate element or ring was dropped.
///
/// Rejections are routine and only ever counted, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The element has no usable `name` tag.
    Unnamed,
    /// The element is not a way/relation, or carries no usable geometry.
    NoGeometry,
    /// The closed ring has fewer points than the configured minimum.
    TooFewPoints,
    /// The ring's south-west corner lies outside the country envelope.
    OutsideEnvelope,
    /// The ring spans too many degrees of latitude or longitude.
    ExtentTooLarge,
}
