//! Geographic validity checks for candidate rings.

use fishing_zones_zone_models::{BoundingBox, GeometryAssembly, RawRecord, Ring, ZoneGeometry};
use geo::{BoundingRect, Coord, LineString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Rejection,
    extract::{assemble_by_name, extract_record},
    normalize::normalize_geometry,
};

/// Widest accepted extent, in degrees, for lakes, reservoirs and ponds.
pub const DEFAULT_MAX_SPAN: f64 = 0.15;

/// Widest accepted extent, in degrees, for river segments.
pub const RIVER_MAX_SPAN: f64 = 0.05;

/// Minimum number of points (closing point included) of an accepted ring.
pub const DEFAULT_MIN_POINTS: usize = 6;

/// Thresholds applied to every fetched ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// The ring's south-west corner must fall inside this box.
    pub envelope: BoundingBox,
    /// Latitude and longitude extents must both be strictly below this.
    pub max_span: f64,
    /// Minimum ring length after closure.
    pub min_points: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            envelope: BoundingBox::SOUTH_KOREA,
            max_span: DEFAULT_MAX_SPAN,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

impl FilterConfig {
    /// Returns a copy with a different span limit.
    #[must_use]
    pub const fn with_max_span(mut self, max_span: f64) -> Self {
        self.max_span = max_span;
        self
    }

    /// Checks a closed ring against every threshold.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a [`Rejection`].
    pub fn check(&self, ring: &Ring) -> Result<(), Rejection> {
        if ring.len() < self.min_points {
            return Err(Rejection::TooFewPoints);
        }

        let line: LineString<f64> = ring
            .iter()
            .map(|point| Coord {
                x: point.lng,
                y: point.lat,
            })
            .collect();
        let rect = line.bounding_rect().ok_or(Rejection::NoGeometry)?;

        let min = rect.min();
        if !self.envelope.contains(min.y, min.x) {
            return Err(Rejection::OutsideEnvelope);
        }

        if rect.height() >= self.max_span || rect.width() >= self.max_span {
            return Err(Rejection::ExtentTooLarge);
        }

        Ok(())
    }

    /// Checks every ring of a geometry; all of them must pass.
    ///
    /// # Errors
    ///
    /// Returns the first ring's [`Rejection`].
    pub fn check_geometry(&self, geometry: &ZoneGeometry) -> Result<(), Rejection> {
        geometry.rings().iter().try_for_each(|ring| self.check(ring))
    }
}

/// Per-reason counts of what the filter saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Elements examined.
    pub examined: usize,
    /// Elements that passed every check.
    pub accepted: usize,
    /// Elements without a usable name.
    pub unnamed: usize,
    /// Elements without usable geometry.
    pub no_geometry: usize,
    /// Rings shorter than the configured minimum.
    pub too_few_points: usize,
    /// Rings whose south-west corner lies outside the envelope.
    pub outside_envelope: usize,
    /// Rings spanning too many degrees.
    pub extent_too_large: usize,
}

impl FilterStats {
    /// Records one rejection.
    pub const fn reject(&mut self, reason: Rejection) {
        match reason {
            Rejection::Unnamed => self.unnamed += 1,
            Rejection::NoGeometry => self.no_geometry += 1,
            Rejection::TooFewPoints => self.too_few_points += 1,
            Rejection::OutsideEnvelope => self.outside_envelope += 1,
            Rejection::ExtentTooLarge => self.extent_too_large += 1,
        }
    }

    /// Total number of rejected elements.
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.unnamed
            + self.no_geometry
            + self.too_few_points
            + self.outside_envelope
            + self.extent_too_large
    }

    /// Adds another run's counts to this one.
    pub const fn absorb(&mut self, other: &Self) {
        self.examined += other.examined;
        self.accepted += other.accepted;
        self.unnamed += other.unnamed;
        self.no_geometry += other.no_geometry;
        self.too_few_points += other.too_few_points;
        self.outside_envelope += other.outside_envelope;
        self.extent_too_large += other.extent_too_large;
    }
}

/// Extracts, closes and checks every element, then combines the accepted
/// rings per name with `assembly`.
#[must_use]
pub fn filter_records(
    elements: &[Value],
    config: &FilterConfig,
    assembly: GeometryAssembly,
) -> (Vec<RawRecord>, FilterStats) {
    let mut stats = FilterStats::default();
    let mut accepted = Vec::new();

    for element in elements {
        stats.examined += 1;
        match accept(element, config) {
            Ok(record) => {
                stats.accepted += 1;
                accepted.push(record);
            }
            Err(reason) => {
                log::trace!("Rejected element: {reason:?}");
                stats.reject(reason);
            }
        }
    }

    log::debug!(
        "Filter accepted {}/{} elements ({} too few points, {} outside envelope, {} too large)",
        stats.accepted,
        stats.examined,
        stats.too_few_points,
        stats.outside_envelope,
        stats.extent_too_large,
    );

    (assemble_by_name(accepted, assembly), stats)
}

fn accept(element: &Value, config: &FilterConfig) -> Result<RawRecord, Rejection> {
    let record = extract_record(element)?;

    // Too-short rings are a point-count failure, not missing geometry.
    let geometry = normalize_geometry(record.geometry).ok_or(Rejection::TooFewPoints)?;
    config.check_geometry(&geometry)?;

    Ok(RawRecord {
        name: record.name,
        geometry,
    })
}
