//! Uniform-stride point reduction for oversized rings.
//!
//! This is plain sampling, not a shape-aware algorithm: every
//! `len / max_points`-th point is kept and the ring is closed again.

use fishing_zones_zone_models::{MIN_RING_POINTS, Ring, ZoneDraft, ZoneGeometry};
use serde::{Deserialize, Serialize};

use crate::ConsolidateError;

/// Smallest budget that can still yield a closed four-point ring.
pub const MIN_BUDGET: usize = MIN_RING_POINTS - 1;

/// Budget used when simplification is requested without a value.
pub const DEFAULT_BUDGET: usize = 25;

/// Maximum number of sampled points per ring (before re-closing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SimplifyBudget(usize);

impl SimplifyBudget {
    /// Validates a budget.
    ///
    /// # Errors
    ///
    /// * [`ConsolidateError::InvalidBudget`] if `max_points` is below
    ///   [`MIN_BUDGET`]
    pub const fn new(max_points: usize) -> Result<Self, ConsolidateError> {
        if max_points < MIN_BUDGET {
            return Err(ConsolidateError::InvalidBudget {
                max_points,
                minimum: MIN_BUDGET,
            });
        }
        Ok(Self(max_points))
    }

    /// The configured point budget.
    #[must_use]
    pub const fn max_points(self) -> usize {
        self.0
    }
}

impl Default for SimplifyBudget {
    fn default() -> Self {
        Self(DEFAULT_BUDGET)
    }
}

impl TryFrom<usize> for SimplifyBudget {
    type Error = ConsolidateError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SimplifyBudget> for usize {
    fn from(budget: SimplifyBudget) -> Self {
        budget.0
    }
}

/// Downsamples a ring of zone `name` to at most `budget` points plus the
/// closing point.
///
/// Rings already within budget come back unchanged.
///
/// # Errors
///
/// * [`ConsolidateError::DegenerateRing`] if the sampled ring is too short
///   to be valid geometry
pub fn simplify_ring(
    name: &str,
    ring: &Ring,
    budget: SimplifyBudget,
) -> Result<Ring, ConsolidateError> {
    let sampled = sample(ring, budget);
    if !sampled.is_viable() {
        return Err(ConsolidateError::DegenerateRing {
            name: name.to_string(),
            points: sampled.len(),
            original: ring.len(),
            max_points: budget.max_points(),
        });
    }
    Ok(sampled)
}

fn sample(ring: &Ring, budget: SimplifyBudget) -> Ring {
    let max_points = budget.max_points();
    let len = ring.len();

    if len <= max_points {
        return ring.clone();
    }

    let points = ring.points();
    #[allow(clippy::cast_precision_loss)]
    let stride = len as f64 / max_points as f64;

    let mut sampled: Ring = (0..max_points)
        .map(|i| {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let index = (i as f64 * stride).floor() as usize;
            points[index.min(len - 1)]
        })
        .collect();
    sampled.close();
    sampled
}

/// Simplifies every ring of a geometry.
///
/// # Errors
///
/// * [`ConsolidateError::DegenerateRing`] if any ring collapses below the
///   minimum ring length
pub fn simplify_geometry(
    name: &str,
    geometry: &ZoneGeometry,
    budget: SimplifyBudget,
) -> Result<ZoneGeometry, ConsolidateError> {
    let simplify = |ring: &Ring| simplify_ring(name, ring, budget);

    Ok(match geometry {
        ZoneGeometry::Polygon(ring) => ZoneGeometry::Polygon(simplify(ring)?),
        ZoneGeometry::Multipolygon(rings) => ZoneGeometry::Multipolygon(
            rings.iter().map(simplify).collect::<Result<Vec<_>, _>>()?,
        ),
    })
}

/// Simplifies a draft's geometry.
///
/// # Errors
///
/// * [`ConsolidateError::DegenerateRing`] if any ring collapses
pub fn simplify_draft(
    draft: ZoneDraft,
    budget: SimplifyBudget,
) -> Result<ZoneDraft, ConsolidateError> {
    let geometry = simplify_geometry(&draft.name, &draft.geometry, budget)?;
    Ok(ZoneDraft { geometry, ..draft })
}

#[cfg(test)]
mod tests {
    use fishing_zones_zone_models::{Classification, GeoPoint};

    use super::*;

    /// A closed ring of `n` distinct points around a circle plus closure.
    #[allow(clippy::cast_precision_loss)]
    fn circle(n: usize) -> Ring {
        let points = (0..n).map(|i| {
            let angle = std::f64::consts::TAU * (i as f64) / (n as f64);
            GeoPoint::rounded(37.5 + 0.01 * angle.sin(), 127.0 + 0.01 * angle.cos())
        });
        Ring::closed(points.collect())
    }

    #[test]
    fn budget_below_minimum_is_rejected() {
        assert!(matches!(
            SimplifyBudget::new(2),
            Err(ConsolidateError::InvalidBudget { max_points: 2, .. })
        ));
        assert!(SimplifyBudget::new(3).is_ok());
    }

    #[test]
    fn budget_deserializes_through_validation() {
        let budget: SimplifyBudget = serde_json::from_str("25").unwrap();
        assert_eq!(budget.max_points(), 25);
        assert!(serde_json::from_str::<SimplifyBudget>("1").is_err());
    }

    #[test]
    fn hundred_point_ring_fits_budget() {
        let ring = circle(99);
        assert_eq!(ring.len(), 100);

        let simplified = simplify_ring("호수", &ring, SimplifyBudget::default()).unwrap();
        assert!(simplified.len() <= 26);
        assert!(simplified.is_closed());
        assert_eq!(simplified.points()[0], ring.points()[0]);
    }

    #[test]
    fn small_ring_is_untouched() {
        let ring = circle(10);
        let simplified = simplify_ring("연못", &ring, SimplifyBudget::default()).unwrap();
        assert_eq!(simplified, ring);
    }

    #[test]
    fn collapsing_ring_is_an_error() {
        // Every sampled index lands on the same repeated point.
        let mut points = vec![GeoPoint::new(37.0, 127.0); 9];
        points.push(GeoPoint::new(37.1, 127.1));
        let ring = Ring::new(points);

        let budget = SimplifyBudget::new(3).unwrap();
        assert!(matches!(
            simplify_ring("물웅덩이", &ring, budget),
            Err(ConsolidateError::DegenerateRing { points: 3, original: 10, .. })
        ));

        let result = simplify_geometry("물웅덩이", &ZoneGeometry::Polygon(ring), budget);
        assert!(matches!(
            result,
            Err(ConsolidateError::DegenerateRing { ref name, points: 3, original: 10, max_points: 3 })
                if name == "물웅덩이"
        ));
    }

    #[test]
    fn multipolygon_is_simplified_ring_by_ring() {
        let draft = ZoneDraft {
            name: "낙동강".to_string(),
            classification: Classification::Restricted,
            restriction: String::new(),
            region: String::new(),
            geometry: ZoneGeometry::Multipolygon(vec![circle(60), circle(8)]),
        };

        let simplified = simplify_draft(draft, SimplifyBudget::default()).unwrap();
        let rings = simplified.geometry.rings();
        assert_eq!(rings.len(), 2);
        assert!(rings[0].len() <= 26);
        assert_eq!(rings[1].len(), 9);
        assert_eq!(simplified.name, "낙동강");
    }
}
