//! Axis-aligned bounding boxes.

use crate::geometry::Point;

/// An axis-aligned bounding box, closed on all sides.
///
/// Overlap tests are closed-interval on purpose: boxes that touch only at a
/// boundary still overlap. Search must over-report such pairs and let the
/// intersector return zero moments for them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb<P: Point> {
    /// Minimum corner.
    pub min: P,
    /// Maximum corner.
    pub max: P,
}

impl<P: Point> Aabb<P> {
    /// Create a box from explicit corners.
    pub fn new(min: P, max: P) -> Self {
        Self { min, max }
    }

    /// Tight box around a set of points.
    ///
    /// # Panics
    /// Panics if `points` is empty.
    pub fn from_points(points: &[P]) -> Self {
        assert!(!points.is_empty(), "bounding box of zero points");
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.component_min(p);
            max = max.component_max(p);
        }
        Self { min, max }
    }

    /// Closed-interval overlap test.
    pub fn overlaps(&self, other: &Aabb<P>) -> bool {
        for i in 0..P::DIM {
            if self.max.coord(i) < other.min.coord(i) || other.max.coord(i) < self.min.coord(i) {
                return false;
            }
        }
        true
    }

    /// Union of this box and another.
    pub fn union(&self, other: &Aabb<P>) -> Self {
        Self {
            min: self.min.component_min(&other.min),
            max: self.max.component_max(&other.max),
        }
    }

    /// Box center.
    pub fn center(&self) -> P {
        self.min.add(&self.max).scale(0.5)
    }

    /// Expand every side by `r`.
    ///
    /// Bounding-sphere semantics for meshfree search: a point with support
    /// radius `r` becomes a box of half-width `r`.
    pub fn inflated(&self, r: f64) -> Self {
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for i in 0..P::DIM {
            lo[i] = self.min.coord(i) - r;
            hi[i] = self.max.coord(i) + r;
        }
        Self {
            min: P::from_slice(&lo[..P::DIM]),
            max: P::from_slice(&hi[..P::DIM]),
        }
    }

    /// Degenerate box around a single point.
    pub fn from_point(p: P) -> Self {
        Self { min: p, max: p }
    }
}
