//! Exact overlap moments for a candidate cell pair.
//!
//! The source cell's convex region is clipped successively against every
//! bounding half-space of the target cell; the moments of whatever survives
//! are the overlap moments. A pair that does not actually overlap comes back
//! as the zero vector, which is the expected outcome for most search-reported
//! pairs near the edge of the bounding-box over-approximation — it is not an
//! error.

use crate::geometry::{ConvexRegion, Moments, MOMENT_EPS};

/// Overlap moments of a source region clipped by a target region.
///
/// Both regions must have the same dimension; mixing dimensions is a caller
/// bug, not a runtime condition.
///
/// Results with `|m0| < eps` are clamped to exactly zero so round-off
/// slivers from nearly coincident boundaries contribute nothing.
pub fn intersect(
    source: &ConvexRegion,
    target: &ConvexRegion,
    with_second: bool,
    eps: f64,
) -> Moments {
    match (source, target) {
        (
            ConvexRegion::Interval { lo: slo, hi: shi },
            ConvexRegion::Interval { lo: tlo, hi: thi },
        ) => {
            let lo = slo.max(*tlo);
            let hi = shi.min(*thi);
            if hi - lo < eps {
                return Moments::zero(with_second);
            }
            ConvexRegion::Interval { lo, hi }.moments(with_second)
        }
        (ConvexRegion::Polygon(s), ConvexRegion::Polygon(t)) => {
            let mut piece = s.clone();
            for (normal, offset) in t.half_planes() {
                piece = piece.clip_half_plane(normal, offset);
                if piece.is_empty() {
                    return Moments::zero(with_second);
                }
            }
            piece.moments(with_second).clamped(eps)
        }
        (ConvexRegion::Polyhedron(s), ConvexRegion::Polyhedron(t)) => {
            let mut piece = s.clone();
            for (normal, offset) in t.half_spaces() {
                piece = piece.clip_half_space(normal, offset);
                if piece.is_empty() {
                    return Moments::zero(with_second);
                }
            }
            piece.moments(with_second).clamped(eps)
        }
        _ => panic!(
            "dimension mismatch: source is {}D, target is {}D",
            source.dim(),
            target.dim()
        ),
    }
}

/// [`intersect`] with the default sliver epsilon.
pub fn intersect_default(source: &ConvexRegion, target: &ConvexRegion) -> Moments {
    intersect(source, target, false, MOMENT_EPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon2, Polyhedron3};

    const TOL: f64 = 1e-12;

    #[test]
    fn test_unit_square_overlap() {
        // The concrete case from the acceptance checklist: squares
        // (0,0)-(2,2) and (1,1)-(2,2) overlap in area 1.0 with centroid
        // (1.5, 1.5).
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 2.0, 2.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(1.0, 1.0, 2.0, 2.0));
        let m = intersect_default(&a, &b);
        assert!((m.m0 - 1.0).abs() < TOL);
        let c = m.centroid().unwrap();
        assert!((c[0] - 1.5).abs() < TOL);
        assert!((c[1] - 1.5).abs() < TOL);
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 2.0, 2.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(0.5, -1.0, 3.0, 1.5));
        let ab = intersect_default(&a, &b);
        let ba = intersect_default(&b, &a);
        assert!((ab.m0 - ba.m0).abs() < TOL);
        assert!((ab.m1[0] - ba.m1[0]).abs() < TOL);
        assert!((ab.m1[1] - ba.m1[1]).abs() < TOL);
    }

    #[test]
    fn test_touching_boxes_zero_moments() {
        // Bounding boxes touch along x = 1 but the interiors are disjoint:
        // the pair is a legitimate search candidate with zero moments.
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 1.0, 1.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(1.0, 0.0, 2.0, 1.0));
        let m = intersect_default(&a, &b);
        assert!(m.is_empty());
    }

    #[test]
    fn test_corner_touch_zero_moments() {
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 1.0, 1.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(1.0, 1.0, 2.0, 2.0));
        assert!(intersect_default(&a, &b).is_empty());
    }

    #[test]
    fn test_disjoint_zero_moments() {
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 1.0, 1.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(5.0, 5.0, 6.0, 6.0));
        assert!(intersect_default(&a, &b).is_empty());
    }

    #[test]
    fn test_containment_returns_inner() {
        let outer = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 4.0, 4.0));
        let inner = ConvexRegion::Polygon(Polygon2::rectangle(1.0, 1.0, 2.0, 3.0));
        let m = intersect_default(&outer, &inner);
        assert!((m.m0 - 2.0).abs() < TOL);
        let c = m.centroid().unwrap();
        assert!((c[0] - 1.5).abs() < TOL);
        assert!((c[1] - 2.0).abs() < TOL);
    }

    #[test]
    fn test_intervals() {
        let a = ConvexRegion::Interval { lo: 0.0, hi: 2.0 };
        let b = ConvexRegion::Interval { lo: 1.5, hi: 3.0 };
        let m = intersect_default(&a, &b);
        assert!((m.m0 - 0.5).abs() < TOL);
        assert!((m.centroid().unwrap()[0] - 1.75).abs() < TOL);

        let touch = ConvexRegion::Interval { lo: 2.0, hi: 3.0 };
        assert!(intersect_default(&a, &touch).is_empty());
    }

    #[test]
    fn test_boxes_3d() {
        let a = ConvexRegion::Polyhedron(Polyhedron3::axis_aligned_box([0.0; 3], [2.0; 3]));
        let b = ConvexRegion::Polyhedron(Polyhedron3::axis_aligned_box([1.0; 3], [3.0; 3]));
        let m = intersect_default(&a, &b);
        assert!((m.m0 - 1.0).abs() < 1e-10);
        let c = m.centroid().unwrap();
        for k in 0..3 {
            assert!((c[k] - 1.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_second_moments_requested() {
        let a = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 2.0, 2.0));
        let b = ConvexRegion::Polygon(Polygon2::rectangle(0.0, 0.0, 1.0, 1.0));
        let m = intersect(&a, &b, true, MOMENT_EPS);
        let m2 = m.m2.unwrap();
        assert!((m2[0] - 1.0 / 3.0).abs() < TOL);
        assert!((m2[3] - 0.25).abs() < TOL);
    }
}
