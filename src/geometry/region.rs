//! Tagged union over the per-dimension convex region representations.
//!
//! Mesh wrappers hand cells to the intersector as a [`ConvexRegion`], which
//! dispatches clipping and moment accumulation to the 1D interval, 2D
//! polygon, or 3D polyhedron kernel by exhaustive match.

use super::moments::Moments;
use super::polygon::Polygon2;
use super::polyhedron::Polyhedron3;

/// A convex region of 1D, 2D, or 3D space, used transiently during clipping.
#[derive(Clone, Debug, PartialEq)]
pub enum ConvexRegion {
    /// A 1D interval `[lo, hi]`.
    Interval { lo: f64, hi: f64 },
    /// A 2D convex polygon.
    Polygon(Polygon2),
    /// A 3D convex polyhedron.
    Polyhedron(Polyhedron3),
}

impl ConvexRegion {
    /// Spatial dimension of the region.
    pub fn dim(&self) -> usize {
        match self {
            ConvexRegion::Interval { .. } => 1,
            ConvexRegion::Polygon(_) => 2,
            ConvexRegion::Polyhedron(_) => 3,
        }
    }

    /// Vertex coordinates, padded to three components.
    ///
    /// Used by the reconstruction limiter to bound extrapolated values at
    /// cell corners.
    pub fn vertex_coords(&self) -> Vec<[f64; 3]> {
        match self {
            ConvexRegion::Interval { lo, hi } => {
                vec![[*lo, 0.0, 0.0], [*hi, 0.0, 0.0]]
            }
            ConvexRegion::Polygon(p) => {
                p.vertices.iter().map(|v| [v[0], v[1], 0.0]).collect()
            }
            ConvexRegion::Polyhedron(p) => p.vertices.clone(),
        }
    }

    /// Moments of the region itself (0th, 1st, optionally 2nd).
    pub fn moments(&self, with_second: bool) -> Moments {
        match self {
            ConvexRegion::Interval { lo, hi } => {
                let mut m = Moments::zero(with_second);
                m.m0 = hi - lo;
                m.m1[0] = 0.5 * (hi * hi - lo * lo);
                if let Some(m2) = m.m2.as_mut() {
                    m2[0] = (hi * hi * hi - lo * lo * lo) / 3.0;
                }
                m
            }
            ConvexRegion::Polygon(p) => p.moments(with_second),
            ConvexRegion::Polyhedron(p) => p.moments(with_second),
        }
    }
}
