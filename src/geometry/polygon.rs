//! Convex polygon representation and half-plane clipping in 2D.
//!
//! Polygons are ordered counter-clockwise vertex loops. Clipping follows the
//! Sutherland–Hodgman scheme: the subject polygon is clipped against one
//! bounding half-plane of the target cell at a time, so the overlap of two
//! convex cells is the subject clipped against every edge of the other.
//!
//! Moments are accumulated by fan triangulation from vertex 0 with signed
//! triangle areas, so the result does not depend on the apex choice and
//! stays correct for the nearly degenerate loops clipping can produce.

use super::moments::Moments;

/// Tolerance for classifying a vertex as lying on a clip line.
///
/// Vertices this close to the line are kept; dropping them would open tiny
/// gaps between adjacent overlap pieces and break conservation.
const ON_EDGE_EPS: f64 = 1e-12;

/// An ordered counter-clockwise loop of vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon2 {
    /// Vertex coordinates in counter-clockwise winding.
    pub vertices: Vec<[f64; 2]>,
}

impl Polygon2 {
    /// Create a polygon from counter-clockwise vertices.
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle `[x0, x1] x [y0, y1]`.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop has too few vertices to bound any area.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Signed area by the shoelace formula (positive for CCW winding).
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let [x0, y0] = self.vertices[i];
            let [x1, y1] = self.vertices[(i + 1) % n];
            sum += x0 * y1 - x1 * y0;
        }
        0.5 * sum
    }

    /// Inward half-planes bounding this (convex, CCW) polygon.
    ///
    /// Each edge `(a, b)` contributes the constraint `n · x <= d` with `n`
    /// the outward edge normal `(e_y, -e_x)`.
    pub fn half_planes(&self) -> Vec<([f64; 2], f64)> {
        let n = self.vertices.len();
        let mut planes = Vec::with_capacity(n);
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let normal = [b[1] - a[1], a[0] - b[0]];
            let len = (normal[0] * normal[0] + normal[1] * normal[1]).sqrt();
            if len < ON_EDGE_EPS {
                continue; // zero-length edge from an earlier clip
            }
            let normal = [normal[0] / len, normal[1] / len];
            planes.push((normal, normal[0] * a[0] + normal[1] * a[1]));
        }
        planes
    }

    /// Clip against the half-plane `n · x <= d` (Sutherland–Hodgman step).
    ///
    /// Vertices within [`ON_EDGE_EPS`] of the line count as inside, so a
    /// polygon touching the clip line at a vertex or edge keeps that contact
    /// rather than losing a sliver.
    pub fn clip_half_plane(&self, normal: [f64; 2], offset: f64) -> Polygon2 {
        let n = self.vertices.len();
        if n == 0 {
            return Polygon2::default();
        }
        let dist = |p: [f64; 2]| normal[0] * p[0] + normal[1] * p[1] - offset;

        let mut out: Vec<[f64; 2]> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let cur = self.vertices[i];
            let next = self.vertices[(i + 1) % n];
            let d_cur = dist(cur);
            let d_next = dist(next);
            let cur_in = d_cur <= ON_EDGE_EPS;
            let next_in = d_next <= ON_EDGE_EPS;

            if cur_in {
                out.push(cur);
            }
            // Edge crosses the line strictly: emit the crossing point.
            if (cur_in && !next_in) || (!cur_in && next_in) {
                let t = d_cur / (d_cur - d_next);
                out.push([
                    cur[0] + t * (next[0] - cur[0]),
                    cur[1] + t * (next[1] - cur[1]),
                ]);
            }
        }
        Polygon2::new(out)
    }

    /// 0th, 1st, and optionally 2nd moments by signed fan triangulation.
    ///
    /// Triangle formulas: `A = cross(b - a, c - a) / 2`,
    /// `m1 = A (a + b + c) / 3`,
    /// `m2_ij = A/12 (sum_p v_pi v_pj + (sum_p v_pi)(sum_p v_pj))`.
    pub fn moments(&self, with_second: bool) -> Moments {
        let mut m = Moments::zero(with_second);
        let n = self.vertices.len();
        if n < 3 {
            return m;
        }
        let a = self.vertices[0];
        for i in 1..n - 1 {
            let b = self.vertices[i];
            let c = self.vertices[i + 1];
            let area =
                0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]));
            m.m0 += area;
            m.m1[0] += area * (a[0] + b[0] + c[0]) / 3.0;
            m.m1[1] += area * (a[1] + b[1] + c[1]) / 3.0;
            if let Some(m2) = m.m2.as_mut() {
                let sx = a[0] + b[0] + c[0];
                let sy = a[1] + b[1] + c[1];
                let sxx = a[0] * a[0] + b[0] * b[0] + c[0] * c[0];
                let syy = a[1] * a[1] + b[1] * b[1] + c[1] * c[1];
                let sxy = a[0] * a[1] + b[0] * b[1] + c[0] * c[1];
                m2[0] += area / 12.0 * (sxx + sx * sx); // xx
                m2[1] += area / 12.0 * (syy + sy * sy); // yy
                m2[3] += area / 12.0 * (sxy + sx * sy); // xy
            }
        }
        m
    }
}
