//! Convex polyhedron representation and half-space clipping in 3D.
//!
//! A polyhedron is a vertex list plus face loops indexed into it, every face
//! wound counter-clockwise when viewed from outside. Clipping against a
//! half-space keeps the inside part of every face and closes the solid with
//! a cap face built from the cut points, ordered around the clip normal.
//!
//! Moments are accumulated from a signed tetrahedron fan anchored at vertex 0,
//! which makes them independent of the apex choice and tolerant of the
//! degenerate faces clipping can leave behind.

use std::collections::HashMap;

use super::moments::Moments;

/// Tolerance for classifying a vertex as lying on a clip plane.
const ON_PLANE_EPS: f64 = 1e-12;

/// Distance below which two cap points are considered the same point.
const MERGE_EPS: f64 = 1e-10;

/// A convex polyhedron as a vertex list and outward-oriented face loops.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyhedron3 {
    /// Vertex coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Face loops (indices into `vertices`), CCW viewed from outside.
    pub faces: Vec<Vec<usize>>,
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

impl Polyhedron3 {
    /// Create a polyhedron from vertices and outward-oriented face loops.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    /// Axis-aligned box `[lo, hi]` with the standard outward face winding.
    pub fn axis_aligned_box(lo: [f64; 3], hi: [f64; 3]) -> Self {
        let [x0, y0, z0] = lo;
        let [x1, y1, z1] = hi;
        let vertices = vec![
            [x0, y0, z0],
            [x1, y0, z0],
            [x1, y1, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x1, y1, z1],
            [x0, y1, z1],
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // bottom (-z)
            vec![4, 5, 6, 7], // top (+z)
            vec![0, 1, 5, 4], // front (-y)
            vec![2, 3, 7, 6], // back (+y)
            vec![0, 4, 7, 3], // left (-x)
            vec![1, 2, 6, 5], // right (+x)
        ];
        Self::new(vertices, faces)
    }

    /// Whether the solid has too few faces to bound any volume.
    pub fn is_empty(&self) -> bool {
        self.faces.len() < 4 || self.vertices.len() < 4
    }

    /// Outward unit-normal half-spaces `n · x <= d` bounding this solid.
    ///
    /// Face normals come from Newell's formula, so slightly non-planar loops
    /// still yield a usable average plane.
    pub fn half_spaces(&self) -> Vec<([f64; 3], f64)> {
        let mut planes = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let mut n = [0.0; 3];
            for i in 0..face.len() {
                let a = self.vertices[face[i]];
                let b = self.vertices[face[(i + 1) % face.len()]];
                let c = cross(a, b);
                n[0] += c[0];
                n[1] += c[1];
                n[2] += c[2];
            }
            let len = norm(n);
            if len < ON_PLANE_EPS {
                continue; // degenerate face left over from clipping
            }
            let n = [n[0] / len, n[1] / len, n[2] / len];
            // Anchor the plane on the face centroid, not a single vertex,
            // to average out non-planarity.
            let mut centroid = [0.0; 3];
            for &v in face {
                for k in 0..3 {
                    centroid[k] += self.vertices[v][k];
                }
            }
            for k in 0..3 {
                centroid[k] /= face.len() as f64;
            }
            planes.push((n, dot(n, centroid)));
        }
        planes
    }

    /// Clip against the half-space `n · x <= d`.
    ///
    /// Vertices within [`ON_PLANE_EPS`] of the plane count as inside. The
    /// open boundary left by removed geometry is closed with a cap face whose
    /// outward normal is the clip normal.
    pub fn clip_half_space(&self, normal: [f64; 3], offset: f64) -> Polyhedron3 {
        let dist: Vec<f64> = self
            .vertices
            .iter()
            .map(|&v| dot(normal, v) - offset)
            .collect();

        let any_outside = dist.iter().any(|&d| d > ON_PLANE_EPS);
        if !any_outside {
            return self.clone();
        }
        let any_inside = dist.iter().any(|&d| d < -ON_PLANE_EPS);
        if !any_inside {
            // At most touching the plane from outside: nothing kept.
            return Polyhedron3::default();
        }

        let inside = |i: usize| dist[i] <= ON_PLANE_EPS;

        let mut out_vertices: Vec<[f64; 3]> = Vec::with_capacity(self.vertices.len() + 8);
        let mut vertex_map: Vec<Option<usize>> = vec![None; self.vertices.len()];

        // Each strictly crossing edge is cut once, shared by its two faces.
        let mut edge_cut: HashMap<(usize, usize), usize> = HashMap::new();
        let mut cap: Vec<usize> = Vec::new();
        let mut out_faces: Vec<Vec<usize>> = Vec::with_capacity(self.faces.len() + 1);

        for face in &self.faces {
            let n = face.len();
            let mut loop_out: Vec<usize> = Vec::with_capacity(n + 2);
            for i in 0..n {
                let a = face[i];
                let b = face[(i + 1) % n];
                if inside(a) {
                    let idx = *vertex_map[a].get_or_insert_with(|| {
                        out_vertices.push(self.vertices[a]);
                        out_vertices.len() - 1
                    });
                    loop_out.push(idx);
                    // On-plane kept vertices belong to the cap boundary too.
                    if dist[a].abs() <= ON_PLANE_EPS && !cap.contains(&idx) {
                        cap.push(idx);
                    }
                }
                // Strict crossing: both endpoints clear of the plane band.
                if (dist[a] > ON_PLANE_EPS && dist[b] < -ON_PLANE_EPS)
                    || (dist[a] < -ON_PLANE_EPS && dist[b] > ON_PLANE_EPS)
                {
                    let key = (a.min(b), a.max(b));
                    let idx = *edge_cut.entry(key).or_insert_with(|| {
                        let t = dist[a] / (dist[a] - dist[b]);
                        let pa = self.vertices[a];
                        let pb = self.vertices[b];
                        out_vertices.push([
                            pa[0] + t * (pb[0] - pa[0]),
                            pa[1] + t * (pb[1] - pa[1]),
                            pa[2] + t * (pb[2] - pa[2]),
                        ]);
                        out_vertices.len() - 1
                    });
                    loop_out.push(idx);
                    if !cap.contains(&idx) {
                        cap.push(idx);
                    }
                }
            }
            if loop_out.len() >= 3 {
                out_faces.push(loop_out);
            }
        }

        // Merge cap points that coincide (cuts through a shared vertex).
        let mut merged: Vec<usize> = Vec::with_capacity(cap.len());
        for &i in &cap {
            let pi = out_vertices[i];
            let duplicate = merged.iter().any(|&j| {
                let pj = out_vertices[j];
                norm(sub(pi, pj)) < MERGE_EPS
            });
            if !duplicate {
                merged.push(i);
            }
        }

        if merged.len() >= 3 {
            out_faces.push(order_cap_loop(&out_vertices, merged, normal));
        }

        Polyhedron3 {
            vertices: out_vertices,
            faces: out_faces,
        }
    }

    /// 0th, 1st, and optionally 2nd moments by a signed tetrahedron fan.
    ///
    /// Tetrahedron formulas with vertices `p, q, r, apex`:
    /// `V = dot(p - apex, cross(q - apex, r - apex)) / 6`,
    /// `m1 = V (p + q + r + apex) / 4`,
    /// `m2_ij = V/20 (sum_k v_ki v_kj + (sum_k v_ki)(sum_k v_kj))`.
    pub fn moments(&self, with_second: bool) -> Moments {
        let mut m = Moments::zero(with_second);
        if self.vertices.is_empty() {
            return m;
        }
        let apex = self.vertices[0];
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let p0 = self.vertices[face[0]];
            for i in 1..face.len() - 1 {
                let p1 = self.vertices[face[i]];
                let p2 = self.vertices[face[i + 1]];
                let vol = dot(sub(p0, apex), cross(sub(p1, apex), sub(p2, apex))) / 6.0;
                m.m0 += vol;
                for k in 0..3 {
                    m.m1[k] += vol * (p0[k] + p1[k] + p2[k] + apex[k]) / 4.0;
                }
                if let Some(m2) = m.m2.as_mut() {
                    let verts = [apex, p0, p1, p2];
                    let mut s = [0.0; 3];
                    for v in &verts {
                        for k in 0..3 {
                            s[k] += v[k];
                        }
                    }
                    let pair = |a: usize, b: usize| {
                        let mut sum = 0.0;
                        for v in &verts {
                            sum += v[a] * v[b];
                        }
                        vol / 20.0 * (sum + s[a] * s[b])
                    };
                    m2[0] += pair(0, 0); // xx
                    m2[1] += pair(1, 1); // yy
                    m2[2] += pair(2, 2); // zz
                    m2[3] += pair(0, 1); // xy
                    m2[4] += pair(0, 2); // xz
                    m2[5] += pair(1, 2); // yz
                }
            }
        }
        m
    }
}

/// Order cap-face points counter-clockwise around `normal` (outward = normal).
fn order_cap_loop(vertices: &[[f64; 3]], mut cap: Vec<usize>, normal: [f64; 3]) -> Vec<usize> {
    let mut centroid = [0.0; 3];
    for &i in &cap {
        for k in 0..3 {
            centroid[k] += vertices[i][k];
        }
    }
    for k in 0..3 {
        centroid[k] /= cap.len() as f64;
    }

    // In-plane basis (u, v) with cross(u, v) = normal.
    let axis = if normal[0].abs() <= normal[1].abs() && normal[0].abs() <= normal[2].abs() {
        [1.0, 0.0, 0.0]
    } else if normal[1].abs() <= normal[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    let mut u = cross(axis, normal);
    let len = norm(u);
    u = [u[0] / len, u[1] / len, u[2] / len];
    let v = cross(normal, u);

    cap.sort_by(|&a, &b| {
        let da = sub(vertices[a], centroid);
        let db = sub(vertices[b], centroid);
        let ta = f64::atan2(dot(da, v), dot(da, u));
        let tb = f64::atan2(dot(db, v), dot(db, u));
        ta.partial_cmp(&tb).unwrap_or(std::cmp::Ordering::Equal)
    });
    cap
}
