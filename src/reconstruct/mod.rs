//! Per-cell polynomial reconstruction of a field from cell averages.
//!
//! Order 0 is the cell average itself. Order 1 adds a gradient estimated by
//! a weighted least-squares fit over the face-neighbor stencil; order 2 adds
//! a Hessian fitted over the two-ring stencil. Both are limited so that the
//! polynomial cannot create values outside the range of the stencil averages
//! (Barth–Jespersen scaling: the gradient is only ever shrunk, never grown).
//!
//! The normal-equations solve uses faer LU, and an under-determined or
//! singular stencil falls back to the next lower order instead of failing —
//! a boundary cell with one neighbor still reconstructs, just at lower
//! order.

mod limiter;
mod polynomial;

pub use limiter::limited_factor;
pub use polynomial::CellPolynomial;

use faer::{linalg::solvers::Solve, Mat};

use crate::geometry::Point;
use crate::mesh::RemapMesh;

/// Tiny distance guard for inverse-distance weights.
const WEIGHT_EPS: f64 = 1e-30;

/// Reconstruct one cell of a field to the requested order (0, 1, or 2).
///
/// `values[c]` is the cell average of the field in cell `c`, or `None` where
/// the field (a single material of it) is absent; absent cells are excluded
/// from stencils. Returns `None` only when the cell itself carries no value.
///
/// # Panics
/// Panics if `order > 2`.
pub fn reconstruct_cell<M: RemapMesh>(
    mesh: &M,
    values: &[Option<f64>],
    cell: usize,
    order: usize,
) -> Option<CellPolynomial> {
    assert!(order <= 2, "reconstruction order must be 0, 1, or 2");
    let u = values[cell]?;
    if order == 0 {
        return Some(CellPolynomial::Constant(u));
    }

    let dim = M::Coord::DIM;
    let center = mesh.cell_centroid(cell).padded();

    // Stencil: face neighbors for linear, two-ring for quadratic.
    let stencil = gather_stencil(mesh, values, cell, order);
    let n_grad = dim;
    let n_quad = dim + dim * (dim - 1) / 2;

    if order == 2 && stencil.len() >= n_grad + n_quad {
        if let Some(poly) = fit_quadratic(mesh, values, cell, u, center, &stencil) {
            return Some(poly);
        }
        // Singular normal matrix: drop to linear.
    }
    if stencil.len() >= n_grad {
        // Linear fits use the one-ring only, even when called as the
        // quadratic fallback.
        let one_ring = gather_stencil(mesh, values, cell, 1);
        if let Some(poly) = fit_linear(mesh, values, cell, u, center, &one_ring) {
            return Some(poly);
        }
    }
    Some(CellPolynomial::Constant(u))
}

/// Reconstruct every cell of a field slice to the requested order.
pub fn reconstruct_field<M: RemapMesh>(
    mesh: &M,
    values: &[Option<f64>],
    order: usize,
) -> Vec<Option<CellPolynomial>> {
    (0..mesh.n_cells())
        .map(|c| reconstruct_cell(mesh, values, c, order))
        .collect()
}

/// Stencil cells with values: one-ring for order 1, two-ring for order 2.
fn gather_stencil<M: RemapMesh>(
    mesh: &M,
    values: &[Option<f64>],
    cell: usize,
    order: usize,
) -> Vec<usize> {
    let mut stencil: Vec<usize> = mesh
        .cell_neighbors(cell)
        .into_iter()
        .filter(|&c| values[c].is_some())
        .collect();
    if order >= 2 {
        let one_ring = stencil.clone();
        for &n in &one_ring {
            for nn in mesh.cell_neighbors(n) {
                if nn != cell && values[nn].is_some() && !stencil.contains(&nn) {
                    stencil.push(nn);
                }
            }
        }
    }
    stencil.sort_unstable();
    stencil
}

/// Bounds of the cell's own and stencil averages, for the limiter.
fn stencil_bounds(u: f64, values: &[Option<f64>], stencil: &[usize]) -> (f64, f64) {
    let mut umin = u;
    let mut umax = u;
    for &c in stencil {
        if let Some(v) = values[c] {
            umin = umin.min(v);
            umax = umax.max(v);
        }
    }
    (umin, umax)
}

fn fit_linear<M: RemapMesh>(
    mesh: &M,
    values: &[Option<f64>],
    cell: usize,
    u: f64,
    center: [f64; 3],
    stencil: &[usize],
) -> Option<CellPolynomial> {
    let dim = M::Coord::DIM;
    if stencil.len() < dim {
        return None;
    }

    // Weighted normal equations (A^T W A) g = A^T W du with
    // w = 1 / |dx|^2, rows du_j = g . (c_j - c_i).
    let mut ata = Mat::<f64>::zeros(dim, dim);
    let mut atb = Mat::<f64>::zeros(dim, 1);
    for &j in stencil {
        let cj = mesh.cell_centroid(j).padded();
        let mut delta = [0.0; 3];
        let mut r2 = 0.0;
        for k in 0..dim {
            delta[k] = cj[k] - center[k];
            r2 += delta[k] * delta[k];
        }
        let w = 1.0 / (r2 + WEIGHT_EPS);
        let du = values[j].unwrap_or(u) - u;
        for p in 0..dim {
            for q in 0..dim {
                ata[(p, q)] += w * delta[p] * delta[q];
            }
            atb[(p, 0)] += w * delta[p] * du;
        }
    }

    let lu = ata.as_ref().full_piv_lu();
    let x = lu.solve(&atb);
    let mut gradient = [0.0; 3];
    for k in 0..dim {
        let g = x[(k, 0)];
        if !g.is_finite() {
            return None; // singular stencil, caller falls back
        }
        gradient[k] = g;
    }

    // Limit so extrapolation to every cell vertex stays within the stencil
    // bounds.
    let (umin, umax) = stencil_bounds(u, values, stencil);
    let vertices = mesh.cell_region(cell).vertex_coords();
    let deviations: Vec<f64> = vertices
        .iter()
        .map(|v| {
            let mut d = 0.0;
            for k in 0..dim {
                d += gradient[k] * (v[k] - center[k]);
            }
            d
        })
        .collect();
    let phi = limited_factor(u, umin, umax, &deviations);
    for g in gradient.iter_mut() {
        *g *= phi;
    }

    Some(CellPolynomial::Linear {
        value: u,
        gradient,
    })
}

fn fit_quadratic<M: RemapMesh>(
    mesh: &M,
    values: &[Option<f64>],
    cell: usize,
    u: f64,
    center: [f64; 3],
    stencil: &[usize],
) -> Option<CellPolynomial> {
    let dim = M::Coord::DIM;
    let pairs = off_diagonal_pairs(dim);
    let n_unknowns = dim + dim + pairs.len();
    if stencil.len() < n_unknowns {
        return None;
    }

    // Unknowns: [g_0..g_dim, H_00..H_dd, H_offdiag...] with basis
    // u(x) - u = g . d + 1/2 sum H_kk d_k^2 + sum_{k<l} H_kl d_k d_l.
    let mut ata = Mat::<f64>::zeros(n_unknowns, n_unknowns);
    let mut atb = Mat::<f64>::zeros(n_unknowns, 1);
    let mut row = vec![0.0; n_unknowns];
    for &j in stencil {
        let cj = mesh.cell_centroid(j).padded();
        let mut delta = [0.0; 3];
        let mut r2 = 0.0;
        for k in 0..dim {
            delta[k] = cj[k] - center[k];
            r2 += delta[k] * delta[k];
        }
        for k in 0..dim {
            row[k] = delta[k];
            row[dim + k] = 0.5 * delta[k] * delta[k];
        }
        for (idx, &(a, b)) in pairs.iter().enumerate() {
            row[2 * dim + idx] = delta[a] * delta[b];
        }
        let w = 1.0 / (r2 + WEIGHT_EPS);
        let du = values[j].unwrap_or(u) - u;
        for p in 0..n_unknowns {
            for q in 0..n_unknowns {
                ata[(p, q)] += w * row[p] * row[q];
            }
            atb[(p, 0)] += w * row[p] * du;
        }
    }

    let lu = ata.as_ref().full_piv_lu();
    let x = lu.solve(&atb);
    for p in 0..n_unknowns {
        if !x[(p, 0)].is_finite() {
            return None;
        }
    }

    let mut gradient = [0.0; 3];
    for k in 0..dim {
        gradient[k] = x[(k, 0)];
    }
    // Hessian in [xx, yy, zz, xy, xz, yz] ordering.
    let mut hessian = [0.0; 6];
    for k in 0..dim {
        hessian[k] = x[(dim + k, 0)];
    }
    for (idx, &(a, b)) in pairs.iter().enumerate() {
        hessian[3 + a + b - 1] = x[(2 * dim + idx, 0)];
    }

    // Limit the full deviation at cell vertices, scaling gradient and
    // Hessian together.
    let (umin, umax) = stencil_bounds(u, values, stencil);
    let vertices = mesh.cell_region(cell).vertex_coords();
    let deviations: Vec<f64> = vertices
        .iter()
        .map(|v| {
            let mut d = [0.0; 3];
            for k in 0..dim {
                d[k] = v[k] - center[k];
            }
            dot3(&gradient, &d) + 0.5 * quad_form(&hessian, &d)
        })
        .collect();
    let phi = limited_factor(u, umin, umax, &deviations);
    for g in gradient.iter_mut() {
        *g *= phi;
    }
    for h in hessian.iter_mut() {
        *h *= phi;
    }

    // Shift the constant so the polynomial's average over the cell equals
    // the cell average; without this the quadratic term breaks
    // conservation.
    let m = mesh.cell_region(cell).moments(true);
    let m2 = m.m2.unwrap_or([0.0; 6]);
    let mean_quad = centered_second_mean(&m2, &m.m1, m.m0, center);
    let value = u - 0.5 * quad_contract(&hessian, &mean_quad);

    Some(CellPolynomial::Quadratic {
        value,
        gradient,
        hessian,
    })
}

/// Off-diagonal index pairs active in `dim` dimensions, ordered (xy, xz, yz).
fn off_diagonal_pairs(dim: usize) -> Vec<(usize, usize)> {
    match dim {
        1 => vec![],
        2 => vec![(0, 1)],
        3 => vec![(0, 1), (0, 2), (1, 2)],
        _ => unreachable!("dimension must be 1, 2, or 3"),
    }
}

fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// `d^T H d` with `H` in `[xx, yy, zz, xy, xz, yz]` ordering.
fn quad_form(h: &[f64; 6], d: &[f64; 3]) -> f64 {
    h[0] * d[0] * d[0]
        + h[1] * d[1] * d[1]
        + h[2] * d[2] * d[2]
        + 2.0 * (h[3] * d[0] * d[1] + h[4] * d[0] * d[2] + h[5] * d[1] * d[2])
}

/// `sum_ij H_ij M_ij` over symmetric component arrays (off-diagonals twice).
fn quad_contract(h: &[f64; 6], m: &[f64; 6]) -> f64 {
    h[0] * m[0]
        + h[1] * m[1]
        + h[2] * m[2]
        + 2.0 * (h[3] * m[3] + h[4] * m[4] + h[5] * m[5])
}

/// Mean of centered second monomials over a region:
/// `(1/m0) int (x_i - c_i)(x_j - c_j)` in symmetric component ordering.
fn centered_second_mean(m2: &[f64; 6], m1: &[f64; 3], m0: f64, c: [f64; 3]) -> [f64; 6] {
    if m0 <= 0.0 {
        return [0.0; 6];
    }
    let inv = 1.0 / m0;
    let comp = |idx: usize, i: usize, j: usize| {
        (m2[idx] - c[i] * m1[j] - c[j] * m1[i] + c[i] * c[j] * m0) * inv
    };
    [
        comp(0, 0, 0),
        comp(1, 1, 1),
        comp(2, 2, 2),
        comp(3, 0, 1),
        comp(4, 0, 2),
        comp(5, 1, 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CartesianMesh1D, CartesianMesh2D};

    const TOL: f64 = 1e-10;

    fn linear_field(mesh: &CartesianMesh2D, a: f64, b: f64, c: f64) -> Vec<Option<f64>> {
        (0..mesh.n_cells())
            .map(|i| {
                let p = mesh.cell_centroid(i);
                Some(a + b * p[0] + c * p[1])
            })
            .collect()
    }

    #[test]
    fn test_order0_is_cell_average() {
        let mesh = CartesianMesh2D::new(3, 3, [0.0, 0.0], [1.0, 1.0]);
        let values = linear_field(&mesh, 2.0, 0.0, 0.0);
        let poly = reconstruct_cell(&mesh, &values, 4, 0).unwrap();
        assert_eq!(poly, CellPolynomial::Constant(2.0));
    }

    #[test]
    fn test_linear_field_gradient_exact() {
        let mesh = CartesianMesh2D::new(5, 5, [0.0, 0.0], [0.2, 0.2]);
        let values = linear_field(&mesh, 1.0, 3.0, -2.0);
        // Interior cell: the unlimited least-squares gradient is exact and
        // the limiter must not cut it (linear data creates no new extrema).
        let poly = reconstruct_cell(&mesh, &values, 12, 1).unwrap();
        match poly {
            CellPolynomial::Linear { value, gradient } => {
                let c = mesh.cell_centroid(12);
                assert!((value - (1.0 + 3.0 * c[0] - 2.0 * c[1])).abs() < TOL);
                assert!((gradient[0] - 3.0).abs() < TOL);
                assert!((gradient[1] + 2.0).abs() < TOL);
            }
            other => panic!("expected linear polynomial, got {other:?}"),
        }
    }

    #[test]
    fn test_limiter_clips_steep_gradient() {
        // A steep asymmetric x-profile: the unlimited fit extrapolates below
        // the stencil minimum at the left face, so the limiter must shrink
        // the gradient until every vertex stays in [0, 10].
        let mesh = CartesianMesh2D::new(3, 3, [0.0, 0.0], [1.0, 1.0]);
        let values = vec![
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(0.0),
            Some(1.0),
            Some(10.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
        ];
        let poly = reconstruct_cell(&mesh, &values, 4, 1).unwrap();
        match poly {
            CellPolynomial::Linear { value, gradient } => {
                // Extrapolations at the cell vertices must stay in [0, 10].
                for dx in [-0.5, 0.5] {
                    for dy in [-0.5, 0.5] {
                        let v = value + gradient[0] * dx + gradient[1] * dy;
                        assert!(v >= -TOL && v <= 10.0 + TOL, "vertex value {v}");
                    }
                }
                // The unlimited x-gradient is 5; it must have been cut.
                assert!(gradient[0] < 5.0 - TOL);
            }
            other => panic!("expected linear polynomial, got {other:?}"),
        }
    }

    #[test]
    fn test_under_determined_falls_back() {
        // A 1-cell mesh has no neighbors: order 1 must fall back to the
        // constant, not fail.
        let mesh = CartesianMesh1D::uniform(0.0, 1.0, 1);
        let values = vec![Some(5.0)];
        let poly = reconstruct_cell(&mesh, &values, 0, 1).unwrap();
        assert_eq!(poly, CellPolynomial::Constant(5.0));
    }

    #[test]
    fn test_quadratic_falls_back_to_linear() {
        // 2 cells in 1D: the two-ring has a single entry, not enough for
        // the two quadratic unknowns, so the fit drops to linear.
        let mesh = CartesianMesh1D::uniform(0.0, 2.0, 2);
        let values = vec![Some(1.0), Some(2.0)];
        let poly = reconstruct_cell(&mesh, &values, 0, 2).unwrap();
        assert!(matches!(poly, CellPolynomial::Linear { .. }));
    }

    #[test]
    fn test_quadratic_reproduces_parabola_mean() {
        // Conservation form: the quadratic polynomial's cell average must
        // equal the input cell average regardless of the fitted Hessian.
        let mesh = CartesianMesh2D::new(5, 5, [0.0, 0.0], [1.0, 1.0]);
        let values: Vec<Option<f64>> = (0..mesh.n_cells())
            .map(|i| {
                let p = mesh.cell_centroid(i);
                Some(p[0] * p[0] + 0.5 * p[1])
            })
            .collect();
        let cell = 12;
        let poly = reconstruct_cell(&mesh, &values, cell, 2).unwrap();
        let m = mesh.cell_region(cell).moments(true);
        let c = mesh.cell_centroid(cell).padded();
        let avg = poly.integrate(c, &m) / m.m0;
        assert!((avg - values[cell].unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_absent_cell_yields_none() {
        let mesh = CartesianMesh2D::new(2, 2, [0.0, 0.0], [1.0, 1.0]);
        let values = vec![None, Some(1.0), Some(1.0), Some(1.0)];
        assert!(reconstruct_cell(&mesh, &values, 0, 1).is_none());
        // Neighbors missing a value are simply excluded from the stencil.
        assert!(reconstruct_cell(&mesh, &values, 3, 1).is_some());
    }
}
