//! Cell polynomials and their analytic integrals over overlap moments.

use crate::geometry::Moments;

/// A reconstructed polynomial anchored at its cell centroid.
///
/// The variant is the achieved order, which may be lower than the order
/// requested when the stencil could not support the fit. Gradients and
/// Hessians are stored padded to three components; inactive components are
/// zero. Hessian ordering is `[xx, yy, zz, xy, xz, yz]`.
#[derive(Clone, Debug, PartialEq)]
pub enum CellPolynomial {
    Constant(f64),
    Linear {
        value: f64,
        gradient: [f64; 3],
    },
    Quadratic {
        value: f64,
        gradient: [f64; 3],
        hessian: [f64; 6],
    },
}

impl CellPolynomial {
    /// Achieved polynomial order.
    pub fn order(&self) -> usize {
        match self {
            CellPolynomial::Constant(_) => 0,
            CellPolynomial::Linear { .. } => 1,
            CellPolynomial::Quadratic { .. } => 2,
        }
    }

    /// Point value at `x`, with the polynomial anchored at `centroid`.
    pub fn evaluate(&self, centroid: [f64; 3], x: [f64; 3]) -> f64 {
        let d = [x[0] - centroid[0], x[1] - centroid[1], x[2] - centroid[2]];
        match self {
            CellPolynomial::Constant(u) => *u,
            CellPolynomial::Linear { value, gradient } => value + dot(gradient, &d),
            CellPolynomial::Quadratic {
                value,
                gradient,
                hessian,
            } => value + dot(gradient, &d) + 0.5 * quad(hessian, &d),
        }
    }

    /// Exact integral of the polynomial over a region given the region's
    /// raw moments, with the polynomial anchored at `centroid`.
    ///
    /// The linear term needs first moments; the quadratic term needs second
    /// moments and contributes nothing when `m.m2` was not computed.
    pub fn integrate(&self, centroid: [f64; 3], m: &Moments) -> f64 {
        let c = centroid;
        match self {
            CellPolynomial::Constant(u) => u * m.m0,
            CellPolynomial::Linear { value, gradient } => {
                let mut acc = value * m.m0;
                for k in 0..3 {
                    acc += gradient[k] * (m.m1[k] - m.m0 * c[k]);
                }
                acc
            }
            CellPolynomial::Quadratic {
                value,
                gradient,
                hessian,
            } => {
                let mut acc = value * m.m0;
                for k in 0..3 {
                    acc += gradient[k] * (m.m1[k] - m.m0 * c[k]);
                }
                if let Some(m2) = m.m2 {
                    // int (x_i - c_i)(x_j - c_j)
                    //   = m2_ij - c_i m1_j - c_j m1_i + c_i c_j m0
                    let pairs = [(0, 0, 0), (1, 1, 1), (2, 2, 2), (3, 0, 1), (4, 0, 2), (5, 1, 2)];
                    for (idx, i, j) in pairs {
                        let centered =
                            m2[idx] - c[i] * m.m1[j] - c[j] * m.m1[i] + c[i] * c[j] * m.m0;
                        let weight = if i == j { 0.5 } else { 1.0 };
                        acc += weight * hessian[idx] * centered;
                    }
                }
                acc
            }
        }
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn quad(h: &[f64; 6], d: &[f64; 3]) -> f64 {
    h[0] * d[0] * d[0]
        + h[1] * d[1] * d[1]
        + h[2] * d[2] * d[2]
        + 2.0 * (h[3] * d[0] * d[1] + h[4] * d[0] * d[2] + h[5] * d[1] * d[2])
}
