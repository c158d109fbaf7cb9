//! Smoothing kernels for meshfree remap.
//!
//! When no target cell boundary exists (particle clouds, swept-face mode)
//! the overlap moments are replaced by kernel weights: the remap integral
//! becomes the Shepard sum `sum w_i u_i / sum w_i`. Kernel and support
//! geometry are closed enums so every evaluation path is an exhaustive match
//! with an explicit value per arm.
//!
//! All kernels are functions of a nonnegative scaled separation `s`. The
//! compact kernels are normalized to unit integral over their support; the
//! singular kernels (inverse-square, Coulomb) have no finite integral and
//! are used unnormalized with an epsilon-regularized core.

use crate::geometry::Point;
use crate::search::{Aabb, KdTree};

use std::f64::consts::PI;

/// Regularization added to the scaled separation of singular kernels.
pub const SINGULAR_EPS: f64 = 1e-6;

/// Smoothing kernel profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Cubic B-spline, support radius 2.
    CubicSpline,
    /// Parabolic `1 - s^2`, support radius 1.
    Epanechnikov,
    /// `1 / (s^2 + eps^2)`, global support, unnormalized.
    InverseSquare,
    /// `1 / (s + eps)`, global support, unnormalized.
    Coulomb,
    /// Flat top to `s = 1/2`, linear ramp to zero at `s = 1`.
    FacetedRamp,
}

/// How the multi-dimensional separation is fed to the kernel profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// Radial argument `s = |(x - y) / h|` with per-axis scaling; one
    /// profile evaluation, normalized for the dimension.
    Elliptic,
    /// Per-axis product of 1D profile evaluations.
    Tensor,
}

impl Kernel {
    /// Profile value at scaled separation `s >= 0` (unnormalized).
    pub fn value(&self, s: f64) -> f64 {
        match self {
            Kernel::CubicSpline => {
                if s < 1.0 {
                    1.0 - 1.5 * s * s + 0.75 * s * s * s
                } else if s < 2.0 {
                    0.25 * (2.0 - s).powi(3)
                } else {
                    0.0
                }
            }
            Kernel::Epanechnikov => {
                if s < 1.0 {
                    1.0 - s * s
                } else {
                    0.0
                }
            }
            Kernel::InverseSquare => 1.0 / (s * s + SINGULAR_EPS * SINGULAR_EPS),
            Kernel::Coulomb => 1.0 / (s + SINGULAR_EPS),
            Kernel::FacetedRamp => {
                if s <= 0.5 {
                    1.0
                } else if s < 1.0 {
                    2.0 * (1.0 - s)
                } else {
                    0.0
                }
            }
        }
    }

    /// First derivative of the profile with respect to `s`.
    pub fn derivative(&self, s: f64) -> f64 {
        match self {
            Kernel::CubicSpline => {
                if s < 1.0 {
                    -3.0 * s + 2.25 * s * s
                } else if s < 2.0 {
                    -0.75 * (2.0 - s) * (2.0 - s)
                } else {
                    0.0
                }
            }
            Kernel::Epanechnikov => {
                if s < 1.0 {
                    -2.0 * s
                } else {
                    0.0
                }
            }
            Kernel::InverseSquare => {
                let d = s * s + SINGULAR_EPS * SINGULAR_EPS;
                -2.0 * s / (d * d)
            }
            Kernel::Coulomb => {
                let d = s + SINGULAR_EPS;
                -1.0 / (d * d)
            }
            Kernel::FacetedRamp => {
                if s <= 0.5 || s >= 1.0 {
                    0.0
                } else {
                    -2.0
                }
            }
        }
    }

    /// Second derivative of the profile with respect to `s`.
    pub fn second_derivative(&self, s: f64) -> f64 {
        match self {
            Kernel::CubicSpline => {
                if s < 1.0 {
                    -3.0 + 4.5 * s
                } else if s < 2.0 {
                    1.5 * (2.0 - s)
                } else {
                    0.0
                }
            }
            Kernel::Epanechnikov => {
                if s < 1.0 {
                    -2.0
                } else {
                    0.0
                }
            }
            Kernel::InverseSquare => {
                let d = s * s + SINGULAR_EPS * SINGULAR_EPS;
                (6.0 * s * s - 2.0 * SINGULAR_EPS * SINGULAR_EPS) / (d * d * d)
            }
            Kernel::Coulomb => {
                let d = s + SINGULAR_EPS;
                2.0 / (d * d * d)
            }
            Kernel::FacetedRamp => 0.0,
        }
    }

    /// Support radius in scaled units; infinite for the singular kernels.
    pub fn support_radius(&self) -> f64 {
        match self {
            Kernel::CubicSpline => 2.0,
            Kernel::Epanechnikov => 1.0,
            Kernel::FacetedRamp => 1.0,
            Kernel::InverseSquare => f64::INFINITY,
            Kernel::Coulomb => f64::INFINITY,
        }
    }

    /// Radial normalization constant for `dim`-dimensional elliptic support
    /// so that the normalized kernel integrates to one. The singular kernels
    /// are not normalizable and return 1.
    ///
    /// # Panics
    /// Panics if `dim` is not 1, 2, or 3.
    pub fn normalization(&self, dim: usize) -> f64 {
        match self {
            Kernel::CubicSpline => match dim {
                1 => 2.0 / 3.0,
                2 => 10.0 / (7.0 * PI),
                3 => 1.0 / PI,
                _ => panic!("dimension must be 1, 2, or 3"),
            },
            Kernel::Epanechnikov => match dim {
                1 => 0.75,
                2 => 2.0 / PI,
                3 => 15.0 / (8.0 * PI),
                _ => panic!("dimension must be 1, 2, or 3"),
            },
            Kernel::FacetedRamp => match dim {
                1 => 2.0 / 3.0,
                2 => 12.0 / (7.0 * PI),
                3 => 8.0 / (5.0 * PI),
                _ => panic!("dimension must be 1, 2, or 3"),
            },
            Kernel::InverseSquare => 1.0,
            Kernel::Coulomb => 1.0,
        }
    }
}

/// Normalized kernel weight between two points.
///
/// `h` holds the per-axis smoothing lengths; only the first `P::DIM` entries
/// are used and all must be positive. Elliptic support evaluates the profile
/// once on the scaled radial separation; tensor support takes the per-axis
/// product of 1D evaluations. Either way the result integrates to one over
/// `y` for the compact kernels.
pub fn weight<P: Point>(support: Support, kernel: Kernel, x: P, y: P, h: [f64; 3]) -> f64 {
    let dim = P::DIM;
    match support {
        Support::Elliptic => {
            let mut s2 = 0.0;
            let mut hprod = 1.0;
            for k in 0..dim {
                let d = (x.coord(k) - y.coord(k)) / h[k];
                s2 += d * d;
                hprod *= h[k];
            }
            kernel.normalization(dim) / hprod * kernel.value(s2.sqrt())
        }
        Support::Tensor => {
            let mut w = 1.0;
            for k in 0..dim {
                let s = ((x.coord(k) - y.coord(k)) / h[k]).abs();
                w *= kernel.normalization(1) / h[k] * kernel.value(s);
            }
            w
        }
    }
}

/// Shepard (normalized weighted-average) remap of scattered point values.
///
/// For each target point the contributing source points are gathered in
/// ascending index order and the value is `sum w_i u_i / sum w_i`. Compact
/// kernels gather through a k-d tree range query over the support radius;
/// global kernels sum over every source point. A target point with zero
/// total weight (outside every support) yields `None`.
pub fn shepard_remap<P: Point>(
    source_points: &[P],
    source_values: &[f64],
    target_points: &[P],
    support: Support,
    kernel: Kernel,
    h: [f64; 3],
) -> Vec<Option<f64>> {
    assert_eq!(source_points.len(), source_values.len());
    let radius = kernel.support_radius();
    let tree = if radius.is_finite() {
        let boxes: Vec<Aabb<P>> = source_points.iter().map(|&p| Aabb::from_point(p)).collect();
        Some(KdTree::build(boxes))
    } else {
        None
    };
    // Largest axis reach of the support, for the box query.
    let mut reach = 0.0_f64;
    for k in 0..P::DIM {
        reach = reach.max(radius * h[k]);
    }

    target_points
        .iter()
        .map(|&x| {
            let mut num = 0.0;
            let mut den = 0.0;
            let mut accumulate = |i: usize| {
                let w = weight(support, kernel, x, source_points[i], h);
                num += w * source_values[i];
                den += w;
            };
            match &tree {
                Some(tree) => {
                    // Query results are ascending, keeping the sum order
                    // deterministic.
                    for i in tree.query(&Aabb::from_point(x).inflated(reach)) {
                        accumulate(i);
                    }
                }
                None => {
                    for i in 0..source_points.len() {
                        accumulate(i);
                    }
                }
            }
            if den > 0.0 {
                Some(num / den)
            } else {
                None
            }
        })
        .collect()
}
