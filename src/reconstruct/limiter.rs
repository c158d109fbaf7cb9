//! Barth–Jespersen slope limiting.

/// Deviations below this count as flat and do not constrain the factor.
const FLAT_EPS: f64 = 1e-14;

/// Scaling factor in `[0, 1]` that keeps `u + phi * d` inside
/// `[umin, umax]` for every deviation `d`.
///
/// `umin`/`umax` are the bounds of the cell's own average and its stencil
/// averages, so `umin <= u <= umax` holds on entry and the returned factor
/// is well defined. Flat deviations impose no constraint.
pub fn limited_factor(u: f64, umin: f64, umax: f64, deviations: &[f64]) -> f64 {
    let mut phi: f64 = 1.0;
    for &d in deviations {
        if d > FLAT_EPS {
            phi = phi.min((umax - u) / d);
        } else if d < -FLAT_EPS {
            phi = phi.min((umin - u) / d);
        }
    }
    phi.clamp(0.0, 1.0)
}
