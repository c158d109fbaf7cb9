//! Integral moments of an overlap region.
//!
//! A [`Moments`] value carries the 0th moment (length/area/volume), the first
//! moments (volume-weighted coordinates), and optionally the symmetric second
//! moments needed for quadratic remap. The centroid of the region is
//! `m1 / m0` whenever `m0 > 0`.

/// Default epsilon below which a 0th moment is clamped to exactly zero.
///
/// Slivers this small are floating-point noise from clipping nearly
/// coincident boundaries; keeping them would inject spurious contributions.
pub const MOMENT_EPS: f64 = 1e-14;

/// Number of symmetric second-moment components.
///
/// Ordering is `[xx, yy, zz, xy, xz, yz]`; components beyond the active
/// dimension stay zero.
pub const M2_COMPONENTS: usize = 6;

/// Integral moments of a clipped overlap region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    /// 0th moment: length (1D), area (2D), or volume (3D).
    pub m0: f64,
    /// First moments, padded to three components.
    pub m1: [f64; 3],
    /// Symmetric second moments `[xx, yy, zz, xy, xz, yz]`, when requested.
    pub m2: Option<[f64; M2_COMPONENTS]>,
}

impl Moments {
    /// The zero (empty-region) moments vector.
    pub fn zero(with_second: bool) -> Self {
        Self {
            m0: 0.0,
            m1: [0.0; 3],
            m2: if with_second { Some([0.0; M2_COMPONENTS]) } else { None },
        }
    }

    /// Whether this region is degenerate/empty and contributes nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.m0 == 0.0
    }

    /// Centroid `m1 / m0`, or `None` for an empty region.
    pub fn centroid(&self) -> Option<[f64; 3]> {
        if self.m0 > 0.0 {
            let inv = 1.0 / self.m0;
            Some([self.m1[0] * inv, self.m1[1] * inv, self.m1[2] * inv])
        } else {
            None
        }
    }

    /// Accumulate another moments vector (signed pieces cancel correctly).
    pub fn accumulate(&mut self, other: &Moments) {
        self.m0 += other.m0;
        for i in 0..3 {
            self.m1[i] += other.m1[i];
        }
        if let (Some(a), Some(b)) = (self.m2.as_mut(), other.m2.as_ref()) {
            for i in 0..M2_COMPONENTS {
                a[i] += b[i];
            }
        }
    }

    /// Clamp a near-zero 0th moment to the exact zero vector.
    ///
    /// Signed fan decomposition can leave `m0` a tiny negative number for a
    /// degenerate region; anything with `|m0| < eps` is treated as empty.
    pub fn clamped(self, eps: f64) -> Self {
        if self.m0.abs() < eps {
            Moments::zero(self.m2.is_some())
        } else {
            self
        }
    }
}
