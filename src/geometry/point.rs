//! Coordinate type abstractions for dimension-independent remap operations.
//!
//! The [`Point`] trait provides a unified interface for coordinates in 1D, 2D,
//! and 3D so that search structures and mesh wrappers can be written once and
//! instantiated per dimension.

use std::fmt::Debug;

/// A point in physical space.
///
/// Implemented for the three coordinate representations the remap core uses:
/// - 1D: `f64`
/// - 2D: `[f64; 2]`
/// - 3D: `[f64; 3]`
///
/// # Example
/// ```
/// use remap_rs::geometry::Point;
///
/// fn separation<P: Point>(a: &P, b: &P) -> f64 {
///     a.distance(b)
/// }
///
/// assert!((separation(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-14);
/// ```
pub trait Point: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Spatial dimension (1, 2, or 3).
    const DIM: usize;

    /// Access coordinate by index.
    ///
    /// # Panics
    /// Panics if `idx >= Self::DIM`.
    fn coord(&self, idx: usize) -> f64;

    /// Create a point from a slice of coordinates.
    ///
    /// # Panics
    /// Panics if `coords.len() < Self::DIM`.
    fn from_slice(coords: &[f64]) -> Self;

    /// Coordinates padded to three components with trailing zeros.
    ///
    /// The geometry kernel stores gradients and moments in fixed-size
    /// three-component arrays regardless of dimension; this is the bridge.
    fn padded(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for i in 0..Self::DIM {
            out[i] = self.coord(i);
        }
        out
    }

    /// Create a point with all coordinates set to zero.
    fn zero() -> Self {
        Self::default()
    }

    /// Add two points component-wise.
    fn add(&self, other: &Self) -> Self {
        let mut coords = [0.0; 3];
        for i in 0..Self::DIM {
            coords[i] = self.coord(i) + other.coord(i);
        }
        Self::from_slice(&coords[..Self::DIM])
    }

    /// Subtract two points component-wise.
    fn sub(&self, other: &Self) -> Self {
        let mut coords = [0.0; 3];
        for i in 0..Self::DIM {
            coords[i] = self.coord(i) - other.coord(i);
        }
        Self::from_slice(&coords[..Self::DIM])
    }

    /// Scale by a scalar.
    fn scale(&self, c: f64) -> Self {
        let mut coords = [0.0; 3];
        for i in 0..Self::DIM {
            coords[i] = c * self.coord(i);
        }
        Self::from_slice(&coords[..Self::DIM])
    }

    /// Dot product.
    fn dot(&self, other: &Self) -> f64 {
        let mut sum = 0.0;
        for i in 0..Self::DIM {
            sum += self.coord(i) * other.coord(i);
        }
        sum
    }

    /// Euclidean norm.
    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Distance between two points.
    fn distance(&self, other: &Self) -> f64 {
        self.sub(other).norm()
    }

    /// Squared distance (avoids the square root for comparisons and weights).
    fn distance_squared(&self, other: &Self) -> f64 {
        let d = self.sub(other);
        d.dot(&d)
    }

    /// Component-wise minimum, used when growing bounding boxes.
    fn component_min(&self, other: &Self) -> Self {
        let mut coords = [0.0; 3];
        for i in 0..Self::DIM {
            coords[i] = self.coord(i).min(other.coord(i));
        }
        Self::from_slice(&coords[..Self::DIM])
    }

    /// Component-wise maximum, used when growing bounding boxes.
    fn component_max(&self, other: &Self) -> Self {
        let mut coords = [0.0; 3];
        for i in 0..Self::DIM {
            coords[i] = self.coord(i).max(other.coord(i));
        }
        Self::from_slice(&coords[..Self::DIM])
    }
}

// =============================================================================
// 1D Implementation: f64
// =============================================================================

impl Point for f64 {
    const DIM: usize = 1;

    #[inline]
    fn coord(&self, idx: usize) -> f64 {
        assert!(idx == 0, "1D point has only index 0, got {idx}");
        *self
    }

    #[inline]
    fn from_slice(coords: &[f64]) -> Self {
        coords[0]
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }
}

// =============================================================================
// 2D Implementation: [f64; 2]
// =============================================================================

impl Point for [f64; 2] {
    const DIM: usize = 2;

    #[inline]
    fn coord(&self, idx: usize) -> f64 {
        self[idx]
    }

    #[inline]
    fn from_slice(coords: &[f64]) -> Self {
        [coords[0], coords[1]]
    }

    #[inline]
    fn zero() -> Self {
        [0.0, 0.0]
    }
}

// =============================================================================
// 3D Implementation: [f64; 3]
// =============================================================================

impl Point for [f64; 3] {
    const DIM: usize = 3;

    #[inline]
    fn coord(&self, idx: usize) -> f64 {
        self[idx]
    }

    #[inline]
    fn from_slice(coords: &[f64]) -> Self {
        [coords[0], coords[1], coords[2]]
    }

    #[inline]
    fn zero() -> Self {
        [0.0, 0.0, 0.0]
    }
}
