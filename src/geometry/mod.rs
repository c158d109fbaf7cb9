//! Robust geometric primitives for the remap core.
//!
//! Point/vector arithmetic, convex region representations per dimension,
//! half-space clipping, and signed moment accumulation.

mod moments;
mod point;
mod polygon;
mod polyhedron;
mod region;

pub use moments::{Moments, M2_COMPONENTS, MOMENT_EPS};
pub use point::Point;
pub use polygon::Polygon2;
pub use polyhedron::Polyhedron3;
pub use region::ConvexRegion;
