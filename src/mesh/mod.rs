//! Mesh capability interface and the Cartesian meshes used by tests.
//!
//! The remap core never owns mesh data; it consumes cells through the
//! [`RemapMesh`] trait. Any mesh wrapper that can present its cells as
//! convex regions with volumes, centroids, and neighbor lists can act as a
//! remap source or target.

mod cartesian;
mod traits;

pub use cartesian::{CartesianMesh1D, CartesianMesh2D, CartesianMesh3D};
pub use traits::RemapMesh;
