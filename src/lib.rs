//! # remap-rs
//!
//! A conservative field remap library for transferring cell-averaged field
//! data between computational meshes.
//!
//! This crate provides the core building blocks of the remap pipeline:
//! - Geometry kernel (points, polygons, polyhedra, half-space clipping,
//!   moment accumulation)
//! - Spatial search (k-d tree over cell bounding boxes)
//! - Exact overlap intersection with signed-moment formulas
//! - Limited polynomial field reconstruction (constant, linear, quadratic)
//! - Conservative, bound-preserving remap with coverage reporting
//! - Smoothing-kernel library for meshfree remap
//! - Serial-vs-partitioned field dump validation
//!
//! The pipeline is Search -> Intersect -> Reconstruct -> Remap: candidate
//! source cells for each target cell come from the search index, the
//! intersector clips them to exact overlap moments, and the remapper
//! integrates the reconstructed source polynomials over those moments.
//! Contributions are always accumulated in ascending source-cell order so
//! serial, thread-parallel, and partitioned runs are bit-identical.

pub mod geometry;
pub mod intersect;
pub mod kernels;
pub mod mesh;
pub mod reconstruct;
pub mod remap;
pub mod search;
pub mod state;
pub mod validate;

// Re-export main types for convenience
pub use geometry::{ConvexRegion, Moments, Point, Polygon2, Polyhedron3};
pub use intersect::{intersect, intersect_default};
pub use kernels::{shepard_remap, weight, Kernel, Support};
pub use mesh::{CartesianMesh1D, CartesianMesh2D, CartesianMesh3D, RemapMesh};
pub use reconstruct::{reconstruct_cell, reconstruct_field, CellPolynomial};
pub use remap::{RemapError, RemappedField, Remapper};
pub use search::{Aabb, SearchError, SearchIndex};
pub use state::{FieldStore, FieldValues, MaterialId, UNIFORM_MATERIAL};
pub use validate::{
    compare_dumps, read_dump, write_dump, CompareError, CompareReport, FieldDumpError,
    DEFAULT_TOLERANCE,
};
