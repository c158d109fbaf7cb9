//! The mesh capability interface consumed by the remap core.

use crate::geometry::{ConvexRegion, Point};
use crate::search::Aabb;

/// Capability interface a mesh wrapper must provide to act as a remap
/// source or target.
///
/// The core never owns mesh data; every query must be deterministic and
/// side-effect-free, and cells are immutable for the duration of a remap
/// pass. Cell indices are local (`0..n_cells()`); [`global_id`] ties a local
/// cell to its identity across mesh partitions.
///
/// [`global_id`]: RemapMesh::global_id
pub trait RemapMesh: Send + Sync {
    /// Physical coordinate type (`f64`, `[f64; 2]`, or `[f64; 3]`).
    type Coord: Point;

    /// Number of cells owned by this mesh (or mesh partition).
    fn n_cells(&self) -> usize;

    /// The cell's extent as a convex region for clipping.
    ///
    /// Non-convex cells must be handed over pre-decomposed; the Cartesian
    /// meshes here are convex by construction.
    fn cell_region(&self, cell: usize) -> ConvexRegion;

    /// Cell measure (length/area/volume).
    fn cell_volume(&self, cell: usize) -> f64;

    /// Cell centroid.
    fn cell_centroid(&self, cell: usize) -> Self::Coord;

    /// Face-adjacent neighbor cells, used as the reconstruction stencil.
    fn cell_neighbors(&self, cell: usize) -> Vec<usize>;

    /// Partition-independent identity of a cell.
    ///
    /// Two partitions of the same parent mesh must report the parent's ids
    /// so that distributed output can be compared against a serial run.
    fn global_id(&self, cell: usize) -> u64 {
        cell as u64
    }

    /// Axis-aligned bounding box of the cell.
    ///
    /// The default derives it from the region's vertices; meshes with
    /// cheaper exact boxes may override.
    fn cell_bbox(&self, cell: usize) -> Aabb<Self::Coord> {
        let verts = self.cell_region(cell).vertex_coords();
        let points: Vec<Self::Coord> = verts
            .iter()
            .map(|v| Self::Coord::from_slice(&v[..Self::Coord::DIM]))
            .collect();
        Aabb::from_points(&points)
    }
}
