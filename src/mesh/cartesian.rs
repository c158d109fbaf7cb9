//! Structured Cartesian meshes implementing the remap capability trait.
//!
//! These are the reference meshes used by tests and benches: uniform cells,
//! face-neighbor stencils, and sub-block extraction that preserves parent
//! global ids so partitioned remaps can be compared against serial ones.

use crate::geometry::{ConvexRegion, Polygon2, Polyhedron3};

use super::traits::RemapMesh;

// =============================================================================
// 1D
// =============================================================================

/// Uniform 1D interval mesh.
#[derive(Clone, Debug)]
pub struct CartesianMesh1D {
    /// Number of cells.
    pub nx: usize,
    /// Left domain boundary.
    pub x0: f64,
    /// Cell size.
    pub dx: f64,
    ids: Option<Vec<u64>>,
}

impl CartesianMesh1D {
    /// `nx` uniform cells starting at `x0` with spacing `dx`.
    pub fn new(nx: usize, x0: f64, dx: f64) -> Self {
        Self {
            nx,
            x0,
            dx,
            ids: None,
        }
    }

    /// Uniform mesh over `[a, b]` with `nx` cells.
    pub fn uniform(a: f64, b: f64, nx: usize) -> Self {
        Self::new(nx, a, (b - a) / nx as f64)
    }

    /// Contiguous sub-block `[i0, i0 + n)` keeping parent global ids.
    pub fn sub_block(&self, i0: usize, n: usize) -> Self {
        assert!(i0 + n <= self.nx, "sub-block exceeds parent mesh");
        Self {
            nx: n,
            x0: self.x0 + i0 as f64 * self.dx,
            dx: self.dx,
            ids: Some((i0..i0 + n).map(|i| self.global_id_of_parent(i)).collect()),
        }
    }

    fn global_id_of_parent(&self, i: usize) -> u64 {
        match &self.ids {
            Some(ids) => ids[i],
            None => i as u64,
        }
    }
}

impl RemapMesh for CartesianMesh1D {
    type Coord = f64;

    fn n_cells(&self) -> usize {
        self.nx
    }

    fn cell_region(&self, cell: usize) -> ConvexRegion {
        let lo = self.x0 + cell as f64 * self.dx;
        ConvexRegion::Interval { lo, hi: lo + self.dx }
    }

    fn cell_volume(&self, _cell: usize) -> f64 {
        self.dx
    }

    fn cell_centroid(&self, cell: usize) -> f64 {
        self.x0 + (cell as f64 + 0.5) * self.dx
    }

    fn cell_neighbors(&self, cell: usize) -> Vec<usize> {
        let mut n = Vec::with_capacity(2);
        if cell > 0 {
            n.push(cell - 1);
        }
        if cell + 1 < self.nx {
            n.push(cell + 1);
        }
        n
    }

    fn global_id(&self, cell: usize) -> u64 {
        self.global_id_of_parent(cell)
    }
}

// =============================================================================
// 2D
// =============================================================================

/// Uniform 2D quadrilateral mesh.
///
/// Cells are indexed row-major: `cell = j * nx + i`.
#[derive(Clone, Debug)]
pub struct CartesianMesh2D {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Lower-left domain corner.
    pub origin: [f64; 2],
    /// Cell size per axis.
    pub spacing: [f64; 2],
    ids: Option<Vec<u64>>,
}

impl CartesianMesh2D {
    /// `nx * ny` uniform cells from `origin` with per-axis `spacing`.
    pub fn new(nx: usize, ny: usize, origin: [f64; 2], spacing: [f64; 2]) -> Self {
        Self {
            nx,
            ny,
            origin,
            spacing,
            ids: None,
        }
    }

    /// Uniform mesh over the rectangle `[x0, x1] x [y0, y1]`.
    pub fn uniform(x0: f64, y0: f64, x1: f64, y1: f64, nx: usize, ny: usize) -> Self {
        Self::new(
            nx,
            ny,
            [x0, y0],
            [(x1 - x0) / nx as f64, (y1 - y0) / ny as f64],
        )
    }

    fn indices(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx, cell / self.nx)
    }

    /// Rectangular sub-block keeping parent global ids.
    ///
    /// The union of disjoint sub-blocks remaps to exactly the same
    /// `(global_id, value)` mapping as the parent mesh; this is how the
    /// partition-independence property is tested.
    pub fn sub_block(&self, i0: usize, j0: usize, nx: usize, ny: usize) -> Self {
        assert!(i0 + nx <= self.nx && j0 + ny <= self.ny, "sub-block exceeds parent mesh");
        let mut ids = Vec::with_capacity(nx * ny);
        for j in j0..j0 + ny {
            for i in i0..i0 + nx {
                ids.push(self.global_id(j * self.nx + i));
            }
        }
        Self {
            nx,
            ny,
            origin: [
                self.origin[0] + i0 as f64 * self.spacing[0],
                self.origin[1] + j0 as f64 * self.spacing[1],
            ],
            spacing: self.spacing,
            ids: Some(ids),
        }
    }
}

impl RemapMesh for CartesianMesh2D {
    type Coord = [f64; 2];

    fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    fn cell_region(&self, cell: usize) -> ConvexRegion {
        let (i, j) = self.indices(cell);
        let x0 = self.origin[0] + i as f64 * self.spacing[0];
        let y0 = self.origin[1] + j as f64 * self.spacing[1];
        ConvexRegion::Polygon(Polygon2::rectangle(
            x0,
            y0,
            x0 + self.spacing[0],
            y0 + self.spacing[1],
        ))
    }

    fn cell_volume(&self, _cell: usize) -> f64 {
        self.spacing[0] * self.spacing[1]
    }

    fn cell_centroid(&self, cell: usize) -> [f64; 2] {
        let (i, j) = self.indices(cell);
        [
            self.origin[0] + (i as f64 + 0.5) * self.spacing[0],
            self.origin[1] + (j as f64 + 0.5) * self.spacing[1],
        ]
    }

    fn cell_neighbors(&self, cell: usize) -> Vec<usize> {
        let (i, j) = self.indices(cell);
        let mut n = Vec::with_capacity(4);
        if i > 0 {
            n.push(cell - 1);
        }
        if i + 1 < self.nx {
            n.push(cell + 1);
        }
        if j > 0 {
            n.push(cell - self.nx);
        }
        if j + 1 < self.ny {
            n.push(cell + self.nx);
        }
        n
    }

    fn global_id(&self, cell: usize) -> u64 {
        match &self.ids {
            Some(ids) => ids[cell],
            None => cell as u64,
        }
    }
}

// =============================================================================
// 3D
// =============================================================================

/// Uniform 3D hexahedral mesh.
///
/// Cells are indexed `cell = (k * ny + j) * nx + i`.
#[derive(Clone, Debug)]
pub struct CartesianMesh3D {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Cells along z.
    pub nz: usize,
    /// Lower domain corner.
    pub origin: [f64; 3],
    /// Cell size per axis.
    pub spacing: [f64; 3],
    ids: Option<Vec<u64>>,
}

impl CartesianMesh3D {
    /// `nx * ny * nz` uniform cells from `origin` with per-axis `spacing`.
    pub fn new(nx: usize, ny: usize, nz: usize, origin: [f64; 3], spacing: [f64; 3]) -> Self {
        Self {
            nx,
            ny,
            nz,
            origin,
            spacing,
            ids: None,
        }
    }

    fn indices(&self, cell: usize) -> (usize, usize, usize) {
        let i = cell % self.nx;
        let j = (cell / self.nx) % self.ny;
        let k = cell / (self.nx * self.ny);
        (i, j, k)
    }

    fn lower_corner(&self, cell: usize) -> [f64; 3] {
        let (i, j, k) = self.indices(cell);
        [
            self.origin[0] + i as f64 * self.spacing[0],
            self.origin[1] + j as f64 * self.spacing[1],
            self.origin[2] + k as f64 * self.spacing[2],
        ]
    }
}

impl RemapMesh for CartesianMesh3D {
    type Coord = [f64; 3];

    fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    fn cell_region(&self, cell: usize) -> ConvexRegion {
        let lo = self.lower_corner(cell);
        let hi = [
            lo[0] + self.spacing[0],
            lo[1] + self.spacing[1],
            lo[2] + self.spacing[2],
        ];
        ConvexRegion::Polyhedron(Polyhedron3::axis_aligned_box(lo, hi))
    }

    fn cell_volume(&self, _cell: usize) -> f64 {
        self.spacing[0] * self.spacing[1] * self.spacing[2]
    }

    fn cell_centroid(&self, cell: usize) -> [f64; 3] {
        let lo = self.lower_corner(cell);
        [
            lo[0] + 0.5 * self.spacing[0],
            lo[1] + 0.5 * self.spacing[1],
            lo[2] + 0.5 * self.spacing[2],
        ]
    }

    fn cell_neighbors(&self, cell: usize) -> Vec<usize> {
        let (i, j, k) = self.indices(cell);
        let mut n = Vec::with_capacity(6);
        if i > 0 {
            n.push(cell - 1);
        }
        if i + 1 < self.nx {
            n.push(cell + 1);
        }
        if j > 0 {
            n.push(cell - self.nx);
        }
        if j + 1 < self.ny {
            n.push(cell + self.nx);
        }
        if k > 0 {
            n.push(cell - self.nx * self.ny);
        }
        if k + 1 < self.nz {
            n.push(cell + self.nx * self.ny);
        }
        n
    }

    fn global_id(&self, cell: usize) -> u64 {
        match &self.ids {
            Some(ids) => ids[cell],
            None => cell as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::RemapMesh;

    const TOL: f64 = 1e-14;

    #[test]
    fn test_mesh2d_cell_geometry() {
        let mesh = CartesianMesh2D::uniform(0.0, 0.0, 2.0, 1.0, 4, 2);
        assert_eq!(mesh.n_cells(), 8);
        assert!((mesh.cell_volume(0) - 0.25).abs() < TOL);
        let c = mesh.cell_centroid(5); // i=1, j=1
        assert!((c[0] - 0.75).abs() < TOL);
        assert!((c[1] - 0.75).abs() < TOL);
        // Region moments agree with the analytic cell measure.
        let m = mesh.cell_region(5).moments(false);
        assert!((m.m0 - mesh.cell_volume(5)).abs() < TOL);
    }

    #[test]
    fn test_mesh2d_neighbors() {
        let mesh = CartesianMesh2D::new(3, 3, [0.0, 0.0], [1.0, 1.0]);
        // Center cell has four neighbors; a corner has two.
        let mut center = mesh.cell_neighbors(4);
        center.sort_unstable();
        assert_eq!(center, vec![1, 3, 5, 7]);
        assert_eq!(mesh.cell_neighbors(0).len(), 2);
    }

    #[test]
    fn test_mesh2d_sub_block_global_ids() {
        let parent = CartesianMesh2D::new(4, 4, [0.0, 0.0], [1.0, 1.0]);
        let block = parent.sub_block(2, 1, 2, 2);
        assert_eq!(block.n_cells(), 4);
        // Parent cells (2,1), (3,1), (2,2), (3,2) = ids 6, 7, 10, 11.
        let ids: Vec<u64> = (0..4).map(|c| block.global_id(c)).collect();
        assert_eq!(ids, vec![6, 7, 10, 11]);
        // Geometry lines up with the parent cells.
        let c = block.cell_centroid(0);
        let pc = parent.cell_centroid(6);
        assert!((c[0] - pc[0]).abs() < TOL);
        assert!((c[1] - pc[1]).abs() < TOL);
    }

    #[test]
    fn test_mesh1d_sub_block() {
        let parent = CartesianMesh1D::uniform(0.0, 1.0, 10);
        let block = parent.sub_block(4, 3);
        assert_eq!(block.n_cells(), 3);
        assert_eq!(block.global_id(0), 4);
        assert!((block.cell_centroid(0) - parent.cell_centroid(4)).abs() < TOL);
    }

    #[test]
    fn test_mesh3d_geometry() {
        let mesh = CartesianMesh3D::new(2, 2, 2, [0.0; 3], [0.5, 1.0, 2.0]);
        assert_eq!(mesh.n_cells(), 8);
        assert!((mesh.cell_volume(0) - 1.0).abs() < TOL);
        let c = mesh.cell_centroid(7);
        assert!((c[0] - 0.75).abs() < TOL);
        assert!((c[1] - 1.5).abs() < TOL);
        assert!((c[2] - 3.0).abs() < TOL);
        assert_eq!(mesh.cell_neighbors(0).len(), 3);
        let m = mesh.cell_region(3).moments(false);
        assert!((m.m0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cell_bbox_matches_region() {
        let mesh = CartesianMesh2D::new(2, 2, [1.0, 2.0], [0.5, 0.25]);
        let b = mesh.cell_bbox(3);
        assert_eq!(b.min, [1.5, 2.25]);
        assert_eq!(b.max, [2.0, 2.5]);
    }
}
